// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly global value implementation
//!
//! This module provides the implementation for WebAssembly globals.

use wee_error::{Error, Result};
use wee_foundation::{GlobalType, Value};

/// Represents a WebAssembly global variable in the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalInstance {
    /// The global type (value type and mutability)
    ty:    GlobalType,
    /// The current runtime value of the global variable
    value: Value,
}

impl GlobalInstance {
    /// Create a new runtime global holding `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TYPE_NOT_MATCH`] if `value` does not have the declared
    /// value type.
    pub fn new(ty: GlobalType, value: Value) -> Result<Self> {
        if !value.matches_type(ty.value_type) {
            return Err(Error::TYPE_NOT_MATCH);
        }
        Ok(Self { ty, value })
    }

    /// Get the current runtime value of the global.
    #[must_use]
    pub fn get(&self) -> Value {
        self.value
    }

    /// Set the runtime value of the global.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IMMUTABLE_GLOBAL`] if the global is immutable and
    /// [`Error::TYPE_NOT_MATCH`] if the value type mismatches.
    pub fn set(&mut self, value: Value) -> Result<()> {
        if !self.ty.mutable {
            return Err(Error::IMMUTABLE_GLOBAL);
        }
        if !value.matches_type(self.ty.value_type) {
            return Err(Error::TYPE_NOT_MATCH);
        }
        self.value = value;
        Ok(())
    }

    /// Declared global type
    #[must_use]
    pub fn global_type(&self) -> GlobalType {
        self.ty
    }
}

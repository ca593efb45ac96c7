// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host function implementation for the wee engine.
//!
//! This module provides the types for representing functions implemented by
//! the embedder that can be called from WebAssembly code.

use std::sync::Arc;

use wee_error::Result;
use wee_foundation::{FuncType, Value};

use crate::memory::MemoryInstance;

/// What a host function sees of its caller.
///
/// The memory is memory 0 of the calling module instance, or `None` when
/// the caller has no memory or the host function is invoked directly by the
/// embedder. The host function must bounds check every offset it takes from
/// its arguments; the [`MemoryInstance`] accessors do so.
#[derive(Debug)]
pub struct HostCallFrame<'a> {
    memory: Option<&'a mut MemoryInstance>,
}

impl<'a> HostCallFrame<'a> {
    /// Frame exposing `memory` to the callee.
    #[must_use]
    pub fn new(memory: Option<&'a mut MemoryInstance>) -> Self {
        Self { memory }
    }

    /// Frame without a memory.
    #[must_use]
    pub fn detached() -> Self {
        Self { memory: None }
    }

    /// The caller's memory 0, if any
    pub fn memory(&mut self) -> Option<&mut MemoryInstance> {
        self.memory.as_deref_mut()
    }
}

/// A function implemented by the embedder.
pub trait HostFunction: Send + Sync {
    /// Calls the function with the caller's frame and the arguments.
    ///
    /// # Errors
    ///
    /// Any error ends the current invocation and is reported to its caller.
    fn call(&self, frame: HostCallFrame<'_>, args: &[Value]) -> Result<Vec<Value>>;
}

impl<F> HostFunction for F
where
    F: Fn(HostCallFrame<'_>, &[Value]) -> Result<Vec<Value>> + Send + Sync,
{
    fn call(&self, frame: HostCallFrame<'_>, args: &[Value]) -> Result<Vec<Value>> {
        self(frame, args)
    }
}

/// Payload of a host function instance
#[derive(Clone)]
pub struct HostFunc {
    /// Declared function type
    pub ty:       FuncType,
    /// Cost added to the cost counter per call when cost metering is on
    pub cost:     u64,
    /// The callable
    pub callable: Arc<dyn HostFunction>,
}

impl HostFunc {
    /// Wraps a closure as a host function with cost 0.
    pub fn new<F>(ty: FuncType, f: F) -> Self
    where
        F: Fn(HostCallFrame<'_>, &[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self { ty, cost: 0, callable: Arc::new(f) }
    }

    /// Wraps an existing callable.
    #[must_use]
    pub fn from_callable(ty: FuncType, callable: Arc<dyn HostFunction>) -> Self {
        Self { ty, cost: 0, callable }
    }

    /// Set the per-call cost hint.
    #[must_use]
    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = cost;
        self
    }
}

impl core::fmt::Debug for HostFunc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostFunc").field("ty", &self.ty).field("cost", &self.cost).finish_non_exhaustive()
    }
}

// WEE - wee-error
// Module: Trap Context
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Location information attached to errors leaving the interpreter.

use core::fmt;

/// Where an error surfaced inside executing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapContext {
    /// Text-format name of the instruction that failed
    pub opcode:   &'static str,
    /// Instruction offset inside the function body
    pub offset:   usize,
    /// Store address of the module instance the frame executed against
    pub module:   Option<u32>,
    /// Store address of the executing function
    pub function: Option<u32>,
}

impl TrapContext {
    /// Create a context for `opcode` at instruction `offset`.
    #[must_use]
    pub const fn new(opcode: &'static str, offset: usize) -> Self {
        Self {
            opcode,
            offset,
            module: None,
            function: None,
        }
    }

    /// Record the module instance address.
    #[must_use]
    pub const fn in_module(mut self, module: u32) -> Self {
        self.module = Some(module);
        self
    }

    /// Record the function address.
    #[must_use]
    pub const fn in_function(mut self, function: u32) -> Self {
        self.function = Some(function);
        self
    }
}

impl fmt::Display for TrapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at `{}` offset {}", self.opcode, self.offset)?;
        if let Some(function) = self.function {
            write!(f, ", function {function}")?;
        }
        if let Some(module) = self.module {
            write!(f, ", module {module}")?;
        }
        Ok(())
    }
}

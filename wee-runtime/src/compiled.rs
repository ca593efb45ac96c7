// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Natively compiled (AOT) function support.
//!
//! The compiler producing native code lives outside the engine. A loaded
//! native image implements [`Executable`]; the engine calls its symbols and
//! hands them a [`CompiledCallContext`] through which the native code reaches
//! back into the engine for memory, globals, calls and traps.

use wee_error::{codes, Error, ErrorCategory, Result};
use wee_foundation::Value;

use crate::memory::MemoryInstance;

/// Index of a function symbol inside a native image.
///
/// Defined function `i` of a module (imports not counted) is symbol `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolIndex(pub u32);

/// Engine services available to native code while a symbol runs.
///
/// All indices are module-local indices of the module that defined the
/// running function.
pub trait CompiledCallContext {
    /// Memory 0 of the defining module, if it has one
    fn memory(&mut self) -> Option<&mut MemoryInstance>;

    /// `memory.grow` on memory 0: previous size in pages, or -1.
    fn memory_grow(&mut self, delta: u32) -> i32;

    /// Value of global `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] for an unknown global.
    fn global_get(&self, idx: u32) -> Result<Value>;

    /// Set global `idx`
    ///
    /// # Errors
    ///
    /// Returns the error of [`crate::GlobalInstance::set`] or
    /// [`Error::WRONG_INSTANCE_INDEX`].
    fn global_set(&mut self, idx: u32, value: Value) -> Result<()>;

    /// Call function `func_idx` and return its results.
    ///
    /// # Errors
    ///
    /// Propagates any trap raised by the callee.
    fn call(&mut self, func_idx: u32, args: &[Value]) -> Result<Vec<Value>>;

    /// `call_indirect` through table `table_idx` at `elem_idx`, expecting type
    /// `type_idx`.
    ///
    /// # Errors
    ///
    /// Traps like the interpreted `call_indirect`, then propagates any trap
    /// raised by the callee.
    fn call_indirect(
        &mut self,
        table_idx: u32,
        elem_idx: u32,
        type_idx: u32,
        args: &[Value],
    ) -> Result<Vec<Value>>;

    /// Error to return from native code that traps with `code`.
    fn trap(&mut self, code: u16) -> Error {
        trap_error(code)
    }
}

/// A loaded native image.
///
/// Function instances keep the image alive through an `Arc` for as long as
/// any of them can still call into it.
pub trait Executable: Send + Sync {
    /// Run `symbol` with `args`.
    ///
    /// # Errors
    ///
    /// Returns the trap raised by the native code or by an engine service it
    /// called.
    fn call(
        &self,
        symbol: SymbolIndex,
        ctx: &mut dyn CompiledCallContext,
        args: &[Value],
    ) -> Result<Vec<Value>>;
}

/// Map a trap code reported by native code to the engine's error.
#[must_use]
pub fn trap_error(code: u16) -> Error {
    match code {
        codes::UNREACHABLE => Error::UNREACHABLE,
        codes::MEMORY_OUT_OF_BOUNDS => Error::MEMORY_OUT_OF_BOUNDS,
        codes::ACCESS_FORBID_MEMORY => Error::ACCESS_FORBID_MEMORY,
        codes::TABLE_OUT_OF_BOUNDS => Error::TABLE_OUT_OF_BOUNDS,
        codes::DIVIDE_BY_ZERO => Error::DIVIDE_BY_ZERO,
        codes::INTEGER_OVERFLOW => Error::INTEGER_OVERFLOW,
        codes::INVALID_CONV_TO_INT => Error::INVALID_CONV_TO_INT,
        codes::UNDEFINED_ELEMENT => Error::UNDEFINED_ELEMENT,
        codes::UNINITIALIZED_ELEMENT => Error::UNINITIALIZED_ELEMENT,
        codes::INDIRECT_CALL_TYPE_MISMATCH => Error::INDIRECT_CALL_TYPE_MISMATCH,
        codes::CALL_STACK_EXHAUSTED => Error::CALL_STACK_EXHAUSTED,
        codes::COST_LIMIT_EXCEEDED => Error::COST_LIMIT_EXCEEDED,
        codes::INTERRUPTED => Error::INTERRUPTED,
        codes::TERMINATED => Error::TERMINATED,
        other => Error::new(ErrorCategory::RuntimeTrap, other, "trap raised by compiled code"),
    }
}

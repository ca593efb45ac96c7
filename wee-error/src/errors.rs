// WEE - wee-error
// Module: Error Types
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The engine-wide error type.
//!
//! Every fallible operation in the engine returns [`Error`]. Errors are small
//! `Copy` values: a category, a numeric code from [`crate::codes`], a static
//! message and, once the error has crossed the interpreter boundary, a
//! [`TrapContext`] describing where it happened.

use core::fmt;

use crate::{codes, context::TrapContext};

/// `Error` categories for engine operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Internal consistency errors (stack shape, address resolution)
    Core           = 1,
    /// Resource limit errors (memory and table growth)
    Resource       = 3,
    /// Type errors (signatures, value and reference types)
    Type           = 6,
    /// Runtime workflow errors (lookup by name, VM stage)
    Runtime        = 7,
    /// WebAssembly traps
    RuntimeTrap    = 13,
    /// Instantiation and linking errors
    Initialization = 14,
    /// Unsupported or disabled features
    NotSupported   = 15,
}

/// Engine `Error` type
///
/// Errors compare equal when category and code match; the message and the
/// attached context are informational.
#[derive(Debug, Copy, Clone)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    /// `Error` message
    pub message:  &'static str,
    /// Where the error was raised, if known
    pub context:  Option<TrapContext>,
}

impl Error {
    /// Value stack, label stack or frame stack empty
    pub const STACK_EMPTY: Self =
        Self::new(ErrorCategory::Core, codes::STACK_EMPTY, "stack empty");
    /// Stack entry has an unexpected shape
    pub const STACK_WRONG_ENTRY: Self =
        Self::new(ErrorCategory::Core, codes::STACK_WRONG_ENTRY, "wrong stack entry");
    /// Store address does not resolve
    pub const WRONG_INSTANCE_ADDRESS: Self = Self::new(
        ErrorCategory::Core,
        codes::WRONG_INSTANCE_ADDRESS,
        "wrong instance address",
    );
    /// Module-local index out of its index space
    pub const WRONG_INSTANCE_INDEX: Self =
        Self::new(ErrorCategory::Core, codes::WRONG_INSTANCE_INDEX, "wrong instance index");
    /// Local index out of the frame's locals window
    pub const WRONG_LOCAL_ADDRESS: Self =
        Self::new(ErrorCategory::Core, codes::WRONG_LOCAL_ADDRESS, "wrong local address");

    /// Function not found
    pub const FUNC_NOT_FOUND: Self =
        Self::new(ErrorCategory::Runtime, codes::FUNC_NOT_FOUND, "function not found");
    /// VM operation issued out of order
    pub const WRONG_VM_WORKFLOW: Self =
        Self::new(ErrorCategory::Runtime, codes::WRONG_VM_WORKFLOW, "wrong VM workflow");
    /// Module not found
    pub const MODULE_NOT_FOUND: Self =
        Self::new(ErrorCategory::Runtime, codes::MODULE_NOT_FOUND, "module not found");
    /// Unsupported or disabled feature
    pub const NOT_SUPPORTED: Self =
        Self::new(ErrorCategory::NotSupported, codes::NOT_SUPPORTED, "feature not supported");

    /// Duplicate module name
    pub const MODULE_NAME_CONFLICT: Self = Self::new(
        ErrorCategory::Initialization,
        codes::MODULE_NAME_CONFLICT,
        "module name conflict",
    );
    /// Import not resolvable
    pub const UNKNOWN_IMPORT: Self =
        Self::new(ErrorCategory::Initialization, codes::UNKNOWN_IMPORT, "unknown import");
    /// Import resolves to an incompatible export
    pub const INCOMPATIBLE_IMPORT_TYPE: Self = Self::new(
        ErrorCategory::Initialization,
        codes::INCOMPATIBLE_IMPORT_TYPE,
        "incompatible import type",
    );
    /// Data segment does not fit
    pub const DATA_SEG_DOES_NOT_FIT: Self = Self::new(
        ErrorCategory::Initialization,
        codes::DATA_SEG_DOES_NOT_FIT,
        "data segment does not fit",
    );
    /// Element segment does not fit
    pub const ELEM_SEG_DOES_NOT_FIT: Self = Self::new(
        ErrorCategory::Initialization,
        codes::ELEM_SEG_DOES_NOT_FIT,
        "elements segment does not fit",
    );
    /// Unsupported instruction in a constant expression
    pub const INVALID_CONST_EXPR: Self = Self::new(
        ErrorCategory::Initialization,
        codes::INVALID_CONST_EXPR,
        "constant expression required",
    );
    /// Unbalanced `block`/`loop`/`if`/`else`/`end` in a function body
    pub const MALFORMED_BODY: Self = Self::new(
        ErrorCategory::Initialization,
        codes::MALFORMED_BODY,
        "unbalanced structured instructions",
    );
    /// Export name used twice
    pub const DUPLICATE_EXPORT: Self =
        Self::new(ErrorCategory::Initialization, codes::DUPLICATE_EXPORT, "duplicate export name");

    /// Memory growth over its limit
    pub const MEMORY_SIZE_EXCEEDED: Self = Self::new(
        ErrorCategory::Resource,
        codes::MEMORY_SIZE_EXCEEDED,
        "memory size exceeded",
    );
    /// Table growth over its limit
    pub const TABLE_SIZE_EXCEEDED: Self =
        Self::new(ErrorCategory::Resource, codes::TABLE_SIZE_EXCEEDED, "table size exceeded");

    /// Value type mismatch
    pub const TYPE_NOT_MATCH: Self =
        Self::new(ErrorCategory::Type, codes::TYPE_NOT_MATCH, "type mismatch");
    /// Function signature mismatch
    pub const FUNC_SIG_MISMATCH: Self =
        Self::new(ErrorCategory::Type, codes::FUNC_SIG_MISMATCH, "function signature mismatch");
    /// Reference type mismatch
    pub const REF_TYPE_MISMATCH: Self =
        Self::new(ErrorCategory::Type, codes::REF_TYPE_MISMATCH, "reference type mismatch");
    /// Write to an immutable global
    pub const IMMUTABLE_GLOBAL: Self =
        Self::new(ErrorCategory::Type, codes::IMMUTABLE_GLOBAL, "global is immutable");

    /// Out of bounds memory access
    pub const MEMORY_OUT_OF_BOUNDS: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::MEMORY_OUT_OF_BOUNDS,
        "out of bounds memory access",
    );
    /// Access length exceeds the width of the accessed value
    pub const ACCESS_FORBID_MEMORY: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::ACCESS_FORBID_MEMORY,
        "memory access exceeds value width",
    );
    /// Out of bounds table access
    pub const TABLE_OUT_OF_BOUNDS: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::TABLE_OUT_OF_BOUNDS,
        "out of bounds table access",
    );
    /// `unreachable` executed
    pub const UNREACHABLE: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::UNREACHABLE, "unreachable");
    /// Integer division by zero
    pub const DIVIDE_BY_ZERO: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::DIVIDE_BY_ZERO, "integer divide by zero");
    /// Integer overflow
    pub const INTEGER_OVERFLOW: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::INTEGER_OVERFLOW, "integer overflow");
    /// NaN to integer conversion
    pub const INVALID_CONV_TO_INT: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::INVALID_CONV_TO_INT,
        "invalid conversion to integer",
    );
    /// Indirect call index past the end of the table
    pub const UNDEFINED_ELEMENT: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::UNDEFINED_ELEMENT, "undefined element");
    /// Indirect call through a null slot
    pub const UNINITIALIZED_ELEMENT: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::UNINITIALIZED_ELEMENT,
        "uninitialized element",
    );
    /// Indirect call type mismatch
    pub const INDIRECT_CALL_TYPE_MISMATCH: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::INDIRECT_CALL_TYPE_MISMATCH,
        "indirect call type mismatch",
    );
    /// Call stack exhausted
    pub const CALL_STACK_EXHAUSTED: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::CALL_STACK_EXHAUSTED,
        "call stack exhausted",
    );
    /// Cost limit exceeded
    pub const COST_LIMIT_EXCEEDED: Self = Self::new(
        ErrorCategory::RuntimeTrap,
        codes::COST_LIMIT_EXCEEDED,
        "cost limit exceeded",
    );
    /// Interrupted by the embedder
    pub const INTERRUPTED: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::INTERRUPTED, "interrupted");
    /// Host function failed
    pub const EXECUTION_FAILED: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::EXECUTION_FAILED, "host function failed");
    /// Host function requested termination
    pub const TERMINATED: Self =
        Self::new(ErrorCategory::RuntimeTrap, codes::TERMINATED, "terminated");

    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
            context: None,
        }
    }

    /// Create a host failure with a custom message.
    ///
    /// Host functions use this to report their own failures; the error keeps
    /// the `EXECUTION_FAILED` code so callers can match on it.
    #[must_use]
    pub const fn host_failure(message: &'static str) -> Self {
        Self::new(ErrorCategory::RuntimeTrap, codes::EXECUTION_FAILED, message)
    }

    /// Attach the location where the error surfaced.
    ///
    /// An already attached context is kept, so the innermost location wins
    /// when an error crosses several call frames.
    #[must_use]
    pub fn with_context(mut self, context: TrapContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    /// The attached context, if any
    #[must_use]
    pub const fn context(&self) -> Option<&TrapContext> {
        self.context.as_ref()
    }

    /// Check if this is a WebAssembly trap
    #[must_use]
    pub fn is_trap(&self) -> bool {
        self.category == ErrorCategory::RuntimeTrap
    }

    /// Check if this is an internal consistency error
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.category == ErrorCategory::Core
    }

    /// Check if this is a resource limit error
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        self.category == ErrorCategory::Resource
    }

    /// Check if this is an instantiation or linking error
    #[must_use]
    pub fn is_link_error(&self) -> bool {
        self.category == ErrorCategory::Initialization
    }

    /// Check if this is a type error
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        self.category == ErrorCategory::Type
    }

    /// Check if this error reports a memory access violation
    #[must_use]
    pub fn is_memory_error(&self) -> bool {
        matches!(
            self.code,
            codes::MEMORY_OUT_OF_BOUNDS | codes::MEMORY_SIZE_EXCEEDED | codes::ACCESS_FORBID_MEMORY
        )
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.code == other.code
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_equality_ignores_message_and_context() {
        let custom = Error::host_failure("sock closed");
        assert_eq!(custom, Error::EXECUTION_FAILED);

        let ctx = TrapContext::new("i32.div_s", 7);
        assert_eq!(Error::DIVIDE_BY_ZERO.with_context(ctx), Error::DIVIDE_BY_ZERO);
        assert_ne!(Error::DIVIDE_BY_ZERO, Error::INTEGER_OVERFLOW);
    }

    #[test]
    fn test_with_context_keeps_innermost() {
        let inner = TrapContext::new("i64.load", 3);
        let outer = TrapContext::new("call", 10);
        let err = Error::MEMORY_OUT_OF_BOUNDS.with_context(inner).with_context(outer);
        assert_eq!(err.context().map(|c| c.opcode), Some("i64.load"));
        assert_eq!(err.context().map(|c| c.offset), Some(3));
    }

    #[test]
    fn test_predicates() {
        assert!(Error::UNREACHABLE.is_trap());
        assert!(Error::MEMORY_OUT_OF_BOUNDS.is_memory_error());
        assert!(Error::ACCESS_FORBID_MEMORY.is_memory_error());
        assert!(Error::ACCESS_FORBID_MEMORY.is_trap());
        assert_ne!(Error::ACCESS_FORBID_MEMORY, Error::MEMORY_OUT_OF_BOUNDS);
        assert!(Error::MEMORY_SIZE_EXCEEDED.is_resource_error());
        assert!(Error::UNKNOWN_IMPORT.is_link_error());
        assert!(Error::STACK_EMPTY.is_internal());
        assert!(Error::FUNC_SIG_MISMATCH.is_type_error());
        assert!(!Error::FUNC_SIG_MISMATCH.is_trap());
    }

    #[test]
    fn test_display() {
        let text = Error::DIVIDE_BY_ZERO.to_string();
        assert!(text.contains("integer divide by zero"));
        assert!(text.starts_with("[RuntimeTrap]"));

        let text = Error::UNREACHABLE
            .with_context(TrapContext::new("unreachable", 0).in_function(4))
            .to_string();
        assert!(text.contains("function 4"));
    }
}

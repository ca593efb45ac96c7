// WEE - wee-error
// Module: Error Codes
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for the engine.
//!
//! Codes are grouped by range so that the numeric value alone tells which
//! part of the engine raised the error.

// Internal consistency errors (1000-1999)
/// Pop or peek on an empty value, label or frame stack
pub const STACK_EMPTY: u16 = 1000;
/// A stack entry had an unexpected shape
pub const STACK_WRONG_ENTRY: u16 = 1001;
/// A store address does not resolve to an instance
pub const WRONG_INSTANCE_ADDRESS: u16 = 1002;
/// A module-local index is outside its index space
pub const WRONG_INSTANCE_INDEX: u16 = 1003;
/// A local index is outside the active frame's locals window
pub const WRONG_LOCAL_ADDRESS: u16 = 1004;

// Runtime workflow errors (2000-2999)
/// Exported function not found
pub const FUNC_NOT_FOUND: u16 = 2000;
/// Operation issued in the wrong VM stage
pub const WRONG_VM_WORKFLOW: u16 = 2001;
/// Module or export not found by name
pub const MODULE_NOT_FOUND: u16 = 2002;
/// Instruction or feature is disabled or unsupported
pub const NOT_SUPPORTED: u16 = 2003;

// Instantiation and linking errors (3000-3999)
/// A module with the same name is already registered
pub const MODULE_NAME_CONFLICT: u16 = 3000;
/// Import does not resolve to any registered export
pub const UNKNOWN_IMPORT: u16 = 3001;
/// Import resolves to an export of an incompatible kind or type
pub const INCOMPATIBLE_IMPORT_TYPE: u16 = 3002;
/// Active data segment does not fit its memory
pub const DATA_SEG_DOES_NOT_FIT: u16 = 3003;
/// Active element segment does not fit its table
pub const ELEM_SEG_DOES_NOT_FIT: u16 = 3004;
/// Constant expression uses an unsupported instruction
pub const INVALID_CONST_EXPR: u16 = 3005;
/// Function body with unbalanced structured instructions
pub const MALFORMED_BODY: u16 = 3006;
/// Two exports of one module share a name
pub const DUPLICATE_EXPORT: u16 = 3007;

// Resource limit errors (4000-4999)
/// Memory growth exceeds a declared or absolute limit
pub const MEMORY_SIZE_EXCEEDED: u16 = 4000;
/// Table growth exceeds a declared or absolute limit
pub const TABLE_SIZE_EXCEEDED: u16 = 4001;

// Type errors (5000-5999)
/// Value type does not match the expected type
pub const TYPE_NOT_MATCH: u16 = 5000;
/// Function signature does not match the expected signature
pub const FUNC_SIG_MISMATCH: u16 = 5001;
/// Reference type does not match the table element type
pub const REF_TYPE_MISMATCH: u16 = 5002;
/// Attempt to write an immutable global
pub const IMMUTABLE_GLOBAL: u16 = 5003;

// Traps (6000-6999)
/// Linear memory access out of bounds
pub const MEMORY_OUT_OF_BOUNDS: u16 = 6000;
/// Table access out of bounds
pub const TABLE_OUT_OF_BOUNDS: u16 = 6001;
/// `unreachable` executed
pub const UNREACHABLE: u16 = 6002;
/// Integer division or remainder by zero
pub const DIVIDE_BY_ZERO: u16 = 6003;
/// Integer overflow in division or truncation
pub const INTEGER_OVERFLOW: u16 = 6004;
/// NaN converted to integer
pub const INVALID_CONV_TO_INT: u16 = 6005;
/// `call_indirect` index beyond the table
pub const UNDEFINED_ELEMENT: u16 = 6006;
/// `call_indirect` through a null table slot
pub const UNINITIALIZED_ELEMENT: u16 = 6007;
/// `call_indirect` callee has a different type than the call site
pub const INDIRECT_CALL_TYPE_MISMATCH: u16 = 6008;
/// Call depth exceeded the configured limit
pub const CALL_STACK_EXHAUSTED: u16 = 6009;
/// Instruction cost limit exceeded
pub const COST_LIMIT_EXCEEDED: u16 = 6010;
/// Execution interrupted by the embedder
pub const INTERRUPTED: u16 = 6011;
/// Host function failed
pub const EXECUTION_FAILED: u16 = 6012;
/// Host function requested termination
pub const TERMINATED: u16 = 6013;
/// Memory access wider than the value it reads or writes
pub const ACCESS_FORBID_MEMORY: u16 = 6014;

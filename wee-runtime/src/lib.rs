// WEE - wee-runtime
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Execution core of the wee WebAssembly engine.
//!
//! The [`Store`] owns every run-time instance in typed arenas; instances
//! refer to each other by address, never by pointer. The [`Executor`] runs
//! functions against a store it borrows for the duration of one call, on a
//! [`StackManager`] holding values, labels and frames.
//!
//! A [`FunctionInstance`] is interpreted Wasm code, a symbol of a natively
//! compiled image ([`Executable`]) or an embedder function ([`HostFunc`]).
//! The executor dispatches once per call on which it is.
//!
//! ```
//! use wee_foundation::{FuncType, Value, ValueType};
//! use wee_format::Module;
//! use wee_foundation::ExternKind;
//! use wee_instructions::{Instruction, NumericOp};
//! use wee_runtime::{Executor, Store};
//!
//! # fn main() -> wee_error::Result<()> {
//! let mut module = Module::new();
//! let add = module.add_function(
//!     FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]),
//!     vec![],
//!     vec![Instruction::LocalGet(0), Instruction::LocalGet(1), NumericOp::I32Add.into(), Instruction::End],
//! );
//! module.add_export("add", ExternKind::Func, add);
//!
//! let mut store = Store::new();
//! let mut executor = Executor::default();
//! let instance = executor.instantiate(&mut store, &module, None)?;
//! let results = executor.invoke_export(&mut store, instance, "add", &[Value::I32(2), Value::I32(3)])?;
//! assert_eq!(results, vec![Value::I32(5)]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod compiled;
pub mod config;
pub mod executor;
pub mod func;
pub mod global;
pub mod host;
pub mod memory;
pub mod module_instance;
pub mod stack;
pub mod statistics;
pub mod store;
pub mod table;

pub use compiled::{trap_error, CompiledCallContext, Executable, SymbolIndex};
pub use config::{Configure, InterruptHandle, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_NATIVE_DEPTH};
pub use executor::{CompiledFrame, Executor};
pub use func::{FunctionCode, FunctionInstance};
pub use global::GlobalInstance;
pub use host::{HostCallFrame, HostFunc, HostFunction};
pub use memory::{MemoryInstance, MemoryValue};
pub use module_instance::{ExternVal, ModuleInstance};
pub use stack::{Frame, Label, StackManager, ValueStack};
pub use statistics::{CostTable, Statistics, DEFAULT_INSTR_COST};
pub use store::Store;
pub use table::{TableInstance, MAX_TABLE_SIZE};
pub use wee_error::{Error, Result};

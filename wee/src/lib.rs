// WEE - wee
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # WEE
//!
//! An embeddable WebAssembly execution engine.
//!
//! The [`Vm`] ties the pieces of the engine together: a [`Store`] holding
//! every instance, an [`Executor`] running code under a [`Configure`], the
//! [`Statistics`] it collects and a per-VM [`LogEnv`].
//!
//! ```rust
//! use wee::{ExternKind, FuncType, Instruction, Module, NumericOp, Value, ValueType, Vm};
//!
//! # fn main() -> wee::Result<()> {
//! let mut module = Module::new();
//! let add = module.add_function(
//!     FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]),
//!     vec![],
//!     vec![
//!         Instruction::LocalGet(0),
//!         Instruction::LocalGet(1),
//!         Instruction::Numeric(NumericOp::I32Add),
//!         Instruction::End,
//!     ],
//! );
//! module.add_export("add", ExternKind::Func, add);
//!
//! let mut vm = Vm::default();
//! let sum = vm.run(module, "add", &[Value::I32(2), Value::I32(3)])?;
//! assert_eq!(sum, vec![Value::I32(5)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: open a `tracing` span around every execution.

pub mod vm;

pub use vm::{Vm, VmStage};
pub use wee_error::{Error, ErrorCategory, Result, TrapContext};
pub use wee_format::{Element, ImportDesc, Module};
pub use wee_foundation::{
    ExternKind, FuncAddr, FuncType, GlobalType, MemAddr, MemoryType, ModuleAddr, TableType, Value, ValueType,
};
pub use wee_host::{HostModule, HostModuleBuilder};
pub use wee_instructions::{BlockType, ConstExpr, Instruction, LoadOp, MemArg, NumericOp, Proposal, StoreOp};
pub use wee_logging::{LogEnv, LogLevel};
pub use wee_runtime::{
    Configure, CostTable, Executor, HostCallFrame, HostFunc, InterruptHandle, Statistics, Store,
};

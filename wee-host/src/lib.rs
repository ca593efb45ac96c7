// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! Host modules for the wee WebAssembly engine.
//!
//! Embedders expose native functionality to Wasm code as a named module of
//! host functions, globals, tables and memories. The module is assembled with
//! a [`HostModuleBuilder`] and registered into a store, after which Wasm
//! modules import its entities by `(module name, field name)`.
//!
//! ## Usage
//!
//! ```rust
//! use wee_foundation::{FuncType, Value, ValueType};
//! use wee_host::HostModuleBuilder;
//! use wee_runtime::Store;
//!
//! # fn main() -> wee_error::Result<()> {
//! let env = HostModuleBuilder::new("env")
//!     .func("double", FuncType::new([ValueType::I32], [ValueType::I32]), |_, args: &[Value]| {
//!         let v = args.first().and_then(Value::as_i32).unwrap_or_default();
//!         Ok(vec![Value::I32(v * 2)])
//!     })
//!     .build()?;
//!
//! let mut store = Store::new();
//! env.register(&mut store)?;
//! assert!(store.is_registered("env"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod module;

pub use builder::HostModuleBuilder;
pub use module::{HostItem, HostModule};
pub use wee_error::{Error, Result};
pub use wee_runtime::{HostCallFrame, HostFunc, HostFunction};

// WEE - wee-foundation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Core type definitions shared across the engine.
//!
//! This crate holds the data every other crate speaks: run-time [`Value`]s,
//! the static [`ValueType`]/[`FuncType`]/[`Limits`] descriptors, bit-exact
//! float wrappers and the typed store addresses.
//!
//! # Feature Flags
//!
//! - `serde`: derives `Serialize`/`Deserialize` for values and types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod addr;
pub mod float_bits;
pub mod types;
pub mod values;

pub use addr::{FuncAddr, GlobalAddr, MemAddr, ModuleAddr, TableAddr};
pub use float_bits::{FloatBits32, FloatBits64};
pub use types::{
    ExternKind, FuncType, GlobalType, Limits, MemoryType, TableType, ValueType, MAX_PAGES,
    PAGE_SIZE,
};
pub use values::Value;
pub use wee_error::{codes, Error, ErrorCategory, Result};

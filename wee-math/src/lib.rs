// Copyright (c) 2025 Ralf Anton Beier
// SPDX-License-Identifier: MIT
// Project: WEE
// Module: wee-math

//! Mathematical operations for the engine.
//! Provides implementations for WebAssembly numeric instructions whose
//! semantics are not a single Rust operator.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![deny(clippy::todo, clippy::unimplemented)]
#![warn(clippy::pedantic)]
// Allow specific lints necessary for low-level math/Wasm ops, matching Cargo.toml
#![allow(clippy::float_arithmetic, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_precision_loss, clippy::float_cmp)]

pub mod ops;

pub use ops::*;
pub use wee_error::{Error as MathError, Result as MathResult};

// WEE - wee-error
// Module: Error Handling
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error handling for the wee WebAssembly execution engine.
//!
//! # Error Categories
//!
//! Errors are organized into categories, each with its own range of error
//! codes (see [`codes`]):
//!
//! ## Internal consistency (1000-1999)
//! - Stack shape violations
//! - Unresolvable store addresses and indices
//!
//! ## Runtime workflow (2000-2999)
//! - Lookup by name
//! - VM stage ordering
//!
//! ## Instantiation (3000-3999)
//! - Import resolution and matching
//! - Segment bounds
//!
//! ## Resource limits (4000-4999) and types (5000-5999)
//!
//! ## Traps (6000-6999)
//! - The Wasm trap conditions plus cost limit, interruption and host failure
//!
//! # Usage
//!
//! ```
//! use wee_error::{codes, Error, ErrorCategory, TrapContext};
//!
//! let error = Error::new(ErrorCategory::RuntimeTrap, codes::UNREACHABLE, "unreachable");
//! assert_eq!(error, Error::UNREACHABLE);
//!
//! let located = Error::DIVIDE_BY_ZERO.with_context(TrapContext::new("i32.div_u", 12));
//! assert!(located.is_trap());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error codes
pub mod codes;
/// Trap location context
pub mod context;
/// Error and error category types
pub mod errors;

pub use context::TrapContext;
pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for engine operations.
pub type Result<T> = core::result::Result<T, Error>;

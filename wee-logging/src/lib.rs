//! # WEE Logging
//!
//! Logging environment for the wee WebAssembly engine.
//!
//! Every VM owns one [`LogEnv`]. It carries the VM's instance id, a minimum
//! [`LogLevel`] and a `log` target, and forwards records to the `log` facade
//! tagged with that id. There is no process-wide registry of environments:
//! an environment lives exactly as long as the VM that owns it.

// WEE - wee-logging
// Module: Logging Infrastructure
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// The per-VM logging environment.
pub mod env;

/// Log level definitions for categorizing message severity.
///
/// Levels range from `Trace` (lowest severity) to `Critical` (highest).
pub mod level;

pub use env::LogEnv;
pub use level::{LogLevel, ParseLogLevelError};
pub use wee_error::{Error, Result};

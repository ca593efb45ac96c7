// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Logging environment owned by one VM.

use core::fmt;

use crate::level::LogLevel;

/// Default `log` target for engine records.
pub const DEFAULT_TARGET: &str = "wee";

/// Per-VM logging context.
///
/// Records below `min_level` are discarded before they reach the `log`
/// facade; the rest are emitted under `target` and prefixed with the
/// instance id so interleaved output of several VMs stays attributable.
///
/// The id is whatever the embedder passes in. Nothing is shared between
/// environments, so building one never affects another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEnv {
    instance_id: u64,
    min_level:   LogLevel,
    target:      String,
}

impl LogEnv {
    /// New environment for instance `instance_id`, with level `Info` and the
    /// default target.
    #[must_use]
    pub fn with_id(instance_id: u64) -> Self {
        Self { instance_id, min_level: LogLevel::Info, target: DEFAULT_TARGET.to_owned() }
    }

    /// Set the minimum level.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the `log` target.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Instance id of the owning VM
    #[must_use]
    pub const fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Current minimum level
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.min_level
    }

    /// `log` target records are emitted under
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target
    }

    /// Whether a record at `level` would be forwarded.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level && log::log_enabled!(target: self.target.as_str(), level.to_log_level())
    }

    /// Forward a record to the `log` facade.
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level < self.min_level {
            return;
        }
        log::log!(target: self.target.as_str(), level.to_log_level(), "[vm {}] {}", self.instance_id, args);
    }

    /// Forward a `Debug` record.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Forward an `Info` record.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Forward a `Warn` record.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }
}

impl Default for LogEnv {
    fn default() -> Self {
        Self::with_id(0)
    }
}

// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Execution statistics.
//!
//! Instruction counting, cost metering against a limit, and a wall-clock
//! split between time spent interpreting and time spent in host functions.
//! One [`Statistics`] value belongs to one executor.

use std::time::{Duration, Instant};

use wee_logging::LogEnv;

/// Cost assigned to an instruction without an explicit entry
pub const DEFAULT_INSTR_COST: u64 = 1;

const TABLE_LEN: usize = 0x100 + 0x20;

/// Per-opcode instruction costs.
///
/// One-byte opcodes use their value as index; `0xFC`-prefixed opcodes follow
/// at `0x100 + sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    costs: Vec<u64>,
}

impl CostTable {
    /// Every instruction costs `cost`.
    #[must_use]
    pub fn uniform(cost: u64) -> Self {
        Self { costs: vec![cost; TABLE_LEN] }
    }

    fn slot(opcode: u16) -> Option<usize> {
        match opcode {
            0..=0xff => Some(opcode as usize),
            0xfc00..=0xfc1f => Some(0x100 + (opcode & 0xff) as usize),
            _ => None,
        }
    }

    /// Set the cost of `opcode`. Opcodes outside the table are ignored.
    #[must_use]
    pub fn with_cost(mut self, opcode: u16, cost: u64) -> Self {
        if let Some(slot) = Self::slot(opcode) {
            self.costs[slot] = cost;
        }
        self
    }

    /// Cost of `opcode`
    #[must_use]
    pub fn cost(&self, opcode: u16) -> u64 {
        Self::slot(opcode).map_or(DEFAULT_INSTR_COST, |slot| self.costs[slot])
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::uniform(DEFAULT_INSTR_COST)
    }
}

#[derive(Debug, Clone, Default)]
struct Timer {
    started: Option<Instant>,
    total:   Duration,
}

impl Timer {
    fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.total += started.elapsed();
        }
    }
}

/// Structure to track execution statistics
#[derive(Debug, Clone)]
pub struct Statistics {
    instr_count: u64,
    cost_sum:    u64,
    cost_limit:  u64,
    cost_table:  CostTable,
    wasm_timer:  Timer,
    host_timer:  Timer,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new(CostTable::default(), u64::MAX)
    }
}

impl Statistics {
    /// Statistics with the given cost table and limit.
    #[must_use]
    pub fn new(cost_table: CostTable, cost_limit: u64) -> Self {
        Self {
            instr_count: 0,
            cost_sum: 0,
            cost_limit,
            cost_table,
            wasm_timer: Timer::default(),
            host_timer: Timer::default(),
        }
    }

    /// Count one executed instruction.
    pub fn inc_instr_count(&mut self) {
        self.instr_count = self.instr_count.saturating_add(1);
    }

    /// Executed instructions
    #[must_use]
    pub fn instr_count(&self) -> u64 {
        self.instr_count
    }

    /// Add `cost` to the cost sum.
    ///
    /// Returns `false`, leaving the sum unchanged, if the limit would be
    /// exceeded.
    #[must_use]
    pub fn add_cost(&mut self, cost: u64) -> bool {
        match self.cost_sum.checked_add(cost) {
            Some(sum) if sum <= self.cost_limit => {
                self.cost_sum = sum;
                true
            }
            _ => false,
        }
    }

    /// Add the cost of `opcode`; see [`Self::add_cost`].
    #[must_use]
    pub fn add_instr_cost(&mut self, opcode: u16) -> bool {
        let cost = self.cost_table.cost(opcode);
        self.add_cost(cost)
    }

    /// Accumulated cost
    #[must_use]
    pub fn total_cost(&self) -> u64 {
        self.cost_sum
    }

    /// Cost limit
    #[must_use]
    pub fn cost_limit(&self) -> u64 {
        self.cost_limit
    }

    /// Replace the cost limit.
    pub fn set_cost_limit(&mut self, limit: u64) {
        self.cost_limit = limit;
    }

    /// Replace the cost table.
    pub fn set_cost_table(&mut self, table: CostTable) {
        self.cost_table = table;
    }

    /// Start the interpretation timer.
    pub fn start_record_wasm(&mut self) {
        self.wasm_timer.start();
    }

    /// Stop the interpretation timer.
    pub fn stop_record_wasm(&mut self) {
        self.wasm_timer.stop();
    }

    /// Start the host-function timer.
    pub fn start_record_host(&mut self) {
        self.host_timer.start();
    }

    /// Stop the host-function timer.
    pub fn stop_record_host(&mut self) {
        self.host_timer.stop();
    }

    /// Time spent interpreting
    #[must_use]
    pub fn wasm_exec_time(&self) -> Duration {
        self.wasm_timer.total
    }

    /// Time spent in host functions
    #[must_use]
    pub fn host_func_exec_time(&self) -> Duration {
        self.host_timer.total
    }

    /// Total recorded time
    #[must_use]
    pub fn total_exec_time(&self) -> Duration {
        self.wasm_timer.total + self.host_timer.total
    }

    /// Instructions per second of interpretation time; 0 before any time
    /// has been recorded.
    #[must_use]
    pub fn instr_per_second(&self) -> f64 {
        let secs = self.wasm_timer.total.as_secs_f64();
        if secs > 0.0 { self.instr_count as f64 / secs } else { 0.0 }
    }

    /// Reset counters and timers; cost limit and table are kept.
    pub fn clear(&mut self) {
        self.instr_count = 0;
        self.cost_sum = 0;
        self.wasm_timer = Timer::default();
        self.host_timer = Timer::default();
    }

    /// Write the counters through `env`.
    pub fn dump_to_log(&self, env: &LogEnv) {
        env.info(format_args!(
            "total execution time: {} ns",
            self.total_exec_time().as_nanos()
        ));
        env.info(format_args!("wasm instructions execution time: {} ns", self.wasm_exec_time().as_nanos()));
        env.info(format_args!("host functions execution time: {} ns", self.host_func_exec_time().as_nanos()));
        env.info(format_args!("executed wasm instructions count: {}", self.instr_count));
        env.info(format_args!("gas costs: {}", self.cost_sum));
        env.info(format_args!("instructions per second: {:.0}", self.instr_per_second()));
    }
}

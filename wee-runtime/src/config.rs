// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Engine configuration and the cooperative interrupt flag.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use wee_foundation::MAX_PAGES;
use wee_instructions::Proposal;

use crate::statistics::CostTable;

/// Default limit on nested calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Default limit on compiled functions nested on the native stack
pub const DEFAULT_MAX_NATIVE_DEPTH: usize = 128;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configure {
    max_memory_pages:   u32,
    count_instructions: bool,
    measure_cost:       bool,
    measure_time:       bool,
    cost_limit:         u64,
    cost_table:         Option<CostTable>,
    interruptible:      bool,
    max_call_depth:     usize,
    max_native_depth:   usize,
    proposals:          u32,
}

impl Default for Configure {
    fn default() -> Self {
        Self {
            max_memory_pages:   MAX_PAGES,
            count_instructions: false,
            measure_cost:       false,
            measure_time:       false,
            cost_limit:         u64::MAX,
            cost_table:         None,
            interruptible:      false,
            max_call_depth:     DEFAULT_MAX_CALL_DEPTH,
            max_native_depth:   DEFAULT_MAX_NATIVE_DEPTH,
            proposals:          Proposal::ALL.iter().fold(0, |bits, p| bits | p.bit()),
        }
    }
}

impl Configure {
    /// Default configuration: all proposals on, no metering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every memory at `pages` pages (at most 65536).
    #[must_use]
    pub fn with_max_memory_pages(mut self, pages: u32) -> Self {
        self.max_memory_pages = pages.min(MAX_PAGES);
        self
    }

    /// Count executed instructions.
    #[must_use]
    pub fn with_count_instructions(mut self, on: bool) -> Self {
        self.count_instructions = on;
        self
    }

    /// Meter instruction and host-call costs.
    #[must_use]
    pub fn with_measure_cost(mut self, on: bool) -> Self {
        self.measure_cost = on;
        self
    }

    /// Record wasm and host execution time.
    #[must_use]
    pub fn with_measure_time(mut self, on: bool) -> Self {
        self.measure_time = on;
        self
    }

    /// Trap once the metered cost would exceed `limit`.
    #[must_use]
    pub fn with_cost_limit(mut self, limit: u64) -> Self {
        self.cost_limit = limit;
        self
    }

    /// Per-opcode costs.
    #[must_use]
    pub fn with_cost_table(mut self, table: CostTable) -> Self {
        self.cost_table = Some(table);
        self
    }

    /// Poll the interrupt flag before every instruction.
    #[must_use]
    pub fn with_interruptible(mut self, on: bool) -> Self {
        self.interruptible = on;
        self
    }

    /// Limit nested calls.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Limit compiled functions running inside one another.
    ///
    /// Each compiled call that reaches back into the engine nests on the
    /// native stack, so this cap stays far below [`Self::max_call_depth`].
    #[must_use]
    pub fn with_max_native_depth(mut self, depth: usize) -> Self {
        self.max_native_depth = depth;
        self
    }

    /// Enable `proposal`.
    #[must_use]
    pub fn add_proposal(mut self, proposal: Proposal) -> Self {
        self.proposals |= proposal.bit();
        self
    }

    /// Disable `proposal`.
    #[must_use]
    pub fn remove_proposal(mut self, proposal: Proposal) -> Self {
        self.proposals &= !proposal.bit();
        self
    }

    /// Whether `proposal` is enabled
    #[must_use]
    pub fn has_proposal(&self, proposal: Proposal) -> bool {
        self.proposals & proposal.bit() != 0
    }

    #[must_use]
    pub fn max_memory_pages(&self) -> u32 {
        self.max_memory_pages
    }

    #[must_use]
    pub fn count_instructions(&self) -> bool {
        self.count_instructions
    }

    #[must_use]
    pub fn measure_cost(&self) -> bool {
        self.measure_cost
    }

    #[must_use]
    pub fn measure_time(&self) -> bool {
        self.measure_time
    }

    #[must_use]
    pub fn cost_limit(&self) -> u64 {
        self.cost_limit
    }

    #[must_use]
    pub fn cost_table(&self) -> Option<&CostTable> {
        self.cost_table.as_ref()
    }

    #[must_use]
    pub fn interruptible(&self) -> bool {
        self.interruptible
    }

    #[must_use]
    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    #[must_use]
    pub fn max_native_depth(&self) -> usize {
        self.max_native_depth
    }
}

/// Shared flag that stops a running invocation at the next instruction.
///
/// Clones share the flag, so a handle can be moved to another thread.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    /// New, unset flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request interruption.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether interruption was requested
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Reset the flag.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

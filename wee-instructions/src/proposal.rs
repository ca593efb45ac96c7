// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Post-MVP proposals the interpreter can gate instructions on.

use core::fmt;

/// WebAssembly proposals supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Proposal {
    /// Bulk memory operations (`memory.copy`, `memory.fill`, segments)
    BulkMemory,
    /// Reference types and multiple tables
    ReferenceTypes,
    /// Sign-extension operators
    SignExtension,
    /// Non-trapping float-to-int conversions
    SaturatingFloatToInt,
    /// Multi-value block types
    MultiValue,
}

impl Proposal {
    /// Every proposal, in declaration order
    pub const ALL: [Proposal; 5] = [
        Proposal::BulkMemory,
        Proposal::ReferenceTypes,
        Proposal::SignExtension,
        Proposal::SaturatingFloatToInt,
        Proposal::MultiValue,
    ];

    /// Bit used in a proposal set
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Proposal::BulkMemory => "bulk-memory",
            Proposal::ReferenceTypes => "reference-types",
            Proposal::SignExtension => "sign-extension",
            Proposal::SaturatingFloatToInt => "nontrapping-float-to-int",
            Proposal::MultiValue => "multi-value",
        })
    }
}

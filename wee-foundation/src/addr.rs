// WEE - wee-foundation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Typed store addresses.
//!
//! An address is the index of an instance inside one of the store's arenas.
//! Each arena kind has its own newtype so a memory address can never be used
//! to look up a function.

use core::fmt;

macro_rules! define_addr {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Create an address from its raw arena index.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw arena index.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Arena index as `usize`.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_addr!(
    /// Address of a function instance
    FuncAddr,
    "func"
);
define_addr!(
    /// Address of a table instance
    TableAddr,
    "table"
);
define_addr!(
    /// Address of a memory instance
    MemAddr,
    "memory"
);
define_addr!(
    /// Address of a global instance
    GlobalAddr,
    "global"
);
define_addr!(
    /// Address of a module instance
    ModuleAddr,
    "module"
);

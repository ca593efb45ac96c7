// WEE - wee-foundation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Static WebAssembly type descriptors.

use core::fmt;

/// Size of one linear memory page in bytes (64 KiB).
pub const PAGE_SIZE: usize = 65536;

/// Absolute ceiling on the number of pages of a 32-bit linear memory.
pub const MAX_PAGES: u32 = 65536;

/// WebAssembly value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// 32-bit integer
    #[default]
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// Function reference
    FuncRef,
    /// External reference
    ExternRef,
}

impl ValueType {
    /// Whether this is a reference type
    #[must_use]
    pub const fn is_ref(self) -> bool {
        matches!(self, Self::FuncRef | Self::ExternRef)
    }

    /// Whether this is a numeric type
    #[must_use]
    pub const fn is_num(self) -> bool {
        !self.is_ref()
    }

    /// Text-format name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::FuncRef => "funcref",
            Self::ExternRef => "externref",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter and result types of a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuncType {
    /// Parameter types
    pub params:  Vec<ValueType>,
    /// Result types
    pub results: Vec<ValueType>,
}

impl FuncType {
    /// Creates a new `FuncType` with the given parameter and result types.
    pub fn new(
        params: impl IntoIterator<Item = ValueType>,
        results: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self {
            params:  params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(") -> (")?;
        for (i, r) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{r}")?;
        }
        f.write_str(")")
    }
}

/// Represents the size limits of a table or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Minimum size
    pub min: u32,
    /// Optional maximum size
    pub max: Option<u32>,
}

impl Limits {
    /// Create limits.
    #[must_use]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Import matching: whether an export with limits `self` may satisfy an
    /// import declaring `expected`.
    ///
    /// The export must be at least as large as required and, if the import
    /// declares a maximum, the export must declare one no larger.
    #[must_use]
    pub const fn is_compatible_with(&self, expected: &Limits) -> bool {
        if self.min < expected.min {
            return false;
        }
        match (self.max, expected.max) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(actual), Some(limit)) => actual <= limit,
        }
    }
}

/// Linear memory type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryType {
    /// Page limits
    pub limits: Limits,
    /// Declared shared (threads proposal)
    pub shared: bool,
}

impl MemoryType {
    /// Unshared memory type with the given page limits.
    #[must_use]
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { limits: Limits::new(min, max), shared: false }
    }
}

/// Table type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableType {
    /// Reference type stored in the table
    pub element_type: ValueType,
    /// Element count limits
    pub limits:       Limits,
}

impl TableType {
    /// Table type with the given element type and limits.
    #[must_use]
    pub const fn new(element_type: ValueType, min: u32, max: Option<u32>) -> Self {
        Self { element_type, limits: Limits::new(min, max) }
    }
}

/// Global type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalType {
    /// Value type
    pub value_type: ValueType,
    /// Whether `global.set` is allowed
    pub mutable:    bool,
}

impl GlobalType {
    /// Global type descriptor.
    #[must_use]
    pub const fn new(value_type: ValueType, mutable: bool) -> Self {
        Self { value_type, mutable }
    }
}

/// Kinds of importable and exportable entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExternKind {
    /// Function
    Func,
    /// Table
    Table,
    /// Memory
    Memory,
    /// Global
    Global,
}

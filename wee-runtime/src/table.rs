// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly table implementation.
//!
//! This module provides an implementation of WebAssembly tables,
//! which store function references or externref values.

use wee_error::{Error, Result};
use wee_foundation::{Limits, TableType, Value};

/// Largest table the engine will allocate, in elements.
pub const MAX_TABLE_SIZE: u32 = 10_000_000;

/// A WebAssembly table is a vector of opaque values of a single type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInstance {
    /// The table type
    ty:       TableType,
    /// The table elements, all of `ty.element_type`
    elements: Vec<Value>,
}

impl TableInstance {
    /// Creates a new table with the specified type.
    /// Elements are initialized to a type-appropriate null value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::REF_TYPE_MISMATCH`] if the element type is not a
    /// reference type and [`Error::TABLE_SIZE_EXCEEDED`] if the minimum size
    /// exceeds [`MAX_TABLE_SIZE`].
    pub fn new(ty: TableType) -> Result<Self> {
        if !ty.element_type.is_ref() {
            return Err(Error::REF_TYPE_MISMATCH);
        }
        if ty.limits.min > MAX_TABLE_SIZE {
            return Err(Error::TABLE_SIZE_EXCEEDED);
        }
        let null = Value::default_for_type(ty.element_type);
        Ok(Self { ty, elements: vec![null; ty.limits.min as usize] })
    }

    /// Declared table type
    #[must_use]
    pub fn table_type(&self) -> TableType {
        self.ty
    }

    /// Limits as seen by an importer: the current size as minimum and the
    /// declared maximum.
    #[must_use]
    pub fn current_limits(&self) -> Limits {
        Limits::new(self.size(), self.ty.limits.max)
    }

    /// Gets the size of the table
    #[must_use]
    pub fn size(&self) -> u32 {
        self.elements.len() as u32
    }

    fn range(&self, offset: u32, len: u32) -> Result<core::ops::Range<usize>> {
        let end = u64::from(offset) + u64::from(len);
        if end > self.elements.len() as u64 {
            return Err(Error::TABLE_OUT_OF_BOUNDS);
        }
        Ok(offset as usize..end as usize)
    }

    fn check_type(&self, value: &Value) -> Result<()> {
        if value.matches_type(self.ty.element_type) {
            Ok(())
        } else {
            Err(Error::REF_TYPE_MISMATCH)
        }
    }

    /// Gets an element from the table
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if the index is out of bounds
    pub fn get(&self, idx: u32) -> Result<Value> {
        self.elements.get(idx as usize).copied().ok_or(Error::TABLE_OUT_OF_BOUNDS)
    }

    /// Sets an element at the specified index
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if the index is out of bounds or
    /// [`Error::REF_TYPE_MISMATCH`] if the value type doesn't match the table
    /// element type
    pub fn set(&mut self, idx: u32, value: Value) -> Result<()> {
        self.check_type(&value)?;
        let slot = self.elements.get_mut(idx as usize).ok_or(Error::TABLE_OUT_OF_BOUNDS)?;
        *slot = value;
        Ok(())
    }

    /// Grows the table by `delta` elements filled with `init`, returning the
    /// previous size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_SIZE_EXCEEDED`] if the new size would exceed the
    /// declared maximum or [`MAX_TABLE_SIZE`]; the table is unchanged then.
    pub fn grow(&mut self, delta: u32, init: Value) -> Result<u32> {
        self.check_type(&init)?;
        let old = self.size();
        let cap = self.ty.limits.max.unwrap_or(MAX_TABLE_SIZE).min(MAX_TABLE_SIZE);
        let new_size = old
            .checked_add(delta)
            .filter(|size| *size <= cap)
            .ok_or(Error::TABLE_SIZE_EXCEEDED)?;
        self.elements.resize(new_size as usize, init);
        Ok(old)
    }

    /// `table.fill`
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if the range exceeds the table.
    pub fn fill(&mut self, offset: u32, len: u32, value: Value) -> Result<()> {
        self.check_type(&value)?;
        let range = self.range(offset, len)?;
        self.elements[range].fill(value);
        Ok(())
    }

    /// `table.copy` within this table; overlapping ranges are handled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if either range exceeds the
    /// table.
    pub fn copy_within(&mut self, dst: u32, src: u32, len: u32) -> Result<()> {
        let src_range = self.range(src, len)?;
        self.range(dst, len)?;
        self.elements.copy_within(src_range, dst as usize);
        Ok(())
    }

    /// Borrows `len` elements starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if the range exceeds the table.
    pub fn get_refs(&self, offset: u32, len: u32) -> Result<&[Value]> {
        let range = self.range(offset, len)?;
        Ok(&self.elements[range])
    }

    /// Writes `values` starting at `offset` (`table.init`, element segment
    /// initialisation and cross-table `table.copy`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::TABLE_OUT_OF_BOUNDS`] if the range exceeds the table
    /// and [`Error::REF_TYPE_MISMATCH`] for a value of the wrong type. Nothing
    /// is written on error.
    pub fn set_refs(&mut self, offset: u32, values: &[Value]) -> Result<()> {
        let range = self.range(offset, values.len() as u32)?;
        for value in values {
            self.check_type(value)?;
        }
        self.elements[range].copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wee_foundation::{FuncAddr, ValueType};

    use super::*;

    fn func(n: u32) -> Value {
        Value::FuncRef(Some(FuncAddr::new(n)))
    }

    #[test]
    fn test_new_table_is_null_filled() -> Result<()> {
        let table = TableInstance::new(TableType::new(ValueType::FuncRef, 3, Some(4)))?;
        assert_eq!(table.size(), 3);
        assert_eq!(table.get(2)?, Value::FuncRef(None));
        assert_eq!(table.get(3), Err(Error::TABLE_OUT_OF_BOUNDS));
        assert!(TableInstance::new(TableType::new(ValueType::I32, 1, None)).is_err());
        Ok(())
    }

    #[test]
    fn test_grow_and_limits() -> Result<()> {
        let mut table = TableInstance::new(TableType::new(ValueType::FuncRef, 1, Some(3)))?;
        assert_eq!(table.grow(2, func(9))?, 1);
        assert_eq!(table.get(2)?, func(9));
        assert_eq!(table.grow(1, Value::FuncRef(None)), Err(Error::TABLE_SIZE_EXCEEDED));
        assert_eq!(table.size(), 3);
        assert_eq!(table.grow(0, Value::ExternRef(None)), Err(Error::REF_TYPE_MISMATCH));
        Ok(())
    }

    #[test]
    fn test_bulk_operations() -> Result<()> {
        let mut table = TableInstance::new(TableType::new(ValueType::FuncRef, 6, None))?;
        table.set_refs(0, &[func(1), func(2), func(3)])?;
        table.copy_within(1, 0, 3)?;
        assert_eq!(table.get_refs(0, 4)?, &[func(1), func(1), func(2), func(3)]);
        table.fill(4, 2, func(7))?;
        assert_eq!(table.get(5)?, func(7));
        assert_eq!(table.fill(5, 2, func(7)), Err(Error::TABLE_OUT_OF_BOUNDS));
        assert_eq!(table.set_refs(5, &[func(0), func(0)]), Err(Error::TABLE_OUT_OF_BOUNDS));
        assert_eq!(table.get(5)?, func(7));
        assert_eq!(table.set(0, Value::ExternRef(Some(1))), Err(Error::REF_TYPE_MISMATCH));
        Ok(())
    }
}

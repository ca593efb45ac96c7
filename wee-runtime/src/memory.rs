// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly Memory Implementation
//!
//! A [`MemoryInstance`] owns one linear memory: a byte buffer whose length is
//! always `pages * 64 KiB`, growable in whole pages up to the smaller of its
//! declared maximum and the engine-wide page cap.
//!
//! # Memory Operations
//!
//! - Growing memory (`grow_page`, `grow`)
//! - Typed access with an explicit width (`load_value`, `store_value`), which
//!   serves every load/store opcode from one routine
//! - Bulk access (`get_bytes`, `set_bytes`, `fill`, `copy_within`)
//!
//! Every access is bounds checked before any byte is touched, so a failing
//! access never performs a partial write.
//!
//! # Usage
//!
//! ```
//! use wee_foundation::MemoryType;
//! use wee_runtime::MemoryInstance;
//!
//! let mut memory = MemoryInstance::new(MemoryType::new(1, Some(2))).unwrap();
//! memory.store_value::<u32>(0, 4, 0xDEAD_BEEF).unwrap();
//! assert_eq!(memory.load_value::<u32>(0, 2).unwrap(), 0xBEEF);
//! memory.grow_page(1).unwrap();
//! assert_eq!(memory.page_count(), 2);
//! ```

use wee_error::{Error, Result};
use wee_foundation::{FloatBits32, FloatBits64, Limits, MemoryType, MAX_PAGES, PAGE_SIZE};

/// Scalar types that can be loaded from and stored to linear memory.
///
/// Values travel through a 64-bit little-endian raw form. Narrow loads of
/// signed types are sign-extended before conversion; everything else is
/// zero-extended. Floats are converted by bit pattern only.
pub trait MemoryValue: Copy {
    /// Width of the type in bytes
    const SIZE: usize;
    /// Whether narrow loads sign-extend
    const SIGNED: bool;

    /// Build the value from its (already extended) raw bits.
    fn from_raw(raw: u64) -> Self;

    /// Raw bits of the value; only the low `length` bytes are stored.
    fn to_raw(self) -> u64;
}

macro_rules! memory_int {
    ($ty:ty, $size:literal, $signed:literal) => {
        impl MemoryValue for $ty {
            const SIZE: usize = $size;
            const SIGNED: bool = $signed;

            fn from_raw(raw: u64) -> Self {
                raw as $ty
            }

            fn to_raw(self) -> u64 {
                self as u64
            }
        }
    };
}

memory_int!(i32, 4, true);
memory_int!(u32, 4, false);
memory_int!(i64, 8, true);
memory_int!(u64, 8, false);

impl MemoryValue for FloatBits32 {
    const SIGNED: bool = false;
    const SIZE: usize = 4;

    fn from_raw(raw: u64) -> Self {
        FloatBits32(raw as u32)
    }

    fn to_raw(self) -> u64 {
        u64::from(self.0)
    }
}

impl MemoryValue for FloatBits64 {
    const SIGNED: bool = false;
    const SIZE: usize = 8;

    fn from_raw(raw: u64) -> Self {
        FloatBits64(raw)
    }

    fn to_raw(self) -> u64 {
        self.0
    }
}

impl MemoryValue for f32 {
    const SIGNED: bool = false;
    const SIZE: usize = 4;

    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }

    fn to_raw(self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl MemoryValue for f64 {
    const SIGNED: bool = false;
    const SIZE: usize = 8;

    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }

    fn to_raw(self) -> u64 {
        self.to_bits()
    }
}

/// A WebAssembly linear memory instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryInstance {
    /// Declared memory type
    ty:         MemoryType,
    /// Backing bytes, exactly `curr_pages * PAGE_SIZE` long
    data:       Vec<u8>,
    /// Current size in pages
    curr_pages: u32,
    /// Effective page cap (declared maximum clamped by the engine cap)
    max_pages:  u32,
}

impl MemoryInstance {
    /// Creates a new memory instance with the absolute Wasm32 page cap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_SIZE_EXCEEDED`] if the minimum size exceeds the
    /// cap.
    pub fn new(ty: MemoryType) -> Result<Self> {
        Self::with_page_limit(ty, MAX_PAGES)
    }

    /// Creates a new memory instance whose growth is additionally capped at
    /// `page_limit` pages.
    ///
    /// # Arguments
    ///
    /// * `ty` - The declared memory type
    /// * `page_limit` - Engine-wide page cap, applied on top of `ty`'s maximum
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_SIZE_EXCEEDED`] if the minimum size exceeds the
    /// effective cap.
    pub fn with_page_limit(ty: MemoryType, page_limit: u32) -> Result<Self> {
        let mut max_pages = page_limit.min(MAX_PAGES);
        if let Some(declared) = ty.limits.max {
            max_pages = max_pages.min(declared);
        }
        if ty.limits.min > max_pages {
            return Err(Error::MEMORY_SIZE_EXCEEDED);
        }
        Ok(Self {
            ty,
            data: vec![0; ty.limits.min as usize * PAGE_SIZE],
            curr_pages: ty.limits.min,
            max_pages,
        })
    }

    /// Declared memory type
    #[must_use]
    pub fn memory_type(&self) -> MemoryType {
        self.ty
    }

    /// Limits as seen by an importer: the current size as minimum and the
    /// declared maximum.
    #[must_use]
    pub fn current_limits(&self) -> Limits {
        Limits::new(self.curr_pages, self.ty.limits.max)
    }

    /// Current size in pages
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.curr_pages
    }

    /// Minimum size in pages
    #[must_use]
    pub fn min_pages(&self) -> u32 {
        self.ty.limits.min
    }

    /// Effective maximum size in pages
    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Whether the memory type declares a maximum
    #[must_use]
    pub fn has_max_page(&self) -> bool {
        self.ty.limits.max.is_some()
    }

    /// Current size in bytes
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// The whole memory contents
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Grows the memory by `count` pages.
    ///
    /// Either the memory grows by exactly `count` pages or nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_SIZE_EXCEEDED`] if the new size would exceed
    /// the effective maximum.
    pub fn grow_page(&mut self, count: u32) -> Result<()> {
        let new_pages = self
            .curr_pages
            .checked_add(count)
            .filter(|pages| *pages <= self.max_pages)
            .ok_or(Error::MEMORY_SIZE_EXCEEDED)?;
        self.data.resize(new_pages as usize * PAGE_SIZE, 0);
        self.curr_pages = new_pages;
        Ok(())
    }

    /// `memory.grow`: grows by `count` pages and returns the previous size.
    ///
    /// # Errors
    ///
    /// Same as [`Self::grow_page`].
    pub fn grow(&mut self, count: u32) -> Result<u32> {
        let old = self.curr_pages;
        self.grow_page(count)?;
        Ok(old)
    }

    fn range(&self, offset: usize, length: usize) -> Result<core::ops::Range<usize>> {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(Error::MEMORY_OUT_OF_BOUNDS),
        }
    }

    /// Reads `length` bytes at `offset` as a `T`, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ACCESS_FORBID_MEMORY`] if `length` exceeds the width
    /// of `T`, and [`Error::MEMORY_OUT_OF_BOUNDS`] if the access exceeds the
    /// current memory size.
    pub fn load_value<T: MemoryValue>(&self, offset: usize, length: usize) -> Result<T> {
        if length > T::SIZE {
            return Err(Error::ACCESS_FORBID_MEMORY);
        }
        let range = self.range(offset, length)?;
        let mut raw = [0u8; 8];
        raw[..length].copy_from_slice(&self.data[range]);
        let mut value = u64::from_le_bytes(raw);
        if T::SIGNED && length > 0 && length < 8 {
            let shift = 64 - 8 * length as u32;
            value = (((value << shift) as i64) >> shift) as u64;
        }
        Ok(T::from_raw(value))
    }

    /// Writes the low `length` bytes of `value` at `offset`, little-endian.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ACCESS_FORBID_MEMORY`] if `length` exceeds the width
    /// of `T`, and [`Error::MEMORY_OUT_OF_BOUNDS`] if the access exceeds the
    /// current memory size.
    pub fn store_value<T: MemoryValue>(&mut self, offset: usize, length: usize, value: T) -> Result<()> {
        if length > T::SIZE {
            return Err(Error::ACCESS_FORBID_MEMORY);
        }
        let range = self.range(offset, length)?;
        self.data[range].copy_from_slice(&value.to_raw().to_le_bytes()[..length]);
        Ok(())
    }

    /// Borrows `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range exceeds the
    /// current memory size.
    pub fn get_bytes(&self, offset: usize, length: usize) -> Result<&[u8]> {
        let range = self.range(offset, length)?;
        Ok(&self.data[range])
    }

    /// Mutably borrows `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range exceeds the
    /// current memory size.
    pub fn get_bytes_mut(&mut self, offset: usize, length: usize) -> Result<&mut [u8]> {
        let range = self.range(offset, length)?;
        Ok(&mut self.data[range])
    }

    /// Copies `bytes` into memory at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range exceeds the
    /// current memory size; nothing is written in that case.
    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = self.range(offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// `memory.fill`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range exceeds the
    /// current memory size.
    pub fn fill(&mut self, offset: usize, length: usize, value: u8) -> Result<()> {
        let range = self.range(offset, length)?;
        self.data[range].fill(value);
        Ok(())
    }

    /// `memory.copy` within this memory; overlapping ranges are handled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if either range exceeds the
    /// current memory size.
    pub fn copy_within(&mut self, dst: usize, src: usize, length: usize) -> Result<()> {
        let src_range = self.range(src, length)?;
        self.range(dst, length)?;
        self.data.copy_within(src_range, dst);
        Ok(())
    }
}

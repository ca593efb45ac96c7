// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Module Instance
//!
//! A module instance binds one module's index spaces to store addresses.
//! Index spaces are positional: the n-th `add_*_addr` call defines local
//! index n, imports first and definitions after, exactly in declaration
//! order.

use std::collections::BTreeMap;

use wee_error::{Error, Result};
use wee_foundation::{
    ExternKind, FuncAddr, FuncType, GlobalAddr, MemAddr, TableAddr, Value,
};

/// An exported or imported entity, by store address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternVal {
    /// Function
    Func(FuncAddr),
    /// Table
    Table(TableAddr),
    /// Memory
    Memory(MemAddr),
    /// Global
    Global(GlobalAddr),
}

impl ExternVal {
    /// Kind of the entity
    #[must_use]
    pub const fn kind(&self) -> ExternKind {
        match self {
            ExternVal::Func(_) => ExternKind::Func,
            ExternVal::Table(_) => ExternKind::Table,
            ExternVal::Memory(_) => ExternKind::Memory,
            ExternVal::Global(_) => ExternKind::Global,
        }
    }
}

/// Represents a runtime module instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInstance {
    /// Registered name, `None` for anonymous instances
    name:          Option<String>,
    /// Function types, by type index
    types:         Vec<FuncType>,
    /// Function index space
    func_addrs:    Vec<FuncAddr>,
    /// Table index space
    table_addrs:   Vec<TableAddr>,
    /// Memory index space
    mem_addrs:     Vec<MemAddr>,
    /// Global index space
    global_addrs:  Vec<GlobalAddr>,
    /// Element segments; dropped segments are empty
    elem_segments: Vec<Vec<Value>>,
    /// Data segments; dropped segments are empty
    data_segments: Vec<Vec<u8>>,
    /// Exports by name
    exports:       BTreeMap<String, ExternVal>,
    /// Start function
    start:         Option<FuncAddr>,
}

impl ModuleInstance {
    /// Creates an empty instance.
    #[must_use]
    pub fn new(name: Option<&str>) -> Self {
        Self { name: name.map(str::to_owned), ..Self::default() }
    }

    /// Registered name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Appends a function type.
    pub fn add_type(&mut self, ty: FuncType) {
        self.types.push(ty);
    }

    /// Function type `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn func_type(&self, idx: u32) -> Result<&FuncType> {
        self.types.get(idx as usize).ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// Appends a function address to the function index space.
    pub fn add_func_addr(&mut self, addr: FuncAddr) {
        self.func_addrs.push(addr);
    }

    /// Appends a table address to the table index space.
    pub fn add_table_addr(&mut self, addr: TableAddr) {
        self.table_addrs.push(addr);
    }

    /// Appends a memory address to the memory index space.
    pub fn add_mem_addr(&mut self, addr: MemAddr) {
        self.mem_addrs.push(addr);
    }

    /// Appends a global address to the global index space.
    pub fn add_global_addr(&mut self, addr: GlobalAddr) {
        self.global_addrs.push(addr);
    }

    /// Store address of function `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn func_addr(&self, idx: u32) -> Result<FuncAddr> {
        self.func_addrs.get(idx as usize).copied().ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// Store address of table `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn table_addr(&self, idx: u32) -> Result<TableAddr> {
        self.table_addrs.get(idx as usize).copied().ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// Store address of memory `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn mem_addr(&self, idx: u32) -> Result<MemAddr> {
        self.mem_addrs.get(idx as usize).copied().ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// Store address of global `idx`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn global_addr(&self, idx: u32) -> Result<GlobalAddr> {
        self.global_addrs.get(idx as usize).copied().ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// Size of the function index space
    #[must_use]
    pub fn func_count(&self) -> usize {
        self.func_addrs.len()
    }

    /// Size of the memory index space
    #[must_use]
    pub fn mem_count(&self) -> usize {
        self.mem_addrs.len()
    }

    /// Size of the global index space
    #[must_use]
    pub fn global_count(&self) -> usize {
        self.global_addrs.len()
    }

    /// Resolves `idx` and records it as the start function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_ADDRESS`] if `idx` is outside the
    /// function index space.
    pub fn set_start_idx(&mut self, idx: u32) -> Result<()> {
        let addr = self.func_addrs.get(idx as usize).copied().ok_or(Error::WRONG_INSTANCE_ADDRESS)?;
        self.start = Some(addr);
        Ok(())
    }

    /// Start function address
    #[must_use]
    pub fn start(&self) -> Option<FuncAddr> {
        self.start
    }

    /// Appends an element segment.
    pub fn add_elem_segment(&mut self, items: Vec<Value>) {
        self.elem_segments.push(items);
    }

    /// Items of element segment `idx` (empty once dropped)
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn elem_segment(&self, idx: u32) -> Result<&[Value]> {
        self.elem_segments.get(idx as usize).map(Vec::as_slice).ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// `elem.drop`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn drop_elem(&mut self, idx: u32) -> Result<()> {
        let segment = self.elem_segments.get_mut(idx as usize).ok_or(Error::WRONG_INSTANCE_INDEX)?;
        *segment = Vec::new();
        Ok(())
    }

    /// Appends a data segment.
    pub fn add_data_segment(&mut self, bytes: Vec<u8>) {
        self.data_segments.push(bytes);
    }

    /// Bytes of data segment `idx` (empty once dropped)
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn data_segment(&self, idx: u32) -> Result<&[u8]> {
        self.data_segments.get(idx as usize).map(Vec::as_slice).ok_or(Error::WRONG_INSTANCE_INDEX)
    }

    /// `data.drop`
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_INDEX`] if `idx` is out of range.
    pub fn drop_data(&mut self, idx: u32) -> Result<()> {
        let segment = self.data_segments.get_mut(idx as usize).ok_or(Error::WRONG_INSTANCE_INDEX)?;
        *segment = Vec::new();
        Ok(())
    }

    /// Records an export. A later export with the same name replaces the
    /// earlier one.
    pub fn add_export(&mut self, name: &str, value: ExternVal) {
        self.exports.insert(name.to_owned(), value);
    }

    /// Export by name
    #[must_use]
    pub fn export(&self, name: &str) -> Option<ExternVal> {
        self.exports.get(name).copied()
    }

    /// All exports, ordered by name
    pub fn exports(&self) -> impl Iterator<Item = (&str, ExternVal)> {
        self.exports.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Exported function by name
    #[must_use]
    pub fn find_func_export(&self, name: &str) -> Option<FuncAddr> {
        match self.export(name)? {
            ExternVal::Func(addr) => Some(addr),
            _ => None,
        }
    }

    /// Exported memory by name
    #[must_use]
    pub fn find_memory_export(&self, name: &str) -> Option<MemAddr> {
        match self.export(name)? {
            ExternVal::Memory(addr) => Some(addr),
            _ => None,
        }
    }

    /// Exported global by name
    #[must_use]
    pub fn find_global_export(&self, name: &str) -> Option<GlobalAddr> {
        match self.export(name)? {
            ExternVal::Global(addr) => Some(addr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_spaces_are_positional() -> Result<()> {
        let mut inst = ModuleInstance::new(Some("math"));
        inst.add_func_addr(FuncAddr::new(10));
        inst.add_func_addr(FuncAddr::new(4));
        assert_eq!(inst.func_addr(1)?, FuncAddr::new(4));
        assert_eq!(inst.func_addr(2), Err(Error::WRONG_INSTANCE_INDEX));
        assert_eq!(inst.name(), Some("math"));

        inst.set_start_idx(0)?;
        assert_eq!(inst.start(), Some(FuncAddr::new(10)));
        assert_eq!(inst.set_start_idx(7), Err(Error::WRONG_INSTANCE_ADDRESS));
        Ok(())
    }

    #[test]
    fn test_exports_by_kind() {
        let mut inst = ModuleInstance::new(None);
        inst.add_export("memory", ExternVal::Memory(MemAddr::new(0)));
        inst.add_export("run", ExternVal::Func(FuncAddr::new(2)));
        assert_eq!(inst.find_func_export("run"), Some(FuncAddr::new(2)));
        assert_eq!(inst.find_func_export("memory"), None);
        assert_eq!(inst.find_memory_export("memory"), Some(MemAddr::new(0)));
        let names: Vec<_> = inst.exports().map(|(name, _)| name).collect();
        assert_eq!(names, ["memory", "run"]);
    }

    #[test]
    fn test_dropped_segments_are_empty() -> Result<()> {
        let mut inst = ModuleInstance::new(None);
        inst.add_data_segment(b"abc".to_vec());
        inst.add_elem_segment(vec![Value::FuncRef(None)]);
        inst.drop_data(0)?;
        inst.drop_elem(0)?;
        assert!(inst.data_segment(0)?.is_empty());
        assert!(inst.elem_segment(0)?.is_empty());
        assert!(inst.drop_data(1).is_err());
        Ok(())
    }
}

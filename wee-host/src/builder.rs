// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Builder for host modules.

use wee_error::{Error, Result};
use wee_foundation::{FuncType, GlobalType, MemoryType, TableType, Value};
use wee_runtime::{HostCallFrame, HostFunc};

use crate::module::{HostItem, HostModule};

/// Assembles a [`HostModule`] item by item.
///
/// Items keep their insertion order. Names must be unique within the
/// module; [`Self::build`] rejects duplicates.
#[derive(Debug)]
pub struct HostModuleBuilder {
    name:  String,
    items: Vec<(String, HostItem)>,
}

impl HostModuleBuilder {
    /// Start a module registered as `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned(), items: Vec::new() }
    }

    fn item(mut self, name: &str, item: HostItem) -> Self {
        self.items.push((name.to_owned(), item));
        self
    }

    /// Add a host function implemented by a closure.
    #[must_use]
    pub fn func<F>(self, name: &str, ty: FuncType, f: F) -> Self
    where
        F: Fn(HostCallFrame<'_>, &[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.host_func(name, HostFunc::new(ty, f))
    }

    /// Add a host function charging `cost` per call when cost metering is on.
    #[must_use]
    pub fn func_with_cost<F>(self, name: &str, ty: FuncType, cost: u64, f: F) -> Self
    where
        F: Fn(HostCallFrame<'_>, &[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        self.host_func(name, HostFunc::new(ty, f).with_cost(cost))
    }

    /// Add a prepared host function.
    #[must_use]
    pub fn host_func(self, name: &str, func: HostFunc) -> Self {
        self.item(name, HostItem::Func(func))
    }

    /// Add a global with an initial value.
    #[must_use]
    pub fn global(self, name: &str, ty: GlobalType, value: Value) -> Self {
        self.item(name, HostItem::Global(ty, value))
    }

    /// Add a table; its slots start out null.
    #[must_use]
    pub fn table(self, name: &str, ty: TableType) -> Self {
        self.item(name, HostItem::Table(ty))
    }

    /// Add a zero-filled memory.
    #[must_use]
    pub fn memory(self, name: &str, ty: MemoryType) -> Self {
        self.item(name, HostItem::Memory(ty))
    }

    /// Finish the module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DUPLICATE_EXPORT`] if two items share a name and
    /// [`Error::TYPE_NOT_MATCH`] if a global's value does not have the
    /// global's type.
    pub fn build(self) -> Result<HostModule> {
        for (i, (name, item)) in self.items.iter().enumerate() {
            if self.items[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::DUPLICATE_EXPORT);
            }
            if let HostItem::Global(ty, value) = item {
                if !value.matches_type(ty.value_type) {
                    return Err(Error::TYPE_NOT_MATCH);
                }
            }
        }
        Ok(HostModule::new(self.name, self.items))
    }
}

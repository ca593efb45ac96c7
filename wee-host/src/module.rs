// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host modules and their registration into a store.

use log::debug;
use wee_error::{Error, Result};
use wee_foundation::{GlobalType, MemoryType, ModuleAddr, TableType, Value};
use wee_runtime::{
    ExternVal, FunctionInstance, GlobalInstance, HostFunc, MemoryInstance, ModuleInstance, Store, TableInstance,
};

/// One named entity of a host module
#[derive(Debug, Clone)]
pub enum HostItem {
    /// Host function
    Func(HostFunc),
    /// Global with its initial value
    Global(GlobalType, Value),
    /// Table
    Table(TableType),
    /// Memory
    Memory(MemoryType),
}

/// A named set of host entities, ready to be registered.
#[derive(Debug, Clone)]
pub struct HostModule {
    name:  String,
    items: Vec<(String, HostItem)>,
}

impl HostModule {
    pub(crate) fn new(name: String, items: Vec<(String, HostItem)>) -> Self {
        Self { name, items }
    }

    /// Registered name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the items, in insertion order
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(name, _)| name.as_str())
    }

    /// Allocate every item into `store` and register the module under its
    /// name, exporting each item under its own name.
    ///
    /// Registration is checked before anything is allocated, so a rejected
    /// module leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NAME_CONFLICT`] if the name is taken and the
    /// allocation errors of tables and memories.
    pub fn register(self, store: &mut Store) -> Result<ModuleAddr> {
        if store.is_registered(&self.name) {
            return Err(Error::MODULE_NAME_CONFLICT);
        }
        let mut tables = Vec::new();
        let mut memories = Vec::new();
        for (_, item) in &self.items {
            match item {
                HostItem::Table(ty) => tables.push(TableInstance::new(*ty)?),
                HostItem::Memory(ty) => memories.push(MemoryInstance::new(*ty)?),
                HostItem::Func(_) | HostItem::Global(..) => {}
            }
        }
        let mut tables = tables.into_iter();
        let mut memories = memories.into_iter();

        let mut instance = ModuleInstance::new(Some(self.name.as_str()));
        for (name, item) in self.items {
            let value = match item {
                HostItem::Func(func) => {
                    let addr = store.insert_func(FunctionInstance::Host(func));
                    instance.add_func_addr(addr);
                    ExternVal::Func(addr)
                }
                HostItem::Global(ty, value) => {
                    let addr = store.insert_global(GlobalInstance::new(ty, value)?);
                    instance.add_global_addr(addr);
                    ExternVal::Global(addr)
                }
                HostItem::Table(_) => {
                    let table = tables.next().ok_or(Error::WRONG_INSTANCE_INDEX)?;
                    let addr = store.insert_table(table);
                    instance.add_table_addr(addr);
                    ExternVal::Table(addr)
                }
                HostItem::Memory(_) => {
                    let memory = memories.next().ok_or(Error::WRONG_INSTANCE_INDEX)?;
                    let addr = store.insert_memory(memory);
                    instance.add_mem_addr(addr);
                    ExternVal::Memory(addr)
                }
            };
            instance.add_export(&name, value);
        }

        let addr = store.insert_module(instance);
        store.register_module(&self.name, addr)?;
        debug!("registered host module {} as {addr}", self.name);
        Ok(addr)
    }
}

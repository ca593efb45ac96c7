// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The store: owner of every run-time instance.
//!
//! Instances live in one arena per kind and are addressed by their arena
//! index. Arenas only grow, so an address stays valid, and keeps naming the
//! same instance, for the lifetime of the store.

use std::collections::BTreeMap;

use log::debug;
use wee_error::{Error, Result};
use wee_foundation::{FuncAddr, GlobalAddr, MemAddr, ModuleAddr, TableAddr};

use crate::{
    func::FunctionInstance,
    global::GlobalInstance,
    memory::MemoryInstance,
    module_instance::ModuleInstance,
    table::TableInstance,
};

macro_rules! arena_accessors {
    ($field:ident, $inst:ty, $addr:ident, $insert:ident, $get:ident, $get_mut:ident) => {
        #[doc = concat!("Moves `instance` into the store and returns its address.")]
        pub fn $insert(&mut self, instance: $inst) -> $addr {
            let addr = $addr::new(self.$field.len() as u32);
            self.$field.push(instance);
            addr
        }

        #[doc = concat!("Instance at `addr`.\n\n# Errors\n\nReturns [`Error::WRONG_INSTANCE_ADDRESS`] if `addr` does not resolve.")]
        pub fn $get(&self, addr: $addr) -> Result<&$inst> {
            self.$field.get(addr.index()).ok_or(Error::WRONG_INSTANCE_ADDRESS)
        }

        #[doc = concat!("Mutable instance at `addr`.\n\n# Errors\n\nReturns [`Error::WRONG_INSTANCE_ADDRESS`] if `addr` does not resolve.")]
        pub fn $get_mut(&mut self, addr: $addr) -> Result<&mut $inst> {
            self.$field.get_mut(addr.index()).ok_or(Error::WRONG_INSTANCE_ADDRESS)
        }
    };
}

/// Owner of all function, table, memory, global and module instances.
#[derive(Debug, Default)]
pub struct Store {
    funcs:    Vec<FunctionInstance>,
    tables:   Vec<TableInstance>,
    memories: Vec<MemoryInstance>,
    globals:  Vec<GlobalInstance>,
    modules:  Vec<ModuleInstance>,
    /// Registered (named) module instances
    named:    BTreeMap<String, ModuleAddr>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    arena_accessors!(funcs, FunctionInstance, FuncAddr, insert_func, get_func, get_func_mut);
    arena_accessors!(tables, TableInstance, TableAddr, insert_table, get_table, get_table_mut);
    arena_accessors!(memories, MemoryInstance, MemAddr, insert_memory, get_memory, get_memory_mut);
    arena_accessors!(globals, GlobalInstance, GlobalAddr, insert_global, get_global, get_global_mut);
    arena_accessors!(modules, ModuleInstance, ModuleAddr, insert_module, get_module, get_module_mut);

    /// Number of function instances
    #[must_use]
    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }

    /// Number of memory instances
    #[must_use]
    pub fn memory_count(&self) -> usize {
        self.memories.len()
    }

    /// Number of module instances, registered or not
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Registers the module at `addr` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NAME_CONFLICT`] if the name is taken and
    /// [`Error::WRONG_INSTANCE_ADDRESS`] if `addr` does not resolve.
    pub fn register_module(&mut self, name: &str, addr: ModuleAddr) -> Result<()> {
        self.get_module(addr)?;
        if self.named.contains_key(name) {
            return Err(Error::MODULE_NAME_CONFLICT);
        }
        debug!("registered module `{name}` as {addr}");
        self.named.insert(name.to_owned(), addr);
        Ok(())
    }

    /// Whether a module is registered under `name`
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Address of the module registered under `name`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NOT_FOUND`] if no module has that name.
    pub fn find_module(&self, name: &str) -> Result<ModuleAddr> {
        self.named.get(name).copied().ok_or(Error::MODULE_NOT_FOUND)
    }

    /// Registered module names, in order
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    /// Function exported as `func_name` by the module registered as
    /// `module_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_ADDRESS`] if either name does not
    /// resolve.
    pub fn find_function(&self, module_name: &str, func_name: &str) -> Result<FuncAddr> {
        let module = self.find_module(module_name).map_err(|_| Error::WRONG_INSTANCE_ADDRESS)?;
        self.get_module(module)?.find_func_export(func_name).ok_or(Error::WRONG_INSTANCE_ADDRESS)
    }
}

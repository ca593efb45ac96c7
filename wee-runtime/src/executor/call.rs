// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Call targets and the callback surface of compiled code.

use log::trace;
use wee_error::{Error, Result};
use wee_foundation::{FuncAddr, ModuleAddr, Value};

use super::Executor;
use crate::{compiled::CompiledCallContext, memory::MemoryInstance, store::Store};

/// Resolves a `call_indirect` target.
///
/// Every check happens here, before anything is pushed for the callee:
/// the index must lie inside the table, the slot must be non-null, and the
/// callee's type must equal type `type_idx` of `module`.
///
/// # Errors
///
/// Returns [`Error::UNDEFINED_ELEMENT`], [`Error::UNINITIALIZED_ELEMENT`] or
/// [`Error::INDIRECT_CALL_TYPE_MISMATCH`].
pub(crate) fn resolve_indirect(
    store: &Store,
    module: ModuleAddr,
    table_idx: u32,
    elem_idx: u32,
    type_idx: u32,
) -> Result<FuncAddr> {
    let instance = store.get_module(module)?;
    let table = store.get_table(instance.table_addr(table_idx)?)?;
    if elem_idx >= table.size() {
        return Err(Error::UNDEFINED_ELEMENT);
    }
    let func = match table.get(elem_idx)? {
        Value::FuncRef(Some(func)) => func,
        Value::FuncRef(None) => return Err(Error::UNINITIALIZED_ELEMENT),
        _ => return Err(Error::INDIRECT_CALL_TYPE_MISMATCH),
    };
    if store.get_func(func)?.func_type() != instance.func_type(type_idx)? {
        trace!("call_indirect through table {table_idx}[{elem_idx}]: type mismatch");
        return Err(Error::INDIRECT_CALL_TYPE_MISMATCH);
    }
    Ok(func)
}

/// Engine services handed to a compiled function while it runs.
pub struct CompiledFrame<'a> {
    executor: &'a mut Executor,
    store:    &'a mut Store,
    module:   ModuleAddr,
}

impl<'a> CompiledFrame<'a> {
    pub(crate) fn new(executor: &'a mut Executor, store: &'a mut Store, module: ModuleAddr) -> Self {
        Self { executor, store, module }
    }

    fn memory_mut(&mut self) -> Result<&mut MemoryInstance> {
        let addr = self.store.get_module(self.module)?.mem_addr(0)?;
        self.store.get_memory_mut(addr)
    }
}

impl CompiledCallContext for CompiledFrame<'_> {
    fn memory(&mut self) -> Option<&mut MemoryInstance> {
        self.memory_mut().ok()
    }

    fn memory_grow(&mut self, delta: u32) -> i32 {
        match self.memory_mut().and_then(|memory| memory.grow(delta)) {
            Ok(old) => old as i32,
            Err(_) => -1,
        }
    }

    fn global_get(&self, idx: u32) -> Result<Value> {
        let addr = self.store.get_module(self.module)?.global_addr(idx)?;
        Ok(self.store.get_global(addr)?.get())
    }

    fn global_set(&mut self, idx: u32, value: Value) -> Result<()> {
        let addr = self.store.get_module(self.module)?.global_addr(idx)?;
        self.store.get_global_mut(addr)?.set(value)
    }

    fn call(&mut self, func_idx: u32, args: &[Value]) -> Result<Vec<Value>> {
        let func = self.store.get_module(self.module)?.func_addr(func_idx)?;
        self.executor.call_nested(self.store, func, args)
    }

    fn call_indirect(&mut self, table_idx: u32, elem_idx: u32, type_idx: u32, args: &[Value]) -> Result<Vec<Value>> {
        let func = resolve_indirect(self.store, self.module, table_idx, elem_idx, type_idx)?;
        self.executor.call_nested(self.store, func, args)
    }
}

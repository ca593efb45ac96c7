// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Module instantiation.
//!
//! Turns a decoded [`Module`] into a [`ModuleInstance`] whose entities live
//! in the store. Imports resolve against modules already registered by
//! name. Active segments are checked in full before any of them is written,
//! so a segment that does not fit leaves every table and memory untouched.

use std::sync::Arc;

use log::{debug, trace};
use wee_error::{Error, Result};
use wee_foundation::{ExternKind, ModuleAddr, Value, ValueType};
use wee_format::{DataMode, ElementMode, ImportDesc, Module};
use wee_instructions::{ConstContext, ConstExpr};

use super::Executor;
use crate::{
    compiled::{Executable, SymbolIndex},
    func::{FunctionCode, FunctionInstance},
    global::GlobalInstance,
    memory::MemoryInstance,
    module_instance::{ExternVal, ModuleInstance},
    store::Store,
    table::TableInstance,
};

/// Constant expression scope: the store plus the instance under construction.
struct InitScope<'a> {
    store:    &'a Store,
    instance: &'a ModuleInstance,
}

impl ConstContext for InitScope<'_> {
    fn global(&self, idx: u32) -> Result<Value> {
        let addr = self.instance.global_addr(idx).map_err(|_| Error::INVALID_CONST_EXPR)?;
        Ok(self.store.get_global(addr)?.get())
    }

    fn func_ref(&self, idx: u32) -> Result<Value> {
        let addr = self.instance.func_addr(idx).map_err(|_| Error::INVALID_CONST_EXPR)?;
        Ok(Value::FuncRef(Some(addr)))
    }
}

/// Evaluate a segment offset, which must produce an `i32`.
fn eval_offset(scope: &InitScope<'_>, expr: &ConstExpr) -> Result<usize> {
    match expr.evaluate(scope)? {
        Value::I32(offset) => Ok(offset as u32 as usize),
        _ => Err(Error::INVALID_CONST_EXPR),
    }
}

/// An active element segment, evaluated and ready to be written.
struct PendingElem {
    table:  u32,
    offset: usize,
    items:  Vec<Value>,
}

/// An active data segment, evaluated and ready to be written.
struct PendingData<'m> {
    memory: u32,
    offset: usize,
    bytes:  &'m [u8],
}

impl Executor {
    /// Instantiate `module`, registering it as `name` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NAME_CONFLICT`] for a name already in use,
    /// [`Error::UNKNOWN_IMPORT`] or [`Error::INCOMPATIBLE_IMPORT_TYPE`] for
    /// unresolvable imports, [`Error::ELEM_SEG_DOES_NOT_FIT`] or
    /// [`Error::DATA_SEG_DOES_NOT_FIT`] for oversized active segments, and any
    /// trap raised by the start function.
    pub fn instantiate(&mut self, store: &mut Store, module: &Module, name: Option<&str>) -> Result<ModuleAddr> {
        self.instantiate_with_image(store, module, name, None)
    }

    /// Instantiate `module` with its defined functions bound to the symbols of
    /// a natively compiled `image`.
    ///
    /// Defined function `i` becomes [`SymbolIndex`] `i`. Without an image every
    /// defined function is interpreted.
    ///
    /// # Errors
    ///
    /// See [`Self::instantiate`].
    pub fn instantiate_with_image(
        &mut self,
        store: &mut Store,
        module: &Module,
        name: Option<&str>,
        image: Option<Arc<dyn Executable>>,
    ) -> Result<ModuleAddr> {
        if let Some(name) = name {
            if store.is_registered(name) {
                return Err(Error::MODULE_NAME_CONFLICT);
            }
        }
        debug!("instantiating module {}", name.unwrap_or("<anonymous>"));

        // Reserve the address first: function instances refer back to it.
        let addr = store.insert_module(ModuleInstance::new(name));
        let mut inst = ModuleInstance::new(name);
        for ty in &module.types {
            inst.add_type(ty.clone());
        }

        resolve_imports(store, module, &mut inst)?;

        for (i, function) in module.functions.iter().enumerate() {
            let ty = module.types.get(function.type_idx as usize).ok_or(Error::WRONG_INSTANCE_INDEX)?.clone();
            let instance = match &image {
                Some(image) => FunctionInstance::Compiled {
                    module: addr,
                    ty,
                    symbol: SymbolIndex(i as u32),
                    image: Arc::clone(image),
                },
                None => FunctionInstance::Wasm {
                    module: addr,
                    ty,
                    code: Arc::new(FunctionCode::new(function.locals.clone(), function.body.clone())?),
                },
            };
            inst.add_func_addr(store.insert_func(instance));
        }
        for ty in &module.tables {
            inst.add_table_addr(store.insert_table(TableInstance::new(*ty)?));
        }
        for ty in &module.memories {
            let memory = MemoryInstance::with_page_limit(*ty, self.config.max_memory_pages())?;
            inst.add_mem_addr(store.insert_memory(memory));
        }
        trace!(
            "allocated {} functions, {} tables, {} memories",
            module.functions.len(),
            module.tables.len(),
            module.memories.len()
        );

        for global in &module.globals {
            let value = global.init.evaluate(&InitScope { store: &*store, instance: &inst })?;
            let instance = GlobalInstance::new(global.ty, value)?;
            inst.add_global_addr(store.insert_global(instance));
        }

        for export in &module.exports {
            if inst.export(&export.name).is_some() {
                return Err(Error::DUPLICATE_EXPORT);
            }
            let value = match export.kind {
                ExternKind::Func => ExternVal::Func(inst.func_addr(export.index)?),
                ExternKind::Table => ExternVal::Table(inst.table_addr(export.index)?),
                ExternKind::Memory => ExternVal::Memory(inst.mem_addr(export.index)?),
                ExternKind::Global => ExternVal::Global(inst.global_addr(export.index)?),
            };
            inst.add_export(&export.name, value);
        }

        initialize_segments(store, module, &mut inst)?;

        if let Some(start) = module.start {
            inst.set_start_idx(start)?;
        }
        let start = inst.start();
        *store.get_module_mut(addr)? = inst;
        if let Some(name) = name {
            store.register_module(name, addr)?;
        }

        if let Some(start) = start {
            debug!("running start function {start}");
            self.invoke(store, start, &[])?;
        }
        debug!("instantiated {addr}");
        Ok(addr)
    }
}

/// Bind every import of `module` to an export of a registered module.
fn resolve_imports(store: &Store, module: &Module, inst: &mut ModuleInstance) -> Result<()> {
    for import in &module.imports {
        let provider = store.find_module(&import.module).map_err(|_| Error::UNKNOWN_IMPORT)?;
        let value = store.get_module(provider)?.export(&import.name).ok_or(Error::UNKNOWN_IMPORT)?;
        trace!("import {}.{} -> {value:?}", import.module, import.name);

        match (import.desc, value) {
            (ImportDesc::Func(type_idx), ExternVal::Func(addr)) => {
                let expected = module.types.get(type_idx as usize).ok_or(Error::WRONG_INSTANCE_INDEX)?;
                if store.get_func(addr)?.func_type() != expected {
                    return Err(Error::INCOMPATIBLE_IMPORT_TYPE);
                }
                inst.add_func_addr(addr);
            }
            (ImportDesc::Table(expected), ExternVal::Table(addr)) => {
                let table = store.get_table(addr)?;
                if table.table_type().element_type != expected.element_type
                    || !table.current_limits().is_compatible_with(&expected.limits)
                {
                    return Err(Error::INCOMPATIBLE_IMPORT_TYPE);
                }
                inst.add_table_addr(addr);
            }
            (ImportDesc::Memory(expected), ExternVal::Memory(addr)) => {
                if !store.get_memory(addr)?.current_limits().is_compatible_with(&expected.limits) {
                    return Err(Error::INCOMPATIBLE_IMPORT_TYPE);
                }
                inst.add_mem_addr(addr);
            }
            (ImportDesc::Global(expected), ExternVal::Global(addr)) => {
                if store.get_global(addr)?.global_type() != expected {
                    return Err(Error::INCOMPATIBLE_IMPORT_TYPE);
                }
                inst.add_global_addr(addr);
            }
            _ => return Err(Error::INCOMPATIBLE_IMPORT_TYPE),
        }
    }
    Ok(())
}

/// Evaluate all segments, check that every active one fits, then write them.
fn initialize_segments(store: &mut Store, module: &Module, inst: &mut ModuleInstance) -> Result<()> {
    let mut elems = Vec::new();
    let mut datas = Vec::new();
    {
        let scope = InitScope { store: &*store, instance: &*inst };
        for element in &module.elements {
            let items = element
                .items
                .iter()
                .map(|item| check_ref(item.evaluate(&scope)?, element.ty))
                .collect::<Result<Vec<_>>>()?;
            match &element.mode {
                ElementMode::Active { table, offset } => {
                    let offset = eval_offset(&scope, offset)?;
                    elems.push((Vec::new(), Some(PendingElem { table: *table, offset, items })));
                }
                ElementMode::Passive => elems.push((items, None)),
                ElementMode::Declarative => elems.push((Vec::new(), None)),
            }
        }
        for data in &module.data {
            match &data.mode {
                DataMode::Active { memory, offset } => {
                    let offset = eval_offset(&scope, offset)?;
                    datas.push(Some(PendingData { memory: *memory, offset, bytes: &data.bytes }));
                }
                DataMode::Passive => datas.push(None),
            }
        }
    }

    for pending in elems.iter().filter_map(|(_, p)| p.as_ref()) {
        let table = store.get_table(inst.table_addr(pending.table)?)?;
        let end = pending.offset.checked_add(pending.items.len()).ok_or(Error::ELEM_SEG_DOES_NOT_FIT)?;
        if end > table.size() as usize {
            return Err(Error::ELEM_SEG_DOES_NOT_FIT);
        }
    }
    for pending in datas.iter().flatten() {
        let memory = store.get_memory(inst.mem_addr(pending.memory)?)?;
        let end = pending.offset.checked_add(pending.bytes.len()).ok_or(Error::DATA_SEG_DOES_NOT_FIT)?;
        if end > memory.data_size() {
            return Err(Error::DATA_SEG_DOES_NOT_FIT);
        }
    }

    for (kept, pending) in elems {
        if let Some(pending) = pending {
            let addr = inst.table_addr(pending.table)?;
            store.get_table_mut(addr)?.set_refs(pending.offset as u32, &pending.items)?;
        }
        inst.add_elem_segment(kept);
    }
    for (pending, data) in datas.into_iter().zip(&module.data) {
        match pending {
            Some(pending) => {
                let addr = inst.mem_addr(pending.memory)?;
                store.get_memory_mut(addr)?.set_bytes(pending.offset, pending.bytes)?;
                inst.add_data_segment(Vec::new());
            }
            None => inst.add_data_segment(data.bytes.clone()),
        }
    }
    Ok(())
}

fn check_ref(value: Value, ty: ValueType) -> Result<Value> {
    if value.matches_type(ty) {
        Ok(value)
    } else {
        Err(Error::REF_TYPE_MISMATCH)
    }
}

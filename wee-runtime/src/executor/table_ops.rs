// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Table instructions.

use wee_error::{Error, Result};
use wee_foundation::{ModuleAddr, TableAddr, Value};
use wee_instructions::Instruction;

use super::Executor;
use crate::store::Store;

fn table_addr(store: &Store, module: ModuleAddr, idx: u32) -> Result<TableAddr> {
    store.get_module(module)?.table_addr(idx)
}

impl Executor {
    pub(super) fn table_op(&mut self, store: &mut Store, module: ModuleAddr, instr: &Instruction) -> Result<()> {
        match *instr {
            Instruction::TableGet(idx) => {
                let elem = self.stack.pop_i32()? as u32;
                let value = store.get_table(table_addr(store, module, idx)?)?.get(elem)?;
                self.stack.push(value);
            }
            Instruction::TableSet(idx) => {
                let addr = table_addr(store, module, idx)?;
                let value = self.stack.pop()?;
                let elem = self.stack.pop_i32()? as u32;
                store.get_table_mut(addr)?.set(elem, value)?;
            }
            Instruction::TableSize(idx) => {
                let size = store.get_table(table_addr(store, module, idx)?)?.size();
                self.stack.push(Value::I32(size as i32));
            }
            Instruction::TableGrow(idx) => {
                let addr = table_addr(store, module, idx)?;
                let delta = self.stack.pop_i32()? as u32;
                let init = self.stack.pop()?;
                let result = match store.get_table_mut(addr)?.grow(delta, init) {
                    Ok(old) => old as i32,
                    Err(_) => -1,
                };
                self.stack.push(Value::I32(result));
            }
            Instruction::TableFill(idx) => {
                let addr = table_addr(store, module, idx)?;
                let len = self.stack.pop_i32()? as u32;
                let value = self.stack.pop()?;
                let dst = self.stack.pop_i32()? as u32;
                store.get_table_mut(addr)?.fill(dst, len, value)?;
            }
            Instruction::TableCopy { dst, src } => {
                let dst_addr = table_addr(store, module, dst)?;
                let src_addr = table_addr(store, module, src)?;
                let len = self.stack.pop_i32()? as u32;
                let src_off = self.stack.pop_i32()? as u32;
                let dst_off = self.stack.pop_i32()? as u32;
                if dst_addr == src_addr {
                    store.get_table_mut(dst_addr)?.copy_within(dst_off, src_off, len)?;
                } else {
                    let refs = store.get_table(src_addr)?.get_refs(src_off, len)?.to_vec();
                    store.get_table_mut(dst_addr)?.set_refs(dst_off, &refs)?;
                }
            }
            Instruction::TableInit { table, elem } => {
                let addr = table_addr(store, module, table)?;
                let len = self.stack.pop_i32()? as u32 as usize;
                let src = self.stack.pop_i32()? as u32 as usize;
                let dst = self.stack.pop_i32()? as u32;
                let segment = store.get_module(module)?.elem_segment(elem)?;
                let refs = src
                    .checked_add(len)
                    .and_then(|end| segment.get(src..end))
                    .ok_or(Error::TABLE_OUT_OF_BOUNDS)?
                    .to_vec();
                store.get_table_mut(addr)?.set_refs(dst, &refs)?;
            }
            Instruction::ElemDrop(idx) => store.get_module_mut(module)?.drop_elem(idx)?,
            _ => {}
        }
        Ok(())
    }
}

// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Linear memory instructions.
//!
//! Dynamic addresses come from Wasm values and are never trusted: the
//! effective address is computed in 64 bits and every access goes through
//! the bounds-checked [`crate::MemoryInstance`] accessors.

use wee_error::{Error, Result};
use wee_foundation::{FloatBits32, FloatBits64, MemAddr, ModuleAddr, Value};
use wee_instructions::{Instruction, LoadOp, MemArg, StoreOp};

use super::Executor;
use crate::store::Store;

fn effective_address(base: i32, memarg: &MemArg) -> Result<usize> {
    let ea = u64::from(base as u32) + u64::from(memarg.offset);
    usize::try_from(ea).map_err(|_| Error::MEMORY_OUT_OF_BOUNDS)
}

fn to_usize(value: i32) -> usize {
    value as u32 as usize
}

fn memory_addr(store: &Store, module: ModuleAddr, idx: u32) -> Result<MemAddr> {
    store.get_module(module)?.mem_addr(idx)
}

impl Executor {
    pub(super) fn load_mem(&mut self, store: &Store, module: ModuleAddr, op: LoadOp, memarg: &MemArg) -> Result<()> {
        let memory = store.get_memory(memory_addr(store, module, memarg.memory)?)?;
        let ea = effective_address(self.stack.pop_i32()?, memarg)?;
        let width = op.width() as usize;
        let value = match op {
            LoadOp::I32Load | LoadOp::I32Load8S | LoadOp::I32Load16S => Value::I32(memory.load_value::<i32>(ea, width)?),
            LoadOp::I32Load8U | LoadOp::I32Load16U => Value::I32(memory.load_value::<u32>(ea, width)? as i32),
            LoadOp::I64Load | LoadOp::I64Load8S | LoadOp::I64Load16S | LoadOp::I64Load32S => {
                Value::I64(memory.load_value::<i64>(ea, width)?)
            }
            LoadOp::I64Load8U | LoadOp::I64Load16U | LoadOp::I64Load32U => {
                Value::I64(memory.load_value::<u64>(ea, width)? as i64)
            }
            LoadOp::F32Load => Value::F32(memory.load_value::<FloatBits32>(ea, width)?),
            LoadOp::F64Load => Value::F64(memory.load_value::<FloatBits64>(ea, width)?),
        };
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn store_mem(&mut self, store: &mut Store, module: ModuleAddr, op: StoreOp, memarg: &MemArg) -> Result<()> {
        let addr = memory_addr(store, module, memarg.memory)?;
        let value = self.stack.pop()?;
        let ea = effective_address(self.stack.pop_i32()?, memarg)?;
        let width = op.width() as usize;
        let memory = store.get_memory_mut(addr)?;
        match value {
            Value::I32(v) => memory.store_value(ea, width, v),
            Value::I64(v) => memory.store_value(ea, width, v),
            Value::F32(v) => memory.store_value(ea, width, v),
            Value::F64(v) => memory.store_value(ea, width, v),
            Value::FuncRef(_) | Value::ExternRef(_) => Err(Error::TYPE_NOT_MATCH),
        }
    }

    pub(super) fn memory_op(&mut self, store: &mut Store, module: ModuleAddr, instr: &Instruction) -> Result<()> {
        match *instr {
            Instruction::MemorySize(idx) => {
                let pages = store.get_memory(memory_addr(store, module, idx)?)?.page_count();
                self.stack.push(Value::I32(pages as i32));
            }
            Instruction::MemoryGrow(idx) => {
                let addr = memory_addr(store, module, idx)?;
                let delta = self.stack.pop_i32()? as u32;
                let result = match store.get_memory_mut(addr)?.grow(delta) {
                    Ok(old) => old as i32,
                    Err(_) => -1,
                };
                self.stack.push(Value::I32(result));
            }
            Instruction::MemoryInit { data, memory } => {
                let addr = memory_addr(store, module, memory)?;
                let len = to_usize(self.stack.pop_i32()?);
                let src = to_usize(self.stack.pop_i32()?);
                let dst = to_usize(self.stack.pop_i32()?);
                let segment = store.get_module(module)?.data_segment(data)?;
                let bytes = src
                    .checked_add(len)
                    .and_then(|end| segment.get(src..end))
                    .ok_or(Error::MEMORY_OUT_OF_BOUNDS)?
                    .to_vec();
                store.get_memory_mut(addr)?.set_bytes(dst, &bytes)?;
            }
            Instruction::DataDrop(idx) => store.get_module_mut(module)?.drop_data(idx)?,
            Instruction::MemoryCopy { dst, src } => {
                let dst_addr = memory_addr(store, module, dst)?;
                let src_addr = memory_addr(store, module, src)?;
                let len = to_usize(self.stack.pop_i32()?);
                let src_off = to_usize(self.stack.pop_i32()?);
                let dst_off = to_usize(self.stack.pop_i32()?);
                if dst_addr == src_addr {
                    store.get_memory_mut(dst_addr)?.copy_within(dst_off, src_off, len)?;
                } else {
                    let bytes = store.get_memory(src_addr)?.get_bytes(src_off, len)?.to_vec();
                    store.get_memory_mut(dst_addr)?.set_bytes(dst_off, &bytes)?;
                }
            }
            Instruction::MemoryFill(idx) => {
                let addr = memory_addr(store, module, idx)?;
                let len = to_usize(self.stack.pop_i32()?);
                let byte = self.stack.pop_i32()? as u8;
                let dst = to_usize(self.stack.pop_i32()?);
                store.get_memory_mut(addr)?.fill(dst, len, byte)?;
            }
            _ => {}
        }
        Ok(())
    }
}

// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Locals and globals.

use wee_error::Result;
use wee_foundation::ModuleAddr;
use wee_instructions::Instruction;

use super::Executor;
use crate::store::Store;

impl Executor {
    pub(super) fn variable(&mut self, store: &mut Store, module: ModuleAddr, instr: &Instruction) -> Result<()> {
        match *instr {
            Instruction::LocalGet(idx) => {
                let value = self.stack.local(idx)?;
                self.stack.push(value);
            }
            Instruction::LocalSet(idx) => {
                let value = self.stack.pop()?;
                self.stack.set_local(idx, value)?;
            }
            Instruction::LocalTee(idx) => {
                let value = self.stack.top()?;
                self.stack.set_local(idx, value)?;
            }
            Instruction::GlobalGet(idx) => {
                let addr = store.get_module(module)?.global_addr(idx)?;
                let value = store.get_global(addr)?.get();
                self.stack.push(value);
            }
            Instruction::GlobalSet(idx) => {
                let addr = store.get_module(module)?.global_addr(idx)?;
                let value = self.stack.pop()?;
                store.get_global_mut(addr)?.set(value)?;
            }
            _ => {}
        }
        Ok(())
    }
}

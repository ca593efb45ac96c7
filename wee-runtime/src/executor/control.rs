// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Structured control: blocks, branches and returns.

use wee_error::Result;
use wee_foundation::ModuleAddr;
use wee_instructions::BlockType;

use super::{block_arity, Executor, Flow};
use crate::{func::FunctionCode, store::Store};

impl Executor {
    pub(super) fn enter_block(
        &mut self,
        store: &Store,
        module: ModuleAddr,
        code: &FunctionCode,
        bt: BlockType,
        pc: usize,
    ) -> Result<Flow> {
        let (params, results) = block_arity(store, module, bt)?;
        let end = code.control.end_of(pc)?;
        self.stack.push_label(params, results, end + 1, None)?;
        Ok(Flow::Continue(pc + 1))
    }

    pub(super) fn enter_loop(
        &mut self,
        store: &Store,
        module: ModuleAddr,
        code: &FunctionCode,
        bt: BlockType,
        pc: usize,
    ) -> Result<Flow> {
        let (params, _) = block_arity(store, module, bt)?;
        let end = code.control.end_of(pc)?;
        self.stack.push_label(params, params, end + 1, Some(pc + 1))?;
        Ok(Flow::Continue(pc + 1))
    }

    pub(super) fn enter_if(
        &mut self,
        store: &Store,
        module: ModuleAddr,
        code: &FunctionCode,
        bt: BlockType,
        pc: usize,
    ) -> Result<Flow> {
        let cond = self.stack.pop_i32()?;
        let (params, results) = block_arity(store, module, bt)?;
        let end = code.control.end_of(pc)?;
        self.stack.push_label(params, results, end + 1, None)?;
        if cond != 0 {
            return Ok(Flow::Continue(pc + 1));
        }
        // The false arm starts after `else`; without one, `end` closes the label.
        Ok(Flow::Continue(code.control.else_of(pc).map_or(end, |else_pc| else_pc + 1)))
    }

    /// `else` reached from the true arm: skip the false arm.
    pub(super) fn leave_then(&mut self) -> Result<Flow> {
        let (label, _) = self.stack.leave_label()?;
        Ok(Flow::Continue(label.from))
    }

    pub(super) fn leave_block(&mut self, pc: usize) -> Result<Flow> {
        let (label, closed_frame) = self.stack.leave_label()?;
        if closed_frame {
            return Ok(Flow::Exit(label.from));
        }
        Ok(Flow::Continue(pc + 1))
    }

    pub(super) fn branch(&mut self, depth: u32) -> Result<Flow> {
        let depth = depth as usize;
        if self.stack.is_bottom_label(depth)? {
            return self.do_return();
        }
        let label = self.stack.pop_label(depth + 1)?;
        match label.cont {
            Some(cont) => {
                self.stack.push_label(label.arity, label.arity, label.from, Some(cont))?;
                Ok(Flow::Continue(cont))
            }
            None => Ok(Flow::Continue(label.from)),
        }
    }

    pub(super) fn do_return(&mut self) -> Result<Flow> {
        let ret_pc = self.stack.bottom_label()?.from;
        self.stack.pop_frame()?;
        Ok(Flow::Exit(ret_pc))
    }
}

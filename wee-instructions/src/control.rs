// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Jump targets of structured control instructions.
//!
//! A function body is a flat instruction sequence terminated by the
//! function-level `end`. [`ControlMap`] records, for every `block`, `loop`
//! and `if`, the position of its matching `end` and (for `if`) `else`, so the
//! interpreter never scans forward at run time.

use log::debug;
use wee_error::{Error, Result};

use crate::instruction::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockTargets {
    else_pc: Option<usize>,
    end_pc:  usize,
}

/// Side table of `else`/`end` positions for one function body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlMap {
    targets: Vec<Option<BlockTargets>>,
}

impl ControlMap {
    /// Build the table for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MALFORMED_BODY`] if structured instructions are
    /// unbalanced, an `else` has no enclosing `if`, or the body does not end
    /// with the function-level `end`.
    pub fn build(code: &[Instruction]) -> Result<Self> {
        let mut targets = vec![None; code.len()];
        let mut open: Vec<usize> = Vec::new();
        let mut closed = false;

        for (pc, instr) in code.iter().enumerate() {
            if closed {
                debug!("instruction after function end at {pc}");
                return Err(Error::MALFORMED_BODY);
            }
            match instr {
                Instruction::Block(_) | Instruction::Loop(_) | Instruction::If(_) => {
                    open.push(pc);
                }
                Instruction::Else => {
                    let start = *open.last().ok_or(Error::MALFORMED_BODY)?;
                    if !matches!(code[start], Instruction::If(_)) {
                        debug!("`else` at {pc} closes a non-`if` block opened at {start}");
                        return Err(Error::MALFORMED_BODY);
                    }
                    let slot = targets[start].get_or_insert(BlockTargets { else_pc: None, end_pc: 0 });
                    if slot.else_pc.replace(pc).is_some() {
                        return Err(Error::MALFORMED_BODY);
                    }
                }
                Instruction::End => match open.pop() {
                    Some(start) => {
                        let slot = targets[start].get_or_insert(BlockTargets { else_pc: None, end_pc: 0 });
                        slot.end_pc = pc;
                    }
                    None => closed = true,
                },
                _ => {}
            }
        }

        if !closed || !open.is_empty() {
            debug!("function body is not terminated ({} blocks open)", open.len());
            return Err(Error::MALFORMED_BODY);
        }
        Ok(Self { targets })
    }

    /// Position of the `end` matching the block that starts at `pc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MALFORMED_BODY`] if `pc` does not start a block.
    pub fn end_of(&self, pc: usize) -> Result<usize> {
        self.targets
            .get(pc)
            .copied()
            .flatten()
            .map(|t| t.end_pc)
            .ok_or(Error::MALFORMED_BODY)
    }

    /// Position of the `else` of the `if` that starts at `pc`, if it has one.
    #[must_use]
    pub fn else_of(&self, pc: usize) -> Option<usize> {
        self.targets.get(pc).copied().flatten().and_then(|t| t.else_pc)
    }
}

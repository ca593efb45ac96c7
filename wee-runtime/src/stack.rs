// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Execution stack of one invocation.
//!
//! [`StackManager`] keeps three stacks side by side:
//!
//! - the value stack, where each frame's locals form a fixed window at the
//!   frame's base followed by the operands;
//! - the label stack, one [`Label`] per entered `block`, `loop` or `if` plus
//!   one per interpreted function body;
//! - the frame stack, one [`Frame`] per call plus a dummy base frame for the
//!   outermost invocation.
//!
//! Leaving a scope is always the same operation: cut the value stack back to
//! the scope's base while keeping its results on top
//! ([`ValueStack::truncate_keeping_tail`]).
//!
//! Between public operations `labels.len() >= frame.lstack_off` and
//! `values.len() >= frame.vstack_off` hold for the current frame. Validated
//! code cannot break this; when an embedder drives the primitives out of
//! order the operations report [`Error::STACK_EMPTY`] or
//! [`Error::STACK_WRONG_ENTRY`] instead of panicking.

use std::sync::Arc;

use wee_error::{Error, Result};
use wee_foundation::{FloatBits32, FloatBits64, FuncAddr, ModuleAddr, Value};

use crate::func::FunctionCode;

/// Operand and locals stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStack {
    values: Vec<Value>,
}

impl ValueStack {
    /// Empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop the top value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if the stack is empty.
    pub fn pop(&mut self) -> Result<Value> {
        self.values.pop().ok_or(Error::STACK_EMPTY)
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes everything between `base` and the top `keep` values.
    ///
    /// Afterwards the stack is `base + keep` long and its top `keep` values
    /// are the previous top `keep` values, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_WRONG_ENTRY`] if fewer than `base + keep`
    /// values are on the stack; the stack is left untouched.
    pub fn truncate_keeping_tail(&mut self, base: usize, keep: usize) -> Result<()> {
        let len = self.values.len();
        let tail_start = len.checked_sub(keep).filter(|start| *start >= base).ok_or(Error::STACK_WRONG_ENTRY)?;
        self.values.drain(base..tail_start);
        Ok(())
    }

    /// The stored values, bottom first
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    fn get(&self, idx: usize) -> Result<&Value> {
        self.values.get(idx).ok_or(Error::STACK_WRONG_ENTRY)
    }

    fn get_mut(&mut self, idx: usize) -> Result<&mut Value> {
        self.values.get_mut(idx).ok_or(Error::STACK_WRONG_ENTRY)
    }

    fn split_top(&mut self, count: usize) -> Result<Vec<Value>> {
        let start = self.values.len().checked_sub(count).ok_or(Error::STACK_EMPTY)?;
        Ok(self.values.split_off(start))
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

/// A structured control scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    /// Value stack height below the scope's parameters
    pub vstack_off: usize,
    /// Values a branch to this label carries
    pub arity:      usize,
    /// Where execution resumes after the scope (for a function body: the
    /// caller's return position)
    pub from:       usize,
    /// Loop body start; branches to a loop label jump here
    pub cont:       Option<usize>,
}

/// A call frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Module instance the frame executes against; `None` for the dummy frame
    pub module:     Option<ModuleAddr>,
    /// Function being executed, if known
    pub func:       Option<FuncAddr>,
    /// Body of an interpreted function
    pub code:       Option<Arc<FunctionCode>>,
    /// Base of the locals window
    pub vstack_off: usize,
    /// Label stack height at entry
    pub lstack_off: usize,
    /// Number of locals (parameters included)
    pub locals:     usize,
    /// Number of results
    pub arity:      usize,
    /// Base frame of an invocation
    pub dummy:      bool,
}

/// Value, label and frame stacks of the current invocation
#[derive(Debug, Clone, Default)]
pub struct StackManager {
    values: ValueStack,
    labels: Vec<Label>,
    frames: Vec<Frame>,
}

macro_rules! typed_pop {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Pop a `", stringify!($variant), "` value.")]
        ///
        /// # Errors
        ///
        /// Returns [`Error::STACK_EMPTY`] on an empty stack and
        /// [`Error::TYPE_NOT_MATCH`] if the top value has another type.
        pub fn $name(&mut self) -> Result<$ty> {
            match self.values.pop()? {
                Value::$variant(v) => Ok(v),
                _ => Err(Error::TYPE_NOT_MATCH),
            }
        }
    };
}

impl StackManager {
    /// Empty stacks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all three stacks.
    pub fn reset(&mut self) {
        self.values.clear();
        self.labels.clear();
        self.frames.clear();
    }

    /// Push a value.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Push several values, first one lowest.
    pub fn push_all(&mut self, values: &[Value]) {
        for value in values {
            self.values.push(*value);
        }
    }

    /// Pop a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] on an empty stack.
    pub fn pop(&mut self) -> Result<Value> {
        self.values.pop()
    }

    /// Pop the top `count` values, lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if fewer values are on the stack.
    pub fn pop_n(&mut self, count: usize) -> Result<Vec<Value>> {
        self.values.split_top(count)
    }

    typed_pop!(pop_i32, I32, i32);
    typed_pop!(pop_i64, I64, i64);
    typed_pop!(pop_f32_bits, F32, FloatBits32);
    typed_pop!(pop_f64_bits, F64, FloatBits64);

    /// Pop an `f32`.
    ///
    /// # Errors
    ///
    /// See [`Self::pop_f32_bits`].
    pub fn pop_f32(&mut self) -> Result<f32> {
        self.pop_f32_bits().map(FloatBits32::value)
    }

    /// Pop an `f64`.
    ///
    /// # Errors
    ///
    /// See [`Self::pop_f64_bits`].
    pub fn pop_f64(&mut self) -> Result<f64> {
        self.pop_f64_bits().map(FloatBits64::value)
    }

    /// Top value
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] on an empty stack.
    pub fn top(&self) -> Result<Value> {
        self.values.as_slice().last().copied().ok_or(Error::STACK_EMPTY)
    }

    /// The top `count` values, lowest first
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if fewer values are on the stack.
    pub fn top_span(&self, count: usize) -> Result<&[Value]> {
        let values = self.values.as_slice();
        let start = values.len().checked_sub(count).ok_or(Error::STACK_EMPTY)?;
        Ok(&values[start..])
    }

    fn local_slot(&self, idx: u32) -> Result<usize> {
        let frame = self.current_frame()?;
        if idx as usize >= frame.locals {
            return Err(Error::WRONG_LOCAL_ADDRESS);
        }
        Ok(frame.vstack_off + idx as usize)
    }

    /// Local `idx` of the current frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_LOCAL_ADDRESS`] if the frame has no such local.
    pub fn local(&self, idx: u32) -> Result<Value> {
        let slot = self.local_slot(idx)?;
        self.values.get(slot).copied()
    }

    /// Overwrite local `idx` of the current frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_LOCAL_ADDRESS`] if the frame has no such local.
    pub fn set_local(&mut self, idx: u32, value: Value) -> Result<()> {
        let slot = self.local_slot(idx)?;
        *self.values.get_mut(slot)? = value;
        Ok(())
    }

    fn base_for(&self, locals: usize) -> Result<usize> {
        self.values.len().checked_sub(locals).ok_or(Error::STACK_WRONG_ENTRY)
    }

    /// Push the sentinel base frame of an invocation.
    pub fn push_dummy_frame(&mut self) {
        self.frames.push(Frame {
            module:     None,
            func:       None,
            code:       None,
            vstack_off: self.values.len(),
            lstack_off: self.labels.len(),
            locals:     0,
            arity:      0,
            dummy:      true,
        });
    }

    /// Push a frame whose `locals` values are already on the stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_WRONG_ENTRY`] if fewer than `locals` values are
    /// on the stack.
    pub fn push_frame(&mut self, module: ModuleAddr, locals: usize, arity: usize) -> Result<()> {
        let vstack_off = self.base_for(locals)?;
        self.frames.push(Frame {
            module: Some(module),
            func: None,
            code: None,
            vstack_off,
            lstack_off: self.labels.len(),
            locals,
            arity,
            dummy: false,
        });
        Ok(())
    }

    /// Push the frame of an interpreted function.
    ///
    /// # Errors
    ///
    /// See [`Self::push_frame`].
    pub fn push_function_frame(
        &mut self,
        module: ModuleAddr,
        func: FuncAddr,
        code: Arc<FunctionCode>,
        locals: usize,
        arity: usize,
    ) -> Result<()> {
        self.push_frame(module, locals, arity)?;
        if let Some(frame) = self.frames.last_mut() {
            frame.func = Some(func);
            frame.code = Some(code);
        }
        Ok(())
    }

    /// Pop the current frame, keeping its `arity` results on top of the
    /// caller's operands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if there is no frame and
    /// [`Error::STACK_WRONG_ENTRY`] if the stacks are shorter than the
    /// frame's base.
    pub fn pop_frame(&mut self) -> Result<Frame> {
        let frame = self.frames.last().ok_or(Error::STACK_EMPTY)?;
        if self.labels.len() < frame.lstack_off {
            return Err(Error::STACK_WRONG_ENTRY);
        }
        self.values.truncate_keeping_tail(frame.vstack_off, frame.arity)?;
        self.labels.truncate(frame.lstack_off);
        self.frames.pop().ok_or(Error::STACK_EMPTY)
    }

    /// Enter a structured scope whose `locals` parameters are already on the
    /// stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_WRONG_ENTRY`] if fewer than `locals` values are
    /// on the stack.
    pub fn push_label(&mut self, locals: usize, arity: usize, from: usize, cont: Option<usize>) -> Result<()> {
        let vstack_off = self.base_for(locals)?;
        self.labels.push(Label { vstack_off, arity, from, cont });
        Ok(())
    }

    /// Remove the innermost `count` labels and unwind the value stack to the
    /// outermost of them, keeping its arity.
    ///
    /// Returns the outermost removed label, the branch target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_WRONG_ENTRY`] if `count` is zero or reaches
    /// below the current frame's labels.
    pub fn pop_label(&mut self, count: usize) -> Result<Label> {
        let floor = self.frames.last().map_or(0, |frame| frame.lstack_off);
        let target_idx = self
            .labels
            .len()
            .checked_sub(count)
            .filter(|idx| count > 0 && *idx >= floor)
            .ok_or(Error::STACK_WRONG_ENTRY)?;
        let target = self.labels[target_idx];
        self.values.truncate_keeping_tail(target.vstack_off, target.arity)?;
        self.labels.truncate(target_idx);
        Ok(target)
    }

    /// Leave the innermost scope by falling through its `end`.
    ///
    /// When the scope was the function body, the frame is popped as well and
    /// the returned flag is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if no label is open.
    pub fn leave_label(&mut self) -> Result<(Label, bool)> {
        let label = self.labels.pop().ok_or(Error::STACK_EMPTY)?;
        // A loop label's arity counts its parameters, not its results.
        if label.cont.is_none() {
            self.values.truncate_keeping_tail(label.vstack_off, label.arity)?;
        }
        let closes_frame = self
            .frames
            .last()
            .is_some_and(|frame| !frame.dummy && frame.code.is_some() && frame.lstack_off == self.labels.len());
        if closes_frame {
            self.pop_frame()?;
        }
        Ok((label, closes_frame))
    }

    /// Label `count` levels out from the innermost one (0 is the innermost).
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_WRONG_ENTRY`] if there is no such label.
    pub fn label_with_count(&self, count: usize) -> Result<&Label> {
        self.labels
            .len()
            .checked_sub(count + 1)
            .and_then(|idx| self.labels.get(idx))
            .ok_or(Error::STACK_WRONG_ENTRY)
    }

    /// Whether the label `count` levels out is the current function body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] without a frame.
    pub fn is_bottom_label(&self, count: usize) -> Result<bool> {
        let frame = self.current_frame()?;
        Ok(self.labels.len().checked_sub(count + 1) == Some(frame.lstack_off))
    }

    /// The current function body's label
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] without a frame and
    /// [`Error::STACK_WRONG_ENTRY`] if the frame has no label.
    pub fn bottom_label(&self) -> Result<&Label> {
        let frame = self.current_frame()?;
        self.labels.get(frame.lstack_off).ok_or(Error::STACK_WRONG_ENTRY)
    }

    /// Current frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::STACK_EMPTY`] if there is none.
    pub fn current_frame(&self) -> Result<&Frame> {
        self.frames.last().ok_or(Error::STACK_EMPTY)
    }

    /// Number of frames, dummy frames included
    #[must_use]
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of open labels
    #[must_use]
    pub fn label_depth(&self) -> usize {
        self.labels.len()
    }

    /// Number of values
    #[must_use]
    pub fn value_depth(&self) -> usize {
        self.values.len()
    }

    /// All values, bottom first
    #[must_use]
    pub fn values(&self) -> &[Value] {
        self.values.as_slice()
    }
}

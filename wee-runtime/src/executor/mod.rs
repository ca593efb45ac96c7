// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The interpreter.
//!
//! An [`Executor`] owns the execution stack, the statistics and the
//! interrupt flag, and runs functions against a [`Store`] it borrows per
//! call. Calls dispatch once on the [`FunctionInstance`] variant:
//! interpreted bodies are entered in place, compiled symbols and host
//! functions run to completion before the caller continues.

mod call;
mod control;
mod instantiate;
mod memory_ops;
mod numeric;
mod table_ops;
mod variable;

use std::sync::Arc;

use log::{trace, warn};
use wee_error::{Error, Result, TrapContext};
use wee_foundation::{FuncAddr, FuncType, ModuleAddr, Value, ValueType};
use wee_instructions::{BlockType, Instruction};

pub use self::call::CompiledFrame;
use crate::{
    compiled::{Executable, SymbolIndex},
    config::{Configure, InterruptHandle},
    func::{FunctionCode, FunctionInstance},
    host::{HostCallFrame, HostFunction},
    stack::StackManager,
    statistics::Statistics,
    store::Store,
};

/// What the interpreter loop does after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Continue the current body at the given position
    Continue(usize),
    /// An interpreted callee was entered; run its body from the start
    Enter,
    /// The current frame returned; resume the caller at the given position
    Exit(usize),
}

/// The parts of a function instance a call needs, taken out of the store
/// before the call mutates it.
enum Callee {
    Wasm { module: ModuleAddr, code: Arc<FunctionCode> },
    Compiled { module: ModuleAddr, symbol: SymbolIndex, image: Arc<dyn Executable> },
    Host { callable: Arc<dyn HostFunction>, cost: u64 },
}

impl Callee {
    fn of(instance: &FunctionInstance) -> Self {
        match instance {
            FunctionInstance::Wasm { module, code, .. } => Callee::Wasm { module: *module, code: Arc::clone(code) },
            FunctionInstance::Compiled { module, symbol, image, .. } => {
                Callee::Compiled { module: *module, symbol: *symbol, image: Arc::clone(image) }
            }
            FunctionInstance::Host(host) => Callee::Host { callable: Arc::clone(&host.callable), cost: host.cost },
        }
    }
}

/// Runs WebAssembly functions.
#[derive(Debug)]
pub struct Executor {
    config:       Configure,
    stats:        Statistics,
    interrupt:    InterruptHandle,
    stack:        StackManager,
    /// Compiled functions currently running inside one another
    native_depth: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Configure::default())
    }
}

impl Executor {
    /// Executor with fresh statistics built from `config`.
    #[must_use]
    pub fn new(config: Configure) -> Self {
        let stats = Statistics::new(config.cost_table().cloned().unwrap_or_default(), config.cost_limit());
        Self { config, stats, interrupt: InterruptHandle::new(), stack: StackManager::new(), native_depth: 0 }
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &Configure {
        &self.config
    }

    /// Collected statistics
    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Mutable statistics
    pub fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    /// Handle that stops a running invocation from any thread.
    #[must_use]
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Execution stack, as left by the last invocation
    #[must_use]
    pub fn stack(&self) -> &StackManager {
        &self.stack
    }

    /// Invoke the function at `func` with `args`.
    ///
    /// The stack is reset first, so an invocation never sees leftovers of a
    /// previous, trapped one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FUNC_SIG_MISMATCH`] if `args` do not match the
    /// function's parameters, and otherwise any trap raised while running,
    /// with a [`TrapContext`] naming the failing instruction.
    pub fn invoke(&mut self, store: &mut Store, func: FuncAddr, args: &[Value]) -> Result<Vec<Value>> {
        self.interrupt.clear();
        self.stack.reset();
        self.stack.push_dummy_frame();
        self.native_depth = 0;
        if self.config.measure_time() {
            self.stats.start_record_wasm();
        }

        let outcome = self.call_nested(store, func, args);

        if self.config.measure_time() {
            self.stats.stop_record_wasm();
        }
        match outcome {
            Ok(results) => {
                self.stack.pop_frame()?;
                Ok(results)
            }
            Err(err) => {
                warn!("invocation of {func} trapped: {err}");
                self.stack.reset();
                Err(err)
            }
        }
    }

    /// Invoke the function `module` exports as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FUNC_NOT_FOUND`] if there is no such function export,
    /// then behaves as [`Self::invoke`].
    pub fn invoke_export(
        &mut self,
        store: &mut Store,
        module: ModuleAddr,
        name: &str,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        let func = store.get_module(module)?.find_func_export(name).ok_or(Error::FUNC_NOT_FOUND)?;
        self.invoke(store, func, args)
    }

    /// Call `func` on top of whatever is running and return its results.
    ///
    /// Used by [`Self::invoke`] and by compiled code calling back into the
    /// engine.
    pub(crate) fn call_nested(&mut self, store: &mut Store, func: FuncAddr, args: &[Value]) -> Result<Vec<Value>> {
        let result_count = {
            let ty = store.get_func(func)?.func_type();
            check_values(&ty.params, args)?;
            ty.results.len()
        };

        self.stack.push_all(args);
        let depth = self.stack.frame_depth();
        if self.enter_function(store, func, 0)? {
            self.execute(store, depth)?;
        }
        self.stack.pop_n(result_count)
    }

    /// Enter `func`, whose arguments are on the stack.
    ///
    /// Returns `true` if an interpreted body was entered and must now be run;
    /// compiled and host functions have already completed with their results
    /// pushed. `ret_pc` is where the caller resumes.
    fn enter_function(&mut self, store: &mut Store, func: FuncAddr, ret_pc: usize) -> Result<bool> {
        if self.stack.frame_depth() > self.config.max_call_depth() {
            return Err(Error::CALL_STACK_EXHAUSTED);
        }
        let (callee, param_count, result_count) = {
            let instance = store.get_func(func)?;
            let ty = instance.func_type();
            trace!("enter {func} {ty}");
            (Callee::of(instance), ty.params.len(), ty.results.len())
        };

        match callee {
            Callee::Wasm { module, code } => {
                for ty in &code.locals {
                    self.stack.push(Value::default_for_type(*ty));
                }
                let locals = param_count + code.locals.len();
                self.stack.push_function_frame(module, func, code, locals, result_count)?;
                self.stack.push_label(0, result_count, ret_pc, None)?;
                Ok(true)
            }
            Callee::Compiled { module, symbol, image } => {
                if self.native_depth >= self.config.max_native_depth() {
                    warn!("compiled call to {func} nested {} deep", self.native_depth);
                    return Err(Error::CALL_STACK_EXHAUSTED);
                }
                let args = self.stack.top_span(param_count)?.to_vec();
                self.stack.push_frame(module, param_count, result_count)?;
                self.native_depth += 1;
                let outcome = {
                    let mut frame = CompiledFrame::new(self, store, module);
                    image.call(symbol, &mut frame, &args)
                };
                self.native_depth -= 1;
                let results = outcome?;
                check_values(&store.get_func(func)?.func_type().results, &results)?;
                self.stack.push_all(&results);
                self.stack.pop_frame()?;
                Ok(false)
            }
            Callee::Host { callable, cost } => {
                let args = self.stack.pop_n(param_count)?;
                if self.config.measure_cost() && !self.stats.add_cost(cost) {
                    return Err(Error::COST_LIMIT_EXCEEDED);
                }
                let memory_addr = self
                    .stack
                    .current_frame()?
                    .module
                    .and_then(|module| store.get_module(module).ok())
                    .and_then(|inst| inst.mem_addr(0).ok());
                let memory = match memory_addr {
                    Some(addr) => Some(store.get_memory_mut(addr)?),
                    None => None,
                };

                let timed = self.config.measure_time();
                if timed {
                    self.stats.stop_record_wasm();
                    self.stats.start_record_host();
                }
                let outcome = callable.call(HostCallFrame::new(memory), &args);
                if timed {
                    self.stats.stop_record_host();
                    self.stats.start_record_wasm();
                }

                let results = outcome?;
                check_values(&store.get_func(func)?.func_type().results, &results)?;
                self.stack.push_all(&results);
                Ok(false)
            }
        }
    }

    /// Run interpreted code until the frame stack is back at `entry_depth`.
    fn execute(&mut self, store: &mut Store, entry_depth: usize) -> Result<()> {
        let mut pc = 0;
        loop {
            let frame = self.stack.current_frame()?;
            let code = frame.code.clone().ok_or(Error::STACK_WRONG_ENTRY)?;
            let module = frame.module.ok_or(Error::STACK_WRONG_ENTRY)?;
            let func = frame.func;

            match self.run_body(store, module, &code, pc) {
                Ok(Flow::Enter) => pc = 0,
                Ok(Flow::Exit(ret_pc)) => {
                    if self.stack.frame_depth() <= entry_depth {
                        return Ok(());
                    }
                    pc = ret_pc;
                }
                Ok(Flow::Continue(_)) => return Err(Error::STACK_WRONG_ENTRY),
                Err((err, at)) => {
                    let opcode = code.instrs.get(at).map_or("end", Instruction::name);
                    let mut context = TrapContext::new(opcode, at).in_module(module.raw());
                    if let Some(func) = func {
                        context = context.in_function(func.raw());
                    }
                    return Err(err.with_context(context));
                }
            }
        }
    }

    /// Interpret `code` from `pc` until control leaves the body.
    fn run_body(
        &mut self,
        store: &mut Store,
        module: ModuleAddr,
        code: &FunctionCode,
        mut pc: usize,
    ) -> core::result::Result<Flow, (Error, usize)> {
        loop {
            let instr = code.instrs.get(pc).ok_or((Error::MALFORMED_BODY, pc))?;
            match self.step(store, module, code, instr, pc) {
                Ok(Flow::Continue(next)) => pc = next,
                Ok(flow) => return Ok(flow),
                Err(err) => return Err((err, pc)),
            }
        }
    }

    fn before_instruction(&mut self, instr: &Instruction) -> Result<()> {
        if self.config.interruptible() && self.interrupt.is_interrupted() {
            return Err(Error::INTERRUPTED);
        }
        if let Some(proposal) = instr.proposal() {
            if !self.config.has_proposal(proposal) {
                return Err(Error::NOT_SUPPORTED);
            }
        }
        if self.config.count_instructions() {
            self.stats.inc_instr_count();
        }
        if self.config.measure_cost() && !self.stats.add_instr_cost(instr.opcode()) {
            return Err(Error::COST_LIMIT_EXCEEDED);
        }
        Ok(())
    }

    /// Execute one instruction.
    fn step(
        &mut self,
        store: &mut Store,
        module: ModuleAddr,
        code: &FunctionCode,
        instr: &Instruction,
        pc: usize,
    ) -> Result<Flow> {
        self.before_instruction(instr)?;
        let next = Flow::Continue(pc + 1);

        match instr {
            Instruction::Unreachable => return Err(Error::UNREACHABLE),
            Instruction::Nop => {}
            Instruction::Block(bt) => return self.enter_block(store, module, code, *bt, pc),
            Instruction::Loop(bt) => return self.enter_loop(store, module, code, *bt, pc),
            Instruction::If(bt) => return self.enter_if(store, module, code, *bt, pc),
            Instruction::Else => return self.leave_then(),
            Instruction::End => return self.leave_block(pc),
            Instruction::Br(depth) => return self.branch(*depth),
            Instruction::BrIf(depth) => {
                if self.stack.pop_i32()? != 0 {
                    return self.branch(*depth);
                }
            }
            Instruction::BrTable(targets, default) => {
                let idx = self.stack.pop_i32()? as u32;
                let depth = targets.get(idx as usize).copied().unwrap_or(*default);
                return self.branch(depth);
            }
            Instruction::Return => return self.do_return(),
            Instruction::Call(func_idx) => {
                let func = store.get_module(module)?.func_addr(*func_idx)?;
                return self.call(store, func, pc);
            }
            Instruction::CallIndirect { type_idx, table_idx } => {
                let elem_idx = self.stack.pop_i32()? as u32;
                let func = call::resolve_indirect(store, module, *table_idx, elem_idx, *type_idx)?;
                return self.call(store, func, pc);
            }

            Instruction::RefNull(ty) => self.stack.push(Value::default_for_type(*ty)),
            Instruction::RefIsNull => {
                let value = self.stack.pop()?;
                self.stack.push(Value::I32(i32::from(value.is_null_ref())));
            }
            Instruction::RefFunc(func_idx) => {
                let func = store.get_module(module)?.func_addr(*func_idx)?;
                self.stack.push(Value::FuncRef(Some(func)));
            }

            Instruction::Drop => {
                self.stack.pop()?;
            }
            Instruction::Select | Instruction::SelectTyped(_) => {
                let cond = self.stack.pop_i32()?;
                let second = self.stack.pop()?;
                let first = self.stack.pop()?;
                self.stack.push(if cond != 0 { first } else { second });
            }

            Instruction::LocalGet(_)
            | Instruction::LocalSet(_)
            | Instruction::LocalTee(_)
            | Instruction::GlobalGet(_)
            | Instruction::GlobalSet(_) => self.variable(store, module, instr)?,

            Instruction::TableGet(_)
            | Instruction::TableSet(_)
            | Instruction::TableSize(_)
            | Instruction::TableGrow(_)
            | Instruction::TableFill(_)
            | Instruction::TableCopy { .. }
            | Instruction::TableInit { .. }
            | Instruction::ElemDrop(_) => self.table_op(store, module, instr)?,

            Instruction::Load(op, memarg) => self.load_mem(store, module, *op, memarg)?,
            Instruction::Store(op, memarg) => self.store_mem(store, module, *op, memarg)?,
            Instruction::MemorySize(_)
            | Instruction::MemoryGrow(_)
            | Instruction::MemoryInit { .. }
            | Instruction::DataDrop(_)
            | Instruction::MemoryCopy { .. }
            | Instruction::MemoryFill(_) => self.memory_op(store, module, instr)?,

            Instruction::I32Const(v) => self.stack.push(Value::I32(*v)),
            Instruction::I64Const(v) => self.stack.push(Value::I64(*v)),
            Instruction::F32Const(v) => self.stack.push(Value::F32(*v)),
            Instruction::F64Const(v) => self.stack.push(Value::F64(*v)),
            Instruction::Numeric(op) => self.numeric(*op)?,
        }
        Ok(next)
    }

    fn call(&mut self, store: &mut Store, func: FuncAddr, pc: usize) -> Result<Flow> {
        if self.enter_function(store, func, pc + 1)? {
            Ok(Flow::Enter)
        } else {
            Ok(Flow::Continue(pc + 1))
        }
    }
}

/// Checks a value list against the declared types.
fn check_values(types: &[ValueType], values: &[Value]) -> Result<()> {
    if types.len() != values.len() || !types.iter().zip(values).all(|(ty, v)| v.matches_type(*ty)) {
        return Err(Error::FUNC_SIG_MISMATCH);
    }
    Ok(())
}

/// Parameter and result counts of a block type.
fn block_arity(store: &Store, module: ModuleAddr, bt: BlockType) -> Result<(usize, usize)> {
    Ok(match bt {
        BlockType::Empty => (0, 0),
        BlockType::Value(_) => (0, 1),
        BlockType::FuncType(idx) => {
            let ty: &FuncType = store.get_module(module)?.func_type(idx)?;
            (ty.params.len(), ty.results.len())
        }
    })
}

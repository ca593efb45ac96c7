// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly constant expressions.
//!
//! Constant expressions are the restricted instruction sequences used for:
//! - Global variable initialization
//! - Element segment offsets and items
//! - Data segment offsets
//!
//! The extended constant expressions proposal's integer `add`, `sub` and
//! `mul` are accepted as well.

use wee_error::{Error, Result};
use wee_foundation::{FloatBits32, FloatBits64, Value, ValueType};

/// Instructions allowed in constant expressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstInstr {
    /// Push an i32 constant
    I32Const(i32),
    /// Push an i64 constant
    I64Const(i64),
    /// Push an f32 constant
    F32Const(FloatBits32),
    /// Push an f64 constant
    F64Const(FloatBits64),
    /// Push a null reference of the given type
    RefNull(ValueType),
    /// Push a reference to a module-local function
    RefFunc(u32),
    /// Push the value of a module-local global
    GlobalGet(u32),
    /// Add two i32 values
    I32Add,
    /// Subtract two i32 values
    I32Sub,
    /// Multiply two i32 values
    I32Mul,
    /// Add two i64 values
    I64Add,
    /// Subtract two i64 values
    I64Sub,
    /// Multiply two i64 values
    I64Mul,
}

/// Resolves the module-local indices a constant expression may refer to.
pub trait ConstContext {
    /// Current value of global `idx`
    fn global(&self, idx: u32) -> Result<Value>;
    /// Reference to function `idx`
    fn func_ref(&self, idx: u32) -> Result<Value>;
}

/// A constant expression
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstExpr {
    /// Instructions, without the terminating `end`
    pub instrs: Vec<ConstInstr>,
}

impl ConstExpr {
    /// Expression from a list of instructions.
    #[must_use]
    pub fn new(instrs: Vec<ConstInstr>) -> Self {
        Self { instrs }
    }

    /// `i32.const v`
    #[must_use]
    pub fn i32(v: i32) -> Self {
        Self::new(vec![ConstInstr::I32Const(v)])
    }

    /// `i64.const v`
    #[must_use]
    pub fn i64(v: i64) -> Self {
        Self::new(vec![ConstInstr::I64Const(v)])
    }

    /// `f32.const v`
    #[must_use]
    pub fn f32(v: f32) -> Self {
        Self::new(vec![ConstInstr::F32Const(FloatBits32::from_float(v))])
    }

    /// `f64.const v`
    #[must_use]
    pub fn f64(v: f64) -> Self {
        Self::new(vec![ConstInstr::F64Const(FloatBits64::from_float(v))])
    }

    /// `ref.func idx`
    #[must_use]
    pub fn ref_func(idx: u32) -> Self {
        Self::new(vec![ConstInstr::RefFunc(idx)])
    }

    /// `ref.null ty`
    #[must_use]
    pub fn ref_null(ty: ValueType) -> Self {
        Self::new(vec![ConstInstr::RefNull(ty)])
    }

    /// `global.get idx`
    #[must_use]
    pub fn global_get(idx: u32) -> Self {
        Self::new(vec![ConstInstr::GlobalGet(idx)])
    }

    /// Evaluate the expression to exactly one value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::INVALID_CONST_EXPR`] if the expression does not leave
    /// exactly one value or mixes operand types, and propagates errors from
    /// `ctx`.
    pub fn evaluate(&self, ctx: &dyn ConstContext) -> Result<Value> {
        let mut stack: Vec<Value> = Vec::with_capacity(2);
        for instr in &self.instrs {
            let value = match *instr {
                ConstInstr::I32Const(v) => Value::I32(v),
                ConstInstr::I64Const(v) => Value::I64(v),
                ConstInstr::F32Const(v) => Value::F32(v),
                ConstInstr::F64Const(v) => Value::F64(v),
                ConstInstr::RefNull(ValueType::FuncRef) => Value::FuncRef(None),
                ConstInstr::RefNull(ValueType::ExternRef) => Value::ExternRef(None),
                ConstInstr::RefNull(_) => return Err(Error::INVALID_CONST_EXPR),
                ConstInstr::RefFunc(idx) => ctx.func_ref(idx)?,
                ConstInstr::GlobalGet(idx) => ctx.global(idx)?,
                ConstInstr::I32Add | ConstInstr::I32Sub | ConstInstr::I32Mul => {
                    let (lhs, rhs) = pop_pair(&mut stack)?;
                    match (lhs, rhs) {
                        (Value::I32(a), Value::I32(b)) => Value::I32(match instr {
                            ConstInstr::I32Add => a.wrapping_add(b),
                            ConstInstr::I32Sub => a.wrapping_sub(b),
                            _ => a.wrapping_mul(b),
                        }),
                        _ => return Err(Error::INVALID_CONST_EXPR),
                    }
                }
                ConstInstr::I64Add | ConstInstr::I64Sub | ConstInstr::I64Mul => {
                    let (lhs, rhs) = pop_pair(&mut stack)?;
                    match (lhs, rhs) {
                        (Value::I64(a), Value::I64(b)) => Value::I64(match instr {
                            ConstInstr::I64Add => a.wrapping_add(b),
                            ConstInstr::I64Sub => a.wrapping_sub(b),
                            _ => a.wrapping_mul(b),
                        }),
                        _ => return Err(Error::INVALID_CONST_EXPR),
                    }
                }
            };
            stack.push(value);
        }
        match stack.as_slice() {
            [value] => Ok(*value),
            _ => Err(Error::INVALID_CONST_EXPR),
        }
    }
}

fn pop_pair(stack: &mut Vec<Value>) -> Result<(Value, Value)> {
    let rhs = stack.pop().ok_or(Error::INVALID_CONST_EXPR)?;
    let lhs = stack.pop().ok_or(Error::INVALID_CONST_EXPR)?;
    Ok((lhs, rhs))
}

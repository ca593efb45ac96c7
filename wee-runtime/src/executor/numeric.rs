// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Numeric instructions.

use wee_error::Result;
use wee_foundation::{FloatBits32, FloatBits64, Value};
use wee_instructions::NumericOp;
use wee_math as math;

use super::Executor;

fn bool_value(b: bool) -> Value {
    Value::I32(i32::from(b))
}

macro_rules! unop {
    ($stack:expr, $pop:ident => $wrap:path, |$a:ident| $body:expr) => {{
        let $a = $stack.$pop()?;
        $stack.push($wrap($body));
    }};
}

macro_rules! binop {
    ($stack:expr, $pop:ident => $wrap:path, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $stack.$pop()?;
        let $a = $stack.$pop()?;
        $stack.push($wrap($body));
    }};
}

impl Executor {
    pub(super) fn numeric(&mut self, op: NumericOp) -> Result<()> {
        let s = &mut self.stack;
        match op {
            NumericOp::I32Eqz => unop!(s, pop_i32 => bool_value, |a| a == 0),
            NumericOp::I32Eq => binop!(s, pop_i32 => bool_value, |a, b| a == b),
            NumericOp::I32Ne => binop!(s, pop_i32 => bool_value, |a, b| a != b),
            NumericOp::I32LtS => binop!(s, pop_i32 => bool_value, |a, b| a < b),
            NumericOp::I32LtU => binop!(s, pop_i32 => bool_value, |a, b| (a as u32) < (b as u32)),
            NumericOp::I32GtS => binop!(s, pop_i32 => bool_value, |a, b| a > b),
            NumericOp::I32GtU => binop!(s, pop_i32 => bool_value, |a, b| (a as u32) > (b as u32)),
            NumericOp::I32LeS => binop!(s, pop_i32 => bool_value, |a, b| a <= b),
            NumericOp::I32LeU => binop!(s, pop_i32 => bool_value, |a, b| (a as u32) <= (b as u32)),
            NumericOp::I32GeS => binop!(s, pop_i32 => bool_value, |a, b| a >= b),
            NumericOp::I32GeU => binop!(s, pop_i32 => bool_value, |a, b| (a as u32) >= (b as u32)),

            NumericOp::I64Eqz => unop!(s, pop_i64 => bool_value, |a| a == 0),
            NumericOp::I64Eq => binop!(s, pop_i64 => bool_value, |a, b| a == b),
            NumericOp::I64Ne => binop!(s, pop_i64 => bool_value, |a, b| a != b),
            NumericOp::I64LtS => binop!(s, pop_i64 => bool_value, |a, b| a < b),
            NumericOp::I64LtU => binop!(s, pop_i64 => bool_value, |a, b| (a as u64) < (b as u64)),
            NumericOp::I64GtS => binop!(s, pop_i64 => bool_value, |a, b| a > b),
            NumericOp::I64GtU => binop!(s, pop_i64 => bool_value, |a, b| (a as u64) > (b as u64)),
            NumericOp::I64LeS => binop!(s, pop_i64 => bool_value, |a, b| a <= b),
            NumericOp::I64LeU => binop!(s, pop_i64 => bool_value, |a, b| (a as u64) <= (b as u64)),
            NumericOp::I64GeS => binop!(s, pop_i64 => bool_value, |a, b| a >= b),
            NumericOp::I64GeU => binop!(s, pop_i64 => bool_value, |a, b| (a as u64) >= (b as u64)),

            NumericOp::F32Eq => binop!(s, pop_f32 => bool_value, |a, b| a == b),
            NumericOp::F32Ne => binop!(s, pop_f32 => bool_value, |a, b| a != b),
            NumericOp::F32Lt => binop!(s, pop_f32 => bool_value, |a, b| a < b),
            NumericOp::F32Gt => binop!(s, pop_f32 => bool_value, |a, b| a > b),
            NumericOp::F32Le => binop!(s, pop_f32 => bool_value, |a, b| a <= b),
            NumericOp::F32Ge => binop!(s, pop_f32 => bool_value, |a, b| a >= b),
            NumericOp::F64Eq => binop!(s, pop_f64 => bool_value, |a, b| a == b),
            NumericOp::F64Ne => binop!(s, pop_f64 => bool_value, |a, b| a != b),
            NumericOp::F64Lt => binop!(s, pop_f64 => bool_value, |a, b| a < b),
            NumericOp::F64Gt => binop!(s, pop_f64 => bool_value, |a, b| a > b),
            NumericOp::F64Le => binop!(s, pop_f64 => bool_value, |a, b| a <= b),
            NumericOp::F64Ge => binop!(s, pop_f64 => bool_value, |a, b| a >= b),

            NumericOp::I32Clz => unop!(s, pop_i32 => Value::I32, |a| a.leading_zeros() as i32),
            NumericOp::I32Ctz => unop!(s, pop_i32 => Value::I32, |a| a.trailing_zeros() as i32),
            NumericOp::I32Popcnt => unop!(s, pop_i32 => Value::I32, |a| a.count_ones() as i32),
            NumericOp::I32Add => binop!(s, pop_i32 => Value::I32, |a, b| a.wrapping_add(b)),
            NumericOp::I32Sub => binop!(s, pop_i32 => Value::I32, |a, b| a.wrapping_sub(b)),
            NumericOp::I32Mul => binop!(s, pop_i32 => Value::I32, |a, b| a.wrapping_mul(b)),
            NumericOp::I32DivS => binop!(s, pop_i32 => Value::I32, |a, b| math::i32_div_s(a, b)?),
            NumericOp::I32DivU => binop!(s, pop_i32 => Value::I32, |a, b| math::i32_div_u(a, b)?),
            NumericOp::I32RemS => binop!(s, pop_i32 => Value::I32, |a, b| math::i32_rem_s(a, b)?),
            NumericOp::I32RemU => binop!(s, pop_i32 => Value::I32, |a, b| math::i32_rem_u(a, b)?),
            NumericOp::I32And => binop!(s, pop_i32 => Value::I32, |a, b| a & b),
            NumericOp::I32Or => binop!(s, pop_i32 => Value::I32, |a, b| a | b),
            NumericOp::I32Xor => binop!(s, pop_i32 => Value::I32, |a, b| a ^ b),
            NumericOp::I32Shl => binop!(s, pop_i32 => Value::I32, |a, b| a.wrapping_shl(b as u32)),
            NumericOp::I32ShrS => binop!(s, pop_i32 => Value::I32, |a, b| a.wrapping_shr(b as u32)),
            NumericOp::I32ShrU => binop!(s, pop_i32 => Value::I32, |a, b| (a as u32).wrapping_shr(b as u32) as i32),
            NumericOp::I32Rotl => binop!(s, pop_i32 => Value::I32, |a, b| a.rotate_left(b as u32 % 32)),
            NumericOp::I32Rotr => binop!(s, pop_i32 => Value::I32, |a, b| a.rotate_right(b as u32 % 32)),

            NumericOp::I64Clz => unop!(s, pop_i64 => Value::I64, |a| i64::from(a.leading_zeros())),
            NumericOp::I64Ctz => unop!(s, pop_i64 => Value::I64, |a| i64::from(a.trailing_zeros())),
            NumericOp::I64Popcnt => unop!(s, pop_i64 => Value::I64, |a| i64::from(a.count_ones())),
            NumericOp::I64Add => binop!(s, pop_i64 => Value::I64, |a, b| a.wrapping_add(b)),
            NumericOp::I64Sub => binop!(s, pop_i64 => Value::I64, |a, b| a.wrapping_sub(b)),
            NumericOp::I64Mul => binop!(s, pop_i64 => Value::I64, |a, b| a.wrapping_mul(b)),
            NumericOp::I64DivS => binop!(s, pop_i64 => Value::I64, |a, b| math::i64_div_s(a, b)?),
            NumericOp::I64DivU => binop!(s, pop_i64 => Value::I64, |a, b| math::i64_div_u(a, b)?),
            NumericOp::I64RemS => binop!(s, pop_i64 => Value::I64, |a, b| math::i64_rem_s(a, b)?),
            NumericOp::I64RemU => binop!(s, pop_i64 => Value::I64, |a, b| math::i64_rem_u(a, b)?),
            NumericOp::I64And => binop!(s, pop_i64 => Value::I64, |a, b| a & b),
            NumericOp::I64Or => binop!(s, pop_i64 => Value::I64, |a, b| a | b),
            NumericOp::I64Xor => binop!(s, pop_i64 => Value::I64, |a, b| a ^ b),
            NumericOp::I64Shl => binop!(s, pop_i64 => Value::I64, |a, b| a.wrapping_shl(b as u32)),
            NumericOp::I64ShrS => binop!(s, pop_i64 => Value::I64, |a, b| a.wrapping_shr(b as u32)),
            NumericOp::I64ShrU => binop!(s, pop_i64 => Value::I64, |a, b| (a as u64).wrapping_shr(b as u32) as i64),
            NumericOp::I64Rotl => binop!(s, pop_i64 => Value::I64, |a, b| a.rotate_left((b as u64 % 64) as u32)),
            NumericOp::I64Rotr => binop!(s, pop_i64 => Value::I64, |a, b| a.rotate_right((b as u64 % 64) as u32)),

            // Sign manipulation works on the bit pattern so NaN payloads survive.
            NumericOp::F32Abs => unop!(s, pop_f32_bits => Value::F32, |a| math::f32_abs(a)),
            NumericOp::F32Neg => unop!(s, pop_f32_bits => Value::F32, |a| math::f32_neg(a)),
            NumericOp::F32Copysign => binop!(s, pop_f32_bits => Value::F32, |a, b| math::f32_copysign(a, b)),
            NumericOp::F32Ceil => unop!(s, pop_f32 => Value::from_f32, |a| a.ceil()),
            NumericOp::F32Floor => unop!(s, pop_f32 => Value::from_f32, |a| a.floor()),
            NumericOp::F32Trunc => unop!(s, pop_f32 => Value::from_f32, |a| a.trunc()),
            NumericOp::F32Nearest => unop!(s, pop_f32 => Value::from_f32, |a| math::f32_nearest(a)),
            NumericOp::F32Sqrt => unop!(s, pop_f32 => Value::from_f32, |a| a.sqrt()),
            NumericOp::F32Add => binop!(s, pop_f32 => Value::from_f32, |a, b| a + b),
            NumericOp::F32Sub => binop!(s, pop_f32 => Value::from_f32, |a, b| a - b),
            NumericOp::F32Mul => binop!(s, pop_f32 => Value::from_f32, |a, b| a * b),
            NumericOp::F32Div => binop!(s, pop_f32 => Value::from_f32, |a, b| a / b),
            NumericOp::F32Min => binop!(s, pop_f32 => Value::from_f32, |a, b| math::f32_min(a, b)),
            NumericOp::F32Max => binop!(s, pop_f32 => Value::from_f32, |a, b| math::f32_max(a, b)),

            NumericOp::F64Abs => unop!(s, pop_f64_bits => Value::F64, |a| math::f64_abs(a)),
            NumericOp::F64Neg => unop!(s, pop_f64_bits => Value::F64, |a| math::f64_neg(a)),
            NumericOp::F64Copysign => binop!(s, pop_f64_bits => Value::F64, |a, b| math::f64_copysign(a, b)),
            NumericOp::F64Ceil => unop!(s, pop_f64 => Value::from_f64, |a| a.ceil()),
            NumericOp::F64Floor => unop!(s, pop_f64 => Value::from_f64, |a| a.floor()),
            NumericOp::F64Trunc => unop!(s, pop_f64 => Value::from_f64, |a| a.trunc()),
            NumericOp::F64Nearest => unop!(s, pop_f64 => Value::from_f64, |a| math::f64_nearest(a)),
            NumericOp::F64Sqrt => unop!(s, pop_f64 => Value::from_f64, |a| a.sqrt()),
            NumericOp::F64Add => binop!(s, pop_f64 => Value::from_f64, |a, b| a + b),
            NumericOp::F64Sub => binop!(s, pop_f64 => Value::from_f64, |a, b| a - b),
            NumericOp::F64Mul => binop!(s, pop_f64 => Value::from_f64, |a, b| a * b),
            NumericOp::F64Div => binop!(s, pop_f64 => Value::from_f64, |a, b| a / b),
            NumericOp::F64Min => binop!(s, pop_f64 => Value::from_f64, |a, b| math::f64_min(a, b)),
            NumericOp::F64Max => binop!(s, pop_f64 => Value::from_f64, |a, b| math::f64_max(a, b)),

            NumericOp::I32WrapI64 => unop!(s, pop_i64 => Value::I32, |a| a as i32),
            NumericOp::I32TruncF32S => unop!(s, pop_f32 => Value::I32, |a| math::i32_trunc_f32_s(a)?),
            NumericOp::I32TruncF32U => unop!(s, pop_f32 => Value::I32, |a| math::i32_trunc_f32_u(a)? as i32),
            NumericOp::I32TruncF64S => unop!(s, pop_f64 => Value::I32, |a| math::i32_trunc_f64_s(a)?),
            NumericOp::I32TruncF64U => unop!(s, pop_f64 => Value::I32, |a| math::i32_trunc_f64_u(a)? as i32),
            NumericOp::I64ExtendI32S => unop!(s, pop_i32 => Value::I64, |a| i64::from(a)),
            NumericOp::I64ExtendI32U => unop!(s, pop_i32 => Value::I64, |a| i64::from(a as u32)),
            NumericOp::I64TruncF32S => unop!(s, pop_f32 => Value::I64, |a| math::i64_trunc_f32_s(a)?),
            NumericOp::I64TruncF32U => unop!(s, pop_f32 => Value::I64, |a| math::i64_trunc_f32_u(a)? as i64),
            NumericOp::I64TruncF64S => unop!(s, pop_f64 => Value::I64, |a| math::i64_trunc_f64_s(a)?),
            NumericOp::I64TruncF64U => unop!(s, pop_f64 => Value::I64, |a| math::i64_trunc_f64_u(a)? as i64),
            NumericOp::F32ConvertI32S => unop!(s, pop_i32 => Value::from_f32, |a| a as f32),
            NumericOp::F32ConvertI32U => unop!(s, pop_i32 => Value::from_f32, |a| a as u32 as f32),
            NumericOp::F32ConvertI64S => unop!(s, pop_i64 => Value::from_f32, |a| a as f32),
            NumericOp::F32ConvertI64U => unop!(s, pop_i64 => Value::from_f32, |a| a as u64 as f32),
            NumericOp::F32DemoteF64 => unop!(s, pop_f64 => Value::from_f32, |a| a as f32),
            NumericOp::F64ConvertI32S => unop!(s, pop_i32 => Value::from_f64, |a| f64::from(a)),
            NumericOp::F64ConvertI32U => unop!(s, pop_i32 => Value::from_f64, |a| f64::from(a as u32)),
            NumericOp::F64ConvertI64S => unop!(s, pop_i64 => Value::from_f64, |a| a as f64),
            NumericOp::F64ConvertI64U => unop!(s, pop_i64 => Value::from_f64, |a| a as u64 as f64),
            NumericOp::F64PromoteF32 => unop!(s, pop_f32 => Value::from_f64, |a| f64::from(a)),
            NumericOp::I32ReinterpretF32 => unop!(s, pop_f32_bits => Value::I32, |a| a.to_bits() as i32),
            NumericOp::I64ReinterpretF64 => unop!(s, pop_f64_bits => Value::I64, |a| a.to_bits() as i64),
            NumericOp::F32ReinterpretI32 => unop!(s, pop_i32 => Value::F32, |a| FloatBits32::from_bits(a as u32)),
            NumericOp::F64ReinterpretI64 => unop!(s, pop_i64 => Value::F64, |a| FloatBits64::from_bits(a as u64)),

            NumericOp::I32Extend8S => unop!(s, pop_i32 => Value::I32, |a| i32::from(a as i8)),
            NumericOp::I32Extend16S => unop!(s, pop_i32 => Value::I32, |a| i32::from(a as i16)),
            NumericOp::I64Extend8S => unop!(s, pop_i64 => Value::I64, |a| i64::from(a as i8)),
            NumericOp::I64Extend16S => unop!(s, pop_i64 => Value::I64, |a| i64::from(a as i16)),
            NumericOp::I64Extend32S => unop!(s, pop_i64 => Value::I64, |a| i64::from(a as i32)),

            NumericOp::I32TruncSatF32S => unop!(s, pop_f32 => Value::I32, |a| math::i32_trunc_sat_f32_s(a)),
            NumericOp::I32TruncSatF32U => unop!(s, pop_f32 => Value::I32, |a| math::i32_trunc_sat_f32_u(a) as i32),
            NumericOp::I32TruncSatF64S => unop!(s, pop_f64 => Value::I32, |a| math::i32_trunc_sat_f64_s(a)),
            NumericOp::I32TruncSatF64U => unop!(s, pop_f64 => Value::I32, |a| math::i32_trunc_sat_f64_u(a) as i32),
            NumericOp::I64TruncSatF32S => unop!(s, pop_f32 => Value::I64, |a| math::i64_trunc_sat_f32_s(a)),
            NumericOp::I64TruncSatF32U => unop!(s, pop_f32 => Value::I64, |a| math::i64_trunc_sat_f32_u(a) as i64),
            NumericOp::I64TruncSatF64S => unop!(s, pop_f64 => Value::I64, |a| math::i64_trunc_sat_f64_s(a)),
            NumericOp::I64TruncSatF64U => unop!(s, pop_f64 => Value::I64, |a| math::i64_trunc_sat_f64_u(a) as i64),
        }
        Ok(())
    }
}

// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The interpreter's instruction representation.
//!
//! Structured and variable instructions are spelled out in [`Instruction`].
//! The large families that differ only in operand type or width are grouped
//! into [`NumericOp`], [`LoadOp`] and [`StoreOp`], each of which knows its
//! binary opcode (used as the key of the cost table) and its text name (used
//! in trap diagnostics).

use wee_foundation::{FloatBits32, FloatBits64, ValueType};

use crate::proposal::Proposal;

/// Block signature of `block`, `loop` and `if`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    /// `[] -> []`
    #[default]
    Empty,
    /// `[] -> [t]`
    Value(ValueType),
    /// Index into the module's type section (multi-value)
    FuncType(u32),
}

/// Static operand of a load or store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemArg {
    /// Alignment hint (log2), not enforced
    pub align:  u32,
    /// Constant offset added to the dynamic address
    pub offset: u32,
    /// Memory index
    pub memory: u32,
}

impl MemArg {
    /// Memory argument for memory 0.
    #[must_use]
    pub const fn new(offset: u32, align: u32) -> Self {
        Self { align, offset, memory: 0 }
    }
}

macro_rules! opcode_family {
    (
        $(#[$meta:meta])*
        $enum:ident {
            $($variant:ident = $opcode:literal, $name:literal;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl $enum {
            /// Binary opcode; `0xFC`-prefixed opcodes are `0xFC00 | sub`.
            #[must_use]
            pub const fn opcode(self) -> u16 {
                match self {
                    $(Self::$variant => $opcode,)*
                }
            }

            /// Text-format name
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }
        }
    };
}

opcode_family! {
    /// Numeric instructions without immediates
    NumericOp {
        I32Eqz = 0x45, "i32.eqz";
        I32Eq = 0x46, "i32.eq";
        I32Ne = 0x47, "i32.ne";
        I32LtS = 0x48, "i32.lt_s";
        I32LtU = 0x49, "i32.lt_u";
        I32GtS = 0x4a, "i32.gt_s";
        I32GtU = 0x4b, "i32.gt_u";
        I32LeS = 0x4c, "i32.le_s";
        I32LeU = 0x4d, "i32.le_u";
        I32GeS = 0x4e, "i32.ge_s";
        I32GeU = 0x4f, "i32.ge_u";
        I64Eqz = 0x50, "i64.eqz";
        I64Eq = 0x51, "i64.eq";
        I64Ne = 0x52, "i64.ne";
        I64LtS = 0x53, "i64.lt_s";
        I64LtU = 0x54, "i64.lt_u";
        I64GtS = 0x55, "i64.gt_s";
        I64GtU = 0x56, "i64.gt_u";
        I64LeS = 0x57, "i64.le_s";
        I64LeU = 0x58, "i64.le_u";
        I64GeS = 0x59, "i64.ge_s";
        I64GeU = 0x5a, "i64.ge_u";
        F32Eq = 0x5b, "f32.eq";
        F32Ne = 0x5c, "f32.ne";
        F32Lt = 0x5d, "f32.lt";
        F32Gt = 0x5e, "f32.gt";
        F32Le = 0x5f, "f32.le";
        F32Ge = 0x60, "f32.ge";
        F64Eq = 0x61, "f64.eq";
        F64Ne = 0x62, "f64.ne";
        F64Lt = 0x63, "f64.lt";
        F64Gt = 0x64, "f64.gt";
        F64Le = 0x65, "f64.le";
        F64Ge = 0x66, "f64.ge";
        I32Clz = 0x67, "i32.clz";
        I32Ctz = 0x68, "i32.ctz";
        I32Popcnt = 0x69, "i32.popcnt";
        I32Add = 0x6a, "i32.add";
        I32Sub = 0x6b, "i32.sub";
        I32Mul = 0x6c, "i32.mul";
        I32DivS = 0x6d, "i32.div_s";
        I32DivU = 0x6e, "i32.div_u";
        I32RemS = 0x6f, "i32.rem_s";
        I32RemU = 0x70, "i32.rem_u";
        I32And = 0x71, "i32.and";
        I32Or = 0x72, "i32.or";
        I32Xor = 0x73, "i32.xor";
        I32Shl = 0x74, "i32.shl";
        I32ShrS = 0x75, "i32.shr_s";
        I32ShrU = 0x76, "i32.shr_u";
        I32Rotl = 0x77, "i32.rotl";
        I32Rotr = 0x78, "i32.rotr";
        I64Clz = 0x79, "i64.clz";
        I64Ctz = 0x7a, "i64.ctz";
        I64Popcnt = 0x7b, "i64.popcnt";
        I64Add = 0x7c, "i64.add";
        I64Sub = 0x7d, "i64.sub";
        I64Mul = 0x7e, "i64.mul";
        I64DivS = 0x7f, "i64.div_s";
        I64DivU = 0x80, "i64.div_u";
        I64RemS = 0x81, "i64.rem_s";
        I64RemU = 0x82, "i64.rem_u";
        I64And = 0x83, "i64.and";
        I64Or = 0x84, "i64.or";
        I64Xor = 0x85, "i64.xor";
        I64Shl = 0x86, "i64.shl";
        I64ShrS = 0x87, "i64.shr_s";
        I64ShrU = 0x88, "i64.shr_u";
        I64Rotl = 0x89, "i64.rotl";
        I64Rotr = 0x8a, "i64.rotr";
        F32Abs = 0x8b, "f32.abs";
        F32Neg = 0x8c, "f32.neg";
        F32Ceil = 0x8d, "f32.ceil";
        F32Floor = 0x8e, "f32.floor";
        F32Trunc = 0x8f, "f32.trunc";
        F32Nearest = 0x90, "f32.nearest";
        F32Sqrt = 0x91, "f32.sqrt";
        F32Add = 0x92, "f32.add";
        F32Sub = 0x93, "f32.sub";
        F32Mul = 0x94, "f32.mul";
        F32Div = 0x95, "f32.div";
        F32Min = 0x96, "f32.min";
        F32Max = 0x97, "f32.max";
        F32Copysign = 0x98, "f32.copysign";
        F64Abs = 0x99, "f64.abs";
        F64Neg = 0x9a, "f64.neg";
        F64Ceil = 0x9b, "f64.ceil";
        F64Floor = 0x9c, "f64.floor";
        F64Trunc = 0x9d, "f64.trunc";
        F64Nearest = 0x9e, "f64.nearest";
        F64Sqrt = 0x9f, "f64.sqrt";
        F64Add = 0xa0, "f64.add";
        F64Sub = 0xa1, "f64.sub";
        F64Mul = 0xa2, "f64.mul";
        F64Div = 0xa3, "f64.div";
        F64Min = 0xa4, "f64.min";
        F64Max = 0xa5, "f64.max";
        F64Copysign = 0xa6, "f64.copysign";
        I32WrapI64 = 0xa7, "i32.wrap_i64";
        I32TruncF32S = 0xa8, "i32.trunc_f32_s";
        I32TruncF32U = 0xa9, "i32.trunc_f32_u";
        I32TruncF64S = 0xaa, "i32.trunc_f64_s";
        I32TruncF64U = 0xab, "i32.trunc_f64_u";
        I64ExtendI32S = 0xac, "i64.extend_i32_s";
        I64ExtendI32U = 0xad, "i64.extend_i32_u";
        I64TruncF32S = 0xae, "i64.trunc_f32_s";
        I64TruncF32U = 0xaf, "i64.trunc_f32_u";
        I64TruncF64S = 0xb0, "i64.trunc_f64_s";
        I64TruncF64U = 0xb1, "i64.trunc_f64_u";
        F32ConvertI32S = 0xb2, "f32.convert_i32_s";
        F32ConvertI32U = 0xb3, "f32.convert_i32_u";
        F32ConvertI64S = 0xb4, "f32.convert_i64_s";
        F32ConvertI64U = 0xb5, "f32.convert_i64_u";
        F32DemoteF64 = 0xb6, "f32.demote_f64";
        F64ConvertI32S = 0xb7, "f64.convert_i32_s";
        F64ConvertI32U = 0xb8, "f64.convert_i32_u";
        F64ConvertI64S = 0xb9, "f64.convert_i64_s";
        F64ConvertI64U = 0xba, "f64.convert_i64_u";
        F64PromoteF32 = 0xbb, "f64.promote_f32";
        I32ReinterpretF32 = 0xbc, "i32.reinterpret_f32";
        I64ReinterpretF64 = 0xbd, "i64.reinterpret_f64";
        F32ReinterpretI32 = 0xbe, "f32.reinterpret_i32";
        F64ReinterpretI64 = 0xbf, "f64.reinterpret_i64";
        I32Extend8S = 0xc0, "i32.extend8_s";
        I32Extend16S = 0xc1, "i32.extend16_s";
        I64Extend8S = 0xc2, "i64.extend8_s";
        I64Extend16S = 0xc3, "i64.extend16_s";
        I64Extend32S = 0xc4, "i64.extend32_s";
        I32TruncSatF32S = 0xfc00, "i32.trunc_sat_f32_s";
        I32TruncSatF32U = 0xfc01, "i32.trunc_sat_f32_u";
        I32TruncSatF64S = 0xfc02, "i32.trunc_sat_f64_s";
        I32TruncSatF64U = 0xfc03, "i32.trunc_sat_f64_u";
        I64TruncSatF32S = 0xfc04, "i64.trunc_sat_f32_s";
        I64TruncSatF32U = 0xfc05, "i64.trunc_sat_f32_u";
        I64TruncSatF64S = 0xfc06, "i64.trunc_sat_f64_s";
        I64TruncSatF64U = 0xfc07, "i64.trunc_sat_f64_u";
    }
}

impl NumericOp {
    /// Proposal this operator belongs to, `None` for MVP operators
    #[must_use]
    pub const fn proposal(self) -> Option<Proposal> {
        match self.opcode() {
            0xc0..=0xc4 => Some(Proposal::SignExtension),
            0xfc00..=0xfc07 => Some(Proposal::SaturatingFloatToInt),
            _ => None,
        }
    }
}

opcode_family! {
    /// Memory load instructions
    LoadOp {
        I32Load = 0x28, "i32.load";
        I64Load = 0x29, "i64.load";
        F32Load = 0x2a, "f32.load";
        F64Load = 0x2b, "f64.load";
        I32Load8S = 0x2c, "i32.load8_s";
        I32Load8U = 0x2d, "i32.load8_u";
        I32Load16S = 0x2e, "i32.load16_s";
        I32Load16U = 0x2f, "i32.load16_u";
        I64Load8S = 0x30, "i64.load8_s";
        I64Load8U = 0x31, "i64.load8_u";
        I64Load16S = 0x32, "i64.load16_s";
        I64Load16U = 0x33, "i64.load16_u";
        I64Load32S = 0x34, "i64.load32_s";
        I64Load32U = 0x35, "i64.load32_u";
    }
}

impl LoadOp {
    /// Number of bytes read from memory
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::I32Load8S | Self::I32Load8U | Self::I64Load8S | Self::I64Load8U => 1,
            Self::I32Load16S | Self::I32Load16U | Self::I64Load16S | Self::I64Load16U => 2,
            Self::I32Load | Self::F32Load | Self::I64Load32S | Self::I64Load32U => 4,
            Self::I64Load | Self::F64Load => 8,
        }
    }
}

opcode_family! {
    /// Memory store instructions
    StoreOp {
        I32Store = 0x36, "i32.store";
        I64Store = 0x37, "i64.store";
        F32Store = 0x38, "f32.store";
        F64Store = 0x39, "f64.store";
        I32Store8 = 0x3a, "i32.store8";
        I32Store16 = 0x3b, "i32.store16";
        I64Store8 = 0x3c, "i64.store8";
        I64Store16 = 0x3d, "i64.store16";
        I64Store32 = 0x3e, "i64.store32";
    }
}

impl StoreOp {
    /// Number of bytes written to memory
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::I32Store8 | Self::I64Store8 => 1,
            Self::I32Store16 | Self::I64Store16 => 2,
            Self::I32Store | Self::F32Store | Self::I64Store32 => 4,
            Self::I64Store | Self::F64Store => 8,
        }
    }
}

/// A decoded WebAssembly instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `unreachable`
    Unreachable,
    /// `nop`
    Nop,
    /// `block`
    Block(BlockType),
    /// `loop`
    Loop(BlockType),
    /// `if`
    If(BlockType),
    /// `else`
    Else,
    /// `end`
    End,
    /// `br l`
    Br(u32),
    /// `br_if l`
    BrIf(u32),
    /// `br_table l* l_default`
    BrTable(Box<[u32]>, u32),
    /// `return`
    Return,
    /// `call f`
    Call(u32),
    /// `call_indirect t x`
    CallIndirect {
        /// Expected type index
        type_idx:  u32,
        /// Table index
        table_idx: u32,
    },

    /// `ref.null t`
    RefNull(ValueType),
    /// `ref.is_null`
    RefIsNull,
    /// `ref.func f`
    RefFunc(u32),

    /// `drop`
    Drop,
    /// `select`
    Select,
    /// `select (result t)`
    SelectTyped(ValueType),

    /// `local.get x`
    LocalGet(u32),
    /// `local.set x`
    LocalSet(u32),
    /// `local.tee x`
    LocalTee(u32),
    /// `global.get x`
    GlobalGet(u32),
    /// `global.set x`
    GlobalSet(u32),

    /// `table.get x`
    TableGet(u32),
    /// `table.set x`
    TableSet(u32),
    /// `table.size x`
    TableSize(u32),
    /// `table.grow x`
    TableGrow(u32),
    /// `table.fill x`
    TableFill(u32),
    /// `table.copy dst src`
    TableCopy {
        /// Destination table
        dst: u32,
        /// Source table
        src: u32,
    },
    /// `table.init table elem`
    TableInit {
        /// Destination table
        table: u32,
        /// Source element segment
        elem:  u32,
    },
    /// `elem.drop x`
    ElemDrop(u32),

    /// Memory loads
    Load(LoadOp, MemArg),
    /// Memory stores
    Store(StoreOp, MemArg),
    /// `memory.size`
    MemorySize(u32),
    /// `memory.grow`
    MemoryGrow(u32),
    /// `memory.init data mem`
    MemoryInit {
        /// Source data segment
        data:   u32,
        /// Destination memory
        memory: u32,
    },
    /// `data.drop x`
    DataDrop(u32),
    /// `memory.copy dst src`
    MemoryCopy {
        /// Destination memory
        dst: u32,
        /// Source memory
        src: u32,
    },
    /// `memory.fill`
    MemoryFill(u32),

    /// `i32.const`
    I32Const(i32),
    /// `i64.const`
    I64Const(i64),
    /// `f32.const`
    F32Const(FloatBits32),
    /// `f64.const`
    F64Const(FloatBits64),
    /// Numeric operators without immediates
    Numeric(NumericOp),
}

impl Instruction {
    /// Binary opcode, used as the key of the cost table.
    #[must_use]
    pub fn opcode(&self) -> u16 {
        match self {
            Instruction::Unreachable => 0x00,
            Instruction::Nop => 0x01,
            Instruction::Block(_) => 0x02,
            Instruction::Loop(_) => 0x03,
            Instruction::If(_) => 0x04,
            Instruction::Else => 0x05,
            Instruction::End => 0x0b,
            Instruction::Br(_) => 0x0c,
            Instruction::BrIf(_) => 0x0d,
            Instruction::BrTable(..) => 0x0e,
            Instruction::Return => 0x0f,
            Instruction::Call(_) => 0x10,
            Instruction::CallIndirect { .. } => 0x11,
            Instruction::Drop => 0x1a,
            Instruction::Select => 0x1b,
            Instruction::SelectTyped(_) => 0x1c,
            Instruction::LocalGet(_) => 0x20,
            Instruction::LocalSet(_) => 0x21,
            Instruction::LocalTee(_) => 0x22,
            Instruction::GlobalGet(_) => 0x23,
            Instruction::GlobalSet(_) => 0x24,
            Instruction::TableGet(_) => 0x25,
            Instruction::TableSet(_) => 0x26,
            Instruction::Load(op, _) => op.opcode(),
            Instruction::Store(op, _) => op.opcode(),
            Instruction::MemorySize(_) => 0x3f,
            Instruction::MemoryGrow(_) => 0x40,
            Instruction::I32Const(_) => 0x41,
            Instruction::I64Const(_) => 0x42,
            Instruction::F32Const(_) => 0x43,
            Instruction::F64Const(_) => 0x44,
            Instruction::Numeric(op) => op.opcode(),
            Instruction::RefNull(_) => 0xd0,
            Instruction::RefIsNull => 0xd1,
            Instruction::RefFunc(_) => 0xd2,
            Instruction::MemoryInit { .. } => 0xfc08,
            Instruction::DataDrop(_) => 0xfc09,
            Instruction::MemoryCopy { .. } => 0xfc0a,
            Instruction::MemoryFill(_) => 0xfc0b,
            Instruction::TableInit { .. } => 0xfc0c,
            Instruction::ElemDrop(_) => 0xfc0d,
            Instruction::TableCopy { .. } => 0xfc0e,
            Instruction::TableGrow(_) => 0xfc0f,
            Instruction::TableSize(_) => 0xfc10,
            Instruction::TableFill(_) => 0xfc11,
        }
    }

    /// Text-format name, used in trap diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Unreachable => "unreachable",
            Instruction::Nop => "nop",
            Instruction::Block(_) => "block",
            Instruction::Loop(_) => "loop",
            Instruction::If(_) => "if",
            Instruction::Else => "else",
            Instruction::End => "end",
            Instruction::Br(_) => "br",
            Instruction::BrIf(_) => "br_if",
            Instruction::BrTable(..) => "br_table",
            Instruction::Return => "return",
            Instruction::Call(_) => "call",
            Instruction::CallIndirect { .. } => "call_indirect",
            Instruction::RefNull(_) => "ref.null",
            Instruction::RefIsNull => "ref.is_null",
            Instruction::RefFunc(_) => "ref.func",
            Instruction::Drop => "drop",
            Instruction::Select | Instruction::SelectTyped(_) => "select",
            Instruction::LocalGet(_) => "local.get",
            Instruction::LocalSet(_) => "local.set",
            Instruction::LocalTee(_) => "local.tee",
            Instruction::GlobalGet(_) => "global.get",
            Instruction::GlobalSet(_) => "global.set",
            Instruction::TableGet(_) => "table.get",
            Instruction::TableSet(_) => "table.set",
            Instruction::TableSize(_) => "table.size",
            Instruction::TableGrow(_) => "table.grow",
            Instruction::TableFill(_) => "table.fill",
            Instruction::TableCopy { .. } => "table.copy",
            Instruction::TableInit { .. } => "table.init",
            Instruction::ElemDrop(_) => "elem.drop",
            Instruction::Load(op, _) => op.name(),
            Instruction::Store(op, _) => op.name(),
            Instruction::MemorySize(_) => "memory.size",
            Instruction::MemoryGrow(_) => "memory.grow",
            Instruction::MemoryInit { .. } => "memory.init",
            Instruction::DataDrop(_) => "data.drop",
            Instruction::MemoryCopy { .. } => "memory.copy",
            Instruction::MemoryFill(_) => "memory.fill",
            Instruction::I32Const(_) => "i32.const",
            Instruction::I64Const(_) => "i64.const",
            Instruction::F32Const(_) => "f32.const",
            Instruction::F64Const(_) => "f64.const",
            Instruction::Numeric(op) => op.name(),
        }
    }

    /// Proposal this instruction needs, `None` for MVP instructions.
    #[must_use]
    pub fn proposal(&self) -> Option<Proposal> {
        match self {
            Instruction::Block(BlockType::FuncType(_))
            | Instruction::Loop(BlockType::FuncType(_))
            | Instruction::If(BlockType::FuncType(_)) => Some(Proposal::MultiValue),
            Instruction::MemoryInit { .. }
            | Instruction::DataDrop(_)
            | Instruction::MemoryCopy { .. }
            | Instruction::MemoryFill(_)
            | Instruction::TableInit { .. }
            | Instruction::ElemDrop(_)
            | Instruction::TableCopy { .. } => Some(Proposal::BulkMemory),
            Instruction::RefNull(_)
            | Instruction::RefIsNull
            | Instruction::RefFunc(_)
            | Instruction::SelectTyped(_)
            | Instruction::TableGet(_)
            | Instruction::TableSet(_)
            | Instruction::TableSize(_)
            | Instruction::TableGrow(_)
            | Instruction::TableFill(_) => Some(Proposal::ReferenceTypes),
            Instruction::Numeric(op) => op.proposal(),
            _ => None,
        }
    }

    /// Shorthand for `f32.const`.
    #[must_use]
    pub fn f32_const(v: f32) -> Self {
        Instruction::F32Const(FloatBits32::from_float(v))
    }

    /// Shorthand for `f64.const`.
    #[must_use]
    pub fn f64_const(v: f64) -> Self {
        Instruction::F64Const(FloatBits64::from_float(v))
    }
}

impl From<NumericOp> for Instruction {
    fn from(op: NumericOp) -> Self {
        Instruction::Numeric(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_and_names() {
        assert_eq!(Instruction::Numeric(NumericOp::I32Add).opcode(), 0x6a);
        assert_eq!(Instruction::from(NumericOp::I64TruncSatF64U).opcode(), 0xfc07);
        assert_eq!(Instruction::Load(LoadOp::I64Load32U, MemArg::default()).name(), "i64.load32_u");
        assert_eq!(Instruction::TableFill(0).opcode(), 0xfc11);
        assert_eq!(Instruction::CallIndirect { type_idx: 0, table_idx: 0 }.name(), "call_indirect");
    }

    #[test]
    fn test_widths() {
        assert_eq!(LoadOp::I64Load16S.width(), 2);
        assert_eq!(LoadOp::F64Load.width(), 8);
        assert_eq!(StoreOp::I64Store32.width(), 4);
    }

    #[test]
    fn test_proposals() {
        assert_eq!(Instruction::from(NumericOp::I32Extend8S).proposal(), Some(Proposal::SignExtension));
        assert_eq!(Instruction::MemoryFill(0).proposal(), Some(Proposal::BulkMemory));
        assert_eq!(Instruction::RefFunc(0).proposal(), Some(Proposal::ReferenceTypes));
        assert_eq!(Instruction::Block(BlockType::FuncType(1)).proposal(), Some(Proposal::MultiValue));
        assert_eq!(Instruction::from(NumericOp::I32Add).proposal(), None);
    }
}

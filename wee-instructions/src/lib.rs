// WEE - wee-instructions
// Module: WebAssembly Instruction Set
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! WebAssembly instruction set for the wee interpreter.
//!
//! # Architecture
//!
//! - `instruction`: the [`Instruction`] enum consumed by the interpreter,
//!   with numeric, load and store opcodes factored into [`NumericOp`],
//!   [`LoadOp`] and [`StoreOp`]
//! - `control`: [`ControlMap`], the per-body table of `else`/`end` positions
//! - `const_expr`: constant expressions used by global initialisers and
//!   segment offsets
//! - `proposal`: the post-MVP proposals an instruction depends on

#![warn(missing_docs)]

pub mod const_expr;
pub mod control;
pub mod instruction;
pub mod proposal;

pub use const_expr::{ConstContext, ConstExpr, ConstInstr};
pub use control::ControlMap;
pub use instruction::{BlockType, Instruction, LoadOp, MemArg, NumericOp, StoreOp};
pub use proposal::Proposal;
pub use wee_error::{Error, Result};

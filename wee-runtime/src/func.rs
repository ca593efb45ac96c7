// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Function instances.
//!
//! A [`FunctionInstance`] is exactly one of three shapes: interpreted Wasm
//! code, a symbol of a natively compiled image, or a host function. The
//! executor matches on it once per call.

use std::sync::Arc;

use wee_error::Result;
use wee_foundation::{FuncType, ModuleAddr, ValueType};
use wee_instructions::{ControlMap, Instruction};

use crate::{
    compiled::{Executable, SymbolIndex},
    host::HostFunc,
};

/// Body of an interpreted function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCode {
    /// Declared locals beyond the parameters, one entry per local
    pub locals:  Vec<ValueType>,
    /// Instructions, terminated by the function-level `end`
    pub instrs:  Vec<Instruction>,
    /// Jump targets of the structured instructions in `instrs`
    pub control: ControlMap,
}

impl FunctionCode {
    /// Build a body and its control table.
    ///
    /// # Errors
    ///
    /// Returns [`wee_error::Error::MALFORMED_BODY`] if `instrs` is not a well
    /// nested body ending in `end`.
    pub fn new(locals: Vec<ValueType>, instrs: Vec<Instruction>) -> Result<Self> {
        let control = ControlMap::build(&instrs)?;
        Ok(Self { locals, instrs, control })
    }
}

/// A function instance owned by the store.
#[derive(Clone)]
pub enum FunctionInstance {
    /// Interpreted WebAssembly function
    Wasm {
        /// Defining module, against which the body resolves its indices
        module: ModuleAddr,
        /// Function type
        ty:     FuncType,
        /// Body
        code:   Arc<FunctionCode>,
    },
    /// Function compiled ahead of time into a native image
    Compiled {
        /// Defining module
        module: ModuleAddr,
        /// Function type
        ty:     FuncType,
        /// Symbol inside `image`
        symbol: SymbolIndex,
        /// The loaded native image
        image:  Arc<dyn Executable>,
    },
    /// Function implemented by the embedder
    Host(HostFunc),
}

impl FunctionInstance {
    /// Interpreted function defined by `module`.
    ///
    /// # Errors
    ///
    /// Returns [`wee_error::Error::MALFORMED_BODY`] for a malformed body.
    pub fn wasm(
        module: ModuleAddr,
        ty: FuncType,
        locals: Vec<ValueType>,
        instrs: Vec<Instruction>,
    ) -> Result<Self> {
        Ok(Self::Wasm { module, ty, code: Arc::new(FunctionCode::new(locals, instrs)?) })
    }

    /// Function type
    #[must_use]
    pub fn func_type(&self) -> &FuncType {
        match self {
            Self::Wasm { ty, .. } | Self::Compiled { ty, .. } => ty,
            Self::Host(host) => &host.ty,
        }
    }

    /// Defining module; host functions have none.
    #[must_use]
    pub fn module(&self) -> Option<ModuleAddr> {
        match self {
            Self::Wasm { module, .. } | Self::Compiled { module, .. } => Some(*module),
            Self::Host(_) => None,
        }
    }

    /// Whether this is an interpreted function
    #[must_use]
    pub fn is_wasm(&self) -> bool {
        matches!(self, Self::Wasm { .. })
    }

    /// Whether this is a compiled function
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        matches!(self, Self::Compiled { .. })
    }

    /// Whether this is a host function
    #[must_use]
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }
}

impl core::fmt::Debug for FunctionInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Wasm { module, ty, code } => f
                .debug_struct("Wasm")
                .field("module", module)
                .field("ty", ty)
                .field("instrs", &code.instrs.len())
                .finish(),
            Self::Compiled { module, ty, symbol, .. } => f
                .debug_struct("Compiled")
                .field("module", module)
                .field("ty", ty)
                .field("symbol", symbol)
                .finish_non_exhaustive(),
            Self::Host(host) => host.fmt(f),
        }
    }
}

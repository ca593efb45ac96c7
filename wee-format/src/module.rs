// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly module format.

use wee_foundation::{ExternKind, FuncType, GlobalType, MemoryType, TableType, ValueType};
use wee_instructions::{ConstExpr, Instruction};

/// WebAssembly function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Type index
    pub type_idx: u32,
    /// Declared locals, beyond the parameters
    pub locals:   Vec<ValueType>,
    /// Function body, terminated by the function-level `end`
    pub body:     Vec<Instruction>,
}

/// WebAssembly global definition
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    /// Global type
    pub ty:   GlobalType,
    /// Initialization expression
    pub init: ConstExpr,
}

/// WebAssembly data segment mode
#[derive(Debug, Clone, PartialEq)]
pub enum DataMode {
    /// Passive segment (used with `memory.init`)
    Passive,
    /// Active segment, copied into a memory at instantiation
    Active {
        /// Memory index
        memory: u32,
        /// Offset expression
        offset: ConstExpr,
    },
}

/// WebAssembly data segment
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    /// Data mode (active or passive)
    pub mode:  DataMode,
    /// Initial data
    pub bytes: Vec<u8>,
}

/// Mode for an element segment, determining how it's initialized.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementMode {
    /// Passive segment (used with `table.init`)
    Passive,
    /// Active segment: associated with a table and an offset.
    Active {
        /// Index of the table to initialize.
        table:  u32,
        /// Offset expression
        offset: ConstExpr,
    },
    /// Declarative segment: only forward-declares `ref.func` targets
    Declarative,
}

/// WebAssembly element segment
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Reference type of the items
    pub ty:    ValueType,
    /// One constant expression per item
    pub items: Vec<ConstExpr>,
    /// The mode of the element segment.
    pub mode:  ElementMode,
}

impl Element {
    /// Active funcref segment listing function indices.
    #[must_use]
    pub fn active_funcs(table: u32, offset: ConstExpr, funcs: &[u32]) -> Self {
        Self {
            ty:    ValueType::FuncRef,
            items: funcs.iter().map(|&f| ConstExpr::ref_func(f)).collect(),
            mode:  ElementMode::Active { table, offset },
        }
    }
}

/// WebAssembly export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Export name
    pub name:  String,
    /// Export kind
    pub kind:  ExternKind,
    /// Index in the kind's index space
    pub index: u32,
}

/// WebAssembly import description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDesc {
    /// Function with the given type index
    Func(u32),
    /// Table
    Table(TableType),
    /// Memory
    Memory(MemoryType),
    /// Global
    Global(GlobalType),
}

impl ImportDesc {
    /// Kind of the imported entity
    #[must_use]
    pub const fn kind(&self) -> ExternKind {
        match self {
            ImportDesc::Func(_) => ExternKind::Func,
            ImportDesc::Table(_) => ExternKind::Table,
            ImportDesc::Memory(_) => ExternKind::Memory,
            ImportDesc::Global(_) => ExternKind::Global,
        }
    }
}

/// WebAssembly import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Module name
    pub module: String,
    /// Import name
    pub name:   String,
    /// Import description
    pub desc:   ImportDesc,
}

/// A decoded, validated WebAssembly module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    /// Function types
    pub types:     Vec<FuncType>,
    /// Imports, in declaration order
    pub imports:   Vec<Import>,
    /// Defined functions
    pub functions: Vec<Function>,
    /// Defined tables
    pub tables:    Vec<TableType>,
    /// Defined memories
    pub memories:  Vec<MemoryType>,
    /// Defined globals
    pub globals:   Vec<Global>,
    /// Exports
    pub exports:   Vec<Export>,
    /// Start function index
    pub start:     Option<u32>,
    /// Element segments
    pub elements:  Vec<Element>,
    /// Data segments
    pub data:      Vec<Data>,
}

impl Module {
    /// Create a new empty module
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn imported(&self, kind: ExternKind) -> u32 {
        self.imports.iter().filter(|i| i.desc.kind() == kind).count() as u32
    }

    /// Number of imported functions
    #[must_use]
    pub fn imported_funcs(&self) -> u32 {
        self.imported(ExternKind::Func)
    }

    /// Number of imported tables
    #[must_use]
    pub fn imported_tables(&self) -> u32 {
        self.imported(ExternKind::Table)
    }

    /// Number of imported memories
    #[must_use]
    pub fn imported_memories(&self) -> u32 {
        self.imported(ExternKind::Memory)
    }

    /// Number of imported globals
    #[must_use]
    pub fn imported_globals(&self) -> u32 {
        self.imported(ExternKind::Global)
    }

    /// Add a function type, returning its type index. Identical types are
    /// shared.
    pub fn add_type(&mut self, ty: FuncType) -> u32 {
        if let Some(pos) = self.types.iter().position(|t| *t == ty) {
            return pos as u32;
        }
        self.types.push(ty);
        self.types.len() as u32 - 1
    }

    /// Add an import, returning its index in its kind's index space.
    pub fn add_import(&mut self, module: &str, name: &str, desc: ImportDesc) -> u32 {
        let index = self.imported(desc.kind());
        self.imports.push(Import { module: module.to_owned(), name: name.to_owned(), desc });
        index
    }

    /// Import a function of type `ty`, returning its function index.
    pub fn import_func(&mut self, module: &str, name: &str, ty: FuncType) -> u32 {
        let type_idx = self.add_type(ty);
        self.add_import(module, name, ImportDesc::Func(type_idx))
    }

    /// Define a function, returning its function index.
    pub fn add_function(
        &mut self,
        ty: FuncType,
        locals: Vec<ValueType>,
        body: Vec<Instruction>,
    ) -> u32 {
        let type_idx = self.add_type(ty);
        self.functions.push(Function { type_idx, locals, body });
        self.imported_funcs() + self.functions.len() as u32 - 1
    }

    /// Define a table, returning its table index.
    pub fn add_table(&mut self, ty: TableType) -> u32 {
        self.tables.push(ty);
        self.imported_tables() + self.tables.len() as u32 - 1
    }

    /// Define a memory, returning its memory index.
    pub fn add_memory(&mut self, ty: MemoryType) -> u32 {
        self.memories.push(ty);
        self.imported_memories() + self.memories.len() as u32 - 1
    }

    /// Define a global, returning its global index.
    pub fn add_global(&mut self, ty: GlobalType, init: ConstExpr) -> u32 {
        self.globals.push(Global { ty, init });
        self.imported_globals() + self.globals.len() as u32 - 1
    }

    /// Export entity `index` of `kind` as `name`.
    pub fn add_export(&mut self, name: &str, kind: ExternKind, index: u32) {
        self.exports.push(Export { name: name.to_owned(), kind, index });
    }

    /// Add an element segment, returning its index.
    pub fn add_element(&mut self, element: Element) -> u32 {
        self.elements.push(element);
        self.elements.len() as u32 - 1
    }

    /// Add a data segment, returning its index.
    pub fn add_data(&mut self, data: Data) -> u32 {
        self.data.push(data);
        self.data.len() as u32 - 1
    }

    /// Add an active data segment for memory 0 at a constant offset.
    pub fn add_active_data(&mut self, offset: i32, bytes: &[u8]) -> u32 {
        self.add_data(Data {
            mode:  DataMode::Active { memory: 0, offset: ConstExpr::i32(offset) },
            bytes: bytes.to_vec(),
        })
    }

    /// Set the start function.
    pub fn set_start(&mut self, func_idx: u32) {
        self.start = Some(func_idx);
    }

    /// Type of function `func_idx` (imported or defined).
    #[must_use]
    pub fn func_type(&self, func_idx: u32) -> Option<&FuncType> {
        let imported: Vec<u32> = self
            .imports
            .iter()
            .filter_map(|i| match i.desc {
                ImportDesc::Func(t) => Some(t),
                _ => None,
            })
            .collect();
        let type_idx = match imported.get(func_idx as usize) {
            Some(&t) => t,
            None => self.functions.get(func_idx as usize - imported.len())?.type_idx,
        };
        self.types.get(type_idx as usize)
    }

    /// Export by name
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.name == name)
    }
}

// WEE - wee-format
// Module: Loaded Module Description
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! Module description handed from the loader to the engine.
//!
//! A [`Module`] is the validated, decoded form of a WebAssembly binary:
//! ordered type, import, function, table, memory and global declarations,
//! element and data segments, exports and an optional start function. The
//! engine instantiates it; it never mutates it.
//!
//! The `add_*` helpers build a module programmatically and return the index
//! the new entity occupies in its index space (imports first, then
//! definitions), which is how embedders and tests assemble modules without
//! a binary decoder.

pub mod module;

pub use module::{
    Data, DataMode, Element, ElementMode, Export, Function, Global, Import, ImportDesc, Module,
};

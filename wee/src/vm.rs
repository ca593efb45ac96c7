// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The embedder-facing virtual machine.
//!
//! A [`Vm`] walks one module at a time through the stages
//! `load` → `instantiate` → `execute`, while any number of named modules
//! can be registered next to it for the active module to import from.

use log::debug;
use wee_error::{Error, Result};
use wee_format::Module;
use wee_foundation::{FuncType, MemAddr, ModuleAddr, Value};
use wee_host::HostModule;
use wee_logging::LogEnv;
use wee_runtime::{Configure, Executor, ExternVal, InterruptHandle, Statistics, Store};

/// Workflow stage of a [`Vm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmStage {
    /// Nothing loaded
    Inited,
    /// A module is loaded but not instantiated
    Loaded,
    /// The loaded module is instantiated and can be executed
    Instantiated,
}

/// WebAssembly virtual machine
#[derive(Debug)]
pub struct Vm {
    store:    Store,
    executor: Executor,
    log_env:  LogEnv,
    stage:    VmStage,
    loaded:   Option<Module>,
    active:   Option<ModuleAddr>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(Configure::default())
    }
}

impl Vm {
    /// VM with an empty store running under `config`.
    ///
    /// Logging goes through a default [`LogEnv`] with instance id 0; use
    /// [`Self::with_log_env`] to tell several VMs apart.
    #[must_use]
    pub fn new(config: Configure) -> Self {
        let log_env = LogEnv::default();
        log_env.debug(format_args!("created vm, max call depth {}", config.max_call_depth()));
        Self {
            store: Store::new(),
            executor: Executor::new(config),
            log_env,
            stage: VmStage::Inited,
            loaded: None,
            active: None,
        }
    }

    /// Replace the logging environment.
    #[must_use]
    pub fn with_log_env(mut self, log_env: LogEnv) -> Self {
        self.log_env = log_env;
        self
    }

    /// Current workflow stage
    #[must_use]
    pub fn stage(&self) -> VmStage {
        self.stage
    }

    /// Configuration the VM runs under
    #[must_use]
    pub fn configure(&self) -> &Configure {
        self.executor.config()
    }

    /// Logging environment
    #[must_use]
    pub fn log_env(&self) -> &LogEnv {
        &self.log_env
    }

    /// The store
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable store
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Statistics of all executions since creation or the last cleanup
    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        self.executor.statistics()
    }

    /// Write the statistics through the VM's logging environment.
    pub fn dump_statistics(&self) {
        self.executor.statistics().dump_to_log(&self.log_env);
    }

    /// Register a host module under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NAME_CONFLICT`] if the name is taken.
    pub fn register_host_module(&mut self, module: HostModule) -> Result<ModuleAddr> {
        let name = module.name().to_owned();
        let addr = module.register(&mut self.store)?;
        self.log_env.debug(format_args!("registered host module {name}"));
        Ok(addr)
    }

    /// Instantiate `module` and register it as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NAME_CONFLICT`] if the name is taken and any
    /// instantiation error.
    pub fn register_module(&mut self, name: &str, module: &Module) -> Result<ModuleAddr> {
        let addr = self.executor.instantiate(&mut self.store, module, Some(name))?;
        self.log_env.debug(format_args!("registered module {name} as {addr}"));
        Ok(addr)
    }

    /// Load `module` as the active module, replacing any previous one.
    pub fn load(&mut self, module: Module) {
        self.loaded = Some(module);
        self.active = None;
        self.stage = VmStage::Loaded;
    }

    /// Instantiate the loaded module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_VM_WORKFLOW`] if nothing is loaded and any
    /// instantiation error, after which the module stays loaded.
    pub fn instantiate(&mut self) -> Result<ModuleAddr> {
        if self.stage == VmStage::Inited {
            return Err(Error::WRONG_VM_WORKFLOW);
        }
        let module = self.loaded.as_ref().ok_or(Error::WRONG_VM_WORKFLOW)?;
        let addr = self.executor.instantiate(&mut self.store, module, None)?;
        self.log_env.debug(format_args!("instantiated active module as {addr}"));
        self.active = Some(addr);
        self.stage = VmStage::Instantiated;
        Ok(addr)
    }

    /// Load, instantiate and execute `func` of `module` in one go.
    ///
    /// # Errors
    ///
    /// Returns any error of the three steps.
    pub fn run(&mut self, module: Module, func: &str, args: &[Value]) -> Result<Vec<Value>> {
        self.load(module);
        self.instantiate()?;
        self.execute(func, args)
    }

    /// Execute the function the active module exports as `func`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_VM_WORKFLOW`] before instantiation and
    /// otherwise behaves as [`Self::invoke`].
    pub fn execute(&mut self, func: &str, args: &[Value]) -> Result<Vec<Value>> {
        if self.stage != VmStage::Instantiated {
            return Err(Error::WRONG_VM_WORKFLOW);
        }
        let module = self.active.ok_or(Error::WRONG_VM_WORKFLOW)?;
        self.invoke(module, func, args)
    }

    /// Execute the function the registered module `module` exports as `func`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MODULE_NOT_FOUND`] for an unknown module name and
    /// otherwise behaves as [`Self::invoke`].
    pub fn execute_registered(&mut self, module: &str, func: &str, args: &[Value]) -> Result<Vec<Value>> {
        let addr = self.store.find_module(module)?;
        self.invoke(addr, func, args)
    }

    /// Invoke the function `module` exports as `name`.
    ///
    /// Arguments are checked against the function's parameters before
    /// anything runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FUNC_NOT_FOUND`] if there is no such export,
    /// [`Error::FUNC_SIG_MISMATCH`] if `args` do not match, and any trap
    /// raised while running.
    pub fn invoke(&mut self, module: ModuleAddr, name: &str, args: &[Value]) -> Result<Vec<Value>> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("execute", module = %module, func = name).entered();

        let func = self.store.get_module(module)?.find_func_export(name).ok_or(Error::FUNC_NOT_FOUND)?;
        debug!("invoking {name} ({func}) of {module}");
        let outcome = self.executor.invoke(&mut self.store, func, args);
        if let Err(err) = &outcome {
            self.log_env.warn(format_args!("execution of {name} failed: {err}"));
        }
        outcome
    }

    /// Exported functions of the active module with their types, sorted by
    /// name.
    #[must_use]
    pub fn function_list(&self) -> Vec<(String, FuncType)> {
        let Some(module) = self.active.and_then(|addr| self.store.get_module(addr).ok()) else {
            return Vec::new();
        };
        let mut list: Vec<_> = module
            .exports()
            .filter_map(|(name, value)| {
                let ExternVal::Func(func) = value else { return None };
                let ty = self.store.get_func(func).ok()?.func_type().clone();
                Some((name.to_owned(), ty))
            })
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    /// Address of the active module instance, once instantiated
    #[must_use]
    pub fn active_module(&self) -> Option<ModuleAddr> {
        self.active
    }

    /// Address of the memory `module` exports as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WRONG_INSTANCE_ADDRESS`] for an unknown module and
    /// [`Error::MODULE_NOT_FOUND`] if there is no such memory export.
    pub fn memory_by_export(&self, module: ModuleAddr, name: &str) -> Result<MemAddr> {
        self.store.get_module(module)?.find_memory_export(name).ok_or(Error::MODULE_NOT_FOUND)
    }

    /// Copy `len` bytes at `offset` out of memory `mem`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range is not inside the
    /// memory.
    pub fn get_data(&self, mem: MemAddr, offset: u32, len: u32) -> Result<Vec<u8>> {
        let bytes = self.store.get_memory(mem)?.get_bytes(offset as usize, len as usize)?;
        Ok(bytes.to_vec())
    }

    /// Write `bytes` at `offset` into memory `mem`; nothing is written if
    /// the range is out of bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MEMORY_OUT_OF_BOUNDS`] if the range is not inside the
    /// memory.
    pub fn set_data(&mut self, mem: MemAddr, offset: u32, bytes: &[u8]) -> Result<()> {
        self.store.get_memory_mut(mem)?.set_bytes(offset as usize, bytes)
    }

    /// Ask a running execution to stop.
    ///
    /// Takes effect only when the VM is configured as interruptible. To stop
    /// an execution from another thread, hand that thread an
    /// [`Self::interrupt_handle`] first.
    pub fn stop(&self) {
        self.executor.interrupt_handle().interrupt();
    }

    /// Handle that stops a running execution from any thread
    #[must_use]
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.executor.interrupt_handle()
    }

    /// Drop the loaded and active module and reset the statistics.
    ///
    /// Registered modules stay registered.
    pub fn cleanup(&mut self) {
        self.loaded = None;
        self.active = None;
        self.stage = VmStage::Inited;
        self.executor.statistics_mut().clear();
        self.log_env.debug(format_args!("cleaned up vm"));
    }
}

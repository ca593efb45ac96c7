//! Host modules built with the builder and imported by Wasm modules.

use wee_error::{Error, Result};
use wee_foundation::{ExternKind, FuncType, GlobalType, MemoryType, TableType, Value, ValueType};
use wee_format::{Element, ImportDesc, Module};
use wee_host::HostModuleBuilder;
use wee_instructions::{ConstExpr, Instruction, LoadOp, MemArg};
use wee_runtime::{Executor, HostCallFrame, Store};

fn unary() -> FuncType {
    FuncType::new([ValueType::I32], [ValueType::I32])
}

fn double_env() -> Result<wee_host::HostModule> {
    HostModuleBuilder::new("env")
        .func("double", unary(), |_: HostCallFrame<'_>, args: &[Value]| {
            let v = args.first().and_then(Value::as_i32).ok_or(Error::TYPE_NOT_MATCH)?;
            Ok(vec![Value::I32(v.wrapping_mul(2))])
        })
        .build()
}

#[test]
fn test_import_host_function() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = Store::new();
    double_env()?.register(&mut store)?;

    let mut module = Module::new();
    let imported = module.import_func("env", "double", unary());
    let wrapper = module.add_function(unary(), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Call(imported),
        Instruction::End,
    ]);
    module.add_export("call_env_double", ExternKind::Func, wrapper);

    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    let results = executor.invoke_export(&mut store, instance, "call_env_double", &[Value::I32(21)])?;
    assert_eq!(results, vec![Value::I32(42)]);

    // The host function is also directly invocable.
    let env = store.find_module("env")?;
    assert_eq!(executor.invoke_export(&mut store, env, "double", &[Value::I32(-4)])?, vec![Value::I32(-8)]);
    Ok(())
}

#[test]
fn test_register_twice_is_rejected() -> Result<()> {
    let mut store = Store::new();
    double_env()?.register(&mut store)?;
    let funcs = store.func_count();

    assert_eq!(double_env()?.register(&mut store), Err(Error::MODULE_NAME_CONFLICT));
    assert_eq!(store.func_count(), funcs);
    Ok(())
}

#[test]
fn test_mismatched_import_type() -> Result<()> {
    let mut store = Store::new();
    double_env()?.register(&mut store)?;

    let mut module = Module::new();
    module.import_func("env", "double", FuncType::new([ValueType::I64], [ValueType::I64]));
    let mut executor = Executor::default();
    assert_eq!(executor.instantiate(&mut store, &module, None), Err(Error::INCOMPATIBLE_IMPORT_TYPE));

    let mut missing = Module::new();
    missing.import_func("env", "triple", unary());
    assert_eq!(executor.instantiate(&mut store, &missing, None), Err(Error::UNKNOWN_IMPORT));
    Ok(())
}

#[test]
fn test_host_reads_shared_memory() -> Result<()> {
    let mut store = Store::new();
    HostModuleBuilder::new("env")
        .memory("memory", MemoryType::new(1, Some(4)))
        .func(
            "sum_bytes",
            FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]),
            |mut frame: HostCallFrame<'_>, args: &[Value]| {
                let ptr = args.first().and_then(Value::as_i32).ok_or(Error::TYPE_NOT_MATCH)?;
                let len = args.get(1).and_then(Value::as_i32).ok_or(Error::TYPE_NOT_MATCH)?;
                let memory = frame.memory().ok_or(Error::MEMORY_OUT_OF_BOUNDS)?;
                let bytes = memory.get_bytes(ptr as u32 as usize, len as u32 as usize)?;
                Ok(vec![Value::I32(bytes.iter().map(|&b| i32::from(b)).sum())])
            },
        )
        .build()?
        .register(&mut store)?;

    let mut module = Module::new();
    module.add_import("env", "memory", ImportDesc::Memory(MemoryType::new(1, None)));
    let sum = module.import_func("env", "sum_bytes", FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]));
    module.add_active_data(8, &[1, 2, 3, 4]);
    let run = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(8),
        Instruction::I32Const(4),
        Instruction::Call(sum),
        Instruction::End,
    ]);
    module.add_export("run", ExternKind::Func, run);

    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "run", &[])?, vec![Value::I32(10)]);

    // The data segment landed in the host's memory.
    let env = store.find_module("env")?;
    let mem = store.get_module(env)?.find_memory_export("memory").ok_or(Error::MODULE_NOT_FOUND)?;
    assert_eq!(store.get_memory(mem)?.get_bytes(8, 4)?, &[1, 2, 3, 4]);

    // Out-of-range reads surface as traps of the invocation.
    let mut probe = Module::new();
    probe.add_import("env", "memory", ImportDesc::Memory(MemoryType::new(1, None)));
    let sum = probe.import_func("env", "sum_bytes", FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]));
    let run = probe.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(65_534),
        Instruction::I32Const(4),
        Instruction::Call(sum),
        Instruction::End,
    ]);
    probe.add_export("run", ExternKind::Func, run);
    let probe = executor.instantiate(&mut store, &probe, None)?;
    assert_eq!(executor.invoke_export(&mut store, probe, "run", &[]), Err(Error::MEMORY_OUT_OF_BOUNDS));
    Ok(())
}

#[test]
fn test_import_host_globals() -> Result<()> {
    let mut store = Store::new();
    HostModuleBuilder::new("env")
        .global("base", GlobalType::new(ValueType::I32, false), Value::I32(1024))
        .global("counter", GlobalType::new(ValueType::I64, true), Value::I64(0))
        .build()?
        .register(&mut store)?;

    let mut module = Module::new();
    module.add_import("env", "base", ImportDesc::Global(GlobalType::new(ValueType::I32, false)));
    module.add_import("env", "counter", ImportDesc::Global(GlobalType::new(ValueType::I64, true)));
    module.add_memory(MemoryType::new(1, None));
    let bump = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::GlobalGet(1),
        Instruction::I64Const(5),
        Instruction::Numeric(wee_instructions::NumericOp::I64Add),
        Instruction::GlobalSet(1),
        Instruction::GlobalGet(0),
        Instruction::Load(LoadOp::I32Load, MemArg::new(0, 2)),
        Instruction::End,
    ]);
    module.add_export("bump", ExternKind::Func, bump);

    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "bump", &[])?, vec![Value::I32(0)]);
    executor.invoke_export(&mut store, instance, "bump", &[])?;

    let env = store.find_module("env")?;
    let counter = store.get_module(env)?.find_global_export("counter").ok_or(Error::MODULE_NOT_FOUND)?;
    assert_eq!(store.get_global(counter)?.get(), Value::I64(10));

    // Mutability is part of the global's type.
    let mut wrong = Module::new();
    wrong.add_import("env", "base", ImportDesc::Global(GlobalType::new(ValueType::I32, true)));
    assert_eq!(executor.instantiate(&mut store, &wrong, None), Err(Error::INCOMPATIBLE_IMPORT_TYPE));
    Ok(())
}

#[test]
fn test_import_host_table() -> Result<()> {
    let mut store = Store::new();
    HostModuleBuilder::new("env")
        .table("table", TableType::new(ValueType::FuncRef, 2, Some(8)))
        .build()?
        .register(&mut store)?;

    let mut module = Module::new();
    module.add_import("env", "table", ImportDesc::Table(TableType::new(ValueType::FuncRef, 2, None)));
    let answer = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(42),
        Instruction::End,
    ]);
    let nullary = module.add_type(FuncType::new([], [ValueType::I32]));
    let dispatch = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::CallIndirect { type_idx: nullary, table_idx: 0 },
        Instruction::End,
    ]);
    module.add_element(Element::active_funcs(0, ConstExpr::i32(1), &[answer]));
    module.add_export("dispatch", ExternKind::Func, dispatch);

    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "dispatch", &[Value::I32(1)])?, vec![Value::I32(42)]);
    assert_eq!(
        executor.invoke_export(&mut store, instance, "dispatch", &[Value::I32(0)]),
        Err(Error::UNINITIALIZED_ELEMENT)
    );
    Ok(())
}

//! Reference scenarios for the execution core.
//!
//! Each test exercises one end-to-end situation the engine must get right:
//! memory growth at the declared maximum, little-endian narrow loads, frame
//! exit arity, a failing indirect call, a host import and independent stores
//! on separate threads.

use wee_error::{Error, Result};
use wee_foundation::{ExternKind, FuncType, MemoryType, ModuleAddr, TableType, Value, ValueType};
use wee_format::{Element, Module};
use wee_instructions::{ConstExpr, Instruction, NumericOp};
use wee_runtime::{
    Executor, ExternVal, FunctionInstance, HostCallFrame, HostFunc, MemoryInstance, ModuleInstance,
    StackManager, Store,
};

#[test]
fn test_scenario_grow_to_declared_max() -> Result<()> {
    let mut memory = MemoryInstance::new(MemoryType::new(1, Some(2)))?;
    memory.grow_page(1)?;
    assert_eq!(memory.page_count(), 2);
    assert_eq!(memory.grow_page(1), Err(Error::MEMORY_SIZE_EXCEEDED));
    assert_eq!(memory.page_count(), 2);
    Ok(())
}

#[test]
fn test_scenario_narrow_little_endian_loads() -> Result<()> {
    let mut memory = MemoryInstance::new(MemoryType::new(1, None))?;
    memory.store_value::<u32>(0, 4, 0xDEAD_BEEF)?;
    assert_eq!(memory.load_value::<u32>(0, 2)?, 0xBEEF);
    assert_eq!(memory.load_value::<u32>(2, 2)?, 0xDEAD);
    Ok(())
}

#[test]
fn test_scenario_frame_exit_keeps_result() -> Result<()> {
    let mut stack = StackManager::new();
    stack.push_dummy_frame();
    let base = stack.value_depth();

    stack.push(Value::I32(1));
    stack.push(Value::I32(2));
    stack.push_frame(ModuleAddr::new(0), 2, 1)?;
    stack.push(Value::I64(99));
    stack.pop_frame()?;

    assert_eq!(&stack.values()[base..], &[Value::I64(99)]);
    assert_eq!(stack.frame_depth(), 1);
    Ok(())
}

#[test]
fn test_scenario_call_indirect_type_mismatch() -> Result<()> {
    let mut module = Module::new();
    let nullary = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(7),
        Instruction::End,
    ]);
    let unary = module.add_type(FuncType::new([ValueType::I32], [ValueType::I32]));
    let caller = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(5),
        Instruction::I32Const(0),
        Instruction::CallIndirect { type_idx: unary, table_idx: 0 },
        Instruction::End,
    ]);
    module.add_table(TableType::new(ValueType::FuncRef, 1, None));
    module.add_element(Element::active_funcs(0, ConstExpr::i32(0), &[nullary]));
    module.add_export("caller", ExternKind::Func, caller);

    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    let before = executor.stack().frame_depth();

    let outcome = executor.invoke_export(&mut store, instance, "caller", &[]);
    assert_eq!(outcome, Err(Error::INDIRECT_CALL_TYPE_MISMATCH));
    assert_eq!(executor.stack().frame_depth(), before);
    assert_eq!(executor.stack().value_depth(), 0);
    Ok(())
}

#[test]
fn test_scenario_host_import_doubles() -> Result<()> {
    let unary = FuncType::new([ValueType::I32], [ValueType::I32]);
    let mut store = Store::new();

    let double = store.insert_func(FunctionInstance::Host(HostFunc::new(
        unary.clone(),
        |_: HostCallFrame<'_>, args: &[Value]| {
            let v = args.first().and_then(Value::as_i32).ok_or(Error::TYPE_NOT_MATCH)?;
            Ok(vec![Value::I32(v.wrapping_mul(2))])
        },
    )));
    let mut env = ModuleInstance::new(Some("env"));
    env.add_func_addr(double);
    env.add_export("double", ExternVal::Func(double));
    let env = store.insert_module(env);
    store.register_module("env", env)?;

    let mut module = Module::new();
    let imported = module.import_func("env", "double", unary.clone());
    let wrapper = module.add_function(unary, vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Call(imported),
        Instruction::End,
    ]);
    module.add_export("call_env_double", ExternKind::Func, wrapper);

    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    let results = executor.invoke_export(&mut store, instance, "call_env_double", &[Value::I32(21)])?;
    assert_eq!(results, vec![Value::I32(42)]);
    Ok(())
}

fn grow_until_full(max: u32) -> Result<(u32, usize)> {
    let mut module = Module::new();
    module.add_memory(MemoryType::new(0, Some(max)));
    let grow = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(1),
        Instruction::MemoryGrow(0),
        Instruction::End,
    ]);
    module.add_export("grow", ExternKind::Func, grow);
    module.add_export("memory", ExternKind::Memory, 0);

    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    loop {
        let result = executor.invoke_export(&mut store, instance, "grow", &[])?;
        if result == vec![Value::I32(-1)] {
            break;
        }
    }
    let mem = store.get_module(instance)?.find_memory_export("memory").ok_or(Error::MODULE_NOT_FOUND)?;
    let memory = store.get_memory(mem)?;
    Ok((memory.page_count(), memory.data_size()))
}

#[test]
fn test_scenario_independent_stores_on_threads() -> Result<()> {
    let (small, large) = std::thread::scope(|scope| {
        let small = scope.spawn(|| grow_until_full(3));
        let large = scope.spawn(|| grow_until_full(17));
        (small.join(), large.join())
    });
    let small = small.map_err(|_| Error::EXECUTION_FAILED)??;
    let large = large.map_err(|_| Error::EXECUTION_FAILED)??;
    assert_eq!(small, (3, 3 * wee_foundation::PAGE_SIZE));
    assert_eq!(large, (17, 17 * wee_foundation::PAGE_SIZE));
    Ok(())
}

#[test]
fn test_every_variant_invocable_through_invoke() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let ty = FuncType::new([ValueType::I32], [ValueType::I32]);
    let mut store = Store::new();
    let module = store.insert_module(ModuleInstance::new(None));
    let wasm = store.insert_func(FunctionInstance::wasm(module, ty.clone(), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Numeric(NumericOp::I32Popcnt),
        Instruction::End,
    ])?);
    let host = store.insert_func(FunctionInstance::Host(HostFunc::new(ty, |_: HostCallFrame<'_>, args: &[Value]| {
        Ok(args.to_vec())
    })));

    let mut executor = Executor::default();
    assert_eq!(executor.invoke(&mut store, wasm, &[Value::I32(0b1011)])?, vec![Value::I32(3)]);
    assert_eq!(executor.invoke(&mut store, host, &[Value::I32(5)])?, vec![Value::I32(5)]);
    Ok(())
}

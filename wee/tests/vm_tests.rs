//! End-to-end tests of the embedder facade.

use wee::{
    BlockType, Configure, Error, ExternKind, FuncType, HostCallFrame, HostModuleBuilder, Instruction, LoadOp,
    LogEnv, LogLevel, MemArg, MemoryType, Module, NumericOp, Result, StoreOp, Value, ValueType, Vm, VmStage,
};

fn binary() -> FuncType {
    FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32])
}

/// Exports `add`, `load(addr)`, `store(addr, value)` and a one-page memory.
fn arith_module() -> Module {
    let mut module = Module::new();
    module.add_memory(MemoryType::new(1, Some(2)));
    let add = module.add_function(binary(), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::LocalGet(1),
        Instruction::Numeric(NumericOp::I32Add),
        Instruction::End,
    ]);
    let load = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Load(LoadOp::I32Load, MemArg::new(0, 2)),
        Instruction::End,
    ]);
    let store = module.add_function(FuncType::new([ValueType::I32, ValueType::I32], []), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::LocalGet(1),
        Instruction::Store(StoreOp::I32Store, MemArg::new(0, 2)),
        Instruction::End,
    ]);
    module.add_export("add", ExternKind::Func, add);
    module.add_export("load", ExternKind::Func, load);
    module.add_export("store", ExternKind::Func, store);
    module.add_export("memory", ExternKind::Memory, 0);
    module
}

#[test]
fn test_load_instantiate_execute() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut vm = Vm::default();
    assert_eq!(vm.execute("add", &[Value::I32(1), Value::I32(2)]), Err(Error::WRONG_VM_WORKFLOW));

    vm.load(arith_module());
    assert_eq!(vm.active_module(), None);
    let active = vm.instantiate()?;
    assert_eq!(vm.stage(), VmStage::Instantiated);
    assert_eq!(vm.active_module(), Some(active));

    assert_eq!(vm.execute("add", &[Value::I32(40), Value::I32(2)])?, vec![Value::I32(42)]);
    assert_eq!(vm.execute("sub", &[]), Err(Error::FUNC_NOT_FOUND));

    let names: Vec<_> = vm.function_list().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["add", "load", "store"]);
    Ok(())
}

#[test]
fn test_run_in_one_step() -> Result<()> {
    let mut vm = Vm::default();
    assert_eq!(vm.run(arith_module(), "add", &[Value::I32(-1), Value::I32(1)])?, vec![Value::I32(0)]);
    Ok(())
}

#[test]
fn test_arguments_are_checked() -> Result<()> {
    let mut vm = Vm::default();
    let module = vm.register_module("arith", &arith_module())?;

    assert_eq!(vm.invoke(module, "add", &[Value::I32(1)]), Err(Error::FUNC_SIG_MISMATCH));
    assert_eq!(vm.invoke(module, "add", &[Value::I32(1), Value::I64(2)]), Err(Error::FUNC_SIG_MISMATCH));
    assert_eq!(vm.invoke(module, "add", &[Value::I32(1), Value::I32(2)])?, vec![Value::I32(3)]);
    Ok(())
}

#[test]
fn test_registered_modules_are_importable() -> Result<()> {
    let mut vm = Vm::default();
    vm.register_module("arith", &arith_module())?;
    assert_eq!(vm.execute_registered("arith", "add", &[Value::I32(3), Value::I32(4)])?, vec![Value::I32(7)]);
    assert_eq!(vm.execute_registered("missing", "add", &[]), Err(Error::MODULE_NOT_FOUND));
    assert_eq!(vm.register_module("arith", &arith_module()), Err(Error::MODULE_NAME_CONFLICT));

    let mut user = Module::new();
    let add = user.import_func("arith", "add", binary());
    let twice = user.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::LocalGet(0),
        Instruction::Call(add),
        Instruction::End,
    ]);
    user.add_export("twice", ExternKind::Func, twice);
    assert_eq!(vm.run(user, "twice", &[Value::I32(21)])?, vec![Value::I32(42)]);
    Ok(())
}

#[test]
fn test_host_module_through_vm() -> Result<()> {
    let mut vm = Vm::default();
    let env = HostModuleBuilder::new("env")
        .func("double", FuncType::new([ValueType::I32], [ValueType::I32]), |_: HostCallFrame<'_>, args: &[Value]| {
            let v = args.first().and_then(Value::as_i32).ok_or(Error::TYPE_NOT_MATCH)?;
            Ok(vec![Value::I32(v.wrapping_mul(2))])
        })
        .build()?;
    vm.register_host_module(env)?;

    let mut module = Module::new();
    let double = module.import_func("env", "double", FuncType::new([ValueType::I32], [ValueType::I32]));
    let wrapper = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Call(double),
        Instruction::End,
    ]);
    module.add_export("call_env_double", ExternKind::Func, wrapper);
    assert_eq!(vm.run(module, "call_env_double", &[Value::I32(21)])?, vec![Value::I32(42)]);
    Ok(())
}

#[test]
fn test_memory_data_access() -> Result<()> {
    let mut vm = Vm::default();
    vm.load(arith_module());
    let active = vm.instantiate()?;
    let memory = vm.memory_by_export(active, "memory")?;
    assert_eq!(vm.memory_by_export(active, "add"), Err(Error::MODULE_NOT_FOUND));

    vm.set_data(memory, 16, &42_i32.to_le_bytes())?;
    assert_eq!(vm.execute("load", &[Value::I32(16)])?, vec![Value::I32(42)]);

    vm.execute("store", &[Value::I32(32), Value::I32(0x0102_0304)])?;
    assert_eq!(vm.get_data(memory, 32, 4)?, vec![4, 3, 2, 1]);

    let tail = 65_536 - 2;
    assert_eq!(vm.get_data(memory, tail, 4), Err(Error::MEMORY_OUT_OF_BOUNDS));
    assert_eq!(vm.set_data(memory, tail, &[9, 9, 9, 9]), Err(Error::MEMORY_OUT_OF_BOUNDS));
    assert_eq!(vm.get_data(memory, tail, 2)?, vec![0, 0]);
    Ok(())
}

#[test]
fn test_interrupt_handle_stops_execution() -> Result<()> {
    let mut vm = Vm::new(Configure::new().with_interruptible(true));
    let handle = vm.interrupt_handle();
    let ctl = HostModuleBuilder::new("ctl")
        .func("halt", FuncType::default(), move |_: HostCallFrame<'_>, _: &[Value]| {
            handle.interrupt();
            Ok(vec![])
        })
        .build()?;
    vm.register_host_module(ctl)?;

    let mut module = Module::new();
    let halt = module.import_func("ctl", "halt", FuncType::default());
    let spin = module.add_function(FuncType::default(), vec![], vec![
        Instruction::Call(halt),
        Instruction::Loop(BlockType::Empty),
        Instruction::Br(0),
        Instruction::End,
        Instruction::End,
    ]);
    let answer = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(42),
        Instruction::End,
    ]);
    module.add_export("spin", ExternKind::Func, spin);
    module.add_export("answer", ExternKind::Func, answer);

    assert_eq!(vm.run(module, "spin", &[]), Err(Error::INTERRUPTED));
    // A stop request is cleared when the next execution starts.
    vm.stop();
    assert_eq!(vm.execute("answer", &[])?, vec![Value::I32(42)]);
    Ok(())
}

#[test]
fn test_statistics_and_cleanup() -> Result<()> {
    let mut vm = Vm::new(Configure::new().with_count_instructions(true).with_measure_cost(true));
    vm.register_module("arith", &arith_module())?;
    vm.load(arith_module());
    vm.instantiate()?;
    vm.execute("add", &[Value::I32(1), Value::I32(1)])?;
    assert_eq!(vm.statistics().instr_count(), 4);
    assert_eq!(vm.statistics().total_cost(), 4);
    vm.dump_statistics();

    vm.cleanup();
    assert_eq!(vm.stage(), VmStage::Inited);
    assert_eq!(vm.active_module(), None);
    assert_eq!(vm.statistics().instr_count(), 0);
    assert_eq!(vm.execute("add", &[Value::I32(1), Value::I32(1)]), Err(Error::WRONG_VM_WORKFLOW));
    assert!(vm.store().is_registered("arith"));
    assert_eq!(vm.execute_registered("arith", "add", &[Value::I32(2), Value::I32(2)])?, vec![Value::I32(4)]);
    Ok(())
}

#[test]
fn test_log_env_belongs_to_its_vm() -> Result<()> {
    let tagged = Vm::default().with_log_env(LogEnv::with_id(9).min_level(LogLevel::Debug));
    let plain = Vm::default();
    assert_eq!(tagged.log_env().instance_id(), 9);
    assert_eq!(tagged.log_env().level(), LogLevel::Debug);
    assert_eq!(plain.log_env(), &LogEnv::default());
    assert_eq!(Vm::default().log_env(), plain.log_env());
    Ok(())
}

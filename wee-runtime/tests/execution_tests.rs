//! Interpreter tests over hand-built modules.

use wee_error::{Error, Result};
use wee_foundation::{ExternKind, FuncType, GlobalType, MemoryType, ModuleAddr, TableType, Value, ValueType};
use wee_format::{Data, DataMode, Element, ImportDesc, Module};
use wee_instructions::{BlockType, ConstExpr, Instruction, LoadOp, MemArg, NumericOp, StoreOp};
use wee_runtime::{Configure, Executor, Store};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run(module: &Module, export: &str, args: &[Value]) -> Result<Vec<Value>> {
    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, module, None)?;
    executor.invoke_export(&mut store, instance, export, args)
}

fn single(module: &Module, export: &str, args: &[Value]) -> Result<Value> {
    run(module, export, args)?.first().copied().ok_or(Error::STACK_EMPTY)
}

fn factorial_module() -> Module {
    let mut module = Module::new();
    let ty = FuncType::new([ValueType::I64], [ValueType::I64]);
    let fac = module.add_function(ty, vec![], vec![
        Instruction::LocalGet(0),
        NumericOp::I64Eqz.into(),
        Instruction::If(BlockType::Value(ValueType::I64)),
        Instruction::I64Const(1),
        Instruction::Else,
        Instruction::LocalGet(0),
        Instruction::LocalGet(0),
        Instruction::I64Const(1),
        NumericOp::I64Sub.into(),
        Instruction::Call(0),
        NumericOp::I64Mul.into(),
        Instruction::End,
        Instruction::End,
    ]);
    module.add_export("fac", ExternKind::Func, fac);
    module
}

#[test]
fn test_recursive_factorial() -> Result<()> {
    init_logging();
    let module = factorial_module();
    assert_eq!(single(&module, "fac", &[Value::I64(0)])?, Value::I64(1));
    assert_eq!(single(&module, "fac", &[Value::I64(20)])?, Value::I64(2_432_902_008_176_640_000));
    Ok(())
}

#[test]
fn test_loop_with_conditional_exit() -> Result<()> {
    let mut module = Module::new();
    let sum = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![ValueType::I32], vec![
        Instruction::Block(BlockType::Empty),
        Instruction::Loop(BlockType::Empty),
        Instruction::LocalGet(0),
        NumericOp::I32Eqz.into(),
        Instruction::BrIf(1),
        Instruction::LocalGet(1),
        Instruction::LocalGet(0),
        NumericOp::I32Add.into(),
        Instruction::LocalSet(1),
        Instruction::LocalGet(0),
        Instruction::I32Const(1),
        NumericOp::I32Sub.into(),
        Instruction::LocalSet(0),
        Instruction::Br(0),
        Instruction::End,
        Instruction::End,
        Instruction::LocalGet(1),
        Instruction::End,
    ]);
    module.add_export("sum", ExternKind::Func, sum);
    assert_eq!(single(&module, "sum", &[Value::I32(100)])?, Value::I32(5050));
    assert_eq!(single(&module, "sum", &[Value::I32(0)])?, Value::I32(0));
    Ok(())
}

#[test]
fn test_br_table_selects_target() -> Result<()> {
    let mut module = Module::new();
    let classify = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::Block(BlockType::Empty),
        Instruction::Block(BlockType::Empty),
        Instruction::Block(BlockType::Empty),
        Instruction::LocalGet(0),
        Instruction::BrTable(vec![0, 1].into_boxed_slice(), 2),
        Instruction::End,
        Instruction::I32Const(100),
        Instruction::Return,
        Instruction::End,
        Instruction::I32Const(200),
        Instruction::Return,
        Instruction::End,
        Instruction::I32Const(300),
        Instruction::End,
    ]);
    module.add_export("classify", ExternKind::Func, classify);
    assert_eq!(single(&module, "classify", &[Value::I32(0)])?, Value::I32(100));
    assert_eq!(single(&module, "classify", &[Value::I32(1)])?, Value::I32(200));
    assert_eq!(single(&module, "classify", &[Value::I32(2)])?, Value::I32(300));
    assert_eq!(single(&module, "classify", &[Value::I32(-1)])?, Value::I32(300));
    Ok(())
}

#[test]
fn test_branch_carries_block_result() -> Result<()> {
    let mut module = Module::new();
    let f = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::Block(BlockType::Value(ValueType::I32)),
        Instruction::I32Const(1),
        Instruction::I32Const(2),
        Instruction::I32Const(42),
        Instruction::Br(0),
        Instruction::End,
        Instruction::End,
    ]);
    module.add_export("f", ExternKind::Func, f);
    assert_eq!(run(&module, "f", &[])?, vec![Value::I32(42)]);
    Ok(())
}

#[test]
fn test_multi_value_block_params() -> Result<()> {
    let mut module = Module::new();
    let pair = module.add_type(FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32, ValueType::I32]));
    let f = module.add_function(FuncType::new([], [ValueType::I32, ValueType::I32]), vec![], vec![
        Instruction::I32Const(3),
        Instruction::I32Const(4),
        Instruction::Block(BlockType::FuncType(pair)),
        NumericOp::I32Mul.into(),
        Instruction::I32Const(5),
        Instruction::End,
        Instruction::End,
    ]);
    module.add_export("f", ExternKind::Func, f);
    assert_eq!(run(&module, "f", &[])?, vec![Value::I32(12), Value::I32(5)]);
    Ok(())
}

#[test]
fn test_globals_and_start_function() -> Result<()> {
    let mut module = Module::new();
    let counter = module.add_global(GlobalType::new(ValueType::I32, true), ConstExpr::i32(10));
    let bump = module.add_function(FuncType::default(), vec![], vec![
        Instruction::GlobalGet(counter),
        Instruction::I32Const(1),
        NumericOp::I32Add.into(),
        Instruction::GlobalSet(counter),
        Instruction::End,
    ]);
    let read = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::GlobalGet(counter),
        Instruction::End,
    ]);
    module.set_start(bump);
    module.add_export("bump", ExternKind::Func, bump);
    module.add_export("read", ExternKind::Func, read);

    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, Some("counter"))?;
    assert_eq!(executor.invoke_export(&mut store, instance, "read", &[])?, vec![Value::I32(11)]);
    executor.invoke_export(&mut store, instance, "bump", &[])?;
    assert_eq!(executor.invoke_export(&mut store, instance, "read", &[])?, vec![Value::I32(12)]);
    Ok(())
}

#[test]
fn test_immutable_global_rejects_set() -> Result<()> {
    let mut module = Module::new();
    let g = module.add_global(GlobalType::new(ValueType::I32, false), ConstExpr::i32(1));
    let f = module.add_function(FuncType::default(), vec![], vec![
        Instruction::I32Const(2),
        Instruction::GlobalSet(g),
        Instruction::End,
    ]);
    module.add_export("f", ExternKind::Func, f);
    assert_eq!(run(&module, "f", &[]), Err(Error::IMMUTABLE_GLOBAL));
    Ok(())
}

#[test]
fn test_cross_module_function_import() -> Result<()> {
    let mut store = Store::new();
    let mut executor = Executor::default();
    executor.instantiate(&mut store, &factorial_module(), Some("math"))?;

    let mut module = Module::new();
    let fac = module.import_func("math", "fac", FuncType::new([ValueType::I64], [ValueType::I64]));
    let twice = module.add_function(FuncType::new([], [ValueType::I64]), vec![], vec![
        Instruction::I64Const(5),
        Instruction::Call(fac),
        Instruction::I64Const(2),
        NumericOp::I64Mul.into(),
        Instruction::End,
    ]);
    module.add_export("twice", ExternKind::Func, twice);
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "twice", &[])?, vec![Value::I64(240)]);

    let mut wrong = Module::new();
    wrong.import_func("math", "fac", FuncType::new([ValueType::I32], [ValueType::I64]));
    assert_eq!(executor.instantiate(&mut store, &wrong, None), Err(Error::INCOMPATIBLE_IMPORT_TYPE));
    let mut unknown = Module::new();
    unknown.add_import("nowhere", "fac", ImportDesc::Func(0));
    assert_eq!(executor.instantiate(&mut store, &unknown, None), Err(Error::UNKNOWN_IMPORT));
    Ok(())
}

fn memory_module() -> Module {
    let mut module = Module::new();
    module.add_memory(MemoryType::new(1, Some(2)));
    module.add_active_data(16, &[0xef, 0xbe, 0xad, 0xde]);
    let load = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::Load(LoadOp::I32Load16U, MemArg::new(16, 1)),
        Instruction::End,
    ]);
    let store = module.add_function(FuncType::new([ValueType::I32, ValueType::I64], []), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::LocalGet(1),
        Instruction::Store(StoreOp::I64Store, MemArg::new(0, 3)),
        Instruction::End,
    ]);
    let grow = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::MemoryGrow(0),
        Instruction::End,
    ]);
    module.add_export("load", ExternKind::Func, load);
    module.add_export("store", ExternKind::Func, store);
    module.add_export("grow", ExternKind::Func, grow);
    module.add_export("memory", ExternKind::Memory, 0);
    module
}

#[test]
fn test_memory_access_and_growth() -> Result<()> {
    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &memory_module(), None)?;

    assert_eq!(executor.invoke_export(&mut store, instance, "load", &[Value::I32(2)])?, vec![Value::I32(0xdead)]);
    let err = executor
        .invoke_export(&mut store, instance, "store", &[Value::I32(65_530), Value::I64(1)])
        .err()
        .ok_or(Error::EXECUTION_FAILED)?;
    assert_eq!(err, Error::MEMORY_OUT_OF_BOUNDS);
    assert_eq!(err.context().map(|c| c.opcode), Some("i64.store"));

    assert_eq!(executor.invoke_export(&mut store, instance, "grow", &[Value::I32(1)])?, vec![Value::I32(1)]);
    assert_eq!(executor.invoke_export(&mut store, instance, "grow", &[Value::I32(1)])?, vec![Value::I32(-1)]);
    executor.invoke_export(&mut store, instance, "store", &[Value::I32(65_530), Value::I64(-1)])?;

    let mem = store.get_module(instance)?.find_memory_export("memory").ok_or(Error::MODULE_NOT_FOUND)?;
    assert_eq!(store.get_memory(mem)?.get_bytes(65_530, 8)?, &[0xff; 8]);
    Ok(())
}

#[test]
fn test_bulk_memory_instructions() -> Result<()> {
    let mut module = Module::new();
    module.add_memory(MemoryType::new(1, None));
    let passive = module.add_data(Data { mode: DataMode::Passive, bytes: b"hello".to_vec() });
    let f = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        // memory.init 0 <- "hello"[1..4]
        Instruction::I32Const(0),
        Instruction::I32Const(1),
        Instruction::I32Const(3),
        Instruction::MemoryInit { data: passive, memory: 0 },
        // memory.copy 10 <- 0..3
        Instruction::I32Const(10),
        Instruction::I32Const(0),
        Instruction::I32Const(3),
        Instruction::MemoryCopy { dst: 0, src: 0 },
        // memory.fill 13..15 = 'x'
        Instruction::I32Const(13),
        Instruction::I32Const(i32::from(b'x')),
        Instruction::I32Const(2),
        Instruction::MemoryFill(0),
        Instruction::DataDrop(passive),
        Instruction::I32Const(11),
        Instruction::Load(LoadOp::I32Load, MemArg::new(0, 2)),
        Instruction::End,
    ]);
    let reinit = module.add_function(FuncType::default(), vec![], vec![
        Instruction::I32Const(0),
        Instruction::I32Const(0),
        Instruction::I32Const(1),
        Instruction::MemoryInit { data: passive, memory: 0 },
        Instruction::End,
    ]);
    module.add_export("f", ExternKind::Func, f);
    module.add_export("reinit", ExternKind::Func, reinit);

    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    let expected = i32::from_le_bytes([b'l', b'l', b'x', b'x']);
    assert_eq!(executor.invoke_export(&mut store, instance, "f", &[])?, vec![Value::I32(expected)]);
    assert_eq!(executor.invoke_export(&mut store, instance, "reinit", &[]), Err(Error::MEMORY_OUT_OF_BOUNDS));
    Ok(())
}

#[test]
fn test_table_instructions_and_indirect_calls() -> Result<()> {
    let mut module = Module::new();
    let unary = FuncType::new([ValueType::I32], [ValueType::I32]);
    let inc = module.add_function(unary.clone(), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::I32Const(1),
        NumericOp::I32Add.into(),
        Instruction::End,
    ]);
    let neg = module.add_function(unary.clone(), vec![], vec![
        Instruction::I32Const(0),
        Instruction::LocalGet(0),
        NumericOp::I32Sub.into(),
        Instruction::End,
    ]);
    let ty = module.add_type(unary);
    module.add_table(TableType::new(ValueType::FuncRef, 2, Some(4)));
    module.add_element(Element::active_funcs(0, ConstExpr::i32(0), &[inc]));
    let dispatch = module.add_function(FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(1),
        Instruction::LocalGet(0),
        Instruction::CallIndirect { type_idx: ty, table_idx: 0 },
        Instruction::End,
    ]);
    let install = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::I32Const(1),
        Instruction::RefFunc(neg),
        Instruction::TableSet(0),
        Instruction::RefNull(ValueType::FuncRef),
        Instruction::I32Const(2),
        Instruction::TableGrow(0),
        Instruction::End,
    ]);
    module.add_export("dispatch", ExternKind::Func, dispatch);
    module.add_export("install", ExternKind::Func, install);

    let mut store = Store::new();
    let mut executor = Executor::default();
    let instance = executor.instantiate(&mut store, &module, None)?;
    let call = |executor: &mut Executor, store: &mut Store, slot: i32| {
        executor.invoke_export(store, instance, "dispatch", &[Value::I32(slot), Value::I32(9)])
    };

    assert_eq!(call(&mut executor, &mut store, 0)?, vec![Value::I32(10)]);
    assert_eq!(call(&mut executor, &mut store, 1), Err(Error::UNINITIALIZED_ELEMENT));
    assert_eq!(call(&mut executor, &mut store, 2), Err(Error::UNDEFINED_ELEMENT));

    assert_eq!(executor.invoke_export(&mut store, instance, "install", &[])?, vec![Value::I32(2)]);
    assert_eq!(call(&mut executor, &mut store, 1)?, vec![Value::I32(-9)]);
    assert_eq!(call(&mut executor, &mut store, 3), Err(Error::UNINITIALIZED_ELEMENT));
    assert_eq!(executor.invoke_export(&mut store, instance, "install", &[])?, vec![Value::I32(-1)]);
    Ok(())
}

#[test]
fn test_numeric_traps() -> Result<()> {
    let mut module = Module::new();
    let div = module.add_function(FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        Instruction::LocalGet(1),
        NumericOp::I32DivS.into(),
        Instruction::End,
    ]);
    let trunc = module.add_function(FuncType::new([ValueType::F64], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        NumericOp::I32TruncF64S.into(),
        Instruction::End,
    ]);
    let trap = module.add_function(FuncType::default(), vec![], vec![Instruction::Unreachable, Instruction::End]);
    module.add_export("div", ExternKind::Func, div);
    module.add_export("trunc", ExternKind::Func, trunc);
    module.add_export("trap", ExternKind::Func, trap);

    assert_eq!(run(&module, "div", &[Value::I32(7), Value::I32(-2)])?, vec![Value::I32(-3)]);
    assert_eq!(run(&module, "div", &[Value::I32(7), Value::I32(0)]), Err(Error::DIVIDE_BY_ZERO));
    assert_eq!(run(&module, "div", &[Value::I32(i32::MIN), Value::I32(-1)]), Err(Error::INTEGER_OVERFLOW));
    assert_eq!(run(&module, "trunc", &[Value::from_f64(-7.9)])?, vec![Value::I32(-7)]);
    assert_eq!(run(&module, "trunc", &[Value::from_f64(3e9)]), Err(Error::INTEGER_OVERFLOW));
    assert_eq!(run(&module, "trap", &[]), Err(Error::UNREACHABLE));
    assert_eq!(run(&module, "missing", &[]), Err(Error::FUNC_NOT_FOUND));
    Ok(())
}

#[test]
fn test_select_and_reference_checks() -> Result<()> {
    let mut module = Module::new();
    let pick = module.add_function(FuncType::new([ValueType::I32], [ValueType::I64]), vec![], vec![
        Instruction::I64Const(10),
        Instruction::I64Const(20),
        Instruction::LocalGet(0),
        Instruction::Select,
        Instruction::End,
    ]);
    let null = module.add_function(FuncType::new([], [ValueType::I32]), vec![], vec![
        Instruction::RefNull(ValueType::ExternRef),
        Instruction::RefIsNull,
        Instruction::End,
    ]);
    module.add_export("pick", ExternKind::Func, pick);
    module.add_export("null", ExternKind::Func, null);
    assert_eq!(run(&module, "pick", &[Value::I32(1)])?, vec![Value::I64(10)]);
    assert_eq!(run(&module, "pick", &[Value::I32(0)])?, vec![Value::I64(20)]);
    assert_eq!(run(&module, "null", &[])?, vec![Value::I32(1)]);
    Ok(())
}

fn spin_module() -> Module {
    let mut module = Module::new();
    let spin = module.add_function(FuncType::default(), vec![], vec![
        Instruction::Loop(BlockType::Empty),
        Instruction::Br(0),
        Instruction::End,
        Instruction::End,
    ]);
    module.add_export("spin", ExternKind::Func, spin);
    module
}

#[test]
fn test_cost_limit_stops_endless_loop() -> Result<()> {
    let mut store = Store::new();
    let config = Configure::new().with_measure_cost(true).with_cost_limit(1_000);
    let mut executor = Executor::new(config);
    let instance = executor.instantiate(&mut store, &spin_module(), None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "spin", &[]), Err(Error::COST_LIMIT_EXCEEDED));
    assert_eq!(executor.statistics().total_cost(), 1_000);
    Ok(())
}

#[test]
fn test_call_depth_limit() -> Result<()> {
    let mut module = Module::new();
    let forever = module.add_function(FuncType::default(), vec![], vec![Instruction::Call(0), Instruction::End]);
    module.add_export("forever", ExternKind::Func, forever);

    let mut store = Store::new();
    let mut executor = Executor::new(Configure::new().with_max_call_depth(64));
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "forever", &[]), Err(Error::CALL_STACK_EXHAUSTED));
    assert_eq!(executor.stack().frame_depth(), 0);
    Ok(())
}

#[test]
fn test_disabled_proposal_is_rejected() -> Result<()> {
    let mut module = Module::new();
    let f = module.add_function(FuncType::new([ValueType::I32], [ValueType::I32]), vec![], vec![
        Instruction::LocalGet(0),
        NumericOp::I32Extend8S.into(),
        Instruction::End,
    ]);
    module.add_export("f", ExternKind::Func, f);

    let mut store = Store::new();
    let config = Configure::new().remove_proposal(wee_instructions::Proposal::SignExtension);
    let mut executor = Executor::new(config);
    let instance = executor.instantiate(&mut store, &module, None)?;
    assert_eq!(executor.invoke_export(&mut store, instance, "f", &[Value::I32(0xff)]), Err(Error::NOT_SUPPORTED));
    assert_eq!(run(&module, "f", &[Value::I32(0xff)])?, vec![Value::I32(-1)]);
    Ok(())
}

#[test]
fn test_memory_page_limit_from_config() -> Result<()> {
    let mut module = Module::new();
    module.add_memory(MemoryType::new(4, None));
    let mut store = Store::new();
    let mut executor = Executor::new(Configure::new().with_max_memory_pages(2));
    assert_eq!(executor.instantiate(&mut store, &module, None), Err(Error::MEMORY_SIZE_EXCEEDED));
    Ok(())
}

#[test]
fn test_unknown_module_address() {
    let mut store = Store::new();
    let outcome = Executor::default().invoke_export(&mut store, ModuleAddr::new(3), "f", &[]);
    assert_eq!(outcome, Err(Error::WRONG_INSTANCE_ADDRESS));
}

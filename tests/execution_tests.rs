//! End-to-end execution tests: arithmetic, structured control flow, calls,
//! memory access, and trap semantics, driven through module instantiation
//! and the typed invocation entry point.

mod common;

use common::{single_function_module, with_memory};
use rstest::rstest;
use wyrm::module::instruction::{BlockType, Instruction, MemArg};
use wyrm::module::{Export, ExportKind, Function, FunctionType, Module, ValueType};
use wyrm::runtime::{Instance, InterpreterOptions, RuntimeError, Store, Trap, Value};

fn instantiate(module: Module) -> Instance {
    let store = Store::new_shared();
    Instance::new(module, &store).expect("instantiation should succeed")
}

fn add_module() -> Module {
    single_function_module(
        "add",
        vec![ValueType::I32, ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::LocalGet { index: 1 },
            Instruction::I32Add,
            Instruction::End,
        ],
    )
}

#[test]
fn test_add() {
    let instance = instantiate(add_module());
    let sum: i32 = instance
        .invoke_typed("add", &[Value::I32(2), Value::I32(3)])
        .unwrap();
    assert_eq!(sum, 5);
}

#[test]
fn test_div_by_zero_traps() {
    let module = single_function_module(
        "div",
        vec![ValueType::I32, ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::LocalGet { index: 1 },
            Instruction::I32DivS,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);

    let err = instance
        .invoke_typed::<i32>("div", &[Value::I32(10), Value::I32(0)])
        .unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::IntegerDivideByZero));

    // The instance stays usable after a trap.
    let quotient: i32 = instance
        .invoke_typed("div", &[Value::I32(10), Value::I32(2)])
        .unwrap();
    assert_eq!(quotient, 5);
}

#[test]
fn test_load_crossing_page_end_traps() {
    let module = with_memory(
        single_function_module(
            "peek",
            vec![ValueType::I32],
            vec![ValueType::I32],
            0,
            vec![
                Instruction::LocalGet { index: 0 },
                Instruction::I32Load {
                    memarg: MemArg::offset(0),
                },
                Instruction::End,
            ],
        ),
        1,
    );
    let instance = instantiate(module);

    // A 4-byte load at 65533 crosses the end of the single page.
    let err = instance
        .invoke_typed::<i32>("peek", &[Value::I32(65533)])
        .unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::OutOfBoundsMemoryAccess));

    // The last full word of the page is readable.
    let value: i32 = instance
        .invoke_typed("peek", &[Value::I32(65532)])
        .unwrap();
    assert_eq!(value, 0);
}

fn loop_sum_module() -> Module {
    // sum = 0; i = 1; while i <= n { sum += i; i += 1 }; sum
    single_function_module(
        "loop_sum",
        vec![ValueType::I32],
        vec![ValueType::I32],
        2, // local 1 = sum, local 2 = i
        vec![
            Instruction::I32Const { value: 1 },
            Instruction::LocalSet { index: 2 },
            Instruction::block(BlockType::Empty),
            Instruction::loop_(BlockType::Empty),
            Instruction::LocalGet { index: 2 },
            Instruction::LocalGet { index: 0 },
            Instruction::I32GtS,
            Instruction::BrIf { depth: 1 },
            Instruction::LocalGet { index: 1 },
            Instruction::LocalGet { index: 2 },
            Instruction::I32Add,
            Instruction::LocalSet { index: 1 },
            Instruction::LocalGet { index: 2 },
            Instruction::I32Const { value: 1 },
            Instruction::I32Add,
            Instruction::LocalSet { index: 2 },
            Instruction::Br { depth: 0 },
            Instruction::End,
            Instruction::End,
            Instruction::LocalGet { index: 1 },
            Instruction::End,
        ],
    )
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(10, 55)]
#[case(100, 5050)]
fn test_loop_sum(#[case] n: i32, #[case] expected: i32) {
    let instance = instantiate(loop_sum_module());
    let sum: i32 = instance.invoke_typed("loop_sum", &[Value::I32(n)]).unwrap();
    assert_eq!(sum, expected);
}

fn br_table_module() -> Module {
    // Four nested blocks; br_table [0,1,2] default 3 picks one of them.
    single_function_module(
        "select_target",
        vec![ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::block(BlockType::Empty),
            Instruction::block(BlockType::Empty),
            Instruction::block(BlockType::Empty),
            Instruction::block(BlockType::Empty),
            Instruction::LocalGet { index: 0 },
            Instruction::br_table([0, 1, 2], 3),
            Instruction::End,
            Instruction::I32Const { value: 0 },
            Instruction::Return,
            Instruction::End,
            Instruction::I32Const { value: 1 },
            Instruction::Return,
            Instruction::End,
            Instruction::I32Const { value: 2 },
            Instruction::Return,
            Instruction::End,
            Instruction::I32Const { value: 3 },
            Instruction::End,
        ],
    )
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 2)]
#[case(3, 3)]
#[case(5, 3)] // out of range: default target
#[case(-1, 3)] // negative selectors are large unsigned values
fn test_br_table(#[case] selector: i32, #[case] expected: i32) {
    let instance = instantiate(br_table_module());
    let target: i32 = instance
        .invoke_typed("select_target", &[Value::I32(selector)])
        .unwrap();
    assert_eq!(target, expected);
}

#[test]
fn test_if_else() {
    let module = single_function_module(
        "pick",
        vec![ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::if_(BlockType::Value(ValueType::I32)),
            Instruction::I32Const { value: 10 },
            Instruction::else_(),
            Instruction::I32Const { value: 20 },
            Instruction::End,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);

    let taken: i32 = instance.invoke_typed("pick", &[Value::I32(1)]).unwrap();
    assert_eq!(taken, 10);
    let skipped: i32 = instance.invoke_typed("pick", &[Value::I32(0)]).unwrap();
    assert_eq!(skipped, 20);
}

#[test]
fn test_if_without_else() {
    let module = single_function_module(
        "clamp_negative",
        vec![ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::I32Const { value: 0 },
            Instruction::I32LtS,
            Instruction::if_(BlockType::Empty),
            Instruction::I32Const { value: 0 },
            Instruction::Return,
            Instruction::End,
            Instruction::LocalGet { index: 0 },
            Instruction::End,
        ],
    );
    let instance = instantiate(module);

    let clamped: i32 = instance
        .invoke_typed("clamp_negative", &[Value::I32(-5)])
        .unwrap();
    assert_eq!(clamped, 0);
    let kept: i32 = instance
        .invoke_typed("clamp_negative", &[Value::I32(7)])
        .unwrap();
    assert_eq!(kept, 7);
}

#[test]
fn test_block_branch_carries_value() {
    // block (result i32): i32.const 42, br 0, (unreachable const) end
    let module = single_function_module(
        "carried",
        vec![],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::block(BlockType::Value(ValueType::I32)),
            Instruction::I32Const { value: 42 },
            Instruction::Br { depth: 0 },
            Instruction::End,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);
    let carried: i32 = instance.invoke_typed("carried", &[]).unwrap();
    assert_eq!(carried, 42);
}

#[test]
fn test_recursive_call() {
    // fac(n) = n == 0 ? 1 : n * fac(n - 1)
    let module = single_function_module(
        "fac",
        vec![ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::I32Eqz,
            Instruction::if_(BlockType::Value(ValueType::I32)),
            Instruction::I32Const { value: 1 },
            Instruction::else_(),
            Instruction::LocalGet { index: 0 },
            Instruction::LocalGet { index: 0 },
            Instruction::I32Const { value: 1 },
            Instruction::I32Sub,
            Instruction::Call { func_index: 0 },
            Instruction::I32Mul,
            Instruction::End,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);
    let fac5: i32 = instance.invoke_typed("fac", &[Value::I32(5)]).unwrap();
    assert_eq!(fac5, 120);
}

#[test]
fn test_call_between_functions() {
    // double(x) = x + x; quadruple(x) = double(double(x))
    let mut module = Module::new();
    module.types.push(FunctionType::new(
        [ValueType::I32],
        [ValueType::I32],
    ));
    module.functions.push(Function::defined(
        0,
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::LocalGet { index: 0 },
            Instruction::I32Add,
            Instruction::End,
        ],
    ));
    module.functions.push(Function::defined(
        0,
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::Call { func_index: 0 },
            Instruction::Call { func_index: 0 },
            Instruction::End,
        ],
    ));
    module.exports.push(Export {
        name: "quadruple".to_string(),
        kind: ExportKind::Func,
        index: 1,
    });

    let instance = instantiate(module);
    let result: i32 = instance
        .invoke_typed("quadruple", &[Value::I32(3)])
        .unwrap();
    assert_eq!(result, 12);
}

#[test]
fn test_unreachable_traps() {
    let module = single_function_module(
        "boom",
        vec![],
        vec![],
        0,
        vec![Instruction::Unreachable, Instruction::End],
    );
    let instance = instantiate(module);
    let err = instance.invoke_typed::<()>("boom", &[]).unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::UnreachableExecuted));
}

#[test]
fn test_select() {
    let module = single_function_module(
        "choose",
        vec![ValueType::I32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::I32Const { value: 100 },
            Instruction::I32Const { value: 200 },
            Instruction::LocalGet { index: 0 },
            Instruction::Select,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);

    let first: i32 = instance.invoke_typed("choose", &[Value::I32(1)]).unwrap();
    assert_eq!(first, 100);
    let second: i32 = instance.invoke_typed("choose", &[Value::I32(0)]).unwrap();
    assert_eq!(second, 200);
}

#[test]
fn test_memory_store_load_round_trip() {
    let module = with_memory(
        {
            let mut module = Module::new();
            module.types.push(FunctionType::new(
                [ValueType::I32, ValueType::I32],
                [],
            ));
            module
                .types
                .push(FunctionType::new([ValueType::I32], [ValueType::I32]));
            module.functions.push(Function::defined(
                0,
                0,
                vec![
                    Instruction::LocalGet { index: 0 },
                    Instruction::LocalGet { index: 1 },
                    Instruction::I32Store {
                        memarg: MemArg::offset(0),
                    },
                    Instruction::End,
                ],
            ));
            module.functions.push(Function::defined(
                1,
                0,
                vec![
                    Instruction::LocalGet { index: 0 },
                    Instruction::I32Load {
                        memarg: MemArg::offset(0),
                    },
                    Instruction::End,
                ],
            ));
            module.exports.push(Export {
                name: "poke".to_string(),
                kind: ExportKind::Func,
                index: 0,
            });
            module.exports.push(Export {
                name: "peek".to_string(),
                kind: ExportKind::Func,
                index: 1,
            });
            module
        },
        1,
    );
    let instance = instantiate(module);

    instance
        .invoke_typed::<()>("poke", &[Value::I32(1024), Value::I32(-7)])
        .unwrap();
    let value: i32 = instance.invoke_typed("peek", &[Value::I32(1024)]).unwrap();
    assert_eq!(value, -7);
}

#[test]
fn test_memory_writes_before_trap_persist() {
    let module = with_memory(
        single_function_module(
            "write_then_trap",
            vec![],
            vec![],
            0,
            vec![
                Instruction::I32Const { value: 0 },
                Instruction::I32Const { value: 99 },
                Instruction::I32Store {
                    memarg: MemArg::offset(0),
                },
                // Out of bounds: traps after the first store committed.
                Instruction::I32Const { value: 65536 },
                Instruction::I32Const { value: 1 },
                Instruction::I32Store {
                    memarg: MemArg::offset(0),
                },
                Instruction::End,
            ],
        ),
        1,
    );
    let store = Store::new_shared();
    let instance = Instance::new(module, &store).unwrap();

    let err = instance
        .invoke_typed::<()>("write_then_trap", &[])
        .unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::OutOfBoundsMemoryAccess));

    let mem = instance.memory_export("mem").unwrap();
    assert_eq!(store.borrow().memory(mem).unwrap().read_i32(0).unwrap(), 99);
}

#[test]
fn test_memory_size_and_grow() {
    let module = with_memory(
        {
            let mut module = Module::new();
            module
                .types
                .push(FunctionType::new([ValueType::I32], [ValueType::I32]));
            module
                .types
                .push(FunctionType::new([], [ValueType::I32]));
            module.functions.push(Function::defined(
                0,
                0,
                vec![
                    Instruction::LocalGet { index: 0 },
                    Instruction::MemoryGrow,
                    Instruction::End,
                ],
            ));
            module.functions.push(Function::defined(
                1,
                0,
                vec![Instruction::MemorySize, Instruction::End],
            ));
            module.exports.push(Export {
                name: "grow".to_string(),
                kind: ExportKind::Func,
                index: 0,
            });
            module.exports.push(Export {
                name: "size".to_string(),
                kind: ExportKind::Func,
                index: 1,
            });
            module
        },
        1,
    );
    let instance = instantiate(module);

    let size: i32 = instance.invoke_typed("size", &[]).unwrap();
    assert_eq!(size, 1);
    let old: i32 = instance.invoke_typed("grow", &[Value::I32(2)]).unwrap();
    assert_eq!(old, 1);
    let size: i32 = instance.invoke_typed("size", &[]).unwrap();
    assert_eq!(size, 3);
}

#[test]
fn test_globals_across_invocations() {
    // A mutable counter global incremented by each call.
    let mut module = Module::new();
    module
        .types
        .push(FunctionType::new([], [ValueType::I32]));
    module.globals.push(wyrm::module::GlobalDef {
        value_type: ValueType::I32,
        mutable: true,
        init: vec![Instruction::I32Const { value: 40 }, Instruction::End],
    });
    module.functions.push(Function::defined(
        0,
        0,
        vec![
            Instruction::GlobalGet { index: 0 },
            Instruction::I32Const { value: 1 },
            Instruction::I32Add,
            Instruction::GlobalSet { index: 0 },
            Instruction::GlobalGet { index: 0 },
            Instruction::End,
        ],
    ));
    module.exports.push(Export {
        name: "bump".to_string(),
        kind: ExportKind::Func,
        index: 0,
    });
    module.exports.push(Export {
        name: "counter".to_string(),
        kind: ExportKind::Global,
        index: 0,
    });

    let instance = instantiate(module);
    let first: i32 = instance.invoke_typed("bump", &[]).unwrap();
    assert_eq!(first, 41);
    let second: i32 = instance.invoke_typed("bump", &[]).unwrap();
    assert_eq!(second, 42);
    assert_eq!(
        instance.global_export("counter").unwrap(),
        Value::I32(42)
    );
}

#[test]
fn test_i64_and_float_round_trip() {
    let module = single_function_module(
        "mix",
        vec![ValueType::I64, ValueType::F64],
        vec![ValueType::F64],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::F64ConvertI64S,
            Instruction::LocalGet { index: 1 },
            Instruction::F64Mul,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);
    let product: f64 = instance
        .invoke_typed("mix", &[Value::I64(-4), Value::F64(2.5)])
        .unwrap();
    assert_eq!(product, -10.0);
}

#[test]
fn test_trunc_nan_traps() {
    let module = single_function_module(
        "to_int",
        vec![ValueType::F32],
        vec![ValueType::I32],
        0,
        vec![
            Instruction::LocalGet { index: 0 },
            Instruction::I32TruncF32S,
            Instruction::End,
        ],
    );
    let instance = instantiate(module);

    let err = instance
        .invoke_typed::<i32>("to_int", &[Value::F32(f32::NAN)])
        .unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::InvalidConversionToInteger));

    let err = instance
        .invoke_typed::<i32>("to_int", &[Value::F32(3e9)])
        .unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::IntegerOverflow));

    let converted: i32 = instance
        .invoke_typed("to_int", &[Value::F32(-3.7)])
        .unwrap();
    assert_eq!(converted, -3);
}

#[test]
fn test_deep_recursion_overflows_control_stack() {
    // f() = f(): unbounded recursion exhausts the frame stack.
    let module = single_function_module(
        "forever",
        vec![],
        vec![],
        0,
        vec![
            Instruction::Call { func_index: 0 },
            Instruction::End,
        ],
    );
    let store = Store::new_shared();
    let options = InterpreterOptions {
        operand_stack_size: 1024,
        control_stack_size: 64,
        label_stack_size: 64,
    };
    let instance = Instance::new_with_options(module, &store, options).unwrap();

    let err = instance.invoke_typed::<()>("forever", &[]).unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::StackOverflow));
}

#[test]
fn test_operand_stack_overflow() {
    // Straight-line code that pushes more operands than the configured
    // capacity before dropping them again.
    let mut code = Vec::new();
    for _ in 0..300 {
        code.push(Instruction::I32Const { value: 0 });
    }
    for _ in 0..300 {
        code.push(Instruction::Drop);
    }
    code.push(Instruction::End);

    let module = single_function_module("flood", vec![], vec![], 0, code);
    let store = Store::new_shared();
    let options = InterpreterOptions {
        operand_stack_size: 256,
        control_stack_size: 64,
        label_stack_size: 64,
    };
    let instance = Instance::new_with_options(module, &store, options).unwrap();

    let err = instance.invoke_typed::<()>("flood", &[]).unwrap_err();
    assert_eq!(err, RuntimeError::Trap(Trap::StackOverflow));
}

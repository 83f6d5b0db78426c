//! Shared helpers for building test modules programmatically.

#![allow(dead_code)]

use wyrm::module::instruction::Instruction;
use wyrm::module::{
    Export, ExportKind, Function, FunctionType, Limits, MemoryDef, Module, ValueType,
};

/// A module exporting one defined function under `name`.
pub fn single_function_module(
    name: &str,
    params: Vec<ValueType>,
    results: Vec<ValueType>,
    locals_count: u32,
    code: Vec<Instruction>,
) -> Module {
    let mut module = Module::new();
    module.types.push(FunctionType::new(params, results));
    module
        .functions
        .push(Function::defined(0, locals_count, code));
    module.exports.push(Export {
        name: name.to_string(),
        kind: ExportKind::Func,
        index: 0,
    });
    module
}

/// Add a single memory of `pages` pages to a module and export it as "mem".
pub fn with_memory(mut module: Module, pages: u32) -> Module {
    module.memories.push(MemoryDef {
        limits: Limits {
            min: pages,
            max: None,
        },
    });
    module.exports.push(Export {
        name: "mem".to_string(),
        kind: ExportKind::Memory,
        index: 0,
    });
    module
}

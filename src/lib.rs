//! A WebAssembly execution engine written in Rust.
//!
//! wyrm interprets decoded WebAssembly modules: it owns the runtime store of
//! functions, memories, tables, and globals, instantiates modules against
//! it, and runs their code on a stack-machine interpreter with structured
//! control flow, bounds-checked memory access, and precise trap semantics.
//! The binary decoder is an external collaborator; this crate consumes its
//! output, the [`module::Module`] data model.
//!
//! # Modules
//!
//! - [`module`] -- The decoded-module representation: types, imports,
//!   functions, exports, segments, and the flat instruction enum.
//! - [`runtime`] -- The store, instances, values, and the interpreter.
//!
//! # Example
//!
//! Build a module that adds two numbers, instantiate it, and call it:
//!
//! ```
//! use wyrm::module::instruction::Instruction;
//! use wyrm::module::{Export, ExportKind, Function, FunctionType, Module, ValueType};
//! use wyrm::runtime::{Instance, Store, Value};
//!
//! let mut module = Module::new();
//! module.types.push(FunctionType::new(
//!     [ValueType::I32, ValueType::I32],
//!     [ValueType::I32],
//! ));
//! module.functions.push(Function::defined(
//!     0,
//!     0,
//!     vec![
//!         Instruction::LocalGet { index: 0 },
//!         Instruction::LocalGet { index: 1 },
//!         Instruction::I32Add,
//!         Instruction::End,
//!     ],
//! ));
//! module.exports.push(Export {
//!     name: "add".to_string(),
//!     kind: ExportKind::Func,
//!     index: 0,
//! });
//!
//! let store = Store::new_shared();
//! let instance = Instance::new(module, &store).unwrap();
//! let sum: i32 = instance
//!     .invoke_typed("add", &[Value::I32(2), Value::I32(3)])
//!     .unwrap();
//! assert_eq!(sum, 5);
//! ```

pub mod module;
pub mod runtime;

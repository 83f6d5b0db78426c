//! WebAssembly runtime implementation
//!
//! This module provides the execution engine: the store of runtime objects,
//! module instances, the value representation, and the stack-machine
//! interpreter that evaluates decoded instructions.

pub mod control;
pub mod executor;
pub mod frame;
pub mod host;
pub mod instance;
pub mod memory;
pub mod ops;
pub mod stack;
pub mod store;
pub mod table;
pub mod value;

pub use host::{HostContext, HostFunc, HostFunction};
pub use instance::Instance;
pub use memory::Memory;
pub use store::{
    ExternVal, FuncAddr, Function, GlobalAddr, MemoryAddr, SharedStore, Store, TableAddr,
    WasmFunction,
};
pub use table::Table;
pub use value::{HostValue, Value};

use crate::module::ValueType;

/// Capacities of the interpreter's per-invocation stacks, in entries.
///
/// All three default to 65536. They bound the operand stack (64-bit cells),
/// the call-frame stack, and the label stack independently; exceeding any of
/// them traps with [`Trap::StackOverflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    pub operand_stack_size: usize,
    pub control_stack_size: usize,
    pub label_stack_size: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        InterpreterOptions {
            operand_stack_size: 65536,
            control_stack_size: 65536,
            label_stack_size: 65536,
        }
    }
}

/// Errors reported at the API boundary, before or instead of execution.
///
/// Setup errors leave no partial state behind: a failed lookup or a rejected
/// invocation does not change the Store or the Instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("function index exceeds types length")]
    FuncIndexExceedsTypesLength,
    #[error("function index out of bounds: {0}")]
    FunctionIndexOutOfBounds(u32),
    #[error("memory index out of bounds: {0}")]
    MemoryIndexOutOfBounds(u32),
    #[error("table index out of bounds: {0}")]
    TableIndexOutOfBounds(u32),
    #[error("global index out of bounds: {0}")]
    GlobalIndexOutOfBounds(u32),
    #[error("parameter count mismatch: expected {expected}, got {actual}")]
    ParamCountMismatch { expected: usize, actual: usize },
    #[error("parameter {index} type mismatch: expected {expected:?}, got {actual:?}")]
    ParamTypeMismatch {
        index: usize,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("result type mismatch: expected {expected:?}, got {actual:?}")]
    ResultTypeMismatch {
        expected: Option<ValueType>,
        actual: Option<ValueType>,
    },
    #[error("only a single return value is supported")]
    OnlySingleReturnValueSupported,
    #[error("unknown import: {module}.{name}")]
    ImportNotFound { module: String, name: String },
    #[error("import kind mismatch for {module}.{name}")]
    ImportKindMismatch { module: String, name: String },
    #[error("incompatible import type for {module}.{name}")]
    ImportTypeMismatch { module: String, name: String },
    #[error("unknown export: {0}")]
    UnknownExport(String),
    #[error("dynamic invocation of host functions is not implemented")]
    InvokeDynamicHostFunctionNotImplemented,
    #[error("invalid memory limits: {0}")]
    InvalidMemoryLimits(String),
    #[error("malformed function body: {0}")]
    MalformedCode(String),
}

/// Runtime errors that abort the current invocation.
///
/// A trap discards the per-call stacks and propagates to the caller; the
/// Instance and its Store remain valid for further invocations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Trap {
    #[error("unreachable executed")]
    UnreachableExecuted,
    #[error("integer divide by zero")]
    IntegerDivideByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("invalid conversion to integer")]
    InvalidConversionToInteger,
    #[error("out of bounds memory access")]
    OutOfBoundsMemoryAccess,
    #[error("out of bounds table access")]
    OutOfBoundsTableAccess,
    #[error("uninitialized element")]
    UninitializedElement,
    #[error("undefined element")]
    UndefinedElement,
    #[error("indirect call type mismatch")]
    IndirectCallTypeMismatch,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("host error: {0}")]
    Host(String),
}

/// Any failure an API entry point can surface: a setup error or a trap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Trap(#[from] Trap),
}

impl RuntimeError {
    /// The trap kind, if this error is a trap.
    pub fn as_trap(&self) -> Option<&Trap> {
        match self {
            RuntimeError::Trap(trap) => Some(trap),
            RuntimeError::Setup(_) => None,
        }
    }
}

//! Host function bridge
//!
//! A host function is a callable the embedder registers in the Store. The
//! interpreter hands it a view of the operand stack: the callable pops its
//! parameters right-to-left and pushes its results left-to-right, exactly as
//! a wasm callee would leave them. The view also exposes the Store, so host
//! code can read and write instance memories, tables, and globals.

use super::stack::OperandStack;
use super::store::SharedStore;
use super::Trap;
use crate::module::FunctionType;
use std::rc::Rc;

/// The callable of a host function.
///
/// Failures surface as traps and abort the invocation that performed the
/// call, like any other trap.
pub type HostFunc = Rc<dyn Fn(&mut HostContext<'_>) -> Result<(), Trap>>;

/// A host function as stored in the Store: signature plus callable.
#[derive(Clone)]
pub struct HostFunction {
    pub func_type: FunctionType,
    pub callable: HostFunc,
}

impl HostFunction {
    pub fn params(&self) -> &[crate::module::ValueType] {
        &self.func_type.params
    }

    pub fn results(&self) -> &[crate::module::ValueType] {
        &self.func_type.results
    }
}

/// The interpreter state a host callable may touch during a call.
pub struct HostContext<'a> {
    operands: &'a mut OperandStack,
    store: &'a SharedStore,
}

impl<'a> HostContext<'a> {
    pub(crate) fn new(operands: &'a mut OperandStack, store: &'a SharedStore) -> Self {
        HostContext { operands, store }
    }

    /// The Store the executing instance lives in. Borrow it to reach
    /// memories, tables, and globals.
    pub fn store(&self) -> &SharedStore {
        self.store
    }

    pub fn pop(&mut self) -> Result<u64, Trap> {
        self.operands.pop()
    }

    pub fn push(&mut self, cell: u64) -> Result<(), Trap> {
        self.operands.push(cell)
    }

    pub fn pop_i32(&mut self) -> Result<i32, Trap> {
        self.operands.pop_i32()
    }

    pub fn push_i32(&mut self, value: i32) -> Result<(), Trap> {
        self.operands.push_i32(value)
    }

    pub fn pop_i64(&mut self) -> Result<i64, Trap> {
        self.operands.pop_i64()
    }

    pub fn push_i64(&mut self, value: i64) -> Result<(), Trap> {
        self.operands.push_i64(value)
    }

    pub fn pop_f32(&mut self) -> Result<f32, Trap> {
        self.operands.pop_f32()
    }

    pub fn push_f32(&mut self, value: f32) -> Result<(), Trap> {
        self.operands.push_f32(value)
    }

    pub fn pop_f64(&mut self) -> Result<f64, Trap> {
        self.operands.pop_f64()
    }

    pub fn push_f64(&mut self, value: f64) -> Result<(), Trap> {
        self.operands.push_f64(value)
    }
}

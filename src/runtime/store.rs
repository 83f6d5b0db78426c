//! WebAssembly Store - owns the runtime objects shared between instances
//!
//! The Store holds four flat, append-only sequences of functions, memories,
//! tables, and globals, addressed by opaque handles (positions). Handles are
//! stable for the Store's lifetime; nothing is ever removed. Instances
//! record handles for each of their imports and definitions, which is what
//! lets two modules share a memory or call each other's functions.
//!
//! Host functions registered under a `(module, name)` pair are found again
//! during import resolution; [`Store::register`] publishes any other extern
//! value the same way.

use super::host::{HostFunc, HostFunction};
use super::instance::InstanceData;
use super::memory::Memory;
use super::table::Table;
use super::{SetupError, Trap};
use crate::module::instruction::Instruction;
use crate::module::{FunctionType, ValueType};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A Store behind shared ownership, as instances hold it.
pub type SharedStore = Rc<RefCell<Store>>;

/// Handle of a function in the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncAddr(pub usize);

/// Handle of a memory in the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryAddr(pub usize);

/// Handle of a table in the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableAddr(pub usize);

/// Handle of a global in the Store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalAddr(pub usize);

/// Any runtime object a name can resolve to during import resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternVal {
    Func(FuncAddr),
    Memory(MemoryAddr),
    Table(TableAddr),
    Global(GlobalAddr),
}

/// A function in the Store: WebAssembly code or a host callable.
pub enum Function {
    Wasm(WasmFunction),
    Host(HostFunction),
}

impl Function {
    /// The function's signature.
    pub fn func_type(&self) -> &FunctionType {
        match self {
            Function::Wasm(f) => &f.func_type,
            Function::Host(f) => &f.func_type,
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Wasm(func) => f
                .debug_struct("Wasm")
                .field("func_type", &func.func_type)
                .field("locals_count", &func.locals_count)
                .field("code_len", &func.code.len())
                .finish(),
            Function::Host(func) => f
                .debug_struct("Host")
                .field("func_type", &func.func_type)
                .finish(),
        }
    }
}

/// A WebAssembly function: resolved type, flat locals count, branch-resolved
/// code, and the address tables of the instance it belongs to.
#[derive(Clone)]
pub struct WasmFunction {
    pub func_type: FunctionType,
    pub locals_count: u32,
    pub code: Rc<[Instruction]>,
    pub instance: Rc<InstanceData>,
}

/// A global variable: its value as a 64-bit cell plus its declared type.
#[derive(Debug, Clone, Copy)]
pub struct Global {
    pub value_type: ValueType,
    pub mutable: bool,
    pub value: u64,
}

/// The registry of runtime objects shared between module instances.
///
/// The Store is not internally synchronised; concurrent use requires
/// external mutual exclusion over it and every instance that references it.
#[derive(Debug, Default)]
pub struct Store {
    functions: Vec<Function>,
    memories: Vec<Memory>,
    tables: Vec<Table>,
    globals: Vec<Global>,
    registry: HashMap<(String, String), ExternVal>,
}

impl Store {
    /// Create a new empty Store.
    pub fn new() -> Self {
        Store::default()
    }

    /// Create a new empty Store behind shared ownership.
    pub fn new_shared() -> SharedStore {
        Rc::new(RefCell::new(Store::new()))
    }

    /// Append a WebAssembly function, returning its handle.
    pub fn add_wasm_function(&mut self, func: WasmFunction) -> FuncAddr {
        let addr = FuncAddr(self.functions.len());
        self.functions.push(Function::Wasm(func));
        addr
    }

    /// Append a host function and record it under `(module, name)` so
    /// import resolution can find it.
    pub fn add_host_function(
        &mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        callable: HostFunc,
        params: Vec<ValueType>,
        results: Vec<ValueType>,
    ) -> FuncAddr {
        let addr = FuncAddr(self.functions.len());
        self.functions.push(Function::Host(HostFunction {
            func_type: FunctionType::new(params, results),
            callable,
        }));
        self.registry
            .insert((module.into(), name.into()), ExternVal::Func(addr));
        addr
    }

    /// Allocate a zeroed memory of `initial_pages`, returning its handle.
    pub fn add_memory(
        &mut self,
        initial_pages: u32,
        max_pages: Option<u32>,
    ) -> Result<MemoryAddr, SetupError> {
        let memory = Memory::new(initial_pages, max_pages)?;
        let addr = MemoryAddr(self.memories.len());
        self.memories.push(memory);
        Ok(addr)
    }

    /// Allocate a table of `initial` empty slots, returning its handle.
    pub fn add_table(&mut self, initial: u32, max: Option<u32>) -> TableAddr {
        let addr = TableAddr(self.tables.len());
        self.tables.push(Table::new(initial, max));
        addr
    }

    /// Allocate a global, returning its handle.
    pub fn add_global(&mut self, value_type: ValueType, mutable: bool, value: u64) -> GlobalAddr {
        let addr = GlobalAddr(self.globals.len());
        self.globals.push(Global {
            value_type,
            mutable,
            value,
        });
        addr
    }

    /// Publish an extern value under `(module, name)` for later import
    /// resolution. Overwrites any previous registration of the same name.
    pub fn register(
        &mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        value: ExternVal,
    ) {
        self.registry.insert((module.into(), name.into()), value);
    }

    /// Resolve a registered name.
    ///
    /// # Errors
    /// Fails with `ImportNotFound` when nothing is registered under the pair.
    pub fn import(&self, module: &str, name: &str) -> Result<ExternVal, SetupError> {
        self.registry
            .get(&(module.to_string(), name.to_string()))
            .copied()
            .ok_or_else(|| SetupError::ImportNotFound {
                module: module.to_string(),
                name: name.to_string(),
            })
    }

    pub fn function(&self, addr: FuncAddr) -> Result<&Function, SetupError> {
        self.functions
            .get(addr.0)
            .ok_or(SetupError::FunctionIndexOutOfBounds(addr.0 as u32))
    }

    /// The signature of the function at `addr`.
    pub fn function_type(&self, addr: FuncAddr) -> Result<&FunctionType, SetupError> {
        Ok(self.function(addr)?.func_type())
    }

    pub fn memory(&self, addr: MemoryAddr) -> Result<&Memory, SetupError> {
        self.memories
            .get(addr.0)
            .ok_or(SetupError::MemoryIndexOutOfBounds(addr.0 as u32))
    }

    pub fn memory_mut(&mut self, addr: MemoryAddr) -> Result<&mut Memory, SetupError> {
        self.memories
            .get_mut(addr.0)
            .ok_or(SetupError::MemoryIndexOutOfBounds(addr.0 as u32))
    }

    pub fn table(&self, addr: TableAddr) -> Result<&Table, SetupError> {
        self.tables
            .get(addr.0)
            .ok_or(SetupError::TableIndexOutOfBounds(addr.0 as u32))
    }

    pub fn table_mut(&mut self, addr: TableAddr) -> Result<&mut Table, SetupError> {
        self.tables
            .get_mut(addr.0)
            .ok_or(SetupError::TableIndexOutOfBounds(addr.0 as u32))
    }

    pub fn global(&self, addr: GlobalAddr) -> Result<&Global, SetupError> {
        self.globals
            .get(addr.0)
            .ok_or(SetupError::GlobalIndexOutOfBounds(addr.0 as u32))
    }

    pub fn global_mut(&mut self, addr: GlobalAddr) -> Result<&mut Global, SetupError> {
        self.globals
            .get_mut(addr.0)
            .ok_or(SetupError::GlobalIndexOutOfBounds(addr.0 as u32))
    }

    /// Number of functions currently in the Store. New function handles are
    /// issued from here upward.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of globals currently in the Store.
    pub fn global_count(&self) -> usize {
        self.globals.len()
    }

    /// Read the table slot an indirect call dispatches through, mapping an
    /// out-of-range index to the `call_indirect` trap kinds.
    pub fn indirect_target(&self, addr: TableAddr, index: u32) -> Result<FuncAddr, Trap> {
        let table = self.table(addr).map_err(|_| Trap::UndefinedElement)?;
        if index >= table.size() {
            return Err(Trap::UndefinedElement);
        }
        table.get(index)?.ok_or(Trap::UninitializedElement)
    }
}

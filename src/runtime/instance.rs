//! WebAssembly module instance
//!
//! Instantiation binds a decoded module to Store handles: imports are
//! resolved through the Store's registry by `(module, name)`, local
//! definitions are allocated fresh handles, global initialisers and segment
//! offsets are evaluated as constant expressions, active segments are
//! applied, and the start function (if any) runs. The resulting instance
//! exposes the typed and untyped invocation entry points.

use super::executor::Executor;
use super::store::{
    ExternVal, FuncAddr, Function, GlobalAddr, MemoryAddr, SharedStore, TableAddr, WasmFunction,
};
use super::value::{HostValue, Value};
use super::{InterpreterOptions, RuntimeError, SetupError, Trap};
use crate::module::builder::resolve_branch_targets;
use crate::module::instruction::Instruction;
use crate::module::{ExportKind, FunctionType, ImportKind, Module};
use std::rc::Rc;

/// A module's index spaces bound to Store handles.
///
/// Element `i` of `funcaddrs` is the handle of the function the module calls
/// "function i", imports included; likewise for the other kinds. Executing
/// functions carry a shared reference to this table, which is all the
/// interpreter needs to resolve calls, memory accesses, and globals.
#[derive(Debug, Default)]
pub struct InstanceData {
    pub types: Vec<FunctionType>,
    pub funcaddrs: Vec<FuncAddr>,
    pub memaddrs: Vec<MemoryAddr>,
    pub tableaddrs: Vec<TableAddr>,
    pub globaladdrs: Vec<GlobalAddr>,
}

/// A WebAssembly module instance.
#[derive(Debug)]
pub struct Instance {
    module: Module,
    store: SharedStore,
    data: Rc<InstanceData>,
    options: InterpreterOptions,
}

impl Instance {
    /// Instantiate `module` against `store` with default interpreter
    /// options.
    pub fn new(module: Module, store: &SharedStore) -> Result<Instance, RuntimeError> {
        Instance::new_with_options(module, store, InterpreterOptions::default())
    }

    /// Instantiate `module` against `store`.
    ///
    /// Resolves imports, allocates Store handles for every definition,
    /// evaluates global initialisers, applies data and element segments,
    /// and runs the start function.
    pub fn new_with_options(
        module: Module,
        store: &SharedStore,
        options: InterpreterOptions,
    ) -> Result<Instance, RuntimeError> {
        let mut data = InstanceData {
            types: module.types.clone(),
            ..InstanceData::default()
        };

        // Imported memories, tables, and globals, in import order. Function
        // imports are resolved below, where the function index space is
        // walked.
        {
            let store_ref = store.borrow();
            for import in &module.imports {
                let resolved = store_ref.import(&import.module, &import.name)?;
                match (&import.kind, resolved) {
                    (ImportKind::Func { .. }, ExternVal::Func(_)) => {}
                    (ImportKind::Memory(_), ExternVal::Memory(addr)) => data.memaddrs.push(addr),
                    (ImportKind::Table(_), ExternVal::Table(addr)) => data.tableaddrs.push(addr),
                    (ImportKind::Global { .. }, ExternVal::Global(addr)) => {
                        data.globaladdrs.push(addr)
                    }
                    _ => {
                        return Err(SetupError::ImportKindMismatch {
                            module: import.module.clone(),
                            name: import.name.clone(),
                        }
                        .into());
                    }
                }
            }
        }

        // The function index space. Imports resolve to existing handles;
        // definitions take the next handles the Store will issue when the
        // functions are added further down.
        let mut next_func = store.borrow().function_count();
        for (index, function) in module.functions.iter().enumerate() {
            match function.import {
                Some(import_index) => {
                    let import =
                        module.imports.get(import_index as usize).ok_or_else(|| {
                            SetupError::MalformedCode(format!(
                                "function {index} references import {import_index} which does not exist"
                            ))
                        })?;
                    let store_ref = store.borrow();
                    let resolved = store_ref.import(&import.module, &import.name)?;
                    let ExternVal::Func(addr) = resolved else {
                        return Err(SetupError::ImportKindMismatch {
                            module: import.module.clone(),
                            name: import.name.clone(),
                        }
                        .into());
                    };
                    let expected = module
                        .types
                        .get(function.type_index as usize)
                        .ok_or(SetupError::FuncIndexExceedsTypesLength)?;
                    if store_ref.function_type(addr)? != expected {
                        return Err(SetupError::ImportTypeMismatch {
                            module: import.module.clone(),
                            name: import.name.clone(),
                        }
                        .into());
                    }
                    data.funcaddrs.push(addr);
                }
                None => {
                    data.funcaddrs.push(FuncAddr(next_func));
                    next_func += 1;
                }
            }
        }

        // Locally defined memories and tables.
        {
            let mut store_mut = store.borrow_mut();
            for memory in &module.memories {
                data.memaddrs
                    .push(store_mut.add_memory(memory.limits.min, memory.limits.max)?);
            }
            for table in &module.tables {
                data.tableaddrs
                    .push(store_mut.add_table(table.limits.min, table.limits.max));
            }
        }

        // Locally defined globals take the next handles; the predicted
        // addresses let initialiser expressions read earlier globals while
        // later ones are still being evaluated.
        let next_global = store.borrow().global_count();
        for offset in 0..module.globals.len() {
            data.globaladdrs.push(GlobalAddr(next_global + offset));
        }

        let data = Rc::new(data);

        for global in &module.globals {
            let mut executor = Executor::new(store.clone(), options);
            let cell = executor.invoke_expression(&data, &global.init)?;
            store
                .borrow_mut()
                .add_global(global.value_type, global.mutable, cell);
        }

        // Lower and add the defined functions, materialising the predicted
        // handles.
        for function in &module.functions {
            if function.import.is_some() {
                continue;
            }
            let func_type = module
                .types
                .get(function.type_index as usize)
                .ok_or(SetupError::FuncIndexExceedsTypesLength)?
                .clone();
            let code: Rc<[Instruction]> = Rc::from(resolve_branch_targets(&function.code)?);
            store.borrow_mut().add_wasm_function(WasmFunction {
                func_type,
                locals_count: function.locals_count,
                code,
                instance: data.clone(),
            });
        }

        // Active data segments.
        for segment in &module.data {
            let addr = data
                .memaddrs
                .get(segment.memory_index as usize)
                .copied()
                .ok_or(SetupError::MemoryIndexOutOfBounds(segment.memory_index))?;
            let mut executor = Executor::new(store.clone(), options);
            let offset = executor.invoke_expression(&data, &segment.offset)? as u32;
            store
                .borrow_mut()
                .memory_mut(addr)?
                .write_bytes(offset, &segment.bytes)?;
        }

        // Active element segments.
        for segment in &module.elements {
            let table_addr = data
                .tableaddrs
                .get(segment.table_index as usize)
                .copied()
                .ok_or(SetupError::TableIndexOutOfBounds(segment.table_index))?;
            let mut executor = Executor::new(store.clone(), options);
            let offset = executor.invoke_expression(&data, &segment.offset)? as u32;

            let mut store_mut = store.borrow_mut();
            let table = store_mut.table_mut(table_addr)?;
            for (position, func_index) in segment.functions.iter().enumerate() {
                let func_addr = data
                    .funcaddrs
                    .get(*func_index as usize)
                    .copied()
                    .ok_or(SetupError::FunctionIndexOutOfBounds(*func_index))?;
                let slot = offset
                    .checked_add(position as u32)
                    .ok_or(Trap::OutOfBoundsTableAccess)?;
                table.set(slot, Some(func_addr))?;
            }
        }

        let instance = Instance {
            module,
            store: store.clone(),
            data,
            options,
        };

        // The start function runs once everything else is in place.
        if let Some(start) = instance.module.start {
            let addr = instance
                .data
                .funcaddrs
                .get(start as usize)
                .copied()
                .ok_or(SetupError::FunctionIndexOutOfBounds(start))?;
            let mut executor = Executor::new(instance.store.clone(), options);
            executor.invoke(addr, &[])?;
        }

        Ok(instance)
    }

    /// Invoke the named Func export with statically typed arguments.
    ///
    /// Argument types must equal the declared parameter types; `R` must
    /// match the single declared result, or be `()` for a void function.
    /// Functions declaring more than one result are rejected with
    /// `OnlySingleReturnValueSupported`.
    pub fn invoke_typed<R: HostValue>(&self, name: &str, args: &[Value]) -> Result<R, RuntimeError> {
        let (addr, func_type) = self.resolve_func_export(name)?;

        if args.len() != func_type.params.len() {
            return Err(SetupError::ParamCountMismatch {
                expected: func_type.params.len(),
                actual: args.len(),
            }
            .into());
        }
        for (index, (arg, &expected)) in args.iter().zip(&func_type.params).enumerate() {
            if arg.typ() != expected {
                return Err(SetupError::ParamTypeMismatch {
                    index,
                    expected,
                    actual: arg.typ(),
                }
                .into());
            }
        }
        if func_type.results.len() > 1 {
            return Err(SetupError::OnlySingleReturnValueSupported.into());
        }
        let declared = func_type.results.first().copied();
        if R::value_type() != declared {
            return Err(SetupError::ResultTypeMismatch {
                expected: declared,
                actual: R::value_type(),
            }
            .into());
        }

        let cells: Vec<u64> = args.iter().map(Value::to_cell).collect();
        let mut executor = Executor::new(self.store.clone(), self.options);
        let results = executor.invoke(addr, &cells)?;
        Ok(R::from_cell(results.first().copied().unwrap_or(0)))
    }

    /// Invoke the named Func export with values already encoded as 64-bit
    /// cells. Only counts are checked, not element types. Results are
    /// written to `out_values` in declaration order.
    ///
    /// Host-function targets are rejected with
    /// `InvokeDynamicHostFunctionNotImplemented`.
    pub fn invoke_dynamic(
        &self,
        name: &str,
        in_values: &[u64],
        out_values: &mut Vec<u64>,
    ) -> Result<(), RuntimeError> {
        let (addr, func_type) = self.resolve_func_export(name)?;

        if matches!(self.store.borrow().function(addr)?, Function::Host(_)) {
            return Err(SetupError::InvokeDynamicHostFunctionNotImplemented.into());
        }
        if in_values.len() != func_type.params.len() {
            return Err(SetupError::ParamCountMismatch {
                expected: func_type.params.len(),
                actual: in_values.len(),
            }
            .into());
        }
        if func_type.results.len() > 1 {
            return Err(SetupError::OnlySingleReturnValueSupported.into());
        }

        let mut executor = Executor::new(self.store.clone(), self.options);
        let results = executor.invoke(addr, in_values)?;
        out_values.clear();
        out_values.extend(results);
        Ok(())
    }

    /// Execute a detached constant expression against this instance, e.g.
    /// to evaluate the kind of initialiser a global or segment offset uses.
    pub fn invoke_expression<R: HostValue>(&self, expr: &[Instruction]) -> Result<R, RuntimeError> {
        let mut executor = Executor::new(self.store.clone(), self.options);
        let cell = executor.invoke_expression(&self.data, expr)?;
        Ok(R::from_cell(cell))
    }

    /// The Store handle of an exported function, for cross-instance linking
    /// or table population.
    pub fn function_export(&self, name: &str) -> Result<FuncAddr, RuntimeError> {
        Ok(self.resolve_func_export(name)?.0)
    }

    /// The Store handle of an exported memory.
    pub fn memory_export(&self, name: &str) -> Result<MemoryAddr, RuntimeError> {
        let export = self.export_of_kind(name, ExportKind::Memory)?;
        self.data
            .memaddrs
            .get(export as usize)
            .copied()
            .ok_or(SetupError::MemoryIndexOutOfBounds(export).into())
    }

    /// The Store handle of an exported table.
    pub fn table_export(&self, name: &str) -> Result<TableAddr, RuntimeError> {
        let export = self.export_of_kind(name, ExportKind::Table)?;
        self.data
            .tableaddrs
            .get(export as usize)
            .copied()
            .ok_or(SetupError::TableIndexOutOfBounds(export).into())
    }

    /// The current value of an exported global.
    pub fn global_export(&self, name: &str) -> Result<Value, RuntimeError> {
        let export = self.export_of_kind(name, ExportKind::Global)?;
        let addr = self
            .data
            .globaladdrs
            .get(export as usize)
            .copied()
            .ok_or(SetupError::GlobalIndexOutOfBounds(export))?;
        let store = self.store.borrow();
        let global = store.global(addr)?;
        Ok(Value::from_cell(global.value_type, global.value))
    }

    /// The decoded module this instance was built from.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// The Store this instance allocates into.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    fn export_of_kind(&self, name: &str, kind: ExportKind) -> Result<u32, SetupError> {
        let export = self
            .module
            .export(name)
            .ok_or_else(|| SetupError::UnknownExport(name.to_string()))?;
        if export.kind != kind {
            return Err(SetupError::UnknownExport(name.to_string()));
        }
        Ok(export.index)
    }

    /// Resolve a named Func export to its handle and signature.
    fn resolve_func_export(&self, name: &str) -> Result<(FuncAddr, FunctionType), RuntimeError> {
        let index = self.export_of_kind(name, ExportKind::Func)?;
        let addr = self
            .data
            .funcaddrs
            .get(index as usize)
            .copied()
            .ok_or(SetupError::FuncIndexExceedsTypesLength)?;
        let func_type = self.store.borrow().function_type(addr)?.clone();
        Ok((addr, func_type))
    }
}

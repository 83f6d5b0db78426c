//! WebAssembly instruction executor
//!
//! One executor is allocated per invocation. It owns the three
//! capacity-limited stacks (operand cells, call frames, labels) and runs a
//! single dispatch loop over branch-resolved instruction arrays. Wasm-to-wasm
//! calls push a frame and continue inside the same loop; host calls run
//! inline against a view of the operand stack. On return or trap the stacks
//! are discarded with the executor.

use super::control::{Label, LabelStack, NO_CONTINUATION};
use super::frame::{Frame, FrameStack};
use super::host::{HostContext, HostFunction};
use super::instance::InstanceData;
use super::ops;
use super::stack::OperandStack;
use super::store::{FuncAddr, Function, MemoryAddr, SharedStore};
use super::{InterpreterOptions, RuntimeError, SetupError, Trap};
use crate::module::builder::resolve_branch_targets;
use crate::module::instruction::Instruction;
use std::rc::Rc;

/// Where the dispatch loop continues after a control transfer.
enum Transfer {
    /// Jump within the current function.
    Jump(usize),
    /// Switch to another frame's code (a call entering a callee, or a
    /// return resuming the caller).
    Resume(Rc<[Instruction]>, Rc<InstanceData>, usize),
    /// The invocation's outermost frame returned.
    Done,
}

/// The memory a memory instruction operates on (index 0 of the instance's
/// memory address space).
fn memaddr(instance: &InstanceData) -> Result<MemoryAddr, SetupError> {
    instance
        .memaddrs
        .first()
        .copied()
        .ok_or(SetupError::MemoryIndexOutOfBounds(0))
}

/// Executes WebAssembly instructions against a Store.
pub struct Executor {
    store: SharedStore,
    operands: OperandStack,
    frames: FrameStack,
    labels: LabelStack,
}

impl Executor {
    /// Create an executor with freshly allocated stacks.
    pub fn new(store: SharedStore, options: InterpreterOptions) -> Self {
        Executor {
            store,
            operands: OperandStack::new(options.operand_stack_size),
            frames: FrameStack::new(options.control_stack_size),
            labels: LabelStack::new(options.label_stack_size),
        }
    }

    /// Invoke the function at `addr` with arguments already encoded as
    /// cells, returning the result cells in declaration order.
    pub fn invoke(&mut self, addr: FuncAddr, args: &[u64]) -> Result<Vec<u64>, RuntimeError> {
        let return_arity = self.store.borrow().function_type(addr)?.results.len();

        for &cell in args {
            self.operands.push(cell)?;
        }

        let outer_depth = self.frames.depth();
        self.call_function(addr)?;
        if self.frames.depth() > outer_depth {
            self.run(outer_depth)?;
        }

        let mut results = vec![0u64; return_arity];
        for slot in results.iter_mut().rev() {
            *slot = self.operands.pop()?;
        }
        Ok(results)
    }

    /// Execute a detached constant expression (a global initialiser or a
    /// segment offset) with one implicit frame and label and arity 1.
    pub fn invoke_expression(
        &mut self,
        instance: &Rc<InstanceData>,
        expr: &[Instruction],
    ) -> Result<u64, RuntimeError> {
        let code: Rc<[Instruction]> = Rc::from(resolve_branch_targets(expr)?);
        let base_depth = self.frames.depth();
        let op_stack_base = self.operands.len();

        self.frames.push(Frame {
            op_stack_base,
            label_stack_base: self.labels.depth(),
            locals_base: op_stack_base,
            return_arity: 1,
            pc: 0,
            code,
            instance: instance.clone(),
        })?;
        self.labels.push(Label {
            return_arity: 1,
            op_stack_base,
            continuation_pc: NO_CONTINUATION,
        })?;

        self.run(base_depth)?;
        Ok(self.operands.pop()?)
    }

    /// Dispatch either variant of the function at `addr`. Arguments must
    /// already sit on top of the operand stack. A wasm callee gets a frame
    /// and its implicit label pushed; a host callee runs to completion here.
    fn call_function(&mut self, addr: FuncAddr) -> Result<(), RuntimeError> {
        enum Target {
            Wasm {
                param_count: usize,
                return_arity: usize,
                locals_count: u32,
                code: Rc<[Instruction]>,
                instance: Rc<InstanceData>,
            },
            Host(HostFunction),
        }

        let target = {
            let store = self.store.borrow();
            match store.function(addr)? {
                Function::Wasm(func) => Target::Wasm {
                    param_count: func.func_type.params.len(),
                    return_arity: func.func_type.results.len(),
                    locals_count: func.locals_count,
                    code: func.code.clone(),
                    instance: func.instance.clone(),
                },
                Function::Host(func) => Target::Host(func.clone()),
            }
        };

        match target {
            Target::Wasm {
                param_count,
                return_arity,
                locals_count,
                code,
                instance,
            } => {
                let op_stack_base = self
                    .operands
                    .len()
                    .checked_sub(param_count)
                    .ok_or(Trap::StackUnderflow)?;
                for _ in 0..locals_count {
                    self.operands.push(0)?;
                }
                self.frames.push(Frame {
                    op_stack_base,
                    label_stack_base: self.labels.depth(),
                    locals_base: op_stack_base,
                    return_arity,
                    pc: 0,
                    code,
                    instance,
                })?;
                self.labels.push(Label {
                    return_arity,
                    op_stack_base,
                    continuation_pc: NO_CONTINUATION,
                })?;
                Ok(())
            }
            Target::Host(func) => self.call_host(func),
        }
    }

    /// Run a host callable against the operand stack, verifying it consumed
    /// its parameters and produced its results.
    fn call_host(&mut self, func: HostFunction) -> Result<(), RuntimeError> {
        let param_count = func.func_type.params.len();
        let result_count = func.func_type.results.len();
        let depth_before = self.operands.len();
        if depth_before < param_count {
            return Err(Trap::StackUnderflow.into());
        }

        let mut ctx = HostContext::new(&mut self.operands, &self.store);
        (func.callable)(&mut ctx)?;

        let expected = depth_before - param_count + result_count;
        if self.operands.len() != expected {
            return Err(Trap::Host(format!(
                "host function left {} operands, expected {expected}",
                self.operands.len()
            ))
            .into());
        }
        Ok(())
    }

    /// Save the caller's continuation and dispatch a call instruction.
    fn enter(&mut self, addr: FuncAddr, return_pc: usize) -> Result<Transfer, RuntimeError> {
        self.frames.top_mut()?.pc = return_pc;
        let depth = self.frames.depth();
        self.call_function(addr)?;
        if self.frames.depth() > depth {
            let callee = self.frames.top()?;
            Ok(Transfer::Resume(
                callee.code.clone(),
                callee.instance.clone(),
                0,
            ))
        } else {
            // Host call, completed inline.
            Ok(Transfer::Jump(return_pc))
        }
    }

    /// Pop the current frame: move the declared results down to the frame's
    /// operand base and resume the caller, or report completion when the
    /// frame stack is back at `until_depth`.
    fn finish_function(&mut self, until_depth: usize) -> Result<Transfer, RuntimeError> {
        let frame = self.frames.pop()?;
        self.labels.truncate(frame.label_stack_base);
        self.operands.unwind(frame.op_stack_base, frame.return_arity)?;

        if self.frames.depth() == until_depth {
            return Ok(Transfer::Done);
        }
        let caller = self.frames.top()?;
        Ok(Transfer::Resume(
            caller.code.clone(),
            caller.instance.clone(),
            caller.pc,
        ))
    }

    /// Branch `depth` labels outward: keep the target's arity worth of
    /// values, discard the rest, and jump to its continuation. A branch to
    /// the function's implicit label is a return.
    fn branch(&mut self, depth: u32, until_depth: usize) -> Result<Transfer, RuntimeError> {
        let frame_label_base = self.frames.top()?.label_stack_base;
        let index = self
            .labels
            .depth()
            .checked_sub(1 + depth as usize)
            .filter(|&index| index >= frame_label_base)
            .ok_or_else(|| {
                SetupError::MalformedCode(format!("branch depth {depth} has no target label"))
            })?;

        if index == frame_label_base {
            return self.finish_function(until_depth);
        }

        let label = *self.labels.get(index).ok_or(Trap::StackUnderflow)?;
        self.operands
            .unwind(label.op_stack_base, label.return_arity)?;
        self.labels.truncate(index);
        Ok(Transfer::Jump(label.continuation_pc as usize))
    }

    /// The dispatch loop. Runs until the frame stack drops back to
    /// `until_depth`, i.e. until the frame that was on top when this was
    /// called has returned.
    fn run(&mut self, until_depth: usize) -> Result<(), RuntimeError> {
        let top = self.frames.top()?;
        let mut code = top.code.clone();
        let mut instance = top.instance.clone();
        let mut pc = top.pc;

        macro_rules! op {
            ($f:path) => {{
                $f(&mut self.operands)?;
                None
            }};
        }
        macro_rules! load {
            ($f:ident, $memarg:expr) => {{
                let addr = memaddr(&instance)?;
                let store = self.store.borrow();
                ops::memory::$f(&mut self.operands, store.memory(addr)?, $memarg)?;
                None
            }};
        }
        macro_rules! store_to {
            ($f:ident, $memarg:expr) => {{
                let addr = memaddr(&instance)?;
                let mut store = self.store.borrow_mut();
                ops::memory::$f(&mut self.operands, store.memory_mut(addr)?, $memarg)?;
                None
            }};
        }

        loop {
            let transfer = {
                let Some(instruction) = code.get(pc) else {
                    return Err(SetupError::MalformedCode(format!(
                        "program counter {pc} past end of function"
                    ))
                    .into());
                };
                pc += 1;

                match instruction {
                    // Control instructions
                    Instruction::Unreachable => return Err(Trap::UnreachableExecuted.into()),
                    Instruction::Nop => None,
                    Instruction::Block { block_type, end } => {
                        self.labels.push(Label {
                            return_arity: block_type.arity(),
                            op_stack_base: self.operands.len(),
                            continuation_pc: *end,
                        })?;
                        None
                    }
                    Instruction::Loop { .. } => {
                        // A branch to a loop label re-executes the loop head,
                        // which pushes a fresh label.
                        self.labels.push(Label {
                            return_arity: 0,
                            op_stack_base: self.operands.len(),
                            continuation_pc: (pc - 1) as u32,
                        })?;
                        None
                    }
                    Instruction::If {
                        block_type,
                        else_target,
                        end,
                    } => {
                        let cond = self.operands.pop_i32()?;
                        if cond != 0 {
                            self.labels.push(Label {
                                return_arity: block_type.arity(),
                                op_stack_base: self.operands.len(),
                                continuation_pc: *end,
                            })?;
                            None
                        } else if let Some(else_target) = else_target {
                            self.labels.push(Label {
                                return_arity: block_type.arity(),
                                op_stack_base: self.operands.len(),
                                continuation_pc: *end,
                            })?;
                            Some(Transfer::Jump(*else_target as usize))
                        } else {
                            // No else branch: skip past the end without
                            // entering the construct.
                            Some(Transfer::Jump(*end as usize))
                        }
                    }
                    Instruction::Else { end } => {
                        // Fell out of the true branch: the construct is done.
                        self.labels.pop()?;
                        Some(Transfer::Jump(*end as usize))
                    }
                    Instruction::End => {
                        let frame_label_base = self.frames.top()?.label_stack_base;
                        if self.labels.depth() == frame_label_base + 1 {
                            // The function's implicit label.
                            Some(self.finish_function(until_depth)?)
                        } else {
                            self.labels.pop()?;
                            None
                        }
                    }
                    Instruction::Br { depth } => Some(self.branch(*depth, until_depth)?),
                    Instruction::BrIf { depth } => {
                        let cond = self.operands.pop_i32()?;
                        if cond != 0 {
                            Some(self.branch(*depth, until_depth)?)
                        } else {
                            None
                        }
                    }
                    Instruction::BrTable { targets, default } => {
                        let selector = self.operands.pop_i32()? as u32;
                        let depth = targets
                            .get(selector as usize)
                            .copied()
                            .unwrap_or(*default);
                        Some(self.branch(depth, until_depth)?)
                    }
                    Instruction::Return => Some(self.finish_function(until_depth)?),
                    Instruction::Call { func_index } => {
                        let addr = instance
                            .funcaddrs
                            .get(*func_index as usize)
                            .copied()
                            .ok_or(SetupError::FunctionIndexOutOfBounds(*func_index))?;
                        Some(self.enter(addr, pc)?)
                    }
                    Instruction::CallIndirect {
                        type_index,
                        table_index,
                    } => {
                        let index = self.operands.pop_i32()? as u32;
                        let table_addr = instance
                            .tableaddrs
                            .get(*table_index as usize)
                            .copied()
                            .ok_or(SetupError::TableIndexOutOfBounds(*table_index))?;
                        let expected = instance
                            .types
                            .get(*type_index as usize)
                            .ok_or(SetupError::FuncIndexExceedsTypesLength)?;
                        let addr = {
                            let store = self.store.borrow();
                            let addr = store.indirect_target(table_addr, index)?;
                            if store.function_type(addr)? != expected {
                                return Err(Trap::IndirectCallTypeMismatch.into());
                            }
                            addr
                        };
                        Some(self.enter(addr, pc)?)
                    }

                    // Parametric instructions
                    Instruction::Drop => {
                        self.operands.pop()?;
                        None
                    }
                    Instruction::Select => {
                        let cond = self.operands.pop_i32()?;
                        let val2 = self.operands.pop()?;
                        let val1 = self.operands.pop()?;
                        self.operands.push(if cond != 0 { val1 } else { val2 })?;
                        None
                    }

                    // Variable instructions
                    Instruction::LocalGet { index } => {
                        let base = self.frames.top()?.locals_base;
                        let cell = self.operands.get(base + *index as usize)?;
                        self.operands.push(cell)?;
                        None
                    }
                    Instruction::LocalSet { index } => {
                        let base = self.frames.top()?.locals_base;
                        let cell = self.operands.pop()?;
                        self.operands.set(base + *index as usize, cell)?;
                        None
                    }
                    Instruction::LocalTee { index } => {
                        let base = self.frames.top()?.locals_base;
                        let cell = self.operands.peek()?;
                        self.operands.set(base + *index as usize, cell)?;
                        None
                    }
                    Instruction::GlobalGet { index } => {
                        let addr = instance
                            .globaladdrs
                            .get(*index as usize)
                            .copied()
                            .ok_or(SetupError::GlobalIndexOutOfBounds(*index))?;
                        let cell = self.store.borrow().global(addr)?.value;
                        self.operands.push(cell)?;
                        None
                    }
                    Instruction::GlobalSet { index } => {
                        let addr = instance
                            .globaladdrs
                            .get(*index as usize)
                            .copied()
                            .ok_or(SetupError::GlobalIndexOutOfBounds(*index))?;
                        let cell = self.operands.pop()?;
                        self.store.borrow_mut().global_mut(addr)?.value = cell;
                        None
                    }

                    // Memory instructions
                    Instruction::I32Load { memarg } => load!(i32_load, *memarg),
                    Instruction::I64Load { memarg } => load!(i64_load, *memarg),
                    Instruction::F32Load { memarg } => load!(f32_load, *memarg),
                    Instruction::F64Load { memarg } => load!(f64_load, *memarg),
                    Instruction::I32Load8S { memarg } => load!(i32_load8_s, *memarg),
                    Instruction::I32Load8U { memarg } => load!(i32_load8_u, *memarg),
                    Instruction::I32Load16S { memarg } => load!(i32_load16_s, *memarg),
                    Instruction::I32Load16U { memarg } => load!(i32_load16_u, *memarg),
                    Instruction::I64Load8S { memarg } => load!(i64_load8_s, *memarg),
                    Instruction::I64Load8U { memarg } => load!(i64_load8_u, *memarg),
                    Instruction::I64Load16S { memarg } => load!(i64_load16_s, *memarg),
                    Instruction::I64Load16U { memarg } => load!(i64_load16_u, *memarg),
                    Instruction::I64Load32S { memarg } => load!(i64_load32_s, *memarg),
                    Instruction::I64Load32U { memarg } => load!(i64_load32_u, *memarg),
                    Instruction::I32Store { memarg } => store_to!(i32_store, *memarg),
                    Instruction::I64Store { memarg } => store_to!(i64_store, *memarg),
                    Instruction::F32Store { memarg } => store_to!(f32_store, *memarg),
                    Instruction::F64Store { memarg } => store_to!(f64_store, *memarg),
                    Instruction::I32Store8 { memarg } => store_to!(i32_store8, *memarg),
                    Instruction::I32Store16 { memarg } => store_to!(i32_store16, *memarg),
                    Instruction::I64Store8 { memarg } => store_to!(i64_store8, *memarg),
                    Instruction::I64Store16 { memarg } => store_to!(i64_store16, *memarg),
                    Instruction::I64Store32 { memarg } => store_to!(i64_store32, *memarg),
                    Instruction::MemorySize => {
                        let addr = memaddr(&instance)?;
                        let store = self.store.borrow();
                        ops::memory::memory_size(&mut self.operands, store.memory(addr)?)?;
                        None
                    }
                    Instruction::MemoryGrow => {
                        let addr = memaddr(&instance)?;
                        let mut store = self.store.borrow_mut();
                        ops::memory::memory_grow(&mut self.operands, store.memory_mut(addr)?)?;
                        None
                    }

                    // Constants
                    Instruction::I32Const { value } => {
                        self.operands.push_i32(*value)?;
                        None
                    }
                    Instruction::I64Const { value } => {
                        self.operands.push_i64(*value)?;
                        None
                    }
                    Instruction::F32Const { value } => {
                        self.operands.push_f32(*value)?;
                        None
                    }
                    Instruction::F64Const { value } => {
                        self.operands.push_f64(*value)?;
                        None
                    }

                    // i32 comparison
                    Instruction::I32Eqz => op!(ops::comparison::i32_eqz),
                    Instruction::I32Eq => op!(ops::comparison::i32_eq),
                    Instruction::I32Ne => op!(ops::comparison::i32_ne),
                    Instruction::I32LtS => op!(ops::comparison::i32_lt_s),
                    Instruction::I32LtU => op!(ops::comparison::i32_lt_u),
                    Instruction::I32GtS => op!(ops::comparison::i32_gt_s),
                    Instruction::I32GtU => op!(ops::comparison::i32_gt_u),
                    Instruction::I32LeS => op!(ops::comparison::i32_le_s),
                    Instruction::I32LeU => op!(ops::comparison::i32_le_u),
                    Instruction::I32GeS => op!(ops::comparison::i32_ge_s),
                    Instruction::I32GeU => op!(ops::comparison::i32_ge_u),

                    // i64 comparison
                    Instruction::I64Eqz => op!(ops::comparison::i64_eqz),
                    Instruction::I64Eq => op!(ops::comparison::i64_eq),
                    Instruction::I64Ne => op!(ops::comparison::i64_ne),
                    Instruction::I64LtS => op!(ops::comparison::i64_lt_s),
                    Instruction::I64LtU => op!(ops::comparison::i64_lt_u),
                    Instruction::I64GtS => op!(ops::comparison::i64_gt_s),
                    Instruction::I64GtU => op!(ops::comparison::i64_gt_u),
                    Instruction::I64LeS => op!(ops::comparison::i64_le_s),
                    Instruction::I64LeU => op!(ops::comparison::i64_le_u),
                    Instruction::I64GeS => op!(ops::comparison::i64_ge_s),
                    Instruction::I64GeU => op!(ops::comparison::i64_ge_u),

                    // f32 comparison
                    Instruction::F32Eq => op!(ops::comparison::f32_eq),
                    Instruction::F32Ne => op!(ops::comparison::f32_ne),
                    Instruction::F32Lt => op!(ops::comparison::f32_lt),
                    Instruction::F32Gt => op!(ops::comparison::f32_gt),
                    Instruction::F32Le => op!(ops::comparison::f32_le),
                    Instruction::F32Ge => op!(ops::comparison::f32_ge),

                    // f64 comparison
                    Instruction::F64Eq => op!(ops::comparison::f64_eq),
                    Instruction::F64Ne => op!(ops::comparison::f64_ne),
                    Instruction::F64Lt => op!(ops::comparison::f64_lt),
                    Instruction::F64Gt => op!(ops::comparison::f64_gt),
                    Instruction::F64Le => op!(ops::comparison::f64_le),
                    Instruction::F64Ge => op!(ops::comparison::f64_ge),

                    // i32 arithmetic and bitwise
                    Instruction::I32Clz => op!(ops::numeric::i32_clz),
                    Instruction::I32Ctz => op!(ops::numeric::i32_ctz),
                    Instruction::I32Popcnt => op!(ops::numeric::i32_popcnt),
                    Instruction::I32Add => op!(ops::numeric::i32_add),
                    Instruction::I32Sub => op!(ops::numeric::i32_sub),
                    Instruction::I32Mul => op!(ops::numeric::i32_mul),
                    Instruction::I32DivS => op!(ops::numeric::i32_div_s),
                    Instruction::I32DivU => op!(ops::numeric::i32_div_u),
                    Instruction::I32RemS => op!(ops::numeric::i32_rem_s),
                    Instruction::I32RemU => op!(ops::numeric::i32_rem_u),
                    Instruction::I32And => op!(ops::bitwise::i32_and),
                    Instruction::I32Or => op!(ops::bitwise::i32_or),
                    Instruction::I32Xor => op!(ops::bitwise::i32_xor),
                    Instruction::I32Shl => op!(ops::bitwise::i32_shl),
                    Instruction::I32ShrS => op!(ops::bitwise::i32_shr_s),
                    Instruction::I32ShrU => op!(ops::bitwise::i32_shr_u),
                    Instruction::I32Rotl => op!(ops::bitwise::i32_rotl),
                    Instruction::I32Rotr => op!(ops::bitwise::i32_rotr),

                    // i64 arithmetic and bitwise
                    Instruction::I64Clz => op!(ops::numeric::i64_clz),
                    Instruction::I64Ctz => op!(ops::numeric::i64_ctz),
                    Instruction::I64Popcnt => op!(ops::numeric::i64_popcnt),
                    Instruction::I64Add => op!(ops::numeric::i64_add),
                    Instruction::I64Sub => op!(ops::numeric::i64_sub),
                    Instruction::I64Mul => op!(ops::numeric::i64_mul),
                    Instruction::I64DivS => op!(ops::numeric::i64_div_s),
                    Instruction::I64DivU => op!(ops::numeric::i64_div_u),
                    Instruction::I64RemS => op!(ops::numeric::i64_rem_s),
                    Instruction::I64RemU => op!(ops::numeric::i64_rem_u),
                    Instruction::I64And => op!(ops::bitwise::i64_and),
                    Instruction::I64Or => op!(ops::bitwise::i64_or),
                    Instruction::I64Xor => op!(ops::bitwise::i64_xor),
                    Instruction::I64Shl => op!(ops::bitwise::i64_shl),
                    Instruction::I64ShrS => op!(ops::bitwise::i64_shr_s),
                    Instruction::I64ShrU => op!(ops::bitwise::i64_shr_u),
                    Instruction::I64Rotl => op!(ops::bitwise::i64_rotl),
                    Instruction::I64Rotr => op!(ops::bitwise::i64_rotr),

                    // f32 arithmetic
                    Instruction::F32Abs => op!(ops::numeric::f32_abs),
                    Instruction::F32Neg => op!(ops::numeric::f32_neg),
                    Instruction::F32Ceil => op!(ops::numeric::f32_ceil),
                    Instruction::F32Floor => op!(ops::numeric::f32_floor),
                    Instruction::F32Trunc => op!(ops::numeric::f32_trunc),
                    Instruction::F32Nearest => op!(ops::numeric::f32_nearest),
                    Instruction::F32Sqrt => op!(ops::numeric::f32_sqrt),
                    Instruction::F32Add => op!(ops::numeric::f32_add),
                    Instruction::F32Sub => op!(ops::numeric::f32_sub),
                    Instruction::F32Mul => op!(ops::numeric::f32_mul),
                    Instruction::F32Div => op!(ops::numeric::f32_div),
                    Instruction::F32Min => op!(ops::numeric::f32_min),
                    Instruction::F32Max => op!(ops::numeric::f32_max),
                    Instruction::F32Copysign => op!(ops::numeric::f32_copysign),

                    // f64 arithmetic
                    Instruction::F64Abs => op!(ops::numeric::f64_abs),
                    Instruction::F64Neg => op!(ops::numeric::f64_neg),
                    Instruction::F64Ceil => op!(ops::numeric::f64_ceil),
                    Instruction::F64Floor => op!(ops::numeric::f64_floor),
                    Instruction::F64Trunc => op!(ops::numeric::f64_trunc),
                    Instruction::F64Nearest => op!(ops::numeric::f64_nearest),
                    Instruction::F64Sqrt => op!(ops::numeric::f64_sqrt),
                    Instruction::F64Add => op!(ops::numeric::f64_add),
                    Instruction::F64Sub => op!(ops::numeric::f64_sub),
                    Instruction::F64Mul => op!(ops::numeric::f64_mul),
                    Instruction::F64Div => op!(ops::numeric::f64_div),
                    Instruction::F64Min => op!(ops::numeric::f64_min),
                    Instruction::F64Max => op!(ops::numeric::f64_max),
                    Instruction::F64Copysign => op!(ops::numeric::f64_copysign),

                    // Conversions
                    Instruction::I32WrapI64 => op!(ops::conversion::i32_wrap_i64),
                    Instruction::I32TruncF32S => op!(ops::conversion::i32_trunc_f32_s),
                    Instruction::I32TruncF32U => op!(ops::conversion::i32_trunc_f32_u),
                    Instruction::I32TruncF64S => op!(ops::conversion::i32_trunc_f64_s),
                    Instruction::I32TruncF64U => op!(ops::conversion::i32_trunc_f64_u),
                    Instruction::I64ExtendI32S => op!(ops::conversion::i64_extend_i32_s),
                    Instruction::I64ExtendI32U => op!(ops::conversion::i64_extend_i32_u),
                    Instruction::I64TruncF32S => op!(ops::conversion::i64_trunc_f32_s),
                    Instruction::I64TruncF32U => op!(ops::conversion::i64_trunc_f32_u),
                    Instruction::I64TruncF64S => op!(ops::conversion::i64_trunc_f64_s),
                    Instruction::I64TruncF64U => op!(ops::conversion::i64_trunc_f64_u),
                    Instruction::F32ConvertI32S => op!(ops::conversion::f32_convert_i32_s),
                    Instruction::F32ConvertI32U => op!(ops::conversion::f32_convert_i32_u),
                    Instruction::F32ConvertI64S => op!(ops::conversion::f32_convert_i64_s),
                    Instruction::F32ConvertI64U => op!(ops::conversion::f32_convert_i64_u),
                    Instruction::F32DemoteF64 => op!(ops::conversion::f32_demote_f64),
                    Instruction::F64ConvertI32S => op!(ops::conversion::f64_convert_i32_s),
                    Instruction::F64ConvertI32U => op!(ops::conversion::f64_convert_i32_u),
                    Instruction::F64ConvertI64S => op!(ops::conversion::f64_convert_i64_s),
                    Instruction::F64ConvertI64U => op!(ops::conversion::f64_convert_i64_u),
                    Instruction::F64PromoteF32 => op!(ops::conversion::f64_promote_f32),
                    Instruction::I32ReinterpretF32 => op!(ops::conversion::i32_reinterpret_f32),
                    Instruction::I64ReinterpretF64 => op!(ops::conversion::i64_reinterpret_f64),
                    Instruction::F32ReinterpretI32 => op!(ops::conversion::f32_reinterpret_i32),
                    Instruction::F64ReinterpretI64 => op!(ops::conversion::f64_reinterpret_i64),

                    // Sign extension
                    Instruction::I32Extend8S => op!(ops::conversion::i32_extend8_s),
                    Instruction::I32Extend16S => op!(ops::conversion::i32_extend16_s),
                    Instruction::I64Extend8S => op!(ops::conversion::i64_extend8_s),
                    Instruction::I64Extend16S => op!(ops::conversion::i64_extend16_s),
                    Instruction::I64Extend32S => op!(ops::conversion::i64_extend32_s),
                }
            };

            match transfer {
                None => {}
                Some(Transfer::Jump(target)) => pc = target,
                Some(Transfer::Resume(next_code, next_instance, next_pc)) => {
                    code = next_code;
                    instance = next_instance;
                    pc = next_pc;
                }
                Some(Transfer::Done) => return Ok(()),
            }
        }
    }
}

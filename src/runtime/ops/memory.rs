//! Memory load and store operations
//!
//! The effective address of every access is the popped i32 base (treated as
//! unsigned) plus the instruction's static offset. The sum is computed in
//! 64 bits; anything past the 32-bit address space or the current memory
//! length traps with `OutOfBoundsMemoryAccess`.

use super::{MemArg, Memory, OperandStack, Trap};

/// Compute the effective address `base + memarg.offset`.
#[inline]
fn effective_address(base: i32, memarg: MemArg) -> Result<u32, Trap> {
    let ea = base as u32 as u64 + memarg.offset as u64;
    if ea > u32::MAX as u64 {
        return Err(Trap::OutOfBoundsMemoryAccess);
    }
    Ok(ea as u32)
}

// ============================================================================
// Loads
// ============================================================================

/// i32.load : [i32] -> [i32]
pub fn i32_load(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i32(ea)?;
    stack.push_i32(value)
}

/// i64.load : [i32] -> [i64]
pub fn i64_load(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i64(ea)?;
    stack.push_i64(value)
}

/// f32.load : [i32] -> [f32]
pub fn f32_load(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_f32(ea)?;
    stack.push_f32(value)
}

/// f64.load : [i32] -> [f64]
pub fn f64_load(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_f64(ea)?;
    stack.push_f64(value)
}

/// i32.load8_s : [i32] -> [i32], sign-extended
pub fn i32_load8_s(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i8(ea)?;
    stack.push_i32(value as i32)
}

/// i32.load8_u : [i32] -> [i32], zero-extended
pub fn i32_load8_u(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_u8(ea)?;
    stack.push_i32(value as i32)
}

/// i32.load16_s : [i32] -> [i32], sign-extended
pub fn i32_load16_s(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i16(ea)?;
    stack.push_i32(value as i32)
}

/// i32.load16_u : [i32] -> [i32], zero-extended
pub fn i32_load16_u(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_u16(ea)?;
    stack.push_i32(value as i32)
}

/// i64.load8_s : [i32] -> [i64], sign-extended
pub fn i64_load8_s(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i8(ea)?;
    stack.push_i64(value as i64)
}

/// i64.load8_u : [i32] -> [i64], zero-extended
pub fn i64_load8_u(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_u8(ea)?;
    stack.push_i64(value as i64)
}

/// i64.load16_s : [i32] -> [i64], sign-extended
pub fn i64_load16_s(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i16(ea)?;
    stack.push_i64(value as i64)
}

/// i64.load16_u : [i32] -> [i64], zero-extended
pub fn i64_load16_u(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_u16(ea)?;
    stack.push_i64(value as i64)
}

/// i64.load32_s : [i32] -> [i64], sign-extended
pub fn i64_load32_s(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_i32(ea)?;
    stack.push_i64(value as i64)
}

/// i64.load32_u : [i32] -> [i64], zero-extended
pub fn i64_load32_u(stack: &mut OperandStack, memory: &Memory, memarg: MemArg) -> Result<(), Trap> {
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    let value = memory.read_u32(ea)?;
    stack.push_i64(value as i64)
}

// ============================================================================
// Stores
// ============================================================================

/// i32.store : [i32 i32] -> []
pub fn i32_store(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u32(ea, value as u32)
}

/// i64.store : [i32 i64] -> []
pub fn i64_store(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u64(ea, value as u64)
}

/// f32.store : [i32 f32] -> []
pub fn f32_store(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_f32(ea, value)
}

/// f64.store : [i32 f64] -> []
pub fn f64_store(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_f64(ea, value)
}

/// i32.store8 : [i32 i32] -> [], low 8 bits
pub fn i32_store8(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u8(ea, value as u8)
}

/// i32.store16 : [i32 i32] -> [], low 16 bits
pub fn i32_store16(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u16(ea, value as u16)
}

/// i64.store8 : [i32 i64] -> [], low 8 bits
pub fn i64_store8(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u8(ea, value as u8)
}

/// i64.store16 : [i32 i64] -> [], low 16 bits
pub fn i64_store16(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u16(ea, value as u16)
}

/// i64.store32 : [i32 i64] -> [], low 32 bits
pub fn i64_store32(stack: &mut OperandStack, memory: &mut Memory, memarg: MemArg) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    let ea = effective_address(stack.pop_i32()?, memarg)?;
    memory.write_u32(ea, value as u32)
}

// ============================================================================
// Size operations
// ============================================================================

/// memory.size : [] -> [i32], current size in pages
pub fn memory_size(stack: &mut OperandStack, memory: &Memory) -> Result<(), Trap> {
    stack.push_i32(memory.size() as i32)
}

/// memory.grow : [i32] -> [i32], previous size in pages or -1 on failure
pub fn memory_grow(stack: &mut OperandStack, memory: &mut Memory) -> Result<(), Trap> {
    let delta = stack.pop_i32()?;
    stack.push_i32(memory.grow(delta as u32))
}

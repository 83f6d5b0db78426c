//! Bitwise and shift operations
//!
//! Shift and rotate amounts are taken modulo the bit width, per the
//! WebAssembly specification.

use super::{OperandStack, Trap};

/// i32.and : [i32 i32] -> [i32]
pub fn i32_and(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1 & c2)
}

/// i32.or : [i32 i32] -> [i32]
pub fn i32_or(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1 | c2)
}

/// i32.xor : [i32 i32] -> [i32]
pub fn i32_xor(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1 ^ c2)
}

/// i32.shl : [i32 i32] -> [i32]
pub fn i32_shl(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1.wrapping_shl(c2 as u32))
}

/// i32.shr_s : [i32 i32] -> [i32]
pub fn i32_shr_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1.wrapping_shr(c2 as u32))
}

/// i32.shr_u : [i32 i32] -> [i32]
pub fn i32_shr_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()? as u32;
    stack.push_i32(c1.wrapping_shr(c2 as u32) as i32)
}

/// i32.rotl : [i32 i32] -> [i32]
pub fn i32_rotl(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()? as u32;
    stack.push_i32(c1.rotate_left(c2 as u32 % 32) as i32)
}

/// i32.rotr : [i32 i32] -> [i32]
pub fn i32_rotr(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()? as u32;
    stack.push_i32(c1.rotate_right(c2 as u32 % 32) as i32)
}

/// i64.and : [i64 i64] -> [i64]
pub fn i64_and(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1 & c2)
}

/// i64.or : [i64 i64] -> [i64]
pub fn i64_or(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1 | c2)
}

/// i64.xor : [i64 i64] -> [i64]
pub fn i64_xor(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1 ^ c2)
}

/// i64.shl : [i64 i64] -> [i64]
pub fn i64_shl(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1.wrapping_shl(c2 as u32))
}

/// i64.shr_s : [i64 i64] -> [i64]
pub fn i64_shr_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1.wrapping_shr(c2 as u32))
}

/// i64.shr_u : [i64 i64] -> [i64]
pub fn i64_shr_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()? as u64;
    stack.push_i64(c1.wrapping_shr(c2 as u32) as i64)
}

/// i64.rotl : [i64 i64] -> [i64]
pub fn i64_rotl(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()? as u64;
    stack.push_i64(c1.rotate_left((c2 % 64) as u32) as i64)
}

/// i64.rotr : [i64 i64] -> [i64]
pub fn i64_rotr(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()? as u64;
    stack.push_i64(c1.rotate_right((c2 % 64) as u32) as i64)
}

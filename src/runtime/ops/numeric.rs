//! Numeric operations
//!
//! Integer arithmetic wraps on overflow except `div` and `rem`, which trap
//! on division by zero and on `INT_MIN / -1`. Float arithmetic follows
//! IEEE 754; `min` and `max` propagate NaN and order `-0.0` below `+0.0`.

use super::{OperandStack, Trap};

// ============================================================================
// i32 arithmetic
// ============================================================================

/// i32.add : [i32 i32] -> [i32]
pub fn i32_add(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1.wrapping_add(c2))
}

/// i32.sub : [i32 i32] -> [i32]
pub fn i32_sub(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1.wrapping_sub(c2))
}

/// i32.mul : [i32 i32] -> [i32]
pub fn i32_mul(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_i32(c1.wrapping_mul(c2))
}

/// i32.div_s : [i32 i32] -> [i32]
///
/// Traps on division by zero and on `i32::MIN / -1` (the quotient 2^31 does
/// not fit).
pub fn i32_div_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    if c1 == i32::MIN && c2 == -1 {
        return Err(Trap::IntegerOverflow);
    }
    stack.push_i32(c1 / c2)
}

/// i32.div_u : [i32 i32] -> [i32]
pub fn i32_div_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i32((c1 / c2) as i32)
}

/// i32.rem_s : [i32 i32] -> [i32]
///
/// `i32::MIN % -1` is 0, not an overflow.
pub fn i32_rem_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i32(c1.wrapping_rem(c2))
}

/// i32.rem_u : [i32 i32] -> [i32]
pub fn i32_rem_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i32((c1 % c2) as i32)
}

/// i32.clz : [i32] -> [i32]
pub fn i32_clz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i32(value.leading_zeros() as i32)
}

/// i32.ctz : [i32] -> [i32]
pub fn i32_ctz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i32(value.trailing_zeros() as i32)
}

/// i32.popcnt : [i32] -> [i32]
pub fn i32_popcnt(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i32(value.count_ones() as i32)
}

// ============================================================================
// i64 arithmetic
// ============================================================================

/// i64.add : [i64 i64] -> [i64]
pub fn i64_add(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1.wrapping_add(c2))
}

/// i64.sub : [i64 i64] -> [i64]
pub fn i64_sub(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1.wrapping_sub(c2))
}

/// i64.mul : [i64 i64] -> [i64]
pub fn i64_mul(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_i64(c1.wrapping_mul(c2))
}

/// i64.div_s : [i64 i64] -> [i64]
pub fn i64_div_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    if c1 == i64::MIN && c2 == -1 {
        return Err(Trap::IntegerOverflow);
    }
    stack.push_i64(c1 / c2)
}

/// i64.div_u : [i64 i64] -> [i64]
pub fn i64_div_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i64((c1 / c2) as i64)
}

/// i64.rem_s : [i64 i64] -> [i64]
pub fn i64_rem_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i64(c1.wrapping_rem(c2))
}

/// i64.rem_u : [i64 i64] -> [i64]
pub fn i64_rem_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    if c2 == 0 {
        return Err(Trap::IntegerDivideByZero);
    }
    stack.push_i64((c1 % c2) as i64)
}

/// i64.clz : [i64] -> [i64]
pub fn i64_clz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value.leading_zeros() as i64)
}

/// i64.ctz : [i64] -> [i64]
pub fn i64_ctz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value.trailing_zeros() as i64)
}

/// i64.popcnt : [i64] -> [i64]
pub fn i64_popcnt(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value.count_ones() as i64)
}

// ============================================================================
// f32 arithmetic
// ============================================================================

/// f32.abs : [f32] -> [f32]
pub fn f32_abs(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.abs())
}

/// f32.neg : [f32] -> [f32]
pub fn f32_neg(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(-value)
}

/// f32.ceil : [f32] -> [f32]
pub fn f32_ceil(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.ceil())
}

/// f32.floor : [f32] -> [f32]
pub fn f32_floor(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.floor())
}

/// f32.trunc : [f32] -> [f32]
pub fn f32_trunc(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.trunc())
}

/// f32.nearest : [f32] -> [f32]
///
/// Rounds to the nearest integer, ties to even.
pub fn f32_nearest(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.round_ties_even())
}

/// f32.sqrt : [f32] -> [f32]
pub fn f32_sqrt(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f32(value.sqrt())
}

/// f32.add : [f32 f32] -> [f32]
pub fn f32_add(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_f32(c1 + c2)
}

/// f32.sub : [f32 f32] -> [f32]
pub fn f32_sub(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_f32(c1 - c2)
}

/// f32.mul : [f32 f32] -> [f32]
pub fn f32_mul(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_f32(c1 * c2)
}

/// f32.div : [f32 f32] -> [f32]
///
/// Division by zero produces an infinity, not a trap.
pub fn f32_div(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_f32(c1 / c2)
}

/// f32.min : [f32 f32] -> [f32]
pub fn f32_min(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    let result = if c1.is_nan() || c2.is_nan() {
        f32::NAN
    } else if c1 == 0.0 && c2 == 0.0 {
        // -0.0 orders below +0.0
        if c1.is_sign_negative() { c1 } else { c2 }
    } else {
        c1.min(c2)
    };
    stack.push_f32(result)
}

/// f32.max : [f32 f32] -> [f32]
pub fn f32_max(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    let result = if c1.is_nan() || c2.is_nan() {
        f32::NAN
    } else if c1 == 0.0 && c2 == 0.0 {
        if c1.is_sign_positive() { c1 } else { c2 }
    } else {
        c1.max(c2)
    };
    stack.push_f32(result)
}

/// f32.copysign : [f32 f32] -> [f32]
pub fn f32_copysign(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_f32(c1.copysign(c2))
}

// ============================================================================
// f64 arithmetic
// ============================================================================

/// f64.abs : [f64] -> [f64]
pub fn f64_abs(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.abs())
}

/// f64.neg : [f64] -> [f64]
pub fn f64_neg(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(-value)
}

/// f64.ceil : [f64] -> [f64]
pub fn f64_ceil(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.ceil())
}

/// f64.floor : [f64] -> [f64]
pub fn f64_floor(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.floor())
}

/// f64.trunc : [f64] -> [f64]
pub fn f64_trunc(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.trunc())
}

/// f64.nearest : [f64] -> [f64]
pub fn f64_nearest(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.round_ties_even())
}

/// f64.sqrt : [f64] -> [f64]
pub fn f64_sqrt(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f64(value.sqrt())
}

/// f64.add : [f64 f64] -> [f64]
pub fn f64_add(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_f64(c1 + c2)
}

/// f64.sub : [f64 f64] -> [f64]
pub fn f64_sub(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_f64(c1 - c2)
}

/// f64.mul : [f64 f64] -> [f64]
pub fn f64_mul(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_f64(c1 * c2)
}

/// f64.div : [f64 f64] -> [f64]
pub fn f64_div(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_f64(c1 / c2)
}

/// f64.min : [f64 f64] -> [f64]
pub fn f64_min(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    let result = if c1.is_nan() || c2.is_nan() {
        f64::NAN
    } else if c1 == 0.0 && c2 == 0.0 {
        if c1.is_sign_negative() { c1 } else { c2 }
    } else {
        c1.min(c2)
    };
    stack.push_f64(result)
}

/// f64.max : [f64 f64] -> [f64]
pub fn f64_max(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    let result = if c1.is_nan() || c2.is_nan() {
        f64::NAN
    } else if c1 == 0.0 && c2 == 0.0 {
        if c1.is_sign_positive() { c1 } else { c2 }
    } else {
        c1.max(c2)
    };
    stack.push_f64(result)
}

/// f64.copysign : [f64 f64] -> [f64]
pub fn f64_copysign(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_f64(c1.copysign(c2))
}

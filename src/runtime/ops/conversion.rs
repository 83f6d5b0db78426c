//! Type conversion operations
//!
//! Width conversions, integer/float conversions, reinterpretation, and the
//! sign-extension operators. The trapping truncations reject NaN with
//! `InvalidConversionToInteger` and any value whose truncation falls outside
//! the target range (infinities included) with `IntegerOverflow`.

use super::{OperandStack, Trap};

/// i32.wrap_i64 : [i64] -> [i32], keep the low 32 bits
pub fn i32_wrap_i64(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i32(value as i32)
}

/// i64.extend_i32_s : [i32] -> [i64]
pub fn i64_extend_i32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i64(value as i64)
}

/// i64.extend_i32_u : [i32] -> [i64]
pub fn i64_extend_i32_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i64(value as u32 as i64)
}

// ============================================================================
// Trapping float-to-integer truncations
// ============================================================================

/// Truncate toward zero and verify the result lies in `[lo, hi)`.
///
/// The bounds are powers of two, exactly representable at both float widths.
fn trunc_checked(value: f64, lo: f64, hi: f64) -> Result<f64, Trap> {
    if value.is_nan() {
        return Err(Trap::InvalidConversionToInteger);
    }
    let t = value.trunc();
    if t < lo || t >= hi {
        return Err(Trap::IntegerOverflow);
    }
    Ok(t)
}

/// i32.trunc_f32_s : [f32] -> [i32]
pub fn i32_trunc_f32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    let t = trunc_checked(value as f64, -2147483648.0, 2147483648.0)?;
    stack.push_i32(t as i32)
}

/// i32.trunc_f32_u : [f32] -> [i32]
pub fn i32_trunc_f32_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    let t = trunc_checked(value as f64, 0.0, 4294967296.0)?;
    stack.push_i32(t as u32 as i32)
}

/// i32.trunc_f64_s : [f64] -> [i32]
pub fn i32_trunc_f64_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    let t = trunc_checked(value, -2147483648.0, 2147483648.0)?;
    stack.push_i32(t as i32)
}

/// i32.trunc_f64_u : [f64] -> [i32]
pub fn i32_trunc_f64_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    let t = trunc_checked(value, 0.0, 4294967296.0)?;
    stack.push_i32(t as u32 as i32)
}

/// i64.trunc_f32_s : [f32] -> [i64]
pub fn i64_trunc_f32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    let t = trunc_checked(value as f64, -9223372036854775808.0, 9223372036854775808.0)?;
    stack.push_i64(t as i64)
}

/// i64.trunc_f32_u : [f32] -> [i64]
pub fn i64_trunc_f32_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    let t = trunc_checked(value as f64, 0.0, 18446744073709551616.0)?;
    stack.push_i64(t as u64 as i64)
}

/// i64.trunc_f64_s : [f64] -> [i64]
pub fn i64_trunc_f64_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    let t = trunc_checked(value, -9223372036854775808.0, 9223372036854775808.0)?;
    stack.push_i64(t as i64)
}

/// i64.trunc_f64_u : [f64] -> [i64]
pub fn i64_trunc_f64_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    let t = trunc_checked(value, 0.0, 18446744073709551616.0)?;
    stack.push_i64(t as u64 as i64)
}

// ============================================================================
// Integer-to-float conversions
// ============================================================================

/// f32.convert_i32_s : [i32] -> [f32]
pub fn f32_convert_i32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_f32(value as f32)
}

/// f32.convert_i32_u : [i32] -> [f32]
pub fn f32_convert_i32_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_f32(value as u32 as f32)
}

/// f32.convert_i64_s : [i64] -> [f32]
pub fn f32_convert_i64_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_f32(value as f32)
}

/// f32.convert_i64_u : [i64] -> [f32]
pub fn f32_convert_i64_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_f32(value as u64 as f32)
}

/// f64.convert_i32_s : [i32] -> [f64]
pub fn f64_convert_i32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_f64(value as f64)
}

/// f64.convert_i32_u : [i32] -> [f64]
pub fn f64_convert_i32_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_f64(value as u32 as f64)
}

/// f64.convert_i64_s : [i64] -> [f64]
pub fn f64_convert_i64_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_f64(value as f64)
}

/// f64.convert_i64_u : [i64] -> [f64]
pub fn f64_convert_i64_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_f64(value as u64 as f64)
}

// ============================================================================
// Float width conversions
// ============================================================================

/// f32.demote_f64 : [f64] -> [f32]
pub fn f32_demote_f64(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_f32(value as f32)
}

/// f64.promote_f32 : [f32] -> [f64]
pub fn f64_promote_f32(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_f64(value as f64)
}

// ============================================================================
// Reinterpretation
// ============================================================================

/// i32.reinterpret_f32 : [f32] -> [i32]
pub fn i32_reinterpret_f32(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f32()?;
    stack.push_i32(value.to_bits() as i32)
}

/// i64.reinterpret_f64 : [f64] -> [i64]
pub fn i64_reinterpret_f64(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_f64()?;
    stack.push_i64(value.to_bits() as i64)
}

/// f32.reinterpret_i32 : [i32] -> [f32]
pub fn f32_reinterpret_i32(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_f32(f32::from_bits(value as u32))
}

/// f64.reinterpret_i64 : [i64] -> [f64]
pub fn f64_reinterpret_i64(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_f64(f64::from_bits(value as u64))
}

// ============================================================================
// Sign extension
// ============================================================================

/// i32.extend8_s : [i32] -> [i32]
pub fn i32_extend8_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i32(value as i8 as i32)
}

/// i32.extend16_s : [i32] -> [i32]
pub fn i32_extend16_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_i32(value as i16 as i32)
}

/// i64.extend8_s : [i64] -> [i64]
pub fn i64_extend8_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value as i8 as i64)
}

/// i64.extend16_s : [i64] -> [i64]
pub fn i64_extend16_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value as i16 as i64)
}

/// i64.extend32_s : [i64] -> [i64]
pub fn i64_extend32_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_i64(value as i32 as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_extend() {
        let mut stack = OperandStack::new(8);
        stack.push_i64(0x1_2345_6789).unwrap();
        i32_wrap_i64(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0x2345_6789);

        stack.push_i32(-1).unwrap();
        i64_extend_i32_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i64().unwrap(), -1);

        stack.push_i32(-1).unwrap();
        i64_extend_i32_u(&mut stack).unwrap();
        assert_eq!(stack.pop_i64().unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_trunc_nan_traps() {
        let mut stack = OperandStack::new(8);
        stack.push_f32(f32::NAN).unwrap();
        assert_eq!(
            i32_trunc_f32_s(&mut stack),
            Err(Trap::InvalidConversionToInteger)
        );
    }

    #[test]
    fn test_trunc_infinity_traps() {
        let mut stack = OperandStack::new(8);
        stack.push_f64(f64::INFINITY).unwrap();
        assert_eq!(i64_trunc_f64_s(&mut stack), Err(Trap::IntegerOverflow));
    }

    #[test]
    fn test_trunc_out_of_range_traps() {
        let mut stack = OperandStack::new(8);
        stack.push_f64(2147483648.0).unwrap();
        assert_eq!(i32_trunc_f64_s(&mut stack), Err(Trap::IntegerOverflow));

        stack.push_f64(-1.0).unwrap();
        assert_eq!(i32_trunc_f64_u(&mut stack), Err(Trap::IntegerOverflow));
    }

    #[test]
    fn test_trunc_boundary_values() {
        let mut stack = OperandStack::new(8);
        stack.push_f64(-2147483648.0).unwrap();
        i32_trunc_f64_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), i32::MIN);

        stack.push_f64(2147483647.0).unwrap();
        i32_trunc_f64_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), i32::MAX);

        // Fractional values inside (-1, 0) truncate to zero for unsigned.
        stack.push_f64(-0.75).unwrap();
        i32_trunc_f64_u(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0);
    }

    #[test]
    fn test_trunc_truncates_toward_zero() {
        let mut stack = OperandStack::new(8);
        stack.push_f32(-3.9).unwrap();
        i32_trunc_f32_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), -3);
    }

    #[test]
    fn test_convert_unsigned() {
        let mut stack = OperandStack::new(8);
        stack.push_i32(-1).unwrap();
        f64_convert_i32_u(&mut stack).unwrap();
        assert_eq!(stack.pop_f64().unwrap(), 4294967295.0);
    }

    #[test]
    fn test_reinterpret_round_trip() {
        let mut stack = OperandStack::new(8);
        stack.push_f32(1.5).unwrap();
        i32_reinterpret_f32(&mut stack).unwrap();
        f32_reinterpret_i32(&mut stack).unwrap();
        assert_eq!(stack.pop_f32().unwrap(), 1.5);
    }

    #[test]
    fn test_sign_extension() {
        let mut stack = OperandStack::new(8);
        stack.push_i32(0x80).unwrap();
        i32_extend8_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), -128);

        stack.push_i32(0x7F).unwrap();
        i32_extend8_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 127);

        stack.push_i64(0x8000).unwrap();
        i64_extend16_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i64().unwrap(), -32768);

        stack.push_i64(0x8000_0000).unwrap();
        i64_extend32_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i64().unwrap(), i32::MIN as i64);
    }
}

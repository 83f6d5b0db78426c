//! Comparison and test operations
//!
//! All of these produce an i32 boolean: 1 for true, 0 for false. Float
//! comparisons are IEEE 754: any comparison with NaN is false except `ne`,
//! which is true.

use super::{OperandStack, Trap};

/// i32.eqz : [i32] -> [i32]
pub fn i32_eqz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i32()?;
    stack.push_bool(value == 0)
}

/// i32.eq : [i32 i32] -> [i32]
pub fn i32_eq(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 == c2)
}

/// i32.ne : [i32 i32] -> [i32]
pub fn i32_ne(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 != c2)
}

/// i32.lt_s : [i32 i32] -> [i32]
pub fn i32_lt_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 < c2)
}

/// i32.lt_u : [i32 i32] -> [i32]
pub fn i32_lt_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    stack.push_bool(c1 < c2)
}

/// i32.gt_s : [i32 i32] -> [i32]
pub fn i32_gt_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 > c2)
}

/// i32.gt_u : [i32 i32] -> [i32]
pub fn i32_gt_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    stack.push_bool(c1 > c2)
}

/// i32.le_s : [i32 i32] -> [i32]
pub fn i32_le_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 <= c2)
}

/// i32.le_u : [i32 i32] -> [i32]
pub fn i32_le_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    stack.push_bool(c1 <= c2)
}

/// i32.ge_s : [i32 i32] -> [i32]
pub fn i32_ge_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()?;
    let c1 = stack.pop_i32()?;
    stack.push_bool(c1 >= c2)
}

/// i32.ge_u : [i32 i32] -> [i32]
pub fn i32_ge_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i32()? as u32;
    let c1 = stack.pop_i32()? as u32;
    stack.push_bool(c1 >= c2)
}

/// i64.eqz : [i64] -> [i32]
pub fn i64_eqz(stack: &mut OperandStack) -> Result<(), Trap> {
    let value = stack.pop_i64()?;
    stack.push_bool(value == 0)
}

/// i64.eq : [i64 i64] -> [i32]
pub fn i64_eq(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 == c2)
}

/// i64.ne : [i64 i64] -> [i32]
pub fn i64_ne(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 != c2)
}

/// i64.lt_s : [i64 i64] -> [i32]
pub fn i64_lt_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 < c2)
}

/// i64.lt_u : [i64 i64] -> [i32]
pub fn i64_lt_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    stack.push_bool(c1 < c2)
}

/// i64.gt_s : [i64 i64] -> [i32]
pub fn i64_gt_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 > c2)
}

/// i64.gt_u : [i64 i64] -> [i32]
pub fn i64_gt_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    stack.push_bool(c1 > c2)
}

/// i64.le_s : [i64 i64] -> [i32]
pub fn i64_le_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 <= c2)
}

/// i64.le_u : [i64 i64] -> [i32]
pub fn i64_le_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    stack.push_bool(c1 <= c2)
}

/// i64.ge_s : [i64 i64] -> [i32]
pub fn i64_ge_s(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()?;
    let c1 = stack.pop_i64()?;
    stack.push_bool(c1 >= c2)
}

/// i64.ge_u : [i64 i64] -> [i32]
pub fn i64_ge_u(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_i64()? as u64;
    let c1 = stack.pop_i64()? as u64;
    stack.push_bool(c1 >= c2)
}

/// f32.eq : [f32 f32] -> [i32]
pub fn f32_eq(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 == c2)
}

/// f32.ne : [f32 f32] -> [i32]
pub fn f32_ne(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 != c2)
}

/// f32.lt : [f32 f32] -> [i32]
pub fn f32_lt(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 < c2)
}

/// f32.gt : [f32 f32] -> [i32]
pub fn f32_gt(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 > c2)
}

/// f32.le : [f32 f32] -> [i32]
pub fn f32_le(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 <= c2)
}

/// f32.ge : [f32 f32] -> [i32]
pub fn f32_ge(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f32()?;
    let c1 = stack.pop_f32()?;
    stack.push_bool(c1 >= c2)
}

/// f64.eq : [f64 f64] -> [i32]
pub fn f64_eq(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 == c2)
}

/// f64.ne : [f64 f64] -> [i32]
pub fn f64_ne(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 != c2)
}

/// f64.lt : [f64 f64] -> [i32]
pub fn f64_lt(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 < c2)
}

/// f64.gt : [f64 f64] -> [i32]
pub fn f64_gt(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 > c2)
}

/// f64.le : [f64 f64] -> [i32]
pub fn f64_le(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 <= c2)
}

/// f64.ge : [f64 f64] -> [i32]
pub fn f64_ge(stack: &mut OperandStack) -> Result<(), Trap> {
    let c2 = stack.pop_f64()?;
    let c1 = stack.pop_f64()?;
    stack.push_bool(c1 >= c2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_signed_vs_unsigned() {
        let mut stack = OperandStack::new(8);
        stack.push_i32(-1).unwrap();
        stack.push_i32(1).unwrap();
        i32_lt_s(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 1);

        // As unsigned, -1 is u32::MAX.
        stack.push_i32(-1).unwrap();
        stack.push_i32(1).unwrap();
        i32_lt_u(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0);
    }

    #[test]
    fn test_eqz() {
        let mut stack = OperandStack::new(8);
        stack.push_i32(0).unwrap();
        i32_eqz(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 1);

        stack.push_i64(5).unwrap();
        i64_eqz(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0);
    }

    #[test]
    fn test_float_nan_comparisons() {
        let mut stack = OperandStack::new(8);
        stack.push_f32(f32::NAN).unwrap();
        stack.push_f32(f32::NAN).unwrap();
        f32_eq(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0);

        stack.push_f64(f64::NAN).unwrap();
        stack.push_f64(1.0).unwrap();
        f64_ne(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 1);

        stack.push_f64(f64::NAN).unwrap();
        stack.push_f64(f64::NAN).unwrap();
        f64_le(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 0);
    }

    #[test]
    fn test_float_ordering() {
        let mut stack = OperandStack::new(8);
        stack.push_f64(1.5).unwrap();
        stack.push_f64(2.5).unwrap();
        f64_lt(&mut stack).unwrap();
        assert_eq!(stack.pop_i32().unwrap(), 1);
    }
}

//! WebAssembly value representation
//!
//! Typed values cross the API boundary; on the operand stack every value
//! occupies one untyped 64-bit cell. Narrower types are zero-extended on
//! push and truncated on pop; floats travel as their IEEE 754 bit patterns.

use super::store::FuncAddr;
use crate::module::ValueType;
use fhex::ToHex;
use std::fmt;

/// Cell encoding of a null reference.
pub const NULL_REF: u64 = u64::MAX;

/// Runtime representation of WebAssembly values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    FuncRef(Option<FuncAddr>),
    ExternRef(Option<u64>),
}

impl Value {
    /// Get the WebAssembly type of this value.
    pub fn typ(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::FuncRef(_) => ValueType::FuncRef,
            Value::ExternRef(_) => ValueType::ExternRef,
        }
    }

    /// Encode this value into a 64-bit stack cell.
    pub fn to_cell(&self) -> u64 {
        match self {
            Value::I32(v) => *v as u32 as u64,
            Value::I64(v) => *v as u64,
            Value::F32(v) => v.to_bits() as u64,
            Value::F64(v) => v.to_bits(),
            Value::FuncRef(addr) => addr.map_or(NULL_REF, |a| a.0 as u64),
            Value::ExternRef(handle) => handle.unwrap_or(NULL_REF),
        }
    }

    /// Decode a 64-bit stack cell as a value of the given type.
    pub fn from_cell(typ: ValueType, cell: u64) -> Value {
        match typ {
            ValueType::I32 => Value::I32(cell as u32 as i32),
            ValueType::I64 => Value::I64(cell as i64),
            ValueType::F32 => Value::F32(f32::from_bits(cell as u32)),
            ValueType::F64 => Value::F64(f64::from_bits(cell)),
            ValueType::FuncRef => Value::FuncRef(if cell == NULL_REF {
                None
            } else {
                Some(FuncAddr(cell as usize))
            }),
            ValueType::ExternRef => Value::ExternRef(if cell == NULL_REF {
                None
            } else {
                Some(cell)
            }),
        }
    }

    /// Convert to i32, returning None if wrong type.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to i64, returning None if wrong type.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to f32, returning None if wrong type.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to f64, returning None if wrong type.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "i32:{v}"),
            Value::I64(v) => write!(f, "i64:{v}"),
            Value::F32(v) => write!(f, "f32:{}", v.to_hex()),
            Value::F64(v) => write!(f, "f64:{}", v.to_hex()),
            Value::FuncRef(Some(addr)) => write!(f, "funcref:{}", addr.0),
            Value::FuncRef(None) => write!(f, "funcref:null"),
            Value::ExternRef(Some(handle)) => write!(f, "externref:{handle}"),
            Value::ExternRef(None) => write!(f, "externref:null"),
        }
    }
}

/// Host scalars that can cross the typed invocation boundary.
///
/// Implementations encode the per-type slot rules: i32/u32 are zero-extended
/// and truncated, i64/u64 are bit-cast, floats are bit-cast through their
/// integer representation, and `()` stands for a void result.
pub trait HostValue: Sized {
    /// The WebAssembly type this scalar maps to; `None` for `()`.
    fn value_type() -> Option<ValueType>;

    /// Decode from a 64-bit stack cell. Ignored for `()`.
    fn from_cell(cell: u64) -> Self;
}

impl HostValue for () {
    fn value_type() -> Option<ValueType> {
        None
    }

    fn from_cell(_cell: u64) -> Self {}
}

impl HostValue for i32 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::I32)
    }

    fn from_cell(cell: u64) -> Self {
        cell as u32 as i32
    }
}

impl HostValue for u32 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::I32)
    }

    fn from_cell(cell: u64) -> Self {
        cell as u32
    }
}

impl HostValue for i64 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::I64)
    }

    fn from_cell(cell: u64) -> Self {
        cell as i64
    }
}

impl HostValue for u64 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::I64)
    }

    fn from_cell(cell: u64) -> Self {
        cell
    }
}

impl HostValue for f32 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::F32)
    }

    fn from_cell(cell: u64) -> Self {
        f32::from_bits(cell as u32)
    }
}

impl HostValue for f64 {
    fn value_type() -> Option<ValueType> {
        Some(ValueType::F64)
    }

    fn from_cell(cell: u64) -> Self {
        f64::from_bits(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type() {
        assert_eq!(Value::I32(42).typ(), ValueType::I32);
        assert_eq!(Value::I64(42).typ(), ValueType::I64);
        assert_eq!(Value::F32(42.0).typ(), ValueType::F32);
        assert_eq!(Value::F64(42.0).typ(), ValueType::F64);
        assert_eq!(Value::FuncRef(None).typ(), ValueType::FuncRef);
    }

    #[test]
    fn test_cell_round_trips() {
        let cases = [
            Value::I32(-1),
            Value::I32(i32::MIN),
            Value::I64(i64::MIN),
            Value::F32(-0.0),
            Value::F64(f64::MAX),
            Value::FuncRef(Some(FuncAddr(7))),
            Value::FuncRef(None),
            Value::ExternRef(Some(99)),
        ];
        for value in cases {
            assert_eq!(Value::from_cell(value.typ(), value.to_cell()), value);
        }
    }

    #[test]
    fn test_i32_cells_are_zero_extended() {
        // -1 as i32 must occupy only the low 32 bits of the cell.
        assert_eq!(Value::I32(-1).to_cell(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_nan_bits_survive_the_cell() {
        let nan = f32::from_bits(0x7FC0_0001);
        let cell = Value::F32(nan).to_cell();
        match Value::from_cell(ValueType::F32, cell) {
            Value::F32(back) => assert_eq!(back.to_bits(), nan.to_bits()),
            other => panic!("expected f32, got {other:?}"),
        }
    }

    #[test]
    fn test_host_value_decoding() {
        assert_eq!(i32::from_cell(0xFFFF_FFFF), -1);
        assert_eq!(u32::from_cell(0xFFFF_FFFF), u32::MAX);
        assert_eq!(i64::from_cell(u64::MAX), -1);
        assert_eq!(f32::from_cell(1.5f32.to_bits() as u64), 1.5);
        assert_eq!(f64::from_cell(2.5f64.to_bits()), 2.5);
        assert_eq!(<() as HostValue>::value_type(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::I32(42)), "i32:42");
        assert_eq!(format!("{}", Value::I64(-3)), "i64:-3");
        assert!(format!("{}", Value::F32(42.0)).starts_with("f32:"));
        assert_eq!(format!("{}", Value::FuncRef(None)), "funcref:null");
    }
}

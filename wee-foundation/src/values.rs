// WEE - wee-foundation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Run-time WebAssembly values.
//!
//! A [`Value`] is a plain `Copy` tagged union. Floats are carried as their
//! bit patterns so that copying a value through locals, globals, the stack or
//! linear memory never changes a NaN payload.

use core::fmt;

use crate::{
    addr::FuncAddr,
    float_bits::{FloatBits32, FloatBits64},
    types::ValueType,
};

/// Represents a WebAssembly runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(FloatBits32),
    /// 64-bit float
    F64(FloatBits64),
    /// Function reference (`None` is `ref.null func`)
    FuncRef(Option<FuncAddr>),
    /// Opaque host reference (`None` is `ref.null extern`)
    ExternRef(Option<u32>),
}

impl Value {
    /// Creates the default (zero or null) value for the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use wee_foundation::{Value, ValueType};
    ///
    /// assert_eq!(Value::default_for_type(ValueType::I32), Value::I32(0));
    /// assert_eq!(Value::default_for_type(ValueType::FuncRef), Value::FuncRef(None));
    /// ```
    #[must_use]
    pub const fn default_for_type(ty: ValueType) -> Self {
        match ty {
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F32 => Value::F32(FloatBits32(0)),
            ValueType::F64 => Value::F64(FloatBits64(0)),
            ValueType::FuncRef => Value::FuncRef(None),
            ValueType::ExternRef => Value::ExternRef(None),
        }
    }

    /// Type of this value
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::FuncRef(_) => ValueType::FuncRef,
            Value::ExternRef(_) => ValueType::ExternRef,
        }
    }

    /// Whether this value has type `ty`
    #[must_use]
    pub fn matches_type(&self, ty: ValueType) -> bool {
        self.value_type() == ty
    }

    /// Float value from an `f32`.
    #[must_use]
    pub fn from_f32(v: f32) -> Self {
        Value::F32(FloatBits32::from_float(v))
    }

    /// Float value from an `f64`.
    #[must_use]
    pub fn from_f64(v: f64) -> Self {
        Value::F64(FloatBits64::from_float(v))
    }

    /// The `i32` payload, if this is an `I32`
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// The `i64` payload, if this is an `I64`
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// The `f32` payload, if this is an `F32`
    #[must_use]
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(v.value()),
            _ => None,
        }
    }

    /// The `f64` payload, if this is an `F64`
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(v.value()),
            _ => None,
        }
    }

    /// The function reference payload, if this is a `FuncRef`
    #[must_use]
    pub const fn as_func_ref(&self) -> Option<Option<FuncAddr>> {
        match self {
            Value::FuncRef(r) => Some(*r),
            _ => None,
        }
    }

    /// Whether this is a null reference of either kind
    #[must_use]
    pub const fn is_null_ref(&self) -> bool {
        matches!(self, Value::FuncRef(None) | Value::ExternRef(None))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::I32(v as i32)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::I64(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::from_f32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::from_f64(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "i32:{v}"),
            Value::I64(v) => write!(f, "i64:{v}"),
            Value::F32(v) => write!(f, "f32:{}", v.value()),
            Value::F64(v) => write!(f, "f64:{}", v.value()),
            Value::FuncRef(Some(addr)) => write!(f, "funcref:{addr}"),
            Value::FuncRef(None) => f.write_str("funcref:null"),
            Value::ExternRef(Some(handle)) => write!(f, "externref:{handle}"),
            Value::ExternRef(None) => f.write_str("externref:null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::I32(1).value_type(), ValueType::I32);
        assert_eq!(Value::from(1.0f64).value_type(), ValueType::F64);
        assert_eq!(Value::FuncRef(Some(FuncAddr::new(3))).value_type(), ValueType::FuncRef);
        assert!(Value::ExternRef(None).is_null_ref());
        assert!(!Value::FuncRef(Some(FuncAddr::new(0))).is_null_ref());
    }

    #[test]
    fn test_unsigned_conversions_wrap() {
        assert_eq!(Value::from(u32::MAX), Value::I32(-1));
        assert_eq!(Value::from(u64::MAX), Value::I64(-1));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::I32(5).as_i32(), Some(5));
        assert_eq!(Value::I32(5).as_i64(), None);
        assert_eq!(Value::from_f32(2.5).as_f32(), Some(2.5));
        assert_eq!(Value::FuncRef(None).as_func_ref(), Some(None));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let value = Value::I64(-42);
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}

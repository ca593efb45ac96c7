// Copyright (c) 2025 Ralf Anton Beier
// SPDX-License-Identifier: MIT
// Project: WEE
// Module: wee-math

//! WebAssembly numeric operations.
//!
//! Integer division and float truncation return `Result` so the interpreter
//! can surface the Wasm trap; everything else is total.

use wee_error::{Error, Result};
use wee_foundation::{FloatBits32, FloatBits64};

macro_rules! div_rem {
    ($div_s:ident, $div_u:ident, $rem_s:ident, $rem_u:ident, $s:ty, $u:ty) => {
        /// Signed division, trapping on zero divisor and on `MIN / -1`.
        pub fn $div_s(lhs: $s, rhs: $s) -> Result<$s> {
            if rhs == 0 {
                return Err(Error::DIVIDE_BY_ZERO);
            }
            if lhs == <$s>::MIN && rhs == -1 {
                return Err(Error::INTEGER_OVERFLOW);
            }
            Ok(lhs.wrapping_div(rhs))
        }

        /// Unsigned division, trapping on zero divisor.
        pub fn $div_u(lhs: $s, rhs: $s) -> Result<$s> {
            if rhs == 0 {
                return Err(Error::DIVIDE_BY_ZERO);
            }
            Ok(((lhs as $u) / (rhs as $u)) as $s)
        }

        /// Signed remainder, trapping on zero divisor. `MIN % -1` is 0.
        pub fn $rem_s(lhs: $s, rhs: $s) -> Result<$s> {
            if rhs == 0 {
                return Err(Error::DIVIDE_BY_ZERO);
            }
            Ok(lhs.wrapping_rem(rhs))
        }

        /// Unsigned remainder, trapping on zero divisor.
        pub fn $rem_u(lhs: $s, rhs: $s) -> Result<$s> {
            if rhs == 0 {
                return Err(Error::DIVIDE_BY_ZERO);
            }
            Ok(((lhs as $u) % (rhs as $u)) as $s)
        }
    };
}

div_rem!(i32_div_s, i32_div_u, i32_rem_s, i32_rem_u, i32, u32);
div_rem!(i64_div_s, i64_div_u, i64_rem_s, i64_rem_u, i64, u64);

// `lo` is the smallest representable value as a float and `hi` the first
// float past the largest; both are exact in every source type used below.
macro_rules! trunc {
    ($name:ident, $f:ty, $int:ty, $lo:expr, $hi:expr) => {
        /// Truncate toward zero, trapping on NaN and on out-of-range input.
        pub fn $name(value: $f) -> Result<$int> {
            if value.is_nan() {
                return Err(Error::INVALID_CONV_TO_INT);
            }
            let truncated = value.trunc();
            if truncated < $lo || truncated >= $hi {
                return Err(Error::INTEGER_OVERFLOW);
            }
            Ok(truncated as $int)
        }
    };
}

trunc!(i32_trunc_f32_s, f32, i32, -2_147_483_648.0_f32, 2_147_483_648.0_f32);
trunc!(i32_trunc_f32_u, f32, u32, 0.0_f32, 4_294_967_296.0_f32);
trunc!(i32_trunc_f64_s, f64, i32, -2_147_483_648.0_f64, 2_147_483_648.0_f64);
trunc!(i32_trunc_f64_u, f64, u32, 0.0_f64, 4_294_967_296.0_f64);
trunc!(
    i64_trunc_f32_s,
    f32,
    i64,
    -9_223_372_036_854_775_808.0_f32,
    9_223_372_036_854_775_808.0_f32
);
trunc!(i64_trunc_f32_u, f32, u64, 0.0_f32, 18_446_744_073_709_551_616.0_f32);
trunc!(
    i64_trunc_f64_s,
    f64,
    i64,
    -9_223_372_036_854_775_808.0_f64,
    9_223_372_036_854_775_808.0_f64
);
trunc!(i64_trunc_f64_u, f64, u64, 0.0_f64, 18_446_744_073_709_551_616.0_f64);

// Rust's `as` already saturates and maps NaN to 0, which is exactly the
// `trunc_sat` semantics.
macro_rules! trunc_sat {
    ($name:ident, $f:ty, $int:ty) => {
        /// Saturating truncation toward zero; NaN becomes 0.
        #[must_use]
        pub fn $name(value: $f) -> $int {
            value as $int
        }
    };
}

trunc_sat!(i32_trunc_sat_f32_s, f32, i32);
trunc_sat!(i32_trunc_sat_f32_u, f32, u32);
trunc_sat!(i32_trunc_sat_f64_s, f64, i32);
trunc_sat!(i32_trunc_sat_f64_u, f64, u32);
trunc_sat!(i64_trunc_sat_f32_s, f32, i64);
trunc_sat!(i64_trunc_sat_f32_u, f32, u64);
trunc_sat!(i64_trunc_sat_f64_s, f64, i64);
trunc_sat!(i64_trunc_sat_f64_u, f64, u64);

macro_rules! float_ops {
    ($min:ident, $max:ident, $nearest:ident, $f:ty) => {
        /// Wasm `min`: NaN-propagating, `-0 < +0`.
        #[must_use]
        pub fn $min(lhs: $f, rhs: $f) -> $f {
            if lhs.is_nan() || rhs.is_nan() {
                return lhs + rhs;
            }
            if lhs == rhs {
                // Equal operands differ at most in the sign of zero.
                return <$f>::from_bits(lhs.to_bits() | rhs.to_bits());
            }
            lhs.min(rhs)
        }

        /// Wasm `max`: NaN-propagating, `-0 < +0`.
        #[must_use]
        pub fn $max(lhs: $f, rhs: $f) -> $f {
            if lhs.is_nan() || rhs.is_nan() {
                return lhs + rhs;
            }
            if lhs == rhs {
                return <$f>::from_bits(lhs.to_bits() & rhs.to_bits());
            }
            lhs.max(rhs)
        }

        /// Round to nearest, ties to even.
        #[must_use]
        pub fn $nearest(value: $f) -> $f {
            value.round_ties_even()
        }
    };
}

float_ops!(f32_min, f32_max, f32_nearest, f32);
float_ops!(f64_min, f64_max, f64_nearest, f64);

/// Flip the sign bit, NaN payload untouched.
#[must_use]
pub const fn f32_neg(value: FloatBits32) -> FloatBits32 {
    FloatBits32(value.0 ^ 0x8000_0000)
}

/// Clear the sign bit, NaN payload untouched.
#[must_use]
pub const fn f32_abs(value: FloatBits32) -> FloatBits32 {
    FloatBits32(value.0 & 0x7fff_ffff)
}

/// Magnitude of `lhs` with the sign of `rhs`.
#[must_use]
pub const fn f32_copysign(lhs: FloatBits32, rhs: FloatBits32) -> FloatBits32 {
    FloatBits32((lhs.0 & 0x7fff_ffff) | (rhs.0 & 0x8000_0000))
}

/// Flip the sign bit, NaN payload untouched.
#[must_use]
pub const fn f64_neg(value: FloatBits64) -> FloatBits64 {
    FloatBits64(value.0 ^ 0x8000_0000_0000_0000)
}

/// Clear the sign bit, NaN payload untouched.
#[must_use]
pub const fn f64_abs(value: FloatBits64) -> FloatBits64 {
    FloatBits64(value.0 & 0x7fff_ffff_ffff_ffff)
}

/// Magnitude of `lhs` with the sign of `rhs`.
#[must_use]
pub const fn f64_copysign(lhs: FloatBits64, rhs: FloatBits64) -> FloatBits64 {
    FloatBits64((lhs.0 & 0x7fff_ffff_ffff_ffff) | (rhs.0 & 0x8000_0000_0000_0000))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_division_traps() {
        assert_eq!(i32_div_s(7, 0), Err(Error::DIVIDE_BY_ZERO));
        assert_eq!(i32_div_s(i32::MIN, -1), Err(Error::INTEGER_OVERFLOW));
        assert_eq!(i32_rem_s(i32::MIN, -1), Ok(0));
        assert_eq!(i32_div_u(-1, 2), Ok(0x7fff_ffff));
        assert_eq!(i64_rem_u(-1, 10), Ok((u64::MAX % 10) as i64));
        assert_eq!(i64_div_s(-7, 2), Ok(-3));
        assert_eq!(i64_rem_s(-7, 2), Ok(-1));
    }

    #[test]
    fn test_trunc_bounds() {
        assert_eq!(i32_trunc_f32_s(-2_147_483_648.0), Ok(i32::MIN));
        assert_eq!(i32_trunc_f32_s(2_147_483_648.0), Err(Error::INTEGER_OVERFLOW));
        assert_eq!(i32_trunc_f64_s(-2_147_483_648.9), Ok(i32::MIN));
        assert_eq!(i32_trunc_f64_s(-2_147_483_649.0), Err(Error::INTEGER_OVERFLOW));
        assert_eq!(i32_trunc_f64_u(-0.9), Ok(0));
        assert_eq!(i32_trunc_f64_u(-1.0), Err(Error::INTEGER_OVERFLOW));
        assert_eq!(i32_trunc_f64_u(4_294_967_295.9), Ok(u32::MAX));
        assert_eq!(i64_trunc_f64_s(f64::NAN), Err(Error::INVALID_CONV_TO_INT));
        assert_eq!(i64_trunc_f32_u(f32::INFINITY), Err(Error::INTEGER_OVERFLOW));
    }

    #[test]
    fn test_trunc_sat() {
        assert_eq!(i32_trunc_sat_f32_s(f32::NAN), 0);
        assert_eq!(i32_trunc_sat_f64_s(1e20), i32::MAX);
        assert_eq!(i32_trunc_sat_f64_u(-5.0), 0);
        assert_eq!(i64_trunc_sat_f64_u(f64::INFINITY), u64::MAX);
    }

    #[test]
    fn test_min_max_signed_zero() {
        assert!(f32_min(0.0, -0.0).is_sign_negative());
        assert!(f32_max(-0.0, 0.0).is_sign_positive());
        assert!(f64_min(f64::NAN, 1.0).is_nan());
        assert_eq!(f64_max(1.0, 2.0), 2.0);
    }

    #[test]
    fn test_nearest_ties_even() {
        assert_eq!(f32_nearest(2.5), 2.0);
        assert_eq!(f32_nearest(3.5), 4.0);
        assert_eq!(f64_nearest(-0.5), -0.0);
        assert!(f64_nearest(-0.5).is_sign_negative());
    }

    #[test]
    fn test_sign_ops_keep_nan_payload() {
        let nan = FloatBits32(0x7fc0_1234);
        assert_eq!(f32_neg(nan).0, 0xffc0_1234);
        assert_eq!(f32_abs(f32_neg(nan)), nan);
        assert_eq!(f64_copysign(FloatBits64::from_float(2.0), FloatBits64::from_float(-0.0)).value(), -2.0);
    }

    proptest! {
        #[test]
        fn prop_div_rem_identity(a in any::<i32>(), b in any::<i32>()) {
            prop_assume!(b != 0 && !(a == i32::MIN && b == -1));
            let q = i32_div_s(a, b).unwrap();
            let r = i32_rem_s(a, b).unwrap();
            prop_assert_eq!(q.wrapping_mul(b).wrapping_add(r), a);
        }

        #[test]
        fn prop_trunc_matches_cast_in_range(v in -2_147_483_648.0f64..2_147_483_647.0f64) {
            prop_assert_eq!(i32_trunc_f64_s(v).unwrap(), v.trunc() as i32);
        }
    }
}

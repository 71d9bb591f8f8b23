//! Fixed-point arithmetic at wad (1e18) and ray (1e27) precision.
//!
//! Multiplication and division round half up: half of the divisor is added
//! before the integer division. Products are formed in 512 bits so that two
//! full-range 256-bit operands never overflow the intermediate; only a
//! result that does not fit back into 256 bits is an error.

use alloy_primitives::{U256, U512};

use crate::error::{EngineError, Result};

/// 1.0 at ray precision (1e27)
pub const RAY: U256 = U256::from_limbs([0x9fd0_803c_e800_0000, 0x033b_2e3c, 0, 0]);

/// 0.5 at ray precision
pub const HALF_RAY: U256 = U256::from_limbs([0x4fe8_401e_7400_0000, 0x019d_971e, 0, 0]);

/// 1.0 at wad precision (1e18)
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// 0.5 at wad precision
pub const HALF_WAD: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Ratio between ray and wad precision (1e9)
pub const WAD_RAY_RATIO: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

/// Seconds in a day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

fn widen(x: U256) -> U512 {
    let l = x.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

fn narrow(x: U512, operation: &'static str) -> Result<U256> {
    let l = x.as_limbs();
    if l[4..].iter().any(|limb| *limb != 0) {
        return Err(EngineError::overflow(operation));
    }
    Ok(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// Computes `(a * b + denominator / 2) / denominator` with a 512-bit product.
pub fn mul_div_half_up(
    a: U256,
    b: U256,
    denominator: U256,
    operation: &'static str,
) -> Result<U256> {
    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let d = widen(denominator);
    let half = d / U512::from(2u64);
    narrow((widen(a) * widen(b) + half) / d, operation)
}

/// Computes `floor(a * b / denominator)` with a 512-bit product.
pub fn mul_div_down(
    a: U256,
    b: U256,
    denominator: U256,
    operation: &'static str,
) -> Result<U256> {
    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    narrow(widen(a) * widen(b) / widen(denominator), operation)
}

/// Multiplies two ray values, rounding half up.
pub fn ray_mul(a: U256, b: U256) -> Result<U256> {
    mul_div_half_up(a, b, RAY, "ray_mul")
}

/// Divides two ray values, rounding half up.
pub fn ray_div(a: U256, b: U256) -> Result<U256> {
    mul_div_half_up(a, RAY, b, "ray_div")
}

/// Multiplies two wad values, rounding half up.
pub fn wad_mul(a: U256, b: U256) -> Result<U256> {
    mul_div_half_up(a, b, WAD, "wad_mul")
}

/// Divides two wad values, rounding half up.
pub fn wad_div(a: U256, b: U256) -> Result<U256> {
    mul_div_half_up(a, WAD, b, "wad_div")
}

/// Scales a wad value up to ray precision.
pub fn wad_to_ray(a: U256) -> Result<U256> {
    a.checked_mul(WAD_RAY_RATIO)
        .ok_or(EngineError::overflow("wad_to_ray"))
}

/// Scales a ray value down to wad precision, rounding half up.
pub fn ray_to_wad(a: U256) -> U256 {
    let quotient = a / WAD_RAY_RATIO;
    let remainder = a % WAD_RAY_RATIO;
    if remainder >= WAD_RAY_RATIO / U256::from(2u64) {
        quotient + U256::from(1u64)
    } else {
        quotient
    }
}

/// Returns `a - b`, or zero when `b > a`.
pub fn zero_floor_sub(a: U256, b: U256) -> U256 {
    a.saturating_sub(b)
}

pub(crate) fn checked_add(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or(EngineError::overflow(operation))
}

pub(crate) fn checked_sub(a: U256, b: U256, reason: &'static str) -> Result<U256> {
    a.checked_sub(b)
        .ok_or(EngineError::InvalidArgument { reason })
}

pub(crate) fn checked_mul(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_mul(b).ok_or(EngineError::overflow(operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(n: u64) -> U256 {
        U256::from(n) * RAY
    }

    #[test]
    fn test_constants() {
        assert_eq!(RAY, U256::from(10u64).pow(U256::from(27u64)));
        assert_eq!(HALF_RAY * U256::from(2u64), RAY);
        assert_eq!(WAD, U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(HALF_WAD * U256::from(2u64), WAD);
        assert_eq!(WAD * WAD_RAY_RATIO, RAY);
        assert_eq!(SECONDS_PER_YEAR, 31_536_000);
    }

    #[test]
    fn test_ray_mul_basic() {
        assert_eq!(ray_mul(ray(2), ray(3)).unwrap(), ray(6));
        assert_eq!(ray_mul(RAY, U256::from(12345u64)).unwrap(), U256::from(12345u64));
        assert_eq!(ray_mul(U256::ZERO, ray(7)).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_ray_mul_rounds_half_up() {
        // 1 * 0.5 ray = 0.5 -> rounds up to 1
        assert_eq!(ray_mul(U256::from(1u64), HALF_RAY).unwrap(), U256::from(1u64));
        // 1 * (0.5 ray - 1) = just under half -> rounds down to 0
        assert_eq!(
            ray_mul(U256::from(1u64), HALF_RAY - U256::from(1u64)).unwrap(),
            U256::ZERO
        );
        // 3 * 0.5 = 1.5 -> 2
        assert_eq!(ray_mul(U256::from(3u64), HALF_RAY).unwrap(), U256::from(2u64));
    }

    #[test]
    fn test_ray_div_rounds_half_up() {
        // 1 / 3 ray = 0.333.. ray, last digit rounds down
        let third = ray_div(RAY, ray(3)).unwrap();
        assert_eq!(third, U256::from_str_radix("333333333333333333333333333", 10).unwrap());
        // 2 / 3 ray = 0.666.. ray, last digit rounds up
        let two_thirds = ray_div(ray(2), ray(3)).unwrap();
        assert_eq!(
            two_thirds,
            U256::from_str_radix("666666666666666666666666667", 10).unwrap()
        );
    }

    #[test]
    fn test_wad_mul_and_div() {
        let one_and_half = WAD + HALF_WAD;
        assert_eq!(wad_mul(one_and_half, U256::from(2u64) * WAD).unwrap(), U256::from(3u64) * WAD);
        assert_eq!(wad_div(U256::from(3u64) * WAD, U256::from(2u64) * WAD).unwrap(), one_and_half);
        // 1 wei * 0.5 = 0.5 wei -> 1 wei
        assert_eq!(wad_mul(U256::from(1u64), HALF_WAD).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(ray_div(RAY, U256::ZERO), Err(EngineError::DivisionByZero));
        assert_eq!(wad_div(WAD, U256::ZERO), Err(EngineError::DivisionByZero));
        assert_eq!(
            mul_div_down(WAD, WAD, U256::ZERO, "test"),
            Err(EngineError::DivisionByZero)
        );
    }

    #[test]
    fn test_wide_intermediate_does_not_overflow() {
        // MAX * RAY overflows 256 bits but the quotient fits
        let result = ray_mul(U256::MAX, RAY).unwrap();
        assert_eq!(result, U256::MAX);

        let big = U256::MAX / U256::from(2u64);
        assert_eq!(ray_div(big, RAY).unwrap(), big);
    }

    #[test]
    fn test_result_overflow() {
        assert_eq!(
            ray_mul(U256::MAX, ray(2)),
            Err(EngineError::ArithmeticOverflow { operation: "ray_mul" })
        );
        assert_eq!(
            ray_div(U256::MAX, ray(1) / U256::from(2u64)),
            Err(EngineError::ArithmeticOverflow { operation: "ray_div" })
        );
        assert_eq!(
            wad_to_ray(U256::MAX),
            Err(EngineError::ArithmeticOverflow { operation: "wad_to_ray" })
        );
    }

    #[test]
    fn test_wad_ray_conversion() {
        assert_eq!(wad_to_ray(WAD).unwrap(), RAY);
        assert_eq!(ray_to_wad(RAY), WAD);
        // 0.5e9 rounds up, just below rounds down
        assert_eq!(ray_to_wad(U256::from(500_000_000u64)), U256::from(1u64));
        assert_eq!(ray_to_wad(U256::from(499_999_999u64)), U256::ZERO);
        assert_eq!(ray_to_wad(U256::MAX), U256::MAX / WAD_RAY_RATIO);
    }

    #[test]
    fn test_ray_div_then_mul_within_one_unit() {
        let samples = [
            (ray(5), ray(3)),
            (U256::from(123_456_789u64), U256::from(7u64)),
            (U256::from(10u64).pow(U256::from(40u64)), U256::from(999_999_937u64) * RAY),
            (U256::from(1u64), RAY + U256::from(1u64)),
            (ray(1_000_000), U256::from(3u64)),
        ];
        for (x, y) in samples {
            let back = ray_mul(ray_div(x, y).unwrap(), y).unwrap();
            let diff = if back > x { back - x } else { x - back };
            // one rounding unit of ray_div scaled by y / RAY, plus one for ray_mul
            let tolerance = y / RAY + U256::from(1u64);
            assert!(diff <= tolerance, "x={x} y={y} back={back}");
        }
    }

    #[test]
    fn test_zero_floor_sub() {
        assert_eq!(zero_floor_sub(U256::from(5u64), U256::from(3u64)), U256::from(2u64));
        assert_eq!(zero_floor_sub(U256::from(3u64), U256::from(5u64)), U256::ZERO);
    }

    #[test]
    fn test_checked_helpers() {
        assert_eq!(
            checked_add(U256::MAX, U256::from(1u64), "add"),
            Err(EngineError::ArithmeticOverflow { operation: "add" })
        );
        assert_eq!(
            checked_sub(U256::ZERO, U256::from(1u64), "negative"),
            Err(EngineError::InvalidArgument { reason: "negative" })
        );
        assert_eq!(
            checked_mul(U256::MAX, U256::from(2u64), "mul"),
            Err(EngineError::ArithmeticOverflow { operation: "mul" })
        );
    }
}

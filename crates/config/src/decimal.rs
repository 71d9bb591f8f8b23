//! Exact conversion of human-readable decimals into wad and ray integers.
//!
//! `0.05` becomes `5 * 10^16` in wad and `5 * 10^25` in ray. No float is
//! involved: the decimal's mantissa is scaled by a power of ten, and values
//! that would lose digits are rejected instead of rounded.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::error::{ConfigError, Result};

const WAD_DECIMALS: u32 = 18;
const RAY_DECIMALS: u32 = 27;

/// Converts a non-negative decimal into ray (27 fractional digits).
///
/// # Example
///
/// ```rust
/// use moneypool_rs_config::to_ray;
/// use moneypool_rs_engine::RAY;
/// use alloy_primitives::U256;
/// use rust_decimal::Decimal;
///
/// let rate = to_ray("coupon_rate", Decimal::new(1, 1)).unwrap(); // 0.1
/// assert_eq!(rate, RAY / U256::from(10u64));
/// ```
pub fn to_ray(field: &'static str, value: Decimal) -> Result<U256> {
    scale_decimal(field, value, RAY_DECIMALS)
}

/// Converts a non-negative decimal into wad (18 fractional digits).
pub fn to_wad(field: &'static str, value: Decimal) -> Result<U256> {
    scale_decimal(field, value, WAD_DECIMALS)
}

fn scale_decimal(field: &'static str, value: Decimal, decimals: u32) -> Result<U256> {
    let invalid = |reason| ConfigError::InvalidDecimal {
        field,
        value: value.to_string(),
        reason,
    };

    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("must not be negative"));
    }

    // Trailing zeros do not count against the precision limit
    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(invalid("too many fractional digits"));
    }

    let mantissa = U256::from(normalized.mantissa().unsigned_abs());
    let factor = U256::from(10u64).pow(U256::from(decimals - scale));
    Ok(mantissa * factor)
}

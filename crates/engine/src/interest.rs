//! Interest accrual over an elapsed time interval.
//!
//! Rates are annual ray values. Both functions return a growth factor in ray
//! (`RAY` means no growth) for the interval `[from, to]`.

use alloy_primitives::U256;

use crate::error::{ensure_ordered, Result};
use crate::math::{checked_add, checked_mul, mul_div_down, ray_mul, RAY, SECONDS_PER_YEAR};

/// Simple interest factor: `RAY + rate * (to - from) / SECONDS_PER_YEAR`.
///
/// # Example
///
/// ```rust
/// use moneypool_rs_engine::interest::calculate_linear_interest;
/// use moneypool_rs_engine::{RAY, SECONDS_PER_YEAR};
/// use alloy_primitives::U256;
///
/// let ten_percent = RAY / U256::from(10u64);
/// let factor = calculate_linear_interest(ten_percent, 0, SECONDS_PER_YEAR).unwrap();
/// assert_eq!(factor, RAY + ten_percent);
/// ```
pub fn calculate_linear_interest(rate: U256, from: u64, to: u64) -> Result<U256> {
    ensure_ordered(from, to)?;
    let elapsed = U256::from(to - from);
    let interest = mul_div_down(
        rate,
        elapsed,
        U256::from(SECONDS_PER_YEAR),
        "linear_interest",
    )?;
    checked_add(RAY, interest, "linear_interest")
}

/// Compound interest factor approximated by the first four terms of the
/// binomial expansion of `(1 + rate / SECONDS_PER_YEAR) ^ (to - from)`.
///
/// ```text
/// n    = to - from
/// x    = rate / SECONDS_PER_YEAR
/// RAY + n*x + n(n-1)/2 * x^2 + n(n-1)(n-2)/6 * x^3
/// ```
///
/// `n - 2` is clamped at zero, so intervals of one or two seconds only keep
/// the terms that exist for them. The approximation undershoots the exact
/// power slightly, which favours borrowers.
pub fn calculate_compounded_interest(rate: U256, from: u64, to: u64) -> Result<U256> {
    ensure_ordered(from, to)?;
    let elapsed = to - from;
    if elapsed == 0 {
        return Ok(RAY);
    }

    let exp = U256::from(elapsed);
    let exp_minus_one = U256::from(elapsed - 1);
    let exp_minus_two = U256::from(elapsed.saturating_sub(2));

    let rate_per_second = rate / U256::from(SECONDS_PER_YEAR);
    let base_power_two = ray_mul(rate_per_second, rate_per_second)?;
    let base_power_three = ray_mul(base_power_two, rate_per_second)?;

    let first_term = checked_mul(rate_per_second, exp, "compounded_interest")?;
    let pairs = checked_mul(exp, exp_minus_one, "compounded_interest")?;
    let second_term =
        checked_mul(pairs, base_power_two, "compounded_interest")? / U256::from(2u64);
    let triples = checked_mul(pairs, exp_minus_two, "compounded_interest")?;
    let third_term =
        checked_mul(triples, base_power_three, "compounded_interest")? / U256::from(6u64);

    let mut result = checked_add(RAY, first_term, "compounded_interest")?;
    result = checked_add(result, second_term, "compounded_interest")?;
    checked_add(result, third_term, "compounded_interest")
}

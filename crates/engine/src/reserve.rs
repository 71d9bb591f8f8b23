//! Reserve index and rate updates.
//!
//! A reserve is described by a [`ReserveSnapshot`]. Every pool action first
//! accrues the l-token index up to the action's timestamp, then applies the
//! balance change and re-prices the reserve with the interest rate model.
//! Transitions return a new snapshot; the input is never modified.
//!
//! The weighted-average helpers keep a pool's average rate current as
//! positions with their own rates enter and leave it.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::interest::calculate_linear_interest;
use crate::irm::{calculate_interest_rates, InterestRateModelParams, InterestRates};
use crate::math::{checked_add, mul_div_down, ray_div, ray_mul, wad_to_ray, zero_floor_sub, RAY};

/// Advances the l-token index by linear interest at `deposit_apy` over
/// `[from, to]`.
pub fn advance_ltoken_index(
    previous_index: U256,
    deposit_apy: U256,
    from: u64,
    to: u64,
) -> Result<U256> {
    let accrued = calculate_linear_interest(deposit_apy, from, to)?;
    ray_mul(previous_index, accrued)
}

/// Weighted average rate after `amount` (wad) at `rate` joins a balance of
/// `total_before` (wad) averaging `average_rate_before`.
///
/// ```text
/// (total_before * average_rate_before + amount * rate) / (total_before + amount)
/// ```
///
/// Amounts are lifted to ray before weighting.
pub fn blend_rate_on_increase(
    average_rate_before: U256,
    total_before: U256,
    amount: U256,
    rate: U256,
) -> Result<U256> {
    let weighted_average_rate = ray_mul(wad_to_ray(total_before)?, average_rate_before)?;
    let weighted_amount_rate = ray_mul(wad_to_ray(amount)?, rate)?;

    let new_total = checked_add(total_before, amount, "blend_rate_on_increase")?;
    ray_div(
        checked_add(weighted_average_rate, weighted_amount_rate, "blend_rate_on_increase")?,
        wad_to_ray(new_total)?,
    )
}

/// Weighted average rate after `amount` (wad) at `rate` leaves a balance of
/// `total_before` (wad) averaging `average_rate_before`.
///
/// Returns zero instead of failing when the whole balance leaves, or when
/// the weight being removed is at least the weight accumulated so far (drift
/// left behind by earlier rounding).
pub fn blend_rate_on_decrease(
    average_rate_before: U256,
    total_before: U256,
    amount: U256,
    rate: U256,
) -> Result<U256> {
    if total_before <= amount {
        debug!(%total_before, %amount, "balance fully drained, average rate floored to zero");
        return Ok(U256::ZERO);
    }

    let weighted_average_rate = ray_mul(wad_to_ray(total_before)?, average_rate_before)?;
    let weighted_amount_rate = ray_mul(wad_to_ray(amount)?, rate)?;

    if weighted_average_rate <= weighted_amount_rate {
        debug!(
            %weighted_average_rate,
            %weighted_amount_rate,
            "removed weight exceeds accumulated weight, average rate floored to zero"
        );
        return Ok(U256::ZERO);
    }

    ray_div(
        weighted_average_rate - weighted_amount_rate,
        wad_to_ray(total_before - amount)?,
    )
}

/// State of a reserve between two pool actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    /// Liquidity held by the reserve (wad)
    pub underlying_asset_balance: U256,
    /// Outstanding debt (wad)
    pub total_borrow_balance: U256,
    /// Timestamp of the last index update (seconds)
    pub last_update_timestamp: u64,
    /// Cumulative deposit index (ray)
    pub current_ltoken_index: U256,
    /// Deposit APY in force since the last update (ray)
    pub current_deposit_apy: U256,
    /// Borrow APY in force since the last update (ray)
    pub current_borrow_apy: U256,
}

impl ReserveSnapshot {
    /// An empty reserve created at `timestamp`, with the index at one.
    pub fn new_reserve(timestamp: u64) -> Self {
        Self {
            underlying_asset_balance: U256::ZERO,
            total_borrow_balance: U256::ZERO,
            last_update_timestamp: timestamp,
            current_ltoken_index: RAY,
            current_deposit_apy: U256::ZERO,
            current_borrow_apy: U256::ZERO,
        }
    }

    /// Accrues the l-token index up to `timestamp` at the current deposit APY.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidTimestampOrder`] if `timestamp < last_update_timestamp`
    pub fn accrue(&self, timestamp: u64) -> Result<ReserveSnapshot> {
        let index = advance_ltoken_index(
            self.current_ltoken_index,
            self.current_deposit_apy,
            self.last_update_timestamp,
            timestamp,
        )?;
        Ok(ReserveSnapshot {
            current_ltoken_index: index,
            last_update_timestamp: timestamp,
            ..*self
        })
    }

    /// Reserve state after `amount` (wad) is deposited at `timestamp`.
    pub fn deposit(
        &self,
        amount: U256,
        timestamp: u64,
        params: &InterestRateModelParams,
    ) -> Result<ReserveSnapshot> {
        let accrued = self.accrue(timestamp)?;
        let rates = calculate_interest_rates(
            accrued.underlying_asset_balance,
            accrued.total_borrow_balance,
            amount,
            U256::ZERO,
            params,
        )?;
        let next = ReserveSnapshot {
            underlying_asset_balance: checked_add(
                accrued.underlying_asset_balance,
                amount,
                "deposit",
            )?,
            ..accrued.with_rates(rates)
        };
        debug!(%amount, timestamp, index = %next.current_ltoken_index, "reserve deposit");
        Ok(next)
    }

    /// Reserve state after `amount` (wad) is withdrawn at `timestamp`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidArgument`] if `amount` exceeds the reserve's liquidity
    pub fn withdraw(
        &self,
        amount: U256,
        timestamp: u64,
        params: &InterestRateModelParams,
    ) -> Result<ReserveSnapshot> {
        let accrued = self.accrue(timestamp)?;
        let rates = calculate_interest_rates(
            accrued.underlying_asset_balance,
            accrued.total_borrow_balance,
            U256::ZERO,
            amount,
            params,
        )?;
        let next = ReserveSnapshot {
            underlying_asset_balance: accrued.underlying_asset_balance - amount,
            ..accrued.with_rates(rates)
        };
        debug!(%amount, timestamp, index = %next.current_ltoken_index, "reserve withdraw");
        Ok(next)
    }

    /// Reserve state after `amount` (wad) is borrowed at `timestamp`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidArgument`] if `amount` exceeds the reserve's liquidity
    pub fn borrow(
        &self,
        amount: U256,
        timestamp: u64,
        params: &InterestRateModelParams,
    ) -> Result<ReserveSnapshot> {
        let accrued = self.accrue(timestamp)?;
        let total_borrow_balance = checked_add(accrued.total_borrow_balance, amount, "borrow")?;
        let rates = calculate_interest_rates(
            accrued.underlying_asset_balance,
            total_borrow_balance,
            U256::ZERO,
            amount,
            params,
        )?;
        let next = ReserveSnapshot {
            underlying_asset_balance: accrued.underlying_asset_balance - amount,
            total_borrow_balance,
            ..accrued.with_rates(rates)
        };
        debug!(%amount, timestamp, index = %next.current_ltoken_index, "reserve borrow");
        Ok(next)
    }

    /// Reserve state after `amount` (wad) of debt is repaid at `timestamp`.
    ///
    /// Repaying more than the outstanding debt clears it; the full amount
    /// still returns to the reserve's liquidity.
    pub fn repay(
        &self,
        amount: U256,
        timestamp: u64,
        params: &InterestRateModelParams,
    ) -> Result<ReserveSnapshot> {
        let accrued = self.accrue(timestamp)?;
        let total_borrow_balance = zero_floor_sub(accrued.total_borrow_balance, amount);
        let rates = calculate_interest_rates(
            accrued.underlying_asset_balance,
            total_borrow_balance,
            amount,
            U256::ZERO,
            params,
        )?;
        let next = ReserveSnapshot {
            underlying_asset_balance: checked_add(
                accrued.underlying_asset_balance,
                amount,
                "repay",
            )?,
            total_borrow_balance,
            ..accrued.with_rates(rates)
        };
        debug!(%amount, timestamp, index = %next.current_ltoken_index, "reserve repay");
        Ok(next)
    }

    /// Underlying amount redeemable for `shares` minted when the index was
    /// `index_at_deposit`. Rounds down.
    pub fn redeemable_balance(&self, shares: U256, index_at_deposit: U256) -> Result<U256> {
        if index_at_deposit.is_zero() {
            return Err(EngineError::DivisionByZero);
        }
        mul_div_down(
            shares,
            self.current_ltoken_index,
            index_at_deposit,
            "redeemable_balance",
        )
    }

    fn with_rates(self, rates: InterestRates) -> ReserveSnapshot {
        ReserveSnapshot {
            current_deposit_apy: rates.deposit_apy,
            current_borrow_apy: rates.borrow_apy,
            ..self
        }
    }
}

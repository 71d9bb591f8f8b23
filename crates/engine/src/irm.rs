//! Kinked utilization interest rate model.
//!
//! The borrow rate is a two-segment piecewise-linear function of pool
//! utilization, continuous at the optimal utilization (the kink):
//!
//! ```text
//! U <= optimal:  borrow = base + (optimal_rate - base) * U / optimal
//! U >  optimal:  borrow = optimal_rate + (max - optimal_rate) * (U - optimal) / (1 - optimal)
//!
//! deposit = borrow * U
//! ```
//!
//! Below the kink liquidity is cheap; above it the slope steepens sharply so
//! that borrowers are pushed to repay before withdrawals run dry. The deposit
//! rate returned here is gross: any reserve factor is applied by the caller.
//!
//! # Example
//!
//! ```rust
//! use moneypool_rs_engine::irm::{calculate_interest_rates, InterestRateModelParams};
//! use moneypool_rs_engine::{RAY, WAD};
//! use alloy_primitives::U256;
//!
//! let percent = |n: u64| RAY * U256::from(n) / U256::from(100u64);
//! let params = InterestRateModelParams::new(percent(75), percent(5), percent(6), percent(100)).unwrap();
//!
//! // First deposit into an empty pool: nothing is borrowed, so U = 0
//! let rates = calculate_interest_rates(
//!     U256::ZERO,
//!     U256::ZERO,
//!     U256::from(10_000u64) * WAD,
//!     U256::ZERO,
//!     &params,
//! ).unwrap();
//!
//! assert_eq!(rates.borrow_apy, percent(5));
//! assert_eq!(rates.deposit_apy, U256::ZERO);
//! ```

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EngineError, Result};
use crate::math::{checked_add, checked_sub, ray_div, ray_mul, RAY};

/// Parameters of the kinked rate curve. All values are ray fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateModelParams {
    /// Utilization at which the curve bends
    pub optimal_utilization_rate: U256,
    /// Borrow rate at zero utilization
    pub borrow_rate_base: U256,
    /// Borrow rate at the optimal utilization
    pub borrow_rate_optimal: U256,
    /// Borrow rate at full utilization
    pub borrow_rate_max: U256,
}

impl InterestRateModelParams {
    /// Creates a validated parameter set.
    pub fn new(
        optimal_utilization_rate: U256,
        borrow_rate_base: U256,
        borrow_rate_optimal: U256,
        borrow_rate_max: U256,
    ) -> Result<Self> {
        let params = Self {
            optimal_utilization_rate,
            borrow_rate_base,
            borrow_rate_optimal,
            borrow_rate_max,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks `0 < optimal_utilization_rate < RAY` and
    /// `base <= optimal <= max`.
    pub fn validate(&self) -> Result<()> {
        if self.optimal_utilization_rate.is_zero() {
            return Err(EngineError::InvalidRateParameter {
                field: "optimal_utilization_rate",
                reason: "must be greater than zero",
            });
        }
        if self.optimal_utilization_rate >= RAY {
            return Err(EngineError::InvalidRateParameter {
                field: "optimal_utilization_rate",
                reason: "must be below one",
            });
        }
        if self.borrow_rate_base > self.borrow_rate_optimal {
            return Err(EngineError::InvalidRateParameter {
                field: "borrow_rate_base",
                reason: "must not exceed borrow_rate_optimal",
            });
        }
        if self.borrow_rate_optimal > self.borrow_rate_max {
            return Err(EngineError::InvalidRateParameter {
                field: "borrow_rate_optimal",
                reason: "must not exceed borrow_rate_max",
            });
        }
        Ok(())
    }

    /// Borrow rate for a utilization (ray).
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRateParameter`] if the parameters fail [`Self::validate`]
    pub fn borrow_rate_at(&self, utilization: U256) -> Result<U256> {
        self.validate()?;
        if utilization <= self.optimal_utilization_rate {
            let slope = ray_div(
                self.borrow_rate_optimal - self.borrow_rate_base,
                self.optimal_utilization_rate,
            )?;
            checked_add(self.borrow_rate_base, ray_mul(slope, utilization)?, "borrow_rate")
        } else {
            let slope = ray_div(
                self.borrow_rate_max - self.borrow_rate_optimal,
                RAY - self.optimal_utilization_rate,
            )?;
            let excess = utilization - self.optimal_utilization_rate;
            checked_add(self.borrow_rate_optimal, ray_mul(slope, excess)?, "borrow_rate")
        }
    }
}

/// Rates produced by [`calculate_interest_rates`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRates {
    /// New borrow APY (ray)
    pub borrow_apy: U256,
    /// New deposit APY (ray), gross of any reserve factor
    pub deposit_apy: U256,
    /// Utilization the rates were derived from (ray)
    pub utilization: U256,
}

/// Returns `total_debt / (total_liquidity + total_debt)` in ray, or zero when
/// nothing is borrowed.
pub fn get_utilization(total_debt: U256, total_liquidity: U256) -> Result<U256> {
    if total_debt.is_zero() {
        return Ok(U256::ZERO);
    }
    let total = checked_add(total_liquidity, total_debt, "utilization")?;
    ray_div(total_debt, total)
}

/// Calculates the borrow and deposit APYs of a reserve after an action.
///
/// # Arguments
///
/// * `underlying_asset_balance` - Liquidity held by the reserve before the action (wad)
/// * `total_borrow_balance` - Outstanding debt of the reserve (wad)
/// * `deposit_delta` - Liquidity added by the action (wad)
/// * `borrow_delta` - Liquidity removed by the action (wad)
/// * `params` - Rate curve parameters
///
/// # Errors
///
/// - [`EngineError::InvalidRateParameter`] if `params` is out of range
/// - [`EngineError::InvalidArgument`] if `borrow_delta` exceeds the available liquidity
pub fn calculate_interest_rates(
    underlying_asset_balance: U256,
    total_borrow_balance: U256,
    deposit_delta: U256,
    borrow_delta: U256,
    params: &InterestRateModelParams,
) -> Result<InterestRates> {
    params.validate()?;

    let total_debt = total_borrow_balance;
    let total_liquidity = checked_sub(
        checked_add(underlying_asset_balance, deposit_delta, "total_liquidity")?,
        borrow_delta,
        "borrow amount exceeds available liquidity",
    )?;

    let utilization = get_utilization(total_debt, total_liquidity)?;
    let borrow_apy = params.borrow_rate_at(utilization)?;
    let deposit_apy = ray_mul(borrow_apy, utilization)?;

    trace!(%utilization, %borrow_apy, %deposit_apy, "interest rates updated");

    Ok(InterestRates {
        borrow_apy,
        deposit_apy,
        utilization,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;

    fn percent(n: u64) -> U256 {
        RAY * U256::from(n) / U256::from(100u64)
    }

    fn wad(n: u64) -> U256 {
        U256::from(n) * WAD
    }

    fn dai_params() -> InterestRateModelParams {
        InterestRateModelParams::new(percent(75), percent(5), percent(6), percent(100)).unwrap()
    }

    fn example_params() -> InterestRateModelParams {
        InterestRateModelParams::new(percent(80), percent(2), percent(10), percent(100)).unwrap()
    }

    #[test]
    fn test_first_deposit_into_empty_pool() {
        let rates =
            calculate_interest_rates(U256::ZERO, U256::ZERO, wad(10_000), U256::ZERO, &dai_params())
                .unwrap();
        assert_eq!(rates.utilization, U256::ZERO);
        assert_eq!(rates.borrow_apy, percent(5));
        assert_eq!(rates.deposit_apy, U256::ZERO);
    }

    #[test]
    fn test_borrow_rate_at_rejects_unvalidated_params() {
        // Public fields let a caller build an inverted curve without `new`
        let inverted = InterestRateModelParams {
            borrow_rate_base: percent(10),
            borrow_rate_optimal: percent(2),
            ..example_params()
        };
        assert_eq!(
            inverted.borrow_rate_at(percent(40)),
            Err(EngineError::InvalidRateParameter {
                field: "borrow_rate_base",
                reason: "must not exceed borrow_rate_optimal",
            })
        );

        let steep = InterestRateModelParams {
            borrow_rate_max: percent(5),
            ..example_params()
        };
        assert!(matches!(
            steep.borrow_rate_at(percent(90)),
            Err(EngineError::InvalidRateParameter { field: "borrow_rate_optimal", .. })
        ));
    }

    #[test]
    fn test_below_kink() {
        // 40% utilization: 2% + 40% * (10% - 2%) / 80% = 6%
        let rates =
            calculate_interest_rates(wad(60), wad(40), U256::ZERO, U256::ZERO, &example_params())
                .unwrap();
        assert_eq!(rates.utilization, percent(40));
        assert_eq!(rates.borrow_apy, percent(6));
        assert_eq!(rates.deposit_apy, ray_mul(percent(6), percent(40)).unwrap());
    }

    #[test]
    fn test_above_kink() {
        // 90% utilization: 10% + (90% - 80%) * (100% - 10%) / (100% - 80%) = 55%
        let rates =
            calculate_interest_rates(wad(10), wad(90), U256::ZERO, U256::ZERO, &example_params())
                .unwrap();
        assert_eq!(rates.utilization, percent(90));
        assert_eq!(rates.borrow_apy, percent(55));
        assert_eq!(rates.deposit_apy, RAY * U256::from(495u64) / U256::from(1000u64));
    }

    #[test]
    fn test_full_utilization_hits_max() {
        let rates =
            calculate_interest_rates(U256::ZERO, wad(100), U256::ZERO, U256::ZERO, &dai_params())
                .unwrap();
        assert_eq!(rates.utilization, RAY);
        assert_eq!(rates.borrow_apy, percent(100));
        assert_eq!(rates.deposit_apy, percent(100));
    }

    #[test]
    fn test_continuity_at_kink() {
        let params = dai_params();
        // U = 75 / (25 + 75) = 0.75 exactly
        let rates =
            calculate_interest_rates(wad(25), wad(75), U256::ZERO, U256::ZERO, &params).unwrap();
        assert_eq!(rates.utilization, params.optimal_utilization_rate);

        let lower = rates.borrow_apy;
        let upper = params.borrow_rate_optimal;
        let diff = if lower > upper { lower - upper } else { upper - lower };
        assert!(diff <= U256::from(1u64), "lower={lower} upper={upper}");

        // One unit above the kink stays next to the optimal rate
        let just_above = params
            .borrow_rate_at(params.optimal_utilization_rate + U256::from(1u64))
            .unwrap();
        assert!(just_above >= upper);
        assert!(just_above - upper <= U256::from(10u64));
    }

    #[test]
    fn test_deltas_change_liquidity() {
        let params = dai_params();
        let deposit =
            calculate_interest_rates(wad(50), wad(50), wad(100), U256::ZERO, &params).unwrap();
        let borrow =
            calculate_interest_rates(wad(50), wad(50), U256::ZERO, wad(25), &params).unwrap();
        let neutral =
            calculate_interest_rates(wad(50), wad(50), U256::ZERO, U256::ZERO, &params).unwrap();

        assert!(deposit.utilization < neutral.utilization);
        assert!(borrow.utilization > neutral.utilization);
        assert!(deposit.borrow_apy < neutral.borrow_apy);
        assert!(borrow.borrow_apy > neutral.borrow_apy);
    }

    #[test]
    fn test_borrow_exceeds_liquidity() {
        let result =
            calculate_interest_rates(wad(10), wad(5), U256::ZERO, wad(11), &dai_params());
        assert!(matches!(result, Err(EngineError::InvalidArgument { .. })));
    }

    #[test]
    fn test_rates_monotonic_in_utilization() {
        let params = dai_params();
        let mut previous = U256::ZERO;
        for borrowed in [0u64, 10, 30, 50, 74, 75, 76, 90, 99, 100] {
            let rates = calculate_interest_rates(
                wad(100 - borrowed),
                wad(borrowed),
                U256::ZERO,
                U256::ZERO,
                &params,
            )
            .unwrap();
            assert!(rates.borrow_apy >= previous);
            previous = rates.borrow_apy;
        }
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let zero_kink = InterestRateModelParams::new(U256::ZERO, percent(1), percent(2), percent(3));
        assert!(matches!(
            zero_kink,
            Err(EngineError::InvalidRateParameter { field: "optimal_utilization_rate", .. })
        ));

        let full_kink = InterestRateModelParams::new(RAY, percent(1), percent(2), percent(3));
        assert!(matches!(
            full_kink,
            Err(EngineError::InvalidRateParameter { field: "optimal_utilization_rate", .. })
        ));

        let base_above_optimal =
            InterestRateModelParams::new(percent(80), percent(3), percent(2), percent(4));
        assert!(matches!(
            base_above_optimal,
            Err(EngineError::InvalidRateParameter { field: "borrow_rate_base", .. })
        ));

        let optimal_above_max =
            InterestRateModelParams::new(percent(80), percent(1), percent(5), percent(4));
        assert!(matches!(
            optimal_above_max,
            Err(EngineError::InvalidRateParameter { field: "borrow_rate_optimal", .. })
        ));
    }

    #[test]
    fn test_calculate_rejects_unvalidated_params() {
        let params = InterestRateModelParams {
            optimal_utilization_rate: percent(80),
            borrow_rate_base: percent(9),
            borrow_rate_optimal: percent(2),
            borrow_rate_max: percent(100),
        };
        let result = calculate_interest_rates(wad(1), wad(1), U256::ZERO, U256::ZERO, &params);
        assert!(result.unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_get_utilization() {
        assert_eq!(get_utilization(U256::ZERO, U256::ZERO).unwrap(), U256::ZERO);
        assert_eq!(get_utilization(wad(1), U256::ZERO).unwrap(), RAY);
        assert_eq!(get_utilization(wad(1), wad(3)).unwrap(), percent(25));
    }
}

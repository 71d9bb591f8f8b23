//! MoneyPool Interest Engine
//!
//! Fixed-point arithmetic for a pooled lending protocol: interest accrual,
//! a kinked borrow-rate curve, reserve index and rate bookkeeping, and the
//! debt and fee schedule of asset-bond loans.
//!
//! # Overview
//!
//! The engine lets you:
//! - Multiply and divide ray (1e27) and wad (1e18) values with half-up rounding
//! - Accrue linear and compounded interest between two timestamps
//! - Compute borrow and deposit APYs from the pool's utilization
//! - Advance the lToken index and blend dToken average rates
//! - Price repayment and liquidation of asset bonds
//!
//! Every function is pure. State lives in plain `Copy` snapshots
//! ([`ReserveSnapshot`], [`AssetBondSnapshot`]) that callers thread through
//! the operations themselves.
//!
//! # Example
//!
//! ```rust
//! use moneypool_rs_engine::{InterestRateModelParams, ReserveSnapshot, RAY, WAD};
//! use alloy_primitives::U256;
//!
//! let percent = |n: u64| RAY * U256::from(n) / U256::from(100u64);
//! let params =
//!     InterestRateModelParams::new(percent(75), percent(5), percent(6), percent(100)).unwrap();
//!
//! let start = 1_640_995_200;
//! let reserve = ReserveSnapshot::new_reserve(start)
//!     .deposit(U256::from(10_000u64) * WAD, start, &params)
//!     .unwrap()
//!     .borrow(U256::from(4_000u64) * WAD, start, &params)
//!     .unwrap();
//!
//! // 40% utilization sits below the kink
//! assert!(reserve.current_borrow_apy > percent(5));
//! assert!(reserve.current_borrow_apy < percent(6));
//! assert!(reserve.current_deposit_apy < reserve.current_borrow_apy);
//! ```

pub mod asset_bond;
pub mod calendar;
pub mod error;
pub mod interest;
pub mod irm;
pub mod math;
pub mod reserve;

// Re-export commonly used types
pub use error::{EngineError, Result};

// Math exports
pub use math::{
    mul_div_down, mul_div_half_up, ray_div, ray_mul, ray_to_wad, wad_div, wad_mul, wad_to_ray,
    zero_floor_sub, HALF_RAY, HALF_WAD, RAY, SECONDS_PER_DAY, SECONDS_PER_YEAR, WAD,
    WAD_RAY_RATIO,
};

// Interest exports
pub use interest::{calculate_compounded_interest, calculate_linear_interest};

// IRM exports
pub use irm::{calculate_interest_rates, get_utilization, InterestRateModelParams, InterestRates};

// Reserve exports
pub use reserve::{
    advance_ltoken_index, blend_rate_on_decrease, blend_rate_on_increase, ReserveSnapshot,
};

// Asset bond exports
pub use asset_bond::{
    calculate_accrued_debt, calculate_debt_data, calculate_fee_on_liquidation,
    calculate_fee_on_repayment, calculate_liquidation_data, payment_date, AssetBondSnapshot,
    DebtData, LoanPhase,
};

// Calendar exports
pub use calendar::{add_days, next_utc_midnight, utc_midnight, UtcDate};

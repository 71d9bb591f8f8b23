//! Debt and fee calculation for asset-bond loans.
//!
//! An asset bond is a fixed-term loan collateralized by a real-world asset.
//! Its timeline is
//!
//! ```text
//! loan start <= collateralize <= maturity <= liquidation
//! ```
//!
//! From collateralization onwards the money pool is owed principal
//! compounded at `interest_rate` (the depositor rate). The borrower owes
//! principal compounded at `coupon_rate`; the difference, plus the interest
//! accrued before collateralization, is the fee of the collateral service
//! provider. After maturity `overdue_interest_rate` is added on top of the
//! coupon.
//!
//! Fees are always charged through the end of the payment's UTC day: the
//! [`payment_date`] is the midnight after the payment timestamp.
//!
//! # Example
//!
//! ```rust
//! use moneypool_rs_engine::asset_bond::{calculate_debt_data, AssetBondSnapshot, LoanPhase};
//! use moneypool_rs_engine::{RAY, WAD};
//! use alloy_primitives::U256;
//!
//! let percent = |n: u64| RAY * U256::from(n) / U256::from(100u64);
//! let day = 86_400u64;
//! let loan_start = 1_640_995_200; // 2022-01-01T00:00:00Z
//!
//! let bond = AssetBondSnapshot {
//!     principal: WAD,
//!     coupon_rate: percent(10),
//!     interest_rate: percent(5),
//!     overdue_interest_rate: percent(3),
//!     loan_start_timestamp: loan_start,
//!     collateralize_timestamp: loan_start,
//!     maturity_timestamp: loan_start + 365 * day,
//!     liquidation_timestamp: loan_start + 375 * day,
//!     fee_on_collateral_service_provider: U256::ZERO,
//!     accrued_debt_on_money_pool: U256::ZERO,
//! };
//!
//! let payment = loan_start + 30 * day;
//! assert_eq!(LoanPhase::at(&bond, payment).unwrap(), LoanPhase::Performing);
//!
//! let debt = calculate_debt_data(&bond, payment).unwrap();
//! assert!(debt.accrued_debt_on_money_pool > WAD);
//! assert!(debt.fee_on_collateral_service_provider > U256::ZERO);
//! ```

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calendar::next_utc_midnight;
use crate::error::{ensure_ordered, EngineError, Result};
use crate::interest::calculate_compounded_interest;
use crate::math::{checked_add, ray_mul, zero_floor_sub, RAY};

/// One asset-bond loan. Timestamps are fixed at collateralization; the two
/// amount fields are filled in by settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBondSnapshot {
    /// Borrowed amount (wad)
    pub principal: U256,
    /// Gross annual rate owed by the borrower (ray)
    pub coupon_rate: U256,
    /// Net annual rate owed to the money pool (ray)
    pub interest_rate: U256,
    /// Extra annual rate charged after maturity (ray)
    pub overdue_interest_rate: U256,
    pub loan_start_timestamp: u64,
    pub collateralize_timestamp: u64,
    pub maturity_timestamp: u64,
    pub liquidation_timestamp: u64,
    /// Fee settled to the collateral service provider (wad)
    pub fee_on_collateral_service_provider: U256,
    /// Debt settled to the money pool (wad)
    pub accrued_debt_on_money_pool: U256,
}

impl AssetBondSnapshot {
    /// Checks the timeline ordering and that the money pool's rate does not
    /// exceed the coupon.
    pub fn validate(&self) -> Result<()> {
        ensure_ordered(self.loan_start_timestamp, self.collateralize_timestamp)?;
        ensure_ordered(self.collateralize_timestamp, self.maturity_timestamp)?;
        ensure_ordered(self.maturity_timestamp, self.liquidation_timestamp)?;
        if self.interest_rate > self.coupon_rate {
            return Err(EngineError::InvalidRateParameter {
                field: "interest_rate",
                reason: "must not exceed coupon_rate",
            });
        }
        Ok(())
    }

    /// Phase of the loan for a payment at `payment_timestamp`.
    pub fn phase_at(&self, payment_timestamp: u64) -> Result<LoanPhase> {
        LoanPhase::at(self, payment_timestamp)
    }

    /// The bond with its debt and fee fields set for a repayment at
    /// `payment_timestamp`.
    pub fn settle_repayment(&self, payment_timestamp: u64) -> Result<AssetBondSnapshot> {
        let data = calculate_debt_data(self, payment_timestamp)?;
        debug!(
            payment_timestamp,
            debt = %data.accrued_debt_on_money_pool,
            fee = %data.fee_on_collateral_service_provider,
            "asset bond repayment settled"
        );
        Ok(self.with_debt_data(data))
    }

    /// The bond with its debt and fee fields set for a liquidation at
    /// `payment_timestamp`.
    pub fn settle_liquidation(&self, payment_timestamp: u64) -> Result<AssetBondSnapshot> {
        let data = calculate_liquidation_data(self, payment_timestamp)?;
        debug!(
            payment_timestamp,
            debt = %data.accrued_debt_on_money_pool,
            fee = %data.fee_on_collateral_service_provider,
            "asset bond liquidation settled"
        );
        Ok(self.with_debt_data(data))
    }

    fn with_debt_data(&self, data: DebtData) -> AssetBondSnapshot {
        AssetBondSnapshot {
            accrued_debt_on_money_pool: data.accrued_debt_on_money_pool,
            fee_on_collateral_service_provider: data.fee_on_collateral_service_provider,
            ..*self
        }
    }
}

/// Where a payment falls on the loan's timeline, judged by its
/// [`payment_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanPhase {
    /// Paid through a day ending on or before maturity
    Performing,
    /// Past maturity, within the grace period before liquidation
    Overdue,
    /// Past the liquidation deadline
    Liquidated,
}

impl LoanPhase {
    /// Phase of `bond` for a payment at `payment_timestamp`.
    pub fn at(bond: &AssetBondSnapshot, payment_timestamp: u64) -> Result<Self> {
        Ok(Self::for_payment_date(bond, payment_date(payment_timestamp)?))
    }

    fn for_payment_date(bond: &AssetBondSnapshot, payment_date: u64) -> Self {
        if payment_date <= bond.maturity_timestamp {
            LoanPhase::Performing
        } else if payment_date <= bond.liquidation_timestamp {
            LoanPhase::Overdue
        } else {
            LoanPhase::Liquidated
        }
    }
}

/// Amounts due when an asset bond is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtData {
    /// Owed to the money pool (wad)
    pub accrued_debt_on_money_pool: U256,
    /// Owed to the collateral service provider (wad)
    pub fee_on_collateral_service_provider: U256,
}

impl DebtData {
    /// Total the payer transfers.
    pub fn total(&self) -> Result<U256> {
        checked_add(
            self.accrued_debt_on_money_pool,
            self.fee_on_collateral_service_provider,
            "debt_total",
        )
    }
}

/// Midnight (UTC) at the end of the day containing `payment_timestamp`.
pub fn payment_date(payment_timestamp: u64) -> Result<u64> {
    next_utc_midnight(payment_timestamp)
}

/// Principal compounded at the money pool's rate from collateralization to
/// `payment_timestamp`.
pub fn calculate_accrued_debt(bond: &AssetBondSnapshot, payment_timestamp: u64) -> Result<U256> {
    bond.validate()?;
    let factor = calculate_compounded_interest(
        bond.interest_rate,
        bond.collateralize_timestamp,
        payment_timestamp,
    )?;
    ray_mul(bond.principal, factor)
}

/// Fee owed to the collateral service provider on repayment.
///
/// Up to the liquidation deadline the fee is the coupon accrued before
/// collateralization, the coupon/interest spread since, and the coupon for
/// the rest of the payment day. Past the deadline the spread stops at
/// maturity, the overdue spread runs from maturity to payment, and the final
/// day is charged at coupon plus overdue rate.
pub fn calculate_fee_on_repayment(bond: &AssetBondSnapshot, payment_timestamp: u64) -> Result<U256> {
    bond.validate()?;
    ensure_ordered(bond.collateralize_timestamp, payment_timestamp)?;
    let payment_date = payment_date(payment_timestamp)?;

    let coupon = bond.coupon_rate;
    let spread = coupon - bond.interest_rate;

    let first_term = calculate_compounded_interest(
        coupon,
        bond.loan_start_timestamp,
        bond.collateralize_timestamp,
    )?;

    let phase = LoanPhase::for_payment_date(bond, payment_date);
    let total_rate = match phase {
        LoanPhase::Performing | LoanPhase::Overdue => {
            let second_term =
                growth(spread, bond.collateralize_timestamp, payment_timestamp)?;
            let third_term = growth(coupon, payment_timestamp, payment_date)?;
            trace!(?phase, %first_term, %second_term, %third_term, "repayment fee terms");
            sum(&[first_term, second_term, third_term])?
        }
        LoanPhase::Liquidated => {
            let overdue_coupon = checked_add(coupon, bond.overdue_interest_rate, "overdue_rate")?;
            let second_term =
                growth(spread, bond.collateralize_timestamp, bond.maturity_timestamp)?;
            // Empty when the payment falls before a same-day maturity
            let overdue_term = growth(
                overdue_coupon - bond.interest_rate,
                bond.maturity_timestamp,
                payment_timestamp.max(bond.maturity_timestamp),
            )?;
            let third_term = growth(overdue_coupon, payment_timestamp, payment_date)?;
            trace!(
                ?phase,
                %first_term,
                %second_term,
                %overdue_term,
                %third_term,
                "repayment fee terms"
            );
            sum(&[first_term, second_term, overdue_term, third_term])?
        }
    };

    growth_over_principal(bond.principal, total_rate)
}

/// Fee owed to the collateral service provider on liquidation.
///
/// Liquidation charges the full coupon from loan start to maturity, then
/// coupon plus overdue rate from maturity through the payment day.
pub fn calculate_fee_on_liquidation(
    bond: &AssetBondSnapshot,
    payment_timestamp: u64,
) -> Result<U256> {
    bond.validate()?;
    let payment_date = payment_date(payment_timestamp)?;

    let first_term = calculate_compounded_interest(
        bond.coupon_rate,
        bond.loan_start_timestamp,
        bond.maturity_timestamp,
    )?;
    let overdue_coupon =
        checked_add(bond.coupon_rate, bond.overdue_interest_rate, "overdue_rate")?;
    let overdue_term = growth(overdue_coupon, bond.maturity_timestamp, payment_date)?;
    trace!(%first_term, %overdue_term, "liquidation fee terms");

    growth_over_principal(bond.principal, sum(&[first_term, overdue_term])?)
}

/// Accrued debt and repayment fee for a repayment at `payment_timestamp`.
pub fn calculate_debt_data(bond: &AssetBondSnapshot, payment_timestamp: u64) -> Result<DebtData> {
    Ok(DebtData {
        accrued_debt_on_money_pool: calculate_accrued_debt(bond, payment_timestamp)?,
        fee_on_collateral_service_provider: calculate_fee_on_repayment(bond, payment_timestamp)?,
    })
}

/// Accrued debt and liquidation fee for a liquidation at `payment_timestamp`.
pub fn calculate_liquidation_data(
    bond: &AssetBondSnapshot,
    payment_timestamp: u64,
) -> Result<DebtData> {
    Ok(DebtData {
        accrued_debt_on_money_pool: calculate_accrued_debt(bond, payment_timestamp)?,
        fee_on_collateral_service_provider: calculate_fee_on_liquidation(bond, payment_timestamp)?,
    })
}

/// Compounded factor minus one: the growth alone.
fn growth(rate: U256, from: u64, to: u64) -> Result<U256> {
    Ok(calculate_compounded_interest(rate, from, to)? - RAY)
}

fn sum(terms: &[U256]) -> Result<U256> {
    terms
        .iter()
        .try_fold(U256::ZERO, |acc, term| checked_add(acc, *term, "fee_rate"))
}

fn growth_over_principal(principal: U256, total_rate: U256) -> Result<U256> {
    Ok(zero_floor_sub(ray_mul(principal, total_rate)?, principal))
}

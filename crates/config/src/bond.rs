//! Asset-bond term sheets.
//!
//! A term sheet is what a collateral service provider submits when it
//! settles a bond: amounts and rates as decimals, the loan start as a
//! calendar date and the duration in days. It becomes an
//! [`AssetBondSnapshot`] once the bond is collateralized.

use alloy_primitives::U256;
use moneypool_rs_engine::calendar::{add_days, UtcDate};
use moneypool_rs_engine::AssetBondSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{to_ray, to_wad};
use crate::error::Result;

/// Days between maturity and the liquidation deadline.
pub const DEFAULT_LIQUIDATION_GRACE_DAYS: u64 = 10;

/// Terms of one asset-bond loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBondTerms {
    /// Borrowed amount in whole tokens.
    pub principal: Decimal,
    /// Gross annual rate owed by the borrower.
    pub coupon_rate: Decimal,
    /// Extra annual rate after maturity.
    pub overdue_interest_rate: Decimal,
    /// Annual rate owed to the money pool.
    pub interest_rate: Decimal,
    pub loan_start_year: i32,
    /// 1 = January
    pub loan_start_month: u32,
    pub loan_start_day: u32,
    pub loan_duration_days: u64,
}

impl AssetBondTerms {
    /// Midnight UTC of the loan start date.
    pub fn loan_start_timestamp(&self) -> Result<u64> {
        let date = UtcDate::new(
            self.loan_start_year,
            self.loan_start_month,
            self.loan_start_day,
        )?;
        Ok(date.to_timestamp())
    }

    pub fn maturity_timestamp(&self) -> Result<u64> {
        Ok(add_days(self.loan_start_timestamp()?, self.loan_duration_days)?)
    }

    pub fn liquidation_timestamp(&self, grace_days: u64) -> Result<u64> {
        Ok(add_days(self.maturity_timestamp()?, grace_days)?)
    }

    /// Builds the bond as collateralized at `collateralize_timestamp`, with
    /// no debt or fee settled yet.
    pub fn to_snapshot(
        &self,
        collateralize_timestamp: u64,
        grace_days: u64,
    ) -> Result<AssetBondSnapshot> {
        let bond = AssetBondSnapshot {
            principal: to_wad("principal", self.principal)?,
            coupon_rate: to_ray("coupon_rate", self.coupon_rate)?,
            interest_rate: to_ray("interest_rate", self.interest_rate)?,
            overdue_interest_rate: to_ray("overdue_interest_rate", self.overdue_interest_rate)?,
            loan_start_timestamp: self.loan_start_timestamp()?,
            collateralize_timestamp,
            maturity_timestamp: self.maturity_timestamp()?,
            liquidation_timestamp: self.liquidation_timestamp(grace_days)?,
            fee_on_collateral_service_provider: U256::ZERO,
            accrued_debt_on_money_pool: U256::ZERO,
        };
        bond.validate()?;
        debug!(
            collateralize_timestamp,
            maturity = bond.maturity_timestamp,
            liquidation = bond.liquidation_timestamp,
            "asset bond collateralized"
        );
        Ok(bond)
    }
}

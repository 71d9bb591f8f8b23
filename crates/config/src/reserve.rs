//! Reserve configuration: token metadata and rate curve in decimal form.

use alloy_primitives::U256;
use moneypool_rs_engine::{ray_mul, InterestRateModelParams, RAY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::to_ray;
use crate::error::{ConfigError, Result};

/// Name and symbol of a token issued for a reserve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
}

impl TokenConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Rate curve parameters as decimal fractions (e.g. `0.75` = 75%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRateModelConfig {
    pub optimal_utilization_rate: Decimal,
    pub borrow_rate_base: Decimal,
    pub borrow_rate_optimal: Decimal,
    pub borrow_rate_max: Decimal,
}

impl InterestRateModelConfig {
    /// Converts to ray and validates through the engine.
    pub fn into_params(self) -> Result<InterestRateModelParams> {
        let params = InterestRateModelParams::new(
            to_ray("optimal_utilization_rate", self.optimal_utilization_rate)?,
            to_ray("borrow_rate_base", self.borrow_rate_base)?,
            to_ray("borrow_rate_optimal", self.borrow_rate_optimal)?,
            to_ray("borrow_rate_max", self.borrow_rate_max)?,
        )?;
        Ok(params)
    }
}

/// A money-pool reserve: the underlying asset, the tokens issued against it
/// and its interest rate model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    /// Underlying asset name.
    pub name: String,
    /// Underlying asset symbol, used to look the reserve up.
    pub symbol: String,
    /// Deposit token.
    pub l_token: TokenConfig,
    /// Debt token.
    pub d_token: TokenConfig,
    /// Asset-bond tokenizer, if the reserve finances asset bonds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<TokenConfig>,
    pub interest_rate_model: InterestRateModelConfig,
    /// Share of the deposit yield kept by the pool (0 to 1).
    #[serde(default)]
    pub money_pool_factor: Decimal,
}

impl ReserveConfig {
    /// The DAI reserve: 75% optimal utilization, 5% base, 6% at the kink,
    /// 100% at full utilization, no money-pool factor.
    pub fn dai() -> Self {
        Self {
            name: "Dai Stablecoin".to_string(),
            symbol: "DAI".to_string(),
            l_token: TokenConfig::new("Elyfi_DaiStablecoin_LToken", "ELFI_DAI_LToken"),
            d_token: TokenConfig::new("Elyfi_DaiStablecoin_DToken", "ELFI_DAI_DToken"),
            tokenizer: Some(TokenConfig::new(
                "Elyfi_DaiStablecoin_Tokenizer",
                "ELFI_DAI_Tokenizer",
            )),
            interest_rate_model: InterestRateModelConfig {
                optimal_utilization_rate: Decimal::new(75, 2),
                borrow_rate_base: Decimal::new(5, 2),
                borrow_rate_optimal: Decimal::new(6, 2),
                borrow_rate_max: Decimal::ONE,
            },
            money_pool_factor: Decimal::ZERO,
        }
    }

    /// The reserve's rate curve in ray.
    pub fn params(&self) -> Result<InterestRateModelParams> {
        self.interest_rate_model.into_params()
    }

    /// The money-pool factor in ray, checked to be at most one.
    pub fn money_pool_factor_ray(&self) -> Result<U256> {
        let factor = to_ray("money_pool_factor", self.money_pool_factor)?;
        if factor > RAY {
            return Err(ConfigError::InvalidDecimal {
                field: "money_pool_factor",
                value: self.money_pool_factor.to_string(),
                reason: "must not exceed one",
            });
        }
        Ok(factor)
    }

    /// Deposit APY after the money-pool factor is taken out of the gross
    /// rate the engine computes.
    pub fn net_deposit_apy(&self, gross_deposit_apy: U256) -> Result<U256> {
        let kept = self.money_pool_factor_ray()?;
        Ok(ray_mul(gross_deposit_apy, RAY - kept)?)
    }
}

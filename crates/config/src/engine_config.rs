//! Top-level configuration loaded from JSON.

use std::path::Path;

use moneypool_rs_engine::AssetBondSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bond::{AssetBondTerms, DEFAULT_LIQUIDATION_GRACE_DAYS};
use crate::error::{ConfigError, Result};
use crate::reserve::ReserveConfig;

/// Reserves served by the money pool and the bond grace period.
///
/// Decimal fields are written as JSON strings so that no value passes
/// through a float:
///
/// ```rust
/// use moneypool_rs_config::EngineConfig;
///
/// let json = r#"{
///     "reserves": [{
///         "name": "Dai Stablecoin",
///         "symbol": "DAI",
///         "l_token": { "name": "Elyfi_DaiStablecoin_LToken", "symbol": "ELFI_DAI_LToken" },
///         "d_token": { "name": "Elyfi_DaiStablecoin_DToken", "symbol": "ELFI_DAI_DToken" },
///         "interest_rate_model": {
///             "optimal_utilization_rate": "0.75",
///             "borrow_rate_base": "0.05",
///             "borrow_rate_optimal": "0.06",
///             "borrow_rate_max": "1"
///         }
///     }]
/// }"#;
///
/// let config = EngineConfig::from_json_str(json).unwrap();
/// assert_eq!(config.liquidation_grace_days, 10);
/// assert!(config.reserve("DAI").is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub reserves: Vec<ReserveConfig>,
    #[serde(default = "default_grace_days")]
    pub liquidation_grace_days: u64,
}

fn default_grace_days() -> u64 {
    DEFAULT_LIQUIDATION_GRACE_DAYS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserves: vec![ReserveConfig::dai()],
            liquidation_grace_days: DEFAULT_LIQUIDATION_GRACE_DAYS,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            reserves = config.reserves.len(),
            grace_days = config.liquidation_grace_days,
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Checks every reserve's rate curve and money-pool factor.
    pub fn validate(&self) -> Result<()> {
        for reserve in &self.reserves {
            reserve.params()?;
            reserve.money_pool_factor_ray()?;
        }
        Ok(())
    }

    /// Looks a reserve up by symbol (case-insensitive).
    pub fn reserve(&self, symbol: &str) -> Result<&ReserveConfig> {
        self.reserves
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| ConfigError::UnknownReserve(symbol.to_string()))
    }

    /// Builds a bond from its terms with this configuration's grace period.
    pub fn collateralize(
        &self,
        terms: &AssetBondTerms,
        collateralize_timestamp: u64,
    ) -> Result<AssetBondSnapshot> {
        terms.to_snapshot(collateralize_timestamp, self.liquidation_grace_days)
    }
}

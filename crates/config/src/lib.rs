//! Configuration for the money-pool engine.
//!
//! Rates and amounts are written by people as decimals ("0.05", "10000").
//! This crate converts them exactly into the engine's ray and wad integers,
//! provides the DAI reserve preset, and turns asset-bond term sheets into
//! engine snapshots.

mod bond;
mod decimal;
mod engine_config;
mod error;
mod reserve;

pub use bond::{AssetBondTerms, DEFAULT_LIQUIDATION_GRACE_DAYS};
pub use decimal::{to_ray, to_wad};
pub use engine_config::EngineConfig;
pub use error::{ConfigError, Result};
pub use reserve::{InterestRateModelConfig, ReserveConfig, TokenConfig};

// ============================================================================
// Engine Configuration
// Per-asset configuration for request validation and fallback behavior
// ============================================================================

use super::{Price, Quantity};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one asset's matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// The asset this engine matches (e.g., "BTC", "ETH")
    pub asset: String,

    /// Optional: Price tick size (minimum price increment)
    /// None means no tick size enforcement
    pub tick_size: Option<Price>,

    /// Optional: Lot size (minimum quantity increment)
    /// None means no lot size enforcement
    pub lot_size: Option<Quantity>,

    /// Optional: Largest quantity accepted in a single request
    pub max_quantity: Option<Quantity>,

    /// Offer unfilled remainders to the external liquidity source
    pub fallback_enabled: bool,

    /// Skip the fallback for limit requests whose limit is worse than the
    /// reference price
    pub enforce_limit_on_fallback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset: String::new(),
            tick_size: None,
            lot_size: None,
            max_quantity: None,
            fallback_enabled: true,
            enforce_limit_on_fallback: false,
        }
    }
}

impl EngineConfig {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Self::default()
        }
    }

    /// Book-only matching: remainders are never sent to the liquidity source
    pub fn book_only(asset: impl Into<String>) -> Self {
        Self::new(asset).with_fallback(false)
    }

    pub fn with_tick_size(mut self, tick: Price) -> Self {
        self.tick_size = Some(tick);
        self
    }

    pub fn with_lot_size(mut self, lot: Quantity) -> Self {
        self.lot_size = Some(lot);
        self
    }

    pub fn with_max_quantity(mut self, max: Quantity) -> Self {
        self.max_quantity = Some(max);
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_limit_enforced_on_fallback(mut self, enforce: bool) -> Self {
        self.enforce_limit_on_fallback = enforce;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.asset.trim().is_empty() {
            return Err("Asset cannot be empty".to_string());
        }

        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err("Tick size must be positive".to_string());
            }
        }

        if let Some(lot) = self.lot_size {
            if lot <= Decimal::ZERO {
                return Err("Lot size must be positive".to_string());
            }
        }

        if let Some(max) = self.max_quantity {
            if max <= Decimal::ZERO {
                return Err("Maximum quantity must be positive".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = EngineConfig::new("BTC");

        assert_eq!(config.asset, "BTC");
        assert!(config.fallback_enabled);
        assert!(!config.enforce_limit_on_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::book_only("ETH")
            .with_tick_size(Decimal::new(1, 2))
            .with_lot_size(Decimal::new(1, 3))
            .with_max_quantity(Decimal::from(1000));

        assert!(!config.fallback_enabled);
        assert_eq!(config.tick_size, Some(Decimal::new(1, 2)));
        assert_eq!(config.lot_size, Some(Decimal::new(1, 3)));
        assert_eq!(config.max_quantity, Some(Decimal::from(1000)));
    }

    #[test]
    fn test_validation() {
        assert!(EngineConfig::new("").validate().is_err());
        assert!(EngineConfig::new("BTC")
            .with_tick_size(Decimal::ZERO)
            .validate()
            .is_err());
        assert!(EngineConfig::new("BTC")
            .with_lot_size(Decimal::from(-1))
            .validate()
            .is_err());
        assert!(EngineConfig::new("BTC")
            .with_max_quantity(Decimal::ZERO)
            .validate()
            .is_err());
    }
}

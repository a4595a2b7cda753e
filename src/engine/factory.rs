// ============================================================================
// Engine Factory
// Creates matching engines with validated configuration
// ============================================================================

use crate::domain::{EngineConfig, Price, Quantity};
use crate::engine::MatchingEngine;
use crate::error::EngineError;
use crate::interfaces::{EventHandler, LiquiditySource, NoLiquidity, NoOpEventHandler};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Arguments
/// * `config` - Engine configuration for one asset
/// * `liquidity` - Reference prices and fallback fills
/// * `event_handler` - Sink for request lifecycle events
///
/// # Example
/// ```
/// use fallback_matching::prelude::*;
/// use fallback_matching::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let engine = create_from_config(
///     EngineConfig::book_only("BTC"),
///     Arc::new(NoLiquidity),
///     Arc::new(NoOpEventHandler),
/// )
/// .unwrap();
/// assert_eq!(engine.asset(), "BTC");
/// ```
pub fn create_from_config(
    config: EngineConfig,
    liquidity: Arc<dyn LiquiditySource>,
    event_handler: Arc<dyn EventHandler>,
) -> Result<MatchingEngine, EngineError> {
    config.validate().map_err(EngineError::InvalidConfig)?;

    tracing::info!(
        asset = %config.asset,
        source = liquidity.name(),
        fallback = config.fallback_enabled,
        enforce_limit = config.enforce_limit_on_fallback,
        "Creating matching engine"
    );

    Ok(MatchingEngine::new(config, liquidity, event_handler))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// Defaults to [`NoLiquidity`] and [`NoOpEventHandler`].
///
/// # Example
/// ```
/// use fallback_matching::prelude::*;
/// use rust_decimal::Decimal;
///
/// let engine = MatchingEngineBuilder::new("BTC")
///     .with_tick_size(Decimal::new(1, 2))
///     .book_only()
///     .build()
///     .unwrap();
/// assert_eq!(engine.asset(), "BTC");
/// ```
pub struct MatchingEngineBuilder {
    config: EngineConfig,
    liquidity: Arc<dyn LiquiditySource>,
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngineBuilder {
    pub fn new(asset: impl Into<String>) -> Self {
        Self::from_config(EngineConfig::new(asset))
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            liquidity: Arc::new(NoLiquidity),
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set price tick size
    pub fn with_tick_size(mut self, tick_size: Price) -> Self {
        self.config.tick_size = Some(tick_size);
        self
    }

    /// Set lot size
    pub fn with_lot_size(mut self, lot_size: Quantity) -> Self {
        self.config.lot_size = Some(lot_size);
        self
    }

    pub fn with_max_quantity(mut self, max_quantity: Quantity) -> Self {
        self.config.max_quantity = Some(max_quantity);
        self
    }

    /// Disable the liquidity fallback
    pub fn book_only(mut self) -> Self {
        self.config.fallback_enabled = false;
        self
    }

    /// Reject fallback fills whose reference price violates the limit
    pub fn enforce_limit_on_fallback(mut self) -> Self {
        self.config.enforce_limit_on_fallback = true;
        self
    }

    pub fn with_liquidity(mut self, liquidity: Arc<dyn LiquiditySource>) -> Self {
        self.liquidity = liquidity;
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Build the matching engine
    pub fn build(self) -> Result<MatchingEngine, EngineError> {
        create_from_config(self.config, self.liquidity, self.event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }
}

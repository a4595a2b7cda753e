// ============================================================================
// Fallback Matching Library
// Price-time order matching with protective thresholds and external liquidity
// ============================================================================

//! # Fallback Matching
//!
//! A per-asset matching engine that fills incoming requests against resting
//! requests in its book and hands any remainder to an external liquidity
//! source.
//!
//! ## Features
//!
//! - **Protective thresholds** (stop-loss / take-profit) checked against a
//!   reference price before any matching
//! - **Price-time priority** over a skip-list of price levels, FIFO within a
//!   level
//! - **Single-shot liquidity fallback** priced at the reference price
//! - **Serialized processing per asset** with snapshots that never block on
//!   the fallback
//! - **Event hooks** for every step of a request's lifecycle
//!
//! ## Example
//!
//! ```rust
//! use fallback_matching::prelude::*;
//! use fallback_matching::testing::MockLiquiditySource;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! // The pool quotes 100 but has no capacity yet
//! let pool = Arc::new(
//!     MockLiquiditySource::new(Decimal::from(100)).with_available(Decimal::ZERO),
//! );
//! let engine = MatchingEngineBuilder::new("BTC")
//!     .with_liquidity(pool.clone())
//!     .build()
//!     .unwrap();
//!
//! // Nothing can fill the limit sell, so it rests
//! let sell = Request::limit("BTC", Side::Sell, Decimal::from(100), Decimal::from(5));
//! assert_eq!(engine.process(sell).unwrap().status, MatchStatus::Resting);
//!
//! // A bigger market buy takes the book first, then the pool
//! pool.set_available(Decimal::from(1000));
//! let outcome = engine
//!     .process(Request::market("BTC", Side::Buy, Decimal::from(8)))
//!     .unwrap();
//!
//! assert_eq!(outcome.book_filled, Decimal::from(5));
//! assert_eq!(outcome.fallback_filled, Decimal::from(3));
//! println!("{}", outcome.summary);
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod testing;
pub mod utils;

#[cfg(feature = "http")]
pub mod adapters;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        EngineConfig, Fill, FillSource, MarginMode, MatchOutcome, MatchStatus, OrderBookSnapshot,
        Price, ProtectiveThresholds, ProtectiveTrigger, Quantity, Request, RequestId, RequestKind,
        Side,
    };
    #[cfg(feature = "async")]
    pub use crate::engine::AsyncEngineHandle;
    pub use crate::engine::{
        create_from_config, EngineWorker, MatchingEngine, MatchingEngineBuilder,
    };
    pub use crate::error::{EngineError, FallbackError, LiquidityError, RequestError};
    pub use crate::interfaces::{
        EventHandler, LiquiditySource, LoggingEventHandler, NoLiquidity, NoOpEventHandler,
        OrderEvent, RecordingEventHandler,
    };
}

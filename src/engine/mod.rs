// ============================================================================
// Engine Module
// Request processing: thresholds, book walk, fallback, resting
// ============================================================================

#[cfg(feature = "async")]
mod async_handle;
mod fallback;
mod matching_engine;
mod price_time;
mod trigger;
mod worker;

pub mod factory;

#[cfg(feature = "async")]
pub use async_handle::AsyncEngineHandle;
pub use factory::{create_from_config, MatchingEngineBuilder};
pub use fallback::LiquidityFallback;
pub use matching_engine::MatchingEngine;
pub use price_time::{BookFills, PriceTimeMatcher};
pub use trigger::TriggerEvaluator;
pub use worker::EngineWorker;

// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod order_book;
pub mod outcome;
pub mod request;

use rust_decimal::Decimal;

/// Prices are exact decimals; zero is never a valid limit price.
pub type Price = Decimal;

/// Quantities are exact decimals; zero means "nothing left".
pub type Quantity = Decimal;

pub use config::EngineConfig;
pub use order_book::{LevelQueue, OrderBook, OrderBookSide, OrderBookSnapshot, PriceLevel};
pub use outcome::{Fill, FillSource, MatchOutcome, MatchStatus};
pub use request::{
    MarginMode, ProtectiveThresholds, ProtectiveTrigger, Request, RequestId, RequestKind, Side,
};

// ============================================================================
// Error Types
// ============================================================================

use crate::domain::{Price, Quantity, Side};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a request was rejected before matching
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Quantity),

    #[error("quantity {quantity} exceeds maximum {max}")]
    QuantityTooLarge { quantity: Quantity, max: Quantity },

    #[error("unknown asset {got}, engine matches {expected}")]
    UnknownAsset { expected: String, got: String },

    #[error("limit requests must have a price")]
    MissingLimitPrice,

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Price),

    #[error("notional of {quantity} at {price} is out of range")]
    NotionalOverflow { price: Price, quantity: Quantity },

    #[error("protective thresholds cannot be negative")]
    NegativeThreshold,

    #[error("price {price} is not a multiple of tick size {tick}")]
    TickSizeViolation { price: Price, tick: Price },

    #[error("quantity {quantity} is not a multiple of lot size {lot}")]
    LotSizeViolation { quantity: Quantity, lot: Quantity },

    #[error("request expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("request {0} is already resting in the book")]
    DuplicateId(String),
}

/// Errors reported by a liquidity source implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidityError {
    #[error("liquidity unavailable: {0}")]
    Unavailable(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Why the fallback contributed nothing. Always recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FallbackError {
    #[error("no fallback liquidity for {side} side")]
    LiquidityUnavailable { side: Side },

    #[error("no reference price to execute fallback fills at")]
    NoReferencePrice,

    #[error("reference price {reference} is worse than limit {limit}")]
    PriceNotAcceptable { limit: Price, reference: Price },

    #[error("fallback transport failure: {0}")]
    TransportFailure(LiquidityError),
}

impl From<LiquidityError> for FallbackError {
    fn from(err: LiquidityError) -> Self {
        FallbackError::TransportFailure(err)
    }
}

/// Errors surfaced to callers of the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("engine worker has stopped")]
    WorkerStopped,

    #[error("failed to start engine worker")]
    WorkerSpawn(#[source] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RequestError::NonPositiveQuantity(Decimal::ZERO).to_string(),
            "quantity must be positive, got 0"
        );
        assert_eq!(
            FallbackError::LiquidityUnavailable { side: Side::Buy }.to_string(),
            "no fallback liquidity for buy side"
        );
        assert_eq!(
            EngineError::from(RequestError::MissingLimitPrice).to_string(),
            "invalid request: limit requests must have a price"
        );
    }

    #[test]
    fn test_liquidity_error_becomes_transport_failure() {
        let err: FallbackError = LiquidityError::Transport("connection reset".into()).into();
        assert!(matches!(err, FallbackError::TransportFailure(_)));
    }
}

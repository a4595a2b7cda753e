// ============================================================================
// Liquidity Source Interface
// Contract for the external counter-liquidity collaborator
// ============================================================================

use crate::domain::{Price, Quantity, RequestId, Side};
use crate::error::LiquidityError;

/// External liquidity consulted when the book cannot satisfy a request.
///
/// Implementations may block on I/O. They are called while the engine holds
/// its per-asset gate, so they should enforce their own timeouts.
pub trait LiquiditySource: Send + Sync {
    /// Reference price for `asset`, used for protective thresholds and for
    /// pricing fallback fills
    fn current_price(&self, asset: &str) -> Result<Price, LiquidityError>;

    /// Capacity available to a request on `side`; zero or negative means none
    fn available_liquidity(&self, side: Side) -> Result<Quantity, LiquidityError>;

    /// Best-effort fill. Returning less than `quantity` is not an error.
    fn fill(
        &self,
        request_id: &RequestId,
        quantity: Quantity,
        side: Side,
    ) -> Result<Quantity, LiquidityError>;

    /// Name for logging
    fn name(&self) -> &str {
        "liquidity-source"
    }
}

/// Source with nothing behind it; every call reports unavailability.
pub struct NoLiquidity;

impl LiquiditySource for NoLiquidity {
    fn current_price(&self, _asset: &str) -> Result<Price, LiquidityError> {
        Err(LiquidityError::Unavailable("no liquidity source".to_string()))
    }

    fn available_liquidity(&self, _side: Side) -> Result<Quantity, LiquidityError> {
        Err(LiquidityError::Unavailable("no liquidity source".to_string()))
    }

    fn fill(
        &self,
        _request_id: &RequestId,
        _quantity: Quantity,
        _side: Side,
    ) -> Result<Quantity, LiquidityError> {
        Err(LiquidityError::Unavailable("no liquidity source".to_string()))
    }

    fn name(&self) -> &str {
        "none"
    }
}

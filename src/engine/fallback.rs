// ============================================================================
// Liquidity Fallback Adapter
// Offers book remainders to the external liquidity source, once per request
// ============================================================================

use crate::domain::{Fill, Price, Quantity, Request, Side};
use crate::error::{FallbackError, LiquidityError};
use crate::interfaces::LiquiditySource;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Bridges unfilled remainders to a [`LiquiditySource`].
///
/// Fallback fills are priced at the reference price the engine fetched for
/// the request. There is no retry; every failure means "no extra fill".
pub struct LiquidityFallback {
    source: Arc<dyn LiquiditySource>,
    enforce_limit: bool,
}

impl LiquidityFallback {
    pub fn new(source: Arc<dyn LiquiditySource>, enforce_limit: bool) -> Self {
        Self {
            source,
            enforce_limit,
        }
    }

    /// Try to fill up to `remaining` of `request` from the liquidity source.
    ///
    /// The returned fill may be for zero quantity when the source accepted
    /// the call but filled nothing.
    pub fn try_fill(
        &self,
        request: &Request,
        remaining: Quantity,
        reference_price: Option<Price>,
    ) -> Result<Fill, FallbackError> {
        let price = reference_price.ok_or(FallbackError::NoReferencePrice)?;

        if self.enforce_limit {
            if let Some(limit) = request.limit_price.filter(|_| request.is_limit()) {
                let acceptable = match request.side {
                    Side::Buy => price <= limit,
                    Side::Sell => price >= limit,
                };
                if !acceptable {
                    return Err(FallbackError::PriceNotAcceptable {
                        limit,
                        reference: price,
                    });
                }
            }
        }

        let available = match self.source.available_liquidity(request.side) {
            Ok(quantity) => quantity,
            Err(LiquidityError::Unavailable(_)) => {
                return Err(FallbackError::LiquidityUnavailable { side: request.side })
            },
            Err(err) => return Err(FallbackError::TransportFailure(err)),
        };
        if available <= Decimal::ZERO {
            return Err(FallbackError::LiquidityUnavailable { side: request.side });
        }

        let requested = remaining.min(available);
        let filled = self.source.fill(&request.id, requested, request.side)?;

        // A source cannot fill more than asked, nor a negative amount.
        let filled = filled.max(Decimal::ZERO).min(requested);

        tracing::debug!(
            source = self.source.name(),
            request_id = %request.id,
            %requested,
            %filled,
            "Fallback fill"
        );

        Ok(Fill::fallback(price, filled))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

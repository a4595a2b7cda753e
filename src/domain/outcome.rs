// ============================================================================
// Match Outcome Domain Model
// ============================================================================

use super::{Price, Quantity, Request, RequestId};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a fill came from
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillSource {
    /// Matched against a resting request
    Book { counterparty: RequestId },
    /// Filled by the external liquidity source
    Fallback,
}

/// One contribution to an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fill {
    pub source: FillSource,
    pub price: Price,
    pub quantity: Quantity,
}

impl Fill {
    pub fn book(counterparty: RequestId, price: Price, quantity: Quantity) -> Self {
        Self {
            source: FillSource::Book { counterparty },
            price,
            quantity,
        }
    }

    pub fn fallback(price: Price, quantity: Quantity) -> Self {
        Self {
            source: FillSource::Fallback,
            price,
            quantity,
        }
    }

    pub fn is_book(&self) -> bool {
        matches!(self.source, FillSource::Book { .. })
    }

    /// price * quantity, `None` when it does not fit in a `Decimal`
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchStatus {
    /// A protective threshold fired; full quantity at the reference price
    ThresholdExecuted,
    /// Nothing left over
    Filled,
    /// Some quantity filled, remainder discarded (market requests)
    PartiallyFilled,
    /// Remainder placed on the book (limit requests)
    Resting,
    /// Nothing filled and nothing rested
    Unfilled,
}

/// Result of processing one request.
///
/// Every field maps 1:1 onto the transport response; `summary` is derived
/// from the numeric fields only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchOutcome {
    pub request_id: RequestId,
    pub status: MatchStatus,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Quantity-weighted average over all fills, zero when nothing filled
    pub executed_price: Price,
    pub fully_filled: bool,
    pub book_filled: Quantity,
    pub fallback_filled: Quantity,
    pub fills: Vec<Fill>,
    pub summary: String,
}

impl MatchOutcome {
    /// Outcome of a protective-threshold execution
    pub fn threshold_executed(request: &Request, reference_price: Price) -> Self {
        let quantity = request.requested_quantity;
        Self {
            request_id: request.id.clone(),
            status: MatchStatus::ThresholdExecuted,
            filled_quantity: quantity,
            remaining_quantity: Decimal::ZERO,
            executed_price: reference_price,
            fully_filled: true,
            book_filled: Decimal::ZERO,
            fallback_filled: Decimal::ZERO,
            fills: Vec::new(),
            summary: format!(
                "Request {} executed by protective threshold at {}",
                request.id,
                reference_price.normalize()
            ),
        }
    }

    /// Outcome of a normal book + fallback pass.
    ///
    /// `request` must already reflect every fill in `fills`.
    pub fn from_fills(request: &Request, fills: Vec<Fill>, rested: bool) -> Self {
        let (book_filled, fallback_filled) =
            fills
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(book, fallback), fill| {
                    if fill.is_book() {
                        (book + fill.quantity, fallback)
                    } else {
                        (book, fallback + fill.quantity)
                    }
                });
        let filled = book_filled + fallback_filled;
        let remaining = request.requested_quantity - filled;
        debug_assert_eq!(filled, request.filled_quantity());

        let status = if remaining <= Decimal::ZERO {
            MatchStatus::Filled
        } else if rested {
            MatchStatus::Resting
        } else if filled > Decimal::ZERO {
            MatchStatus::PartiallyFilled
        } else {
            MatchStatus::Unfilled
        };

        let mut summary = format!(
            "Request {}: requested {}, filled {} ({} from book, {} from fallback), remaining {}",
            request.id,
            request.requested_quantity.normalize(),
            filled.normalize(),
            book_filled.normalize(),
            fallback_filled.normalize(),
            remaining.normalize(),
        );
        if status == MatchStatus::Resting {
            summary.push_str("; resting");
        }

        Self {
            request_id: request.id.clone(),
            status,
            filled_quantity: filled,
            remaining_quantity: remaining,
            executed_price: weighted_price(&fills),
            fully_filled: remaining <= Decimal::ZERO,
            book_filled,
            fallback_filled,
            fills,
            summary,
        }
    }
}

/// Quantity-weighted average price; zero for an empty fill list.
pub fn weighted_price(fills: &[Fill]) -> Price {
    let quantity: Quantity = fills.iter().map(|fill| fill.quantity).sum();
    if quantity <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let notional = fills.iter().try_fold(Decimal::ZERO, |notional, fill| {
        notional.checked_add(fill.notional()?)
    });
    match notional {
        Some(notional) => notional / quantity,
        // Summed notional is out of range; weight each price by its share
        None => fills
            .iter()
            .map(|fill| fill.price * (fill.quantity / quantity))
            .sum(),
    }
}

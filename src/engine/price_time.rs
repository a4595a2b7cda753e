// ============================================================================
// Price/Time Priority Book Walk (FIFO)
// ============================================================================

use crate::domain::{Fill, LevelQueue, OrderBookSide, Price, Request, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use smallvec::SmallVec;

/// Fills produced by one walk of the opposing side, in execution order
pub type BookFills = SmallVec<[Fill; 4]>;

/// Price/Time priority matching against one side of the book
///
/// Levels are visited best price first; within a level, oldest request first.
/// A limit request stops at the first level it does not cross.
///
/// # Example
/// ```text
/// Book:  100 @ 5 (A, t=1)
///        100 @ 5 (B, t=2)
///        101 @ 7 (C, t=3)
///
/// Incoming: Buy 8 @ 100 limit
/// Result: 5 with A, 3 with B, C untouched
/// ```
///
/// The walk never removes anything; fully filled requests stay in their
/// queue until the caller compacts the side. A trade whose notional does not
/// fit in a `Decimal` ends the walk before either side is touched.
pub struct PriceTimeMatcher;

impl PriceTimeMatcher {
    pub fn match_request(
        &self,
        incoming: &mut Request,
        opposite_side: &OrderBookSide,
        now: DateTime<Utc>,
    ) -> BookFills {
        let mut fills = BookFills::new();

        'levels: for level in opposite_side.levels_by_priority() {
            if incoming.remaining_quantity() <= Decimal::ZERO {
                break;
            }
            if !Self::prices_cross(incoming, level.price) {
                break;
            }

            let mut queue = level.lock();
            let LevelQueue {
                requests,
                open_quantity,
            } = &mut *queue;

            for resting in requests.iter_mut() {
                let incoming_remaining = incoming.remaining_quantity();
                if incoming_remaining <= Decimal::ZERO {
                    break;
                }
                if resting.is_expired(now) {
                    continue;
                }

                let trade_quantity = incoming_remaining.min(resting.remaining_quantity());
                if trade_quantity <= Decimal::ZERO {
                    continue;
                }

                if trade_quantity.checked_mul(level.price).is_none() {
                    tracing::warn!(
                        request_id = %incoming.id,
                        price = %level.price,
                        quantity = %trade_quantity,
                        "Trade notional overflows, stopping book walk"
                    );
                    break 'levels;
                }
                let fill = Fill::book(resting.id.clone(), level.price, trade_quantity);

                if resting.fill(trade_quantity) && incoming.fill(trade_quantity) {
                    *open_quantity -= trade_quantity;
                    fills.push(fill);
                }
            }
        }

        fills
    }

    /// Check if the incoming request accepts `book_price`. Market requests
    /// accept any price.
    pub fn prices_cross(incoming: &Request, book_price: Price) -> bool {
        match (incoming.limit_price, incoming.is_limit()) {
            (Some(limit), true) => match incoming.side {
                Side::Buy => book_price <= limit,
                Side::Sell => book_price >= limit,
            },
            _ => true,
        }
    }
}

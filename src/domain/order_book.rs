// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use crossbeam_skiplist::SkipMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::{Price, Quantity, Request, RequestId, Side};
use crate::error::RequestError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// FIFO queue of resting requests at one price
#[derive(Debug, Default)]
pub struct LevelQueue {
    pub(crate) requests: VecDeque<Request>,
    /// Sum of remaining quantity over `requests`
    pub(crate) open_quantity: Quantity,
}

impl LevelQueue {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn open_quantity(&self) -> Quantity {
        self.open_quantity
    }

    /// Resting requests, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }

    fn push_back(&mut self, request: Request) {
        self.open_quantity += request.remaining_quantity();
        self.requests.push_back(request);
    }

    fn remove(&mut self, id: &RequestId) -> Option<Request> {
        let position = self.requests.iter().position(|r| &r.id == id)?;
        let request = self.requests.remove(position)?;
        self.open_quantity -= request.remaining_quantity();
        Some(request)
    }

    /// Drop filled and expired requests, preserving the order of the rest.
    fn compact(&mut self, now: DateTime<Utc>) -> Vec<Request> {
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.requests.len());

        for request in self.requests.drain(..) {
            if request.is_fully_filled() || request.is_expired(now) {
                removed.push(request);
            } else {
                kept.push_back(request);
            }
        }

        self.requests = kept;
        self.open_quantity = self
            .requests
            .iter()
            .map(Request::remaining_quantity)
            .sum();
        removed
    }
}

/// All resting requests at a specific price
#[derive(Debug)]
pub struct PriceLevel {
    pub price: Price,
    queue: Mutex<LevelQueue>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            queue: Mutex::new(LevelQueue::default()),
        }
    }

    pub(crate) fn add_request(&self, request: Request) {
        self.queue.lock().push_back(request);
    }

    pub fn open_quantity(&self) -> Quantity {
        self.queue.lock().open_quantity()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Exclusive access to the queue for a match pass
    pub(crate) fn lock(&self) -> MutexGuard<'_, LevelQueue> {
        self.queue.lock()
    }
}

// ============================================================================
// Order Book Side
// ============================================================================

/// One side of the book (bids or asks), price-indexed.
///
/// Levels are kept sorted by the skip list, so matching walks them directly
/// instead of re-sorting per request.
pub struct OrderBookSide {
    levels: SkipMap<Price, Arc<PriceLevel>>,
    side: Side,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: SkipMap::new(),
            side,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    fn insert(&self, price: Price, request: Request) {
        let level = self
            .levels
            .get_or_insert(price, Arc::new(PriceLevel::new(price)));
        level.value().add_request(request);
    }

    /// Levels in matching order: ascending for asks, descending for bids
    pub fn levels_by_priority(&self) -> Box<dyn Iterator<Item = Arc<PriceLevel>> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(|e| Arc::clone(e.value()))),
            Side::Sell => Box::new(self.levels.iter().map(|e| Arc::clone(e.value()))),
        }
    }

    /// Get the best (top-of-book) price
    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(|level| level.price)
    }

    pub fn best_level(&self) -> Option<Arc<PriceLevel>> {
        self.levels_by_priority().next()
    }

    /// Remove filled and expired requests, then empty levels.
    pub(crate) fn compact(&self, now: DateTime<Utc>) -> Vec<Request> {
        let mut removed = Vec::new();
        let mut empty = Vec::new();

        for entry in self.levels.iter() {
            let mut queue = entry.value().lock();
            removed.extend(queue.compact(now));
            if queue.is_empty() {
                empty.push(*entry.key());
            }
        }

        for key in empty {
            self.levels.remove(&key);
        }

        removed
    }

    fn remove(&self, price: Price, id: &RequestId) -> Option<Request> {
        let entry = self.levels.get(&price)?;
        let level = Arc::clone(entry.value());
        let mut queue = level.lock();
        let removed = queue.remove(id);
        if queue.is_empty() {
            drop(queue);
            self.levels.remove(&price);
        }
        removed
    }

    fn get(&self, price: Price, id: &RequestId) -> Option<Request> {
        let entry = self.levels.get(&price)?;
        let queue = entry.value().lock();
        let found = queue.iter().find(|r| &r.id == id).cloned();
        found
    }

    /// (price, open quantity) for the best `num_levels` levels
    pub fn get_depth(&self, num_levels: usize) -> Vec<(Price, Quantity)> {
        self.levels_by_priority()
            .take(num_levels)
            .map(|level| (level.price, level.open_quantity()))
            .collect()
    }

    pub fn open_quantity(&self) -> Quantity {
        self.levels
            .iter()
            .map(|entry| entry.value().open_quantity())
            .sum()
    }

    /// Number of resting requests
    pub fn len(&self) -> usize {
        self.levels.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Resting buy and sell requests for a single asset.
///
/// Writes are only issued by the owning engine while it holds its gate;
/// readers (snapshots, lookups) may run concurrently. Outside the crate the
/// book can only be changed through the engine:
///
/// ```compile_fail
/// use fallback_matching::domain::{OrderBook, Request, Side};
/// use rust_decimal::Decimal;
///
/// let book = OrderBook::new("BTC");
/// book.insert_resting(Request::limit("BTC", Side::Sell, Decimal::ONE, Decimal::ONE))
///     .unwrap();
/// ```
pub struct OrderBook {
    asset: String,
    bids: OrderBookSide,
    asks: OrderBookSide,
    /// Where each resting request lives
    index: RwLock<HashMap<RequestId, (Side, Price)>>,
}

impl OrderBook {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            bids: OrderBookSide::new(Side::Buy),
            asks: OrderBookSide::new(Side::Sell),
            index: RwLock::new(HashMap::new()),
        }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Append a limit request with open quantity to its own side.
    pub(crate) fn insert_resting(&self, request: Request) -> Result<(), RequestError> {
        let price = match (request.is_limit(), request.limit_price) {
            (true, Some(price)) if price > Decimal::ZERO => price,
            (true, Some(price)) => return Err(RequestError::NonPositivePrice(price)),
            _ => return Err(RequestError::MissingLimitPrice),
        };
        if request.remaining_quantity() <= Decimal::ZERO {
            return Err(RequestError::NonPositiveQuantity(request.remaining_quantity()));
        }

        self.index
            .write()
            .insert(request.id.clone(), (request.side, price));
        self.side(request.side).insert(price, request);
        Ok(())
    }

    pub fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// The side an incoming request of `side` is matched against
    pub fn opposing_side(&self, side: Side) -> &OrderBookSide {
        self.side(side.opposite())
    }

    /// Compact one side and forget the removed requests.
    pub(crate) fn compact(&self, side: Side, now: DateTime<Utc>) -> Vec<Request> {
        let removed = self.side(side).compact(now);
        if !removed.is_empty() {
            let mut index = self.index.write();
            for request in &removed {
                index.remove(&request.id);
            }
        }
        removed
    }

    pub(crate) fn remove(&self, id: &RequestId) -> Option<Request> {
        let (side, price) = self.index.write().remove(id)?;
        self.side(side).remove(price, id)
    }

    /// Copy of a resting request
    pub fn get(&self, id: &RequestId) -> Option<Request> {
        let (side, price) = *self.index.read().get(id)?;
        self.side(side).get(price, id)
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.index.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            self.asset.clone(),
            self.bids.get_depth(depth),
            self.asks.get_depth(depth),
        )
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of the order book state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub asset: String,
    /// Bid levels (price, open quantity), best first
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels (price, open quantity), best first
    pub asks: Vec<(Price, Quantity)>,
    /// Current spread (ask - bid)
    pub spread: Option<Price>,
    pub mid_price: Option<Price>,
}

impl OrderBookSnapshot {
    pub fn with_depth(
        asset: String,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
    ) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => {
                (Some(ask - bid), Some((bid + ask) / Decimal::from(2)))
            },
            _ => (None, None),
        };

        Self {
            asset,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_quantity(&self) -> Quantity {
        self.bids.iter().map(|(_, qty)| qty).sum()
    }

    pub fn total_ask_quantity(&self) -> Quantity {
        self.asks.iter().map(|(_, qty)| qty).sum()
    }
}

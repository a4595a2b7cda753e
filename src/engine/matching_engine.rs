// ============================================================================
// Matching Engine
// Core business logic for request processing
// ============================================================================

use crate::domain::{
    EngineConfig, Fill, FillSource, MatchOutcome, OrderBook, OrderBookSnapshot, Price, Request,
    RequestId,
};
use crate::engine::fallback::LiquidityFallback;
use crate::engine::price_time::PriceTimeMatcher;
use crate::engine::trigger::TriggerEvaluator;
use crate::error::{EngineError, RequestError};
use crate::interfaces::{EventHandler, LiquiditySource, OrderEvent};
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Matching engine for a single asset.
///
/// Every request runs to completion before the next one for the same asset
/// starts (the `gate`). Book level locks are only held during the walk,
/// insert and compaction, so snapshots stay cheap while a fallback call is
/// in flight. Engines for different assets share nothing.
pub struct MatchingEngine {
    config: EngineConfig,

    book: OrderBook,

    matcher: PriceTimeMatcher,

    /// Reference prices for thresholds and fallback pricing
    liquidity: Arc<dyn LiquiditySource>,

    /// None when the config disables the fallback
    fallback: Option<LiquidityFallback>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,

    /// Serializes whole requests
    gate: Mutex<()>,

    /// Sequence counter for request sequencing
    sequence_counter: AtomicU64,
}

impl MatchingEngine {
    /// Create a new matching engine. The config is expected to be validated;
    /// see [`crate::engine::create_from_config`].
    pub fn new(
        config: EngineConfig,
        liquidity: Arc<dyn LiquiditySource>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        let fallback = config.fallback_enabled.then(|| {
            LiquidityFallback::new(Arc::clone(&liquidity), config.enforce_limit_on_fallback)
        });

        Self {
            book: OrderBook::new(config.asset.clone()),
            config,
            matcher: PriceTimeMatcher,
            liquidity,
            fallback,
            event_handler,
            gate: Mutex::new(()),
            sequence_counter: AtomicU64::new(0),
        }
    }

    /// Process one request: protective thresholds, book, fallback, rest.
    ///
    /// Returns `Err` only when the request is rejected before matching.
    pub fn process(&self, mut request: Request) -> Result<MatchOutcome, EngineError> {
        request.assign_id_if_missing();
        let mut events = vec![OrderEvent::RequestReceived {
            request_id: request.id.clone(),
            timestamp: Utc::now(),
        }];

        let outcome = {
            let _gate = self.gate.lock();

            if let Err(reason) = self.validate_request(&request) {
                tracing::info!(
                    asset = %self.config.asset,
                    request_id = %request.id,
                    %reason,
                    "Request rejected"
                );
                events.push(OrderEvent::RequestRejected {
                    request_id: request.id.clone(),
                    reason: reason.to_string(),
                    timestamp: Utc::now(),
                });
                drop(_gate);
                self.event_handler.on_events(events);
                return Err(EngineError::InvalidRequest(reason));
            }

            let seq = self.sequence_counter.fetch_add(1, Ordering::AcqRel);
            request.set_sequence(seq);

            self.execute(request, &mut events)
        };

        events.push(OrderEvent::RequestCompleted {
            request_id: outcome.request_id.clone(),
            status: outcome.status,
            filled_quantity: outcome.filled_quantity,
            remaining_quantity: outcome.remaining_quantity,
            timestamp: Utc::now(),
        });
        self.event_handler.on_events(events);

        Ok(outcome)
    }

    /// Cancel a resting request
    pub fn cancel(&self, request_id: &RequestId) -> Option<Request> {
        let removed = {
            let _gate = self.gate.lock();
            self.book.remove(request_id)?
        };

        tracing::debug!(asset = %self.config.asset, request_id = %request_id, "Request cancelled");
        self.event_handler.on_event(OrderEvent::RequestCancelled {
            request_id: request_id.clone(),
            timestamp: Utc::now(),
        });
        Some(removed)
    }

    /// Get order book snapshot
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        self.book.snapshot(depth)
    }

    /// Copy of a resting request
    pub fn resting(&self, request_id: &RequestId) -> Option<Request> {
        self.book.get(request_id)
    }

    /// Number of resting requests on both sides
    pub fn resting_count(&self) -> usize {
        self.book.len()
    }

    /// Get spread
    pub fn spread(&self) -> Option<Price> {
        self.snapshot(1).spread
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Price> {
        self.snapshot(1).mid_price
    }

    pub fn asset(&self) -> &str {
        &self.config.asset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn book(&self) -> &OrderBook {
        &self.book
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    /// Runs with the gate held.
    fn execute(&self, mut request: Request, events: &mut Vec<OrderEvent>) -> MatchOutcome {
        let reference_price = self.reference_price();

        if let Some(price) = reference_price {
            if let Some(trigger) = TriggerEvaluator::fired(&request, price) {
                tracing::debug!(
                    asset = %self.config.asset,
                    request_id = %request.id,
                    ?trigger,
                    %price,
                    "Protective threshold executed"
                );
                events.push(OrderEvent::ThresholdExecuted {
                    request_id: request.id.clone(),
                    trigger,
                    price,
                    quantity: request.requested_quantity,
                    timestamp: Utc::now(),
                });
                return MatchOutcome::threshold_executed(&request, price);
            }
        }

        // Book walk
        let now = Utc::now();
        let opposite = request.side.opposite();
        let mut fills: Vec<Fill> = self
            .matcher
            .match_request(&mut request, self.book.side(opposite), now)
            .into_vec();
        for expired in self
            .book
            .compact(opposite, now)
            .into_iter()
            .filter(|r| !r.is_fully_filled())
        {
            tracing::debug!(
                asset = %self.config.asset,
                request_id = %expired.id,
                "Resting request expired"
            );
            events.push(OrderEvent::RequestExpired {
                request_id: expired.id,
                timestamp: now,
            });
        }

        for fill in &fills {
            if let FillSource::Book { counterparty } = &fill.source {
                events.push(OrderEvent::BookFill {
                    request_id: request.id.clone(),
                    counterparty: counterparty.clone(),
                    price: fill.price,
                    quantity: fill.quantity,
                    timestamp: now,
                });
            }
        }

        // Fallback
        let remaining = request.remaining_quantity();
        if remaining > Decimal::ZERO {
            if let Some(fallback) = &self.fallback {
                match fallback.try_fill(&request, remaining, reference_price) {
                    Ok(fill) if fill.quantity > Decimal::ZERO => {
                        if request.fill(fill.quantity) {
                            events.push(OrderEvent::FallbackFill {
                                request_id: request.id.clone(),
                                price: fill.price,
                                quantity: fill.quantity,
                                timestamp: Utc::now(),
                            });
                            fills.push(fill);
                        }
                    },
                    Ok(_) => {},
                    Err(err) => {
                        tracing::warn!(
                            asset = %self.config.asset,
                            request_id = %request.id,
                            source = fallback.source_name(),
                            error = %err,
                            "Fallback contributed no fill"
                        );
                        events.push(OrderEvent::FallbackFailed {
                            request_id: request.id.clone(),
                            reason: err.to_string(),
                            timestamp: Utc::now(),
                        });
                    },
                }
            }
        }

        // Rest or discard the remainder
        let remaining = request.remaining_quantity();
        let mut rested = false;
        if remaining > Decimal::ZERO && request.is_limit() {
            let price = request.limit_price.unwrap_or(Decimal::ZERO);
            let rested_request = request.clone();
            match self.book.insert_resting(rested_request) {
                Ok(()) => {
                    rested = true;
                    tracing::debug!(
                        asset = %self.config.asset,
                        request_id = %request.id,
                        %price,
                        %remaining,
                        "Request resting"
                    );
                    events.push(OrderEvent::RequestRested {
                        request_id: request.id.clone(),
                        price,
                        quantity: remaining,
                        timestamp: Utc::now(),
                    });
                },
                Err(err) => {
                    tracing::warn!(
                        request_id = %request.id,
                        error = %err,
                        "Could not rest request"
                    );
                },
            }
        }

        MatchOutcome::from_fills(&request, fills, rested)
    }

    /// Reference price from the liquidity source; errors and non-positive
    /// quotes mean "no price".
    fn reference_price(&self) -> Option<Price> {
        match self.liquidity.current_price(&self.config.asset) {
            Ok(price) if price > Decimal::ZERO => Some(price),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(asset = %self.config.asset, error = %err, "No reference price");
                None
            },
        }
    }

    fn validate_request(&self, request: &Request) -> Result<(), RequestError> {
        if request.asset != self.config.asset {
            return Err(RequestError::UnknownAsset {
                expected: self.config.asset.clone(),
                got: request.asset.clone(),
            });
        }

        let quantity = request.requested_quantity;
        if quantity <= Decimal::ZERO {
            return Err(RequestError::NonPositiveQuantity(quantity));
        }
        if let Some(max) = self.config.max_quantity {
            if quantity > max {
                return Err(RequestError::QuantityTooLarge { quantity, max });
            }
        }
        if let Some(lot) = self.config.lot_size {
            if !(quantity % lot).is_zero() {
                return Err(RequestError::LotSizeViolation { quantity, lot });
            }
        }

        if request.is_limit() {
            let price = request.limit_price.ok_or(RequestError::MissingLimitPrice)?;
            if price <= Decimal::ZERO {
                return Err(RequestError::NonPositivePrice(price));
            }
            if let Some(tick) = self.config.tick_size {
                if !(price % tick).is_zero() {
                    return Err(RequestError::TickSizeViolation { price, tick });
                }
            }
            if price.checked_mul(quantity).is_none() {
                return Err(RequestError::NotionalOverflow { price, quantity });
            }
        }

        if request.thresholds.stop_loss < Decimal::ZERO
            || request.thresholds.take_profit < Decimal::ZERO
        {
            return Err(RequestError::NegativeThreshold);
        }

        if let Some(expires_at) = request.expires_at {
            if expires_at <= Utc::now() {
                return Err(RequestError::Expired(expires_at));
            }
        }

        if self.book.contains(&request.id) {
            return Err(RequestError::DuplicateId(request.id.to_string()));
        }

        Ok(())
    }
}

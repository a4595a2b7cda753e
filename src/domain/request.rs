// ============================================================================
// Trade Request Domain Model
// ============================================================================

use super::{Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Identity of a request. Submitters may choose it; otherwise a UUID v4 is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RequestKind {
    /// Executes against whatever is available; never rests
    Market,
    /// Executes at the limit price or better; remainder rests in the book
    Limit,
}

/// Margin tag carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MarginMode {
    #[default]
    Cross,
    Isolated,
}

/// Which protective threshold fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtectiveTrigger {
    StopLoss,
    TakeProfit,
}

/// Stop-loss / take-profit levels. A zero level is inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProtectiveThresholds {
    pub stop_loss: Price,
    pub take_profit: Price,
}

impl ProtectiveThresholds {
    pub const NONE: Self = Self {
        stop_loss: Decimal::ZERO,
        take_profit: Decimal::ZERO,
    };

    pub fn stop_loss(&self) -> Option<Price> {
        Some(self.stop_loss).filter(|p| *p > Decimal::ZERO)
    }

    pub fn take_profit(&self) -> Option<Price> {
        Some(self.take_profit).filter(|p| *p > Decimal::ZERO)
    }

    pub fn is_active(&self) -> bool {
        self.stop_loss().is_some() || self.take_profit().is_some()
    }
}

// ============================================================================
// Request Entity
// ============================================================================

/// A buy or sell request for one asset.
///
/// Identity and terms are fixed at construction. `filled_quantity` only
/// moves forward, and only while the owning engine holds its book gate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Request {
    pub id: RequestId,
    pub asset: String,
    pub side: Side,
    pub kind: RequestKind,
    /// Only meaningful for limit requests
    pub limit_price: Option<Price>,
    pub requested_quantity: Quantity,
    pub thresholds: ProtectiveThresholds,
    pub leverage: u32,
    pub margin_mode: MarginMode,
    pub trader: String,
    pub submitted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,

    filled_quantity: Quantity,
    sequence: u64,
}

impl Request {
    pub fn new(
        asset: impl Into<String>,
        side: Side,
        kind: RequestKind,
        limit_price: Option<Price>,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: RequestId::generate(),
            asset: asset.into(),
            side,
            kind,
            limit_price,
            requested_quantity: quantity,
            thresholds: ProtectiveThresholds::NONE,
            leverage: 1,
            margin_mode: MarginMode::Cross,
            trader: String::new(),
            submitted_at: Utc::now(),
            expires_at: None,
            filled_quantity: Decimal::ZERO,
            sequence: 0,
        }
    }

    pub fn market(asset: impl Into<String>, side: Side, quantity: Quantity) -> Self {
        Self::new(asset, side, RequestKind::Market, None, quantity)
    }

    pub fn limit(asset: impl Into<String>, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::new(asset, side, RequestKind::Limit, Some(price), quantity)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    pub fn with_id(mut self, id: impl Into<RequestId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_stop_loss(mut self, price: Price) -> Self {
        self.thresholds.stop_loss = price;
        self
    }

    pub fn with_take_profit(mut self, price: Price) -> Self {
        self.thresholds.take_profit = price;
        self
    }

    pub fn with_leverage(mut self, leverage: u32) -> Self {
        self.leverage = leverage;
        self
    }

    pub fn with_margin_mode(mut self, mode: MarginMode) -> Self {
        self.margin_mode = mode;
        self
    }

    pub fn with_trader(mut self, trader: impl Into<String>) -> Self {
        self.trader = trader.into();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn filled_quantity(&self) -> Quantity {
        self.filled_quantity
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.requested_quantity - self.filled_quantity
    }

    pub fn is_fully_filled(&self) -> bool {
        self.filled_quantity >= self.requested_quantity
    }

    /// Engine-assigned arrival order within one asset
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_market(&self) -> bool {
        matches!(self.kind, RequestKind::Market)
    }

    pub fn is_limit(&self) -> bool {
        matches!(self.kind, RequestKind::Limit)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    // ========================================================================
    // Mutation (engine only)
    // ========================================================================

    /// Record a fill. Returns false and leaves the request untouched if the
    /// quantity is not positive or exceeds what is left.
    pub(crate) fn fill(&mut self, quantity: Quantity) -> bool {
        if quantity <= Decimal::ZERO || quantity > self.remaining_quantity() {
            return false;
        }
        self.filled_quantity += quantity;
        true
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    pub(crate) fn assign_id_if_missing(&mut self) {
        if self.id.is_empty() {
            self.id = RequestId::generate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_request_creation() {
        let request = Request::limit("BTC", Side::Buy, Decimal::from(100), Decimal::from(10));

        assert!(request.is_limit());
        assert!(!request.id.is_empty());
        assert_eq!(request.remaining_quantity(), Decimal::from(10));
        assert_eq!(request.filled_quantity(), Decimal::ZERO);
        assert_eq!(request.leverage, 1);
        assert_eq!(request.margin_mode, MarginMode::Cross);
        assert!(!request.thresholds.is_active());
    }

    #[test]
    fn test_fill_tracks_remaining() {
        let mut request = Request::market("BTC", Side::Sell, Decimal::from(10));

        assert!(request.fill(Decimal::from(3)));
        assert_eq!(request.filled_quantity(), Decimal::from(3));
        assert_eq!(request.remaining_quantity(), Decimal::from(7));
        assert!(!request.is_fully_filled());

        assert!(request.fill(Decimal::from(7)));
        assert!(request.is_fully_filled());
    }

    #[test]
    fn test_overfill_protection() {
        let mut request = Request::market("BTC", Side::Buy, Decimal::from(5));

        assert!(!request.fill(Decimal::from(6)));
        assert!(!request.fill(Decimal::ZERO));
        assert!(!request.fill(Decimal::from(-1)));
        assert_eq!(request.filled_quantity(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_thresholds_are_inactive() {
        let request = Request::market("BTC", Side::Buy, Decimal::ONE)
            .with_stop_loss(Decimal::ZERO)
            .with_take_profit(Decimal::from(105));

        assert_eq!(request.thresholds.stop_loss(), None);
        assert_eq!(request.thresholds.take_profit(), Some(Decimal::from(105)));
        assert!(request.thresholds.is_active());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let request =
            Request::market("BTC", Side::Buy, Decimal::ONE).with_expiry(now - Duration::seconds(1));

        assert!(request.is_expired(now));
        assert!(!Request::market("BTC", Side::Buy, Decimal::ONE).is_expired(now));
    }

    #[test]
    fn test_empty_id_is_replaced() {
        let mut request = Request::market("BTC", Side::Buy, Decimal::ONE).with_id("  ");
        request.assign_id_if_missing();
        assert!(!request.id.is_empty());

        let mut named = Request::market("BTC", Side::Buy, Decimal::ONE).with_id("buy-1");
        named.assign_id_if_missing();
        assert_eq!(named.id.as_str(), "buy-1");
    }
}

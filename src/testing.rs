// ============================================================================
// Test Doubles
// In-memory liquidity source for exercising the engine without a live venue
// ============================================================================

use crate::domain::{Price, Quantity, RequestId, Side};
use crate::error::LiquidityError;
use crate::interfaces::LiquiditySource;
use parking_lot::Mutex;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Quantity(Quantity),
    Unreachable,
}

/// Configurable [`LiquiditySource`].
///
/// Defaults: 1000 units available on both sides, fills everything it is
/// asked for, quotes the price given to [`MockLiquiditySource::new`].
pub struct MockLiquiditySource {
    price: Mutex<Option<Price>>,
    availability: Mutex<Availability>,
    fill_ratio: Decimal,
    fail_fills: bool,
    fills: Mutex<Vec<(RequestId, Quantity, Side)>>,
}

impl MockLiquiditySource {
    pub fn new(price: Price) -> Self {
        Self {
            price: Mutex::new(Some(price)),
            availability: Mutex::new(Availability::Quantity(Decimal::from(1000))),
            fill_ratio: Decimal::ONE,
            fail_fills: false,
            fills: Mutex::new(Vec::new()),
        }
    }

    pub fn with_available(self, quantity: Quantity) -> Self {
        self.set_available(quantity);
        self
    }

    /// Fraction of each fill request that is actually filled
    pub fn with_fill_ratio(mut self, ratio: Decimal) -> Self {
        self.fill_ratio = ratio;
        self
    }

    /// Capacity queries fail as unreachable
    pub fn unavailable(self) -> Self {
        *self.availability.lock() = Availability::Unreachable;
        self
    }

    /// Fill calls fail with a transport error
    pub fn failing_fills(mut self) -> Self {
        self.fail_fills = true;
        self
    }

    /// Price queries fail
    pub fn without_price(self) -> Self {
        *self.price.lock() = None;
        self
    }

    pub fn set_price(&self, price: Option<Price>) {
        *self.price.lock() = price;
    }

    /// Change the capacity reported on both sides
    pub fn set_available(&self, quantity: Quantity) {
        *self.availability.lock() = Availability::Quantity(quantity);
    }

    pub fn fill_calls(&self) -> usize {
        self.fills.lock().len()
    }

    /// Every fill request received, in order
    pub fn fill_requests(&self) -> Vec<(RequestId, Quantity, Side)> {
        self.fills.lock().clone()
    }
}

impl LiquiditySource for MockLiquiditySource {
    fn current_price(&self, _asset: &str) -> Result<Price, LiquidityError> {
        let price = *self.price.lock();
        price.ok_or_else(|| LiquidityError::Transport("price feed down".to_string()))
    }

    fn available_liquidity(&self, _side: Side) -> Result<Quantity, LiquidityError> {
        match *self.availability.lock() {
            Availability::Quantity(quantity) => Ok(quantity),
            Availability::Unreachable => {
                Err(LiquidityError::Unavailable("pool unreachable".to_string()))
            },
        }
    }

    fn fill(
        &self,
        request_id: &RequestId,
        quantity: Quantity,
        side: Side,
    ) -> Result<Quantity, LiquidityError> {
        self.fills.lock().push((request_id.clone(), quantity, side));
        if self.fail_fills {
            return Err(LiquidityError::Transport("connection reset".to_string()));
        }
        Ok(quantity * self.fill_ratio)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

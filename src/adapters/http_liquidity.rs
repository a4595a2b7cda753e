// ============================================================================
// HTTP Liquidity Source
// Blocking REST client for an external liquidity pool
// ============================================================================

use crate::domain::{Price, Quantity, RequestId, Side};
use crate::error::LiquidityError;
use crate::interfaces::LiquiditySource;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for [`HttpLiquiditySource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpLiquidityConfig {
    /// e.g. `http://localhost:8080`
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for HttpLiquidityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 2_000,
        }
    }
}

impl HttpLiquidityConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: Price,
}

#[derive(Debug, Deserialize)]
struct LiquidityResponse {
    amount: Quantity,
}

#[derive(Debug, Serialize)]
struct TradeRequest<'a> {
    order_id: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Quantity,
    is_buy: bool,
}

#[derive(Debug, Deserialize)]
struct TradeResponse {
    filled_amount: Quantity,
}

/// [`LiquiditySource`] that talks JSON over HTTP.
///
/// Every call is bounded by the configured timeout; a timeout surfaces as
/// [`LiquidityError::Transport`] and the engine treats it as "no fill".
pub struct HttpLiquiditySource {
    client: Client,
    base_url: String,
}

impl HttpLiquiditySource {
    pub fn new(config: HttpLiquidityConfig) -> Result<Self, LiquidityError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                LiquidityError::Transport(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read<T: DeserializeOwned>(
        response: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<T, LiquidityError> {
        let body = response
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| LiquidityError::Transport(e.to_string()))?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, LiquidityError> {
    serde_json::from_str(body).map_err(|e| LiquidityError::Decode(e.to_string()))
}

impl LiquiditySource for HttpLiquiditySource {
    fn current_price(&self, asset: &str) -> Result<Price, LiquidityError> {
        let response = self.client.get(self.url(&format!("/price/{asset}"))).send();
        let PriceResponse { price } = Self::read(response)?;
        Ok(price)
    }

    fn available_liquidity(&self, side: Side) -> Result<Quantity, LiquidityError> {
        let response = self
            .client
            .get(self.url("/liquidity"))
            .query(&[("isBuyOrder", side.is_buy())])
            .send();
        let LiquidityResponse { amount } = Self::read(response)?;
        Ok(amount)
    }

    fn fill(
        &self,
        request_id: &RequestId,
        quantity: Quantity,
        side: Side,
    ) -> Result<Quantity, LiquidityError> {
        let body = TradeRequest {
            order_id: request_id.as_str(),
            amount: quantity,
            is_buy: side.is_buy(),
        };
        let response = self.client.post(self.url("/trade")).json(&body).send();
        let TradeResponse { filled_amount } = Self::read(response)?;

        tracing::debug!(request_id = %request_id, %quantity, %filled_amount, "Pool trade");
        Ok(filled_amount)
    }

    fn name(&self) -> &str {
        "http"
    }
}

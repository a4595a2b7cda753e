// ============================================================================
// Async Engine Handle
// Runs blocking engine calls on tokio's blocking pool
// ============================================================================

use crate::domain::{MatchOutcome, OrderBookSnapshot, Request, RequestId};
use crate::engine::MatchingEngine;
use crate::error::{EngineError, EngineResult};
use std::sync::Arc;

/// Cloneable handle for calling a [`MatchingEngine`] from async code.
///
/// `process` may block on the liquidity source, so it never runs on a
/// runtime worker thread.
#[derive(Clone)]
pub struct AsyncEngineHandle {
    engine: Arc<MatchingEngine>,
}

impl AsyncEngineHandle {
    pub fn new(engine: Arc<MatchingEngine>) -> Self {
        Self { engine }
    }

    pub async fn process(&self, request: Request) -> EngineResult<MatchOutcome> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.process(request))
            .await
            .map_err(|_| EngineError::WorkerStopped)?
    }

    pub async fn cancel(&self, request_id: RequestId) -> EngineResult<Option<Request>> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.cancel(&request_id))
            .await
            .map_err(|_| EngineError::WorkerStopped)
    }

    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        self.engine.snapshot(depth)
    }

    pub fn engine(&self) -> &Arc<MatchingEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, MatchStatus, Side};
    use crate::interfaces::NoOpEventHandler;
    use crate::testing::MockLiquiditySource;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_concurrent_async_submissions() {
        let source = MockLiquiditySource::new(Decimal::from(100)).with_available(Decimal::from(10));
        let engine = Arc::new(MatchingEngine::new(
            EngineConfig::new("BTC"),
            Arc::new(source),
            Arc::new(NoOpEventHandler),
        ));
        let handle = AsyncEngineHandle::new(engine);

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    handle
                        .process(Request::market("BTC", Side::Buy, Decimal::ONE))
                        .await
                        .unwrap()
                })
            })
            .collect();

        for task in tasks {
            let outcome = task.await.unwrap();
            assert_eq!(outcome.status, MatchStatus::Filled);
            assert_eq!(outcome.executed_price, Decimal::from(100));
        }
    }

    #[tokio::test]
    async fn test_async_cancel() {
        let engine = Arc::new(MatchingEngine::new(
            EngineConfig::book_only("BTC"),
            Arc::new(crate::interfaces::NoLiquidity),
            Arc::new(NoOpEventHandler),
        ));
        let handle = AsyncEngineHandle::new(engine);
        handle
            .process(
                Request::limit("BTC", Side::Buy, Decimal::from(99), Decimal::ONE).with_id("bid"),
            )
            .await
            .unwrap();

        assert_eq!(handle.snapshot(1).best_bid(), Some(Decimal::from(99)));
        assert!(handle.cancel(RequestId::new("bid")).await.unwrap().is_some());
        assert!(handle.snapshot(1).bids.is_empty());
    }
}

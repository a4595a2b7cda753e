// ============================================================================
// Engine Worker
// Dedicated thread that owns the submission queue for one asset
// ============================================================================

use crate::domain::{MatchOutcome, Request, RequestId};
use crate::engine::MatchingEngine;
use crate::error::{EngineError, EngineResult};
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum Command {
    Process(Request, Sender<EngineResult<MatchOutcome>>),
    Cancel(RequestId, Sender<Option<Request>>),
    Shutdown,
}

/// Runs one [`MatchingEngine`] on its own thread.
///
/// Callers on any thread submit through a channel and block on the reply.
/// Requests are processed in arrival order. Read-only queries (snapshots,
/// lookups) go straight to [`EngineWorker::engine`].
pub struct EngineWorker {
    engine: Arc<MatchingEngine>,
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl EngineWorker {
    pub fn spawn(engine: Arc<MatchingEngine>) -> EngineResult<Self> {
        Self::spawn_inner(engine, None)
    }

    /// Spawn and pin the worker thread to `core_id`. Pinning failure is
    /// logged and the worker runs unpinned.
    #[cfg(feature = "numa")]
    pub fn spawn_pinned(engine: Arc<MatchingEngine>, core_id: usize) -> EngineResult<Self> {
        Self::spawn_inner(engine, Some(core_id))
    }

    fn spawn_inner(engine: Arc<MatchingEngine>, core_id: Option<usize>) -> EngineResult<Self> {
        let (commands, inbox) = channel::unbounded();
        let worker_engine = Arc::clone(&engine);

        let handle = thread::Builder::new()
            .name(format!("engine-{}", engine.asset()))
            .spawn(move || {
                if let Some(core) = core_id {
                    if !crate::utils::pin_current_thread_to_core(core) {
                        tracing::warn!(core, "Could not pin engine worker");
                    }
                }
                run(&worker_engine, inbox);
            })
            .map_err(EngineError::WorkerSpawn)?;

        tracing::info!(asset = %engine.asset(), "Engine worker started");

        Ok(Self {
            engine,
            commands,
            handle: Some(handle),
        })
    }

    /// Submit a request and wait for its outcome
    pub fn submit(&self, request: Request) -> EngineResult<MatchOutcome> {
        let (reply, outcome) = channel::bounded(1);
        self.commands
            .send(Command::Process(request, reply))
            .map_err(|_| EngineError::WorkerStopped)?;
        outcome.recv().map_err(|_| EngineError::WorkerStopped)?
    }

    pub fn cancel(&self, request_id: RequestId) -> EngineResult<Option<Request>> {
        let (reply, cancelled) = channel::bounded(1);
        self.commands
            .send(Command::Cancel(request_id, reply))
            .map_err(|_| EngineError::WorkerStopped)?;
        cancelled.recv().map_err(|_| EngineError::WorkerStopped)
    }

    pub fn engine(&self) -> &Arc<MatchingEngine> {
        &self.engine
    }

    /// Stop accepting work, drain what is queued, and join the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(Command::Shutdown);
            if handle.join().is_err() {
                tracing::error!(asset = %self.engine.asset(), "Engine worker panicked");
            }
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(engine: &MatchingEngine, inbox: Receiver<Command>) {
    for command in inbox {
        match command {
            Command::Process(request, reply) => {
                // Caller may have given up waiting
                let _ = reply.send(engine.process(request));
            },
            Command::Cancel(request_id, reply) => {
                let _ = reply.send(engine.cancel(&request_id));
            },
            Command::Shutdown => break,
        }
    }
    tracing::info!(asset = %engine.asset(), "Engine worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, MatchStatus, Side};
    use crate::interfaces::{NoLiquidity, NoOpEventHandler};
    use rust_decimal::Decimal;

    fn worker() -> EngineWorker {
        let engine = Arc::new(MatchingEngine::new(
            EngineConfig::book_only("BTC"),
            Arc::new(NoLiquidity),
            Arc::new(NoOpEventHandler),
        ));
        EngineWorker::spawn(engine).unwrap()
    }

    #[test]
    fn test_submit_through_worker() {
        let worker = worker();
        worker
            .submit(Request::limit("BTC", Side::Sell, Decimal::from(100), Decimal::from(2)))
            .unwrap();

        let outcome = worker
            .submit(Request::market("BTC", Side::Buy, Decimal::from(2)))
            .unwrap();
        assert_eq!(outcome.status, MatchStatus::Filled);
        assert_eq!(worker.engine().resting_count(), 0);
        worker.shutdown();
    }

    #[test]
    fn test_rejection_is_returned_to_caller() {
        let worker = worker();
        let result = worker.submit(Request::market("ETH", Side::Buy, Decimal::ONE));
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn test_cancel_through_worker() {
        let worker = worker();
        let request = Request::limit("BTC", Side::Buy, Decimal::from(99), Decimal::ONE)
            .with_id("bid-1");
        worker.submit(request).unwrap();

        assert!(worker.cancel(RequestId::new("bid-1")).unwrap().is_some());
        assert!(worker.cancel(RequestId::new("bid-1")).unwrap().is_none());
    }

    #[test]
    fn test_many_producers() {
        let worker = Arc::new(worker());
        for i in 0..20 {
            worker
                .submit(Request::limit("BTC", Side::Sell, Decimal::from(100 + i), Decimal::ONE))
                .unwrap();
        }

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let worker = Arc::clone(&worker);
                thread::spawn(move || {
                    for _ in 0..5 {
                        worker
                            .submit(Request::market("BTC", Side::Buy, Decimal::ONE))
                            .unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(worker.engine().resting_count(), 0);
    }
}

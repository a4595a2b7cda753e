// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod liquidity_source;

pub use event_handler::{
    EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent, RecordingEventHandler,
};
pub use liquidity_source::{LiquiditySource, NoLiquidity};

// ============================================================================
// Adapters
// Concrete liquidity sources backed by external systems
// ============================================================================

mod http_liquidity;

pub use http_liquidity::{HttpLiquidityConfig, HttpLiquiditySource};

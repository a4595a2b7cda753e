// ============================================================================
// Basic Usage Example
// ============================================================================

use fallback_matching::prelude::*;
use fallback_matching::testing::MockLiquiditySource;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> Result<(), EngineError> {
    println!("=== Fallback Matching Example ===\n");

    // Pool quotes 100 and fills half of whatever it is asked for
    let pool = Arc::new(
        MockLiquiditySource::new(Decimal::from(100)).with_fill_ratio(Decimal::new(5, 1)),
    );
    let engine = MatchingEngineBuilder::new("BTC")
        .with_tick_size(Decimal::new(1, 2))
        .with_liquidity(pool.clone())
        .with_event_handler(Arc::new(LoggingEventHandler))
        .build()?;

    println!("Created matching engine for BTC\n");

    // Close the pool while seeding so the sells rest instead of filling there
    println!("Adding sell requests...");
    pool.set_available(Decimal::ZERO);
    for (i, price) in [100i64, 101].into_iter().enumerate() {
        let quantity = Decimal::from(5 + i as i64 * 2);
        let sell = Request::limit("BTC", Side::Sell, Decimal::from(price), quantity)
            .with_id(format!("seller_{i}"));
        let outcome = engine.process(sell)?;
        println!("  {}", outcome.summary);
    }
    pool.set_available(Decimal::from(1000));

    println!("\n=== Order Book Snapshot ===");
    print_snapshot(&engine.snapshot(5));

    // Market buy bigger than the book: book first, then the pool
    let outcome = engine.process(Request::market("BTC", Side::Buy, Decimal::from(20)))?;
    println!("\n{}", outcome.summary);
    println!("  status:         {:?}", outcome.status);
    println!("  executed price: {}", outcome.executed_price.round_dp(4));
    for fill in &outcome.fills {
        println!("  fill {} @ {} ({:?})", fill.quantity, fill.price, fill.source);
    }

    // Protective stop: the reference price is already below it
    pool.set_price(Some(Decimal::from(94)));
    let protected = Request::market("BTC", Side::Buy, Decimal::from(3))
        .with_stop_loss(Decimal::from(95));
    let outcome = engine.process(protected)?;
    println!("\n{}", outcome.summary);

    // Rejections come back as errors
    let off_tick = Request::limit("BTC", Side::Buy, Decimal::new(1001, 3), Decimal::ONE);
    if let Err(err) = engine.process(off_tick) {
        println!("\nRejected: {err}");
    }

    println!("\nPool was asked to fill {} time(s)", pool.fill_calls());
    Ok(())
}

fn print_snapshot(snapshot: &OrderBookSnapshot) {
    println!("\nBids:");
    for (price, qty) in &snapshot.bids {
        println!("  {} @ {}", qty, price);
    }

    println!("\nAsks:");
    for (price, qty) in &snapshot.asks {
        println!("  {} @ {}", qty, price);
    }

    println!("\nSpread: {:?}", snapshot.spread);
}

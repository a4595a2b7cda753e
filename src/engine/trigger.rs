// ============================================================================
// Protective Threshold Evaluation
// Stop-loss / take-profit checks on incoming requests
// ============================================================================

use crate::domain::{Price, ProtectiveTrigger, Request, Side};
use rust_decimal::Decimal;

/// Decides whether an incoming request's protective thresholds fire.
///
/// The comparison table is asymmetric and must stay that way:
///
/// ```text
///            stop-loss            take-profit
/// buy        ref <= stop_loss     ref >= take_profit
/// sell       ref >= stop_loss     ref >= take_profit
/// ```
///
/// Zero thresholds and non-positive reference prices never fire.
pub struct TriggerEvaluator;

impl TriggerEvaluator {
    pub fn evaluate(request: &Request, reference_price: Price) -> bool {
        Self::fired(request, reference_price).is_some()
    }

    /// The threshold that fired, stop-loss checked first
    pub fn fired(request: &Request, reference_price: Price) -> Option<ProtectiveTrigger> {
        if reference_price <= Decimal::ZERO {
            return None;
        }

        let thresholds = &request.thresholds;
        let stop_loss_hit = thresholds.stop_loss().is_some_and(|stop| match request.side {
            Side::Buy => reference_price <= stop,
            Side::Sell => reference_price >= stop,
        });
        if stop_loss_hit {
            return Some(ProtectiveTrigger::StopLoss);
        }

        let take_profit_hit = thresholds
            .take_profit()
            .is_some_and(|target| reference_price >= target);
        if take_profit_hit {
            return Some(ProtectiveTrigger::TakeProfit);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn buy() -> Request {
        Request::limit("BTC", Side::Buy, Decimal::from(100), Decimal::from(5))
    }

    fn sell() -> Request {
        Request::limit("BTC", Side::Sell, Decimal::from(100), Decimal::from(5))
    }

    #[test]
    fn test_buy_stop_loss() {
        let request = buy().with_stop_loss(Decimal::from(95));

        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(94)));
        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(95)));
        assert!(!TriggerEvaluator::evaluate(&request, Decimal::from(96)));
        assert_eq!(
            TriggerEvaluator::fired(&request, Decimal::from(94)),
            Some(ProtectiveTrigger::StopLoss)
        );
    }

    #[test]
    fn test_buy_take_profit() {
        let request = buy().with_take_profit(Decimal::from(105));

        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(105)));
        assert!(!TriggerEvaluator::evaluate(&request, Decimal::from(104)));
    }

    #[test]
    fn test_sell_stop_loss_fires_upward() {
        let request = sell().with_stop_loss(Decimal::from(95));

        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(95)));
        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(120)));
        assert!(!TriggerEvaluator::evaluate(&request, Decimal::from(94)));
    }

    #[test]
    fn test_sell_take_profit_same_direction_as_stop_loss() {
        let request = sell().with_take_profit(Decimal::from(105));

        assert!(TriggerEvaluator::evaluate(&request, Decimal::from(106)));
        assert!(!TriggerEvaluator::evaluate(&request, Decimal::from(104)));
        assert_eq!(
            TriggerEvaluator::fired(&request, Decimal::from(106)),
            Some(ProtectiveTrigger::TakeProfit)
        );
    }

    #[test]
    fn test_missing_reference_price_never_fires() {
        let request = buy().with_stop_loss(Decimal::from(95));

        assert!(!TriggerEvaluator::evaluate(&request, Decimal::ZERO));
        assert!(!TriggerEvaluator::evaluate(&request, Decimal::from(-1)));
    }

    quickcheck! {
        fn prop_unset_thresholds_never_fire(reference: u32, is_buy: bool) -> bool {
            let request = if is_buy { buy() } else { sell() };
            !TriggerEvaluator::evaluate(&request, Decimal::from(reference))
        }

        fn prop_sell_thresholds_fire_at_or_above(threshold: u16, reference: u16) -> bool {
            let threshold = Decimal::from(threshold) + Decimal::ONE;
            let reference = Decimal::from(reference) + Decimal::ONE;
            let request = sell().with_stop_loss(threshold).with_take_profit(threshold);
            TriggerEvaluator::evaluate(&request, reference) == (reference >= threshold)
        }
    }
}

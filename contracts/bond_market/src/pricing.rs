use crate::error::Error;
use crate::storage::{Adjustment, Market, SCALE};
use crate::validation::calculate_max_payout;

/// Current price of one payout unit in quote units (SCALE)
///
/// Formula: price = max(1, control_variable × total_debt / baseline_debt)
///
/// Example:
/// - control_variable: 20, total_debt: 6,000, baseline_debt: 5,000
/// - price: 20 × 6,000 / 5,000 = 24
pub fn market_price(market: &Market) -> Result<i128, Error> {
    let price = market
        .terms
        .control_variable
        .checked_mul(market.total_debt)
        .and_then(|v| v.checked_div(market.baseline_debt))
        .ok_or(Error::InvalidParameters)?;
    Ok(price.max(1))
}

/// Lowest price at which a payout stays within the ledger's appraisal of
/// the quote, so the ledger never mints unbacked tokens
///
/// Formula: floor = ceil(quote_amount × SCALE / value)
///
/// Example:
/// - quote_amount: 100 USDC, value: 100 tokens
/// - floor: 1.00 per token
pub fn backing_price(quote_amount: i128, value: i128) -> Option<i128> {
    if value <= 0 {
        return None;
    }
    let scaled = quote_amount.checked_mul(SCALE)?;
    Some(scaled.checked_add(value - 1)?.checked_div(value)?.max(1))
}

/// Payout units bought by `quote_amount` at `price`
///
/// Formula: payout = quote_amount × SCALE / price
pub fn calculate_payout(quote_amount: i128, price: i128) -> Option<i128> {
    quote_amount.checked_mul(SCALE)?.checked_div(price)
}

/// Bring a market's pricing state forward to `now` in a single step,
/// whatever the gap since the last interaction:
/// 1. phase in any pending control variable decrease
/// 2. decay outstanding debt toward the baseline
/// 3. retune once if a tune boundary has passed and the market is open
///
/// Returns true when a tune happened.
pub fn decay_and_tune(market: &mut Market, now: u64) -> Result<bool, Error> {
    apply_adjustment(market, now)?;
    decay_debt(market, now)?;

    if now >= market.schedule.next_tune && now < market.terms.conclusion {
        tune(market, now)?;
        return Ok(true);
    }
    Ok(false)
}

fn apply_adjustment(market: &mut Market, now: u64) -> Result<(), Error> {
    if !market.adjustment.active {
        return Ok(());
    }

    let adjustment = &mut market.adjustment;
    let elapsed = now.saturating_sub(adjustment.last_adjustment);

    if elapsed >= adjustment.time_to_adjusted {
        market.terms.control_variable = market
            .terms
            .control_variable
            .saturating_sub(adjustment.change)
            .max(1);
        *adjustment = Adjustment::idle(now);
        return Ok(());
    }

    let step = adjustment
        .change
        .checked_mul(elapsed as i128)
        .and_then(|v| v.checked_div(adjustment.time_to_adjusted as i128))
        .ok_or(Error::InvalidParameters)?;

    market.terms.control_variable = market.terms.control_variable.saturating_sub(step).max(1);
    adjustment.change -= step;
    adjustment.time_to_adjusted -= elapsed;
    adjustment.last_adjustment = now;
    Ok(())
}

/// Only debt above the baseline decays, so an idle market settles at a
/// price of `control_variable` and tuning alone moves it from there.
fn decay_debt(market: &mut Market, now: u64) -> Result<(), Error> {
    let elapsed = now.saturating_sub(market.schedule.last_decay);
    if elapsed == 0 {
        return Ok(());
    }

    let excess = (market.total_debt - market.baseline_debt).max(0);
    let window = market.schedule.decay_window;
    let decay = if elapsed >= window {
        excess
    } else {
        excess
            .checked_mul(elapsed as i128)
            .and_then(|v| v.checked_div(window as i128))
            .ok_or(Error::InvalidParameters)?
    };

    market.total_debt -= decay;
    market.schedule.last_decay = now;
    Ok(())
}

/// Steer the control variable toward the value that would have priced the
/// market on pace.
///
/// Formula: target_cv = base_cv × (sold + baseline) / (ideal_sold + baseline)
///
/// Selling ahead of schedule raises the target, which applies at once.
/// Selling behind lowers it, and the decrease is spread over one tune
/// interval. With no sales `ideal_sold` only grows, so the price never
/// rises on its own.
fn tune(market: &mut Market, now: u64) -> Result<(), Error> {
    let start = market.schedule.start;
    let conclusion = market.terms.conclusion;
    let duration = conclusion.saturating_sub(start).max(1) as i128;
    let elapsed = now.saturating_sub(start) as i128;

    let ideal_sold = market
        .target_total
        .checked_mul(elapsed)
        .and_then(|v| v.checked_div(duration))
        .ok_or(Error::InvalidParameters)?;

    let numerator = market
        .sold
        .checked_add(market.baseline_debt)
        .ok_or(Error::InvalidParameters)?;
    let denominator = ideal_sold
        .checked_add(market.baseline_debt)
        .ok_or(Error::InvalidParameters)?;
    let target_cv = market
        .terms
        .base_control_variable
        .checked_mul(numerator)
        .and_then(|v| v.checked_div(denominator))
        .ok_or(Error::InvalidParameters)?
        .max(1);

    let current = market.terms.control_variable;
    if target_cv >= current {
        market.terms.control_variable = target_cv;
        market.adjustment = Adjustment::idle(now);
    } else {
        market.adjustment = Adjustment {
            change: current - target_cv,
            last_adjustment: now,
            time_to_adjusted: market.schedule.tune_interval,
            active: true,
        };
    }

    // Re-pace the per-deposit cap against what is left
    let remaining = if market.capacity_in_quote {
        let price = market_price(market)?;
        calculate_payout(market.capacity, price).ok_or(Error::InvalidParameters)?
    } else {
        market.capacity
    };
    market.max_payout = calculate_max_payout(
        remaining,
        conclusion - now,
        market.schedule.deposit_interval,
    )
    .ok_or(Error::InvalidParameters)?;

    // First boundary strictly after now, skipping any missed ones
    let interval = market.schedule.tune_interval;
    let passed = (now - market.schedule.next_tune) / interval + 1;
    market.schedule.next_tune += passed * interval;

    Ok(())
}

impl Adjustment {
    pub fn idle(now: u64) -> Self {
        Adjustment {
            change: 0,
            last_adjustment: now,
            time_to_adjusted: 0,
            active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MarketStatus, Schedule, Terms};
    use soroban_sdk::{testutils::Address as _, Address, Env};

    const DAY: u64 = 86_400;
    const START: u64 = 1_000;

    /// 10,000 tokens over 10 days at 20 USDC, 5 day linear vesting
    fn fresh_market(env: &Env) -> Market {
        let target_total = 10_000 * SCALE;
        let baseline_debt = 5_000 * SCALE;
        Market {
            id: 0,
            quote_asset: Address::generate(env),
            capacity: target_total,
            capacity_in_quote: false,
            total_debt: baseline_debt,
            baseline_debt,
            target_total,
            sold: 0,
            purchased: 0,
            max_payout: 1_000 * SCALE,
            status: MarketStatus::Active,
            terms: Terms {
                control_variable: 20 * SCALE,
                base_control_variable: 20 * SCALE,
                linear_vesting: true,
                vesting: 5 * DAY,
                conclusion: START + 10 * DAY,
                max_debt: 12_500 * SCALE,
            },
            schedule: Schedule {
                start: START,
                deposit_interval: DAY,
                tune_interval: DAY,
                decay_window: 5 * DAY,
                last_decay: START,
                next_tune: START + DAY,
            },
            adjustment: Adjustment::idle(START),
        }
    }

    #[test]
    fn test_price_at_baseline() {
        let env = Env::default();
        let market = fresh_market(&env);

        assert_eq!(market_price(&market).unwrap(), 20 * SCALE);
    }

    #[test]
    fn test_price_floor() {
        let env = Env::default();
        let mut market = fresh_market(&env);
        market.total_debt = 0;

        assert_eq!(market_price(&market).unwrap(), 1);
    }

    #[test]
    fn test_calculate_payout() {
        // Expected: 20,000 USDC at 20 USDC = 1,000 tokens
        let payout = calculate_payout(20_000 * SCALE, 20 * SCALE).unwrap();
        assert_eq!(payout, 1_000 * SCALE);
    }

    #[test]
    fn test_debt_decays_toward_baseline() {
        let env = Env::default();
        let mut market = fresh_market(&env);
        market.total_debt = 10_000 * SCALE;

        // just short of one fifth of the window, before the first tune
        let tuned = decay_and_tune(&mut market, START + DAY - 1).unwrap();
        assert!(!tuned);
        assert!(market.total_debt < 10_000 * SCALE);
        assert!(market.total_debt > 9_000 * SCALE);

        // a whole window clears the excess and stops at the baseline
        let mut market = fresh_market(&env);
        market.total_debt = 10_000 * SCALE;
        decay_and_tune(&mut market, START + 5 * DAY).unwrap();
        assert_eq!(market.total_debt, 5_000 * SCALE);

        decay_and_tune(&mut market, START + 9 * DAY).unwrap();
        assert_eq!(market.total_debt, 5_000 * SCALE);
    }

    #[test]
    fn test_idle_market_keeps_a_live_price() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        // long past the decay window with no purchases
        decay_and_tune(&mut market, START + 5 * DAY + 1).unwrap();
        assert_eq!(market.total_debt, market.baseline_debt);
        decay_and_tune(&mut market, START + 8 * DAY).unwrap();

        // price follows the tuned control variable, far above the floor
        let price = market_price(&market).unwrap();
        assert_eq!(price, market.terms.control_variable);
        assert!(price > SCALE);
    }

    #[test]
    fn test_backing_price() {
        // quote appraised one for one
        assert_eq!(backing_price(100 * SCALE, 100 * SCALE).unwrap(), SCALE);

        // rounds up so the payout never exceeds the value
        let floor = backing_price(100, 3).unwrap();
        assert_eq!(floor, 333_333_334);
        assert!(calculate_payout(100, floor).unwrap() <= 3);

        assert_eq!(backing_price(100, 0), None);
    }

    #[test]
    fn test_price_never_rises_without_purchases() {
        let env = Env::default();
        let market = fresh_market(&env);

        // Interact at every tune boundary
        let mut stepped = market.clone();
        let mut last_price = market_price(&stepped).unwrap();
        for day in 1..10u64 {
            for at in [START + day * DAY, START + day * DAY + DAY / 2] {
                decay_and_tune(&mut stepped, at).unwrap();
                let price = market_price(&stepped).unwrap();
                assert!(price <= last_price);
                last_price = price;
            }
        }

        // Single catch-up steps from the untouched market
        let mut last_price = market_price(&market).unwrap();
        for day in 1..10u64 {
            let mut preview = market.clone();
            decay_and_tune(&mut preview, START + day * DAY).unwrap();
            let price = market_price(&preview).unwrap();
            assert!(price <= last_price);
            last_price = price;
        }
    }

    #[test]
    fn test_selling_ahead_raises_control_variable() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        // 3,000 sold by day one, ideal pace is 1,000
        market.sold = 3_000 * SCALE;
        market.total_debt += 3_000 * SCALE;
        decay_and_tune(&mut market, START + DAY).unwrap();

        // Expected: 20 × (3,000 + 5,000) / (1,000 + 5,000) = 26.666...
        assert_eq!(market.terms.control_variable, 20 * SCALE * 8 / 6);
        assert!(!market.adjustment.active);
    }

    #[test]
    fn test_selling_behind_phases_in_decrease() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        decay_and_tune(&mut market, START + DAY).unwrap();

        // Expected target: 20 × 5,000 / 6,000, not applied yet
        let target = 20 * SCALE * 5 / 6;
        assert_eq!(market.terms.control_variable, 20 * SCALE);
        assert!(market.adjustment.active);
        assert_eq!(market.adjustment.change, 20 * SCALE - target);

        // half of it lands half way through the interval
        decay_and_tune(&mut market, START + DAY + DAY / 2).unwrap();
        let half = (20 * SCALE - target) / 2;
        assert_eq!(market.terms.control_variable, 20 * SCALE - half);

        // the rest by the next boundary, before that boundary's own tune
        let mut settled = market.clone();
        apply_adjustment(&mut settled, START + 2 * DAY).unwrap();
        assert_eq!(settled.terms.control_variable, target);
        assert!(!settled.adjustment.active);
    }

    #[test]
    fn test_tune_catches_up_missed_boundaries() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        let tuned = decay_and_tune(&mut market, START + 3 * DAY + 10).unwrap();
        assert!(tuned);
        assert_eq!(market.schedule.next_tune, START + 4 * DAY);

        // no second tune before the next boundary
        let tuned = decay_and_tune(&mut market, START + 4 * DAY - 1).unwrap();
        assert!(!tuned);
    }

    #[test]
    fn test_tune_repaces_max_payout() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        market.capacity = 8_000 * SCALE;
        decay_and_tune(&mut market, START + 2 * DAY).unwrap();

        // Expected: 8,000 left over 8 days
        assert_eq!(market.max_payout, 1_000 * SCALE);
    }

    #[test]
    fn test_no_tune_after_conclusion() {
        let env = Env::default();
        let mut market = fresh_market(&env);

        let tuned = decay_and_tune(&mut market, START + 10 * DAY).unwrap();
        assert!(!tuned);
        assert_eq!(market.schedule.next_tune, START + DAY);
    }
}

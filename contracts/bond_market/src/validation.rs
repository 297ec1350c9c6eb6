use crate::error::Error;
use crate::storage::{MarketParams, BASIS_POINTS, SCALE};

/// Reject market parameters that cannot produce a working market
///
/// # Errors
/// - `InvalidParameters`: Non-positive capacity or price, negative buffer,
///   zero deposit or tune interval, conclusion not in the future, deposit
///   interval longer than the market, or linear vesting with zero length
pub fn validate_market_params(params: &MarketParams, now: u64) -> Result<(), Error> {
    if params.capacity <= 0 || params.initial_price <= 0 || params.debt_buffer_bps < 0 {
        return Err(Error::InvalidParameters);
    }
    if params.conclusion <= now {
        return Err(Error::InvalidParameters);
    }
    if params.deposit_interval == 0 || params.tune_interval == 0 {
        return Err(Error::InvalidParameters);
    }
    if params.deposit_interval > params.conclusion - now {
        return Err(Error::InvalidParameters);
    }
    if params.linear_vesting && params.vesting == 0 {
        return Err(Error::InvalidParameters);
    }
    Ok(())
}

/// Express a capacity in payout units
///
/// Formula: target = capacity × SCALE / price (quote capacity), else capacity
///
/// Example:
/// - capacity: 10,000 USDC, price: 20 USDC per token
/// - target: 10,000 / 20 = 500 tokens
pub fn calculate_target_total(capacity: i128, capacity_in_quote: bool, price: i128) -> Option<i128> {
    if capacity_in_quote {
        capacity.checked_mul(SCALE)?.checked_div(price)
    } else {
        Some(capacity)
    }
}

/// Largest payout a single deposit may take, spreading what is left
/// evenly over the deposit intervals that remain
///
/// Formula: max_payout = remaining / ceil(time_remaining / deposit_interval)
///
/// Example:
/// - remaining: 10,000, time_remaining: 10 days, interval: 1 day
/// - max_payout: 10,000 / 10 = 1,000
pub fn calculate_max_payout(remaining: i128, time_remaining: u64, deposit_interval: u64) -> Option<i128> {
    if deposit_interval == 0 {
        return None;
    }
    let intervals = time_remaining.div_ceil(deposit_interval).max(1);
    remaining.checked_div(intervals as i128)
}

/// Circuit breaker on outstanding debt
///
/// Formula: max_debt = target × (1 + buffer)
///
/// Example:
/// - target: 10,000, buffer: 25% (2,500 basis points)
/// - max_debt: 12,500
pub fn calculate_max_debt(target_total: i128, debt_buffer_bps: i128) -> Option<i128> {
    let multiplier = BASIS_POINTS.checked_add(debt_buffer_bps)?;
    target_total.checked_mul(multiplier)?.checked_div(BASIS_POINTS)
}

/// Debt the market carries when sales track the ideal pace: the share of
/// the target sold within one decay window
///
/// Formula: baseline = target × decay_window / duration
pub fn calculate_baseline_debt(target_total: i128, decay_window: u64, duration: u64) -> Option<i128> {
    if duration == 0 {
        return None;
    }
    let window = decay_window.min(duration) as i128;
    target_total.checked_mul(window)?.checked_div(duration as i128)
}

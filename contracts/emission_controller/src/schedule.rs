use crate::storage::{BASIS_POINTS, RATE_DENOMINATOR};

/// Epochs owed at `now`, counting every boundary passed since the last
/// distribution
///
/// Formula: due = (now - next_distribution) / length + 1, or 0 before
/// next_distribution
///
/// Example:
/// - next_distribution: 10:00, length: 8h, now: 03:00 next day
/// - due: 17h / 8h + 1 = 3
pub fn epochs_due(now: u64, next_distribution: u64, length: u64) -> u64 {
    if now < next_distribution || length == 0 {
        return 0;
    }
    (now - next_distribution) / length + 1
}

/// Tokens emitted for `due` epochs
///
/// Formula: emission = supply × rate × due / RATE_DENOMINATOR
///
/// Example:
/// - supply: 1,000,000, rate: 2,860 (0.286%), due: 1
/// - emission: 2,860
pub fn calculate_emission(total_supply: i128, rate: i128, due: u64) -> Option<i128> {
    total_supply
        .checked_mul(rate)?
        .checked_mul(due as i128)?
        .checked_div(RATE_DENOMINATOR)
}

/// A pool's cut of the post-bounty emission
///
/// Formula: share = remainder × weight_bps / 10,000
pub fn pool_share(remainder: i128, weight_bps: u32) -> Option<i128> {
    remainder
        .checked_mul(weight_bps as i128)?
        .checked_div(BASIS_POINTS as i128)
}

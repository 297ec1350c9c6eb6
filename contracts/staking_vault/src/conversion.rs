use crate::storage::SCALE;

/// Shares minted for `amount` base units
///
/// Formula: shares = amount × SCALE / index
///
/// Example:
/// - amount: 100, index: 1.25
/// - shares: 100 / 1.25 = 80
pub fn to_shares(amount: i128, index: i128) -> Option<i128> {
    amount.checked_mul(SCALE)?.checked_div(index)
}

/// Base units redeemable for `shares`
///
/// Formula: base = shares × index / SCALE
pub fn to_base(shares: i128, index: i128) -> Option<i128> {
    shares.checked_mul(index)?.checked_div(SCALE)
}

/// Index increase that spreads `reward` over `total_shares`
///
/// Formula: increment = reward × SCALE / total_shares
///
/// Equivalent to index × (1 + reward / rebasing_supply). The additive form
/// rounds down, so the tokens owed after a rebase never exceed the tokens
/// held.
pub fn index_increment(reward: i128, total_shares: i128) -> Option<i128> {
    if total_shares <= 0 || reward <= 0 {
        return Some(0);
    }
    reward.checked_mul(SCALE)?.checked_div(total_shares)
}

use crate::storage::Note;

/// Portion of a note's payout unlocked at `now`
///
/// Linear notes unlock pro rata between start and vesting end. Other notes
/// unlock in full at vesting end.
///
/// Example:
/// - payout: 1,000, start: Day 0, vesting_end: Day 5 (linear)
/// - At Day 2: vested = 1,000 × 2/5 = 400
pub fn vested_amount(note: &Note, now: u64) -> i128 {
    if now >= note.vesting_end {
        return note.payout;
    }
    if !note.linear || now <= note.start {
        return 0;
    }

    let elapsed = (now - note.start) as i128;
    let length = (note.vesting_end - note.start) as i128;
    note.payout
        .checked_mul(elapsed)
        .and_then(|v| v.checked_div(length))
        .unwrap_or(0)
}

/// Unlocked but not yet released
pub fn releasable(note: &Note, now: u64) -> i128 {
    vested_amount(note, now).saturating_sub(note.redeemed).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    const SCALE: i128 = 10_000_000;
    const DAY: u64 = 86_400;

    fn note(env: &Env, linear: bool) -> Note {
        Note {
            id: 0,
            market_id: 0,
            owner: Address::generate(env),
            payout: 1_000 * SCALE,
            start: 0,
            vesting_end: 5 * DAY,
            linear,
            redeemed: 0,
        }
    }

    #[test]
    fn test_linear_vesting() {
        let env = Env::default();
        let note = note(&env, true);

        assert_eq!(vested_amount(&note, 0), 0);
        assert_eq!(vested_amount(&note, 2 * DAY), 400 * SCALE);
        assert_eq!(vested_amount(&note, 5 * DAY), 1_000 * SCALE);
        assert_eq!(vested_amount(&note, 50 * DAY), 1_000 * SCALE);
    }

    #[test]
    fn test_vesting_is_monotonic() {
        let env = Env::default();
        let note = note(&env, true);

        let mut last = 0;
        for hour in 0..=(5 * 24 + 1) {
            let vested = vested_amount(&note, hour * 3_600);
            assert!(vested >= last);
            assert!(vested <= note.payout);
            last = vested;
        }
    }

    #[test]
    fn test_unlock_at_conclusion() {
        let env = Env::default();
        let note = note(&env, false);

        assert_eq!(vested_amount(&note, 5 * DAY - 1), 0);
        assert_eq!(vested_amount(&note, 5 * DAY), 1_000 * SCALE);
    }

    #[test]
    fn test_releasable_excludes_redeemed() {
        let env = Env::default();
        let mut note = note(&env, true);
        note.redeemed = 400 * SCALE;

        assert_eq!(releasable(&note, 2 * DAY), 0);
        assert_eq!(releasable(&note, 3 * DAY), 200 * SCALE);
        assert_eq!(releasable(&note, 6 * DAY), 600 * SCALE);
    }
}

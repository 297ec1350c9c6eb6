use soroban_sdk::{contracttype, Address};

// Constants
pub const SCALE: i128 = 10_000_000; // index 1.0

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultState {
    /// Base units per share (SCALE), never decreases
    pub index: i128,
    pub total_shares: i128,
    /// Credited rewards not yet folded into the index
    pub pending_reward: i128,
    pub last_rebase: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePosition {
    pub shares: i128,
    /// Base units put in, returned in full by `forfeit`
    pub principal: i128,
    pub warmup_end: u64,
    /// Rebasing balance view when true, fixed-shares wrapped view when false
    pub auto_compound: bool,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Governor,
    Token,
    Controller,
    WarmupLength,
    State,
    Position(Address),
    Initialized,
}

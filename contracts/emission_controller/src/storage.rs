use soroban_sdk::{contracttype, Address};

// Constants
pub const RATE_DENOMINATOR: i128 = 1_000_000; // rate 2,860 = 0.286% per epoch
pub const BASIS_POINTS: u32 = 10_000; // 100% = 10,000 basis points

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Epoch {
    pub number: u32,
    /// Seconds
    pub length: u64,
    pub next_distribution: u64,
}

/// A recipient taking a fixed share of each emission ahead of the vault
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPool {
    pub recipient: Address,
    pub weight_bps: u32,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Governor,
    Ledger,
    Token,
    Vault,
    Epoch,
    Rate,
    MaxRate,
    Bounty,
    Pools,
    Initialized,
}

use soroban_sdk::{contracttype, Address, Vec};

use crate::storage::RewardPool;

#[contracttype]
#[derive(Clone, Debug)]
pub struct DistributedEvent {
    pub caller: Address,
    pub epoch: u32,
    pub epochs_due: u64,
    pub emission: i128,
    pub bounty: i128,
    pub to_pools: i128,
    pub to_vault: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RateChangedEvent {
    pub old_rate: i128,
    pub new_rate: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BountyChangedEvent {
    pub old_bounty: i128,
    pub new_bounty: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolsChangedEvent {
    pub pools: Vec<RewardPool>,
    pub total_weight_bps: u32,
}

use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct StakedEvent {
    pub owner: Address,
    pub amount: i128,
    pub shares: i128,
    pub index: i128,
    pub warmup_end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UnstakedEvent {
    pub owner: Address,
    pub shares: i128,
    pub amount: i128,
    pub index: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ForfeitedEvent {
    pub owner: Address,
    pub returned: i128,
    pub recredited: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RebasedEvent {
    pub distributed: i128,
    pub old_index: i128,
    pub new_index: i128,
    pub total_shares: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RewardCreditedEvent {
    pub controller: Address,
    pub amount: i128,
    pub pending: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WrapChangedEvent {
    pub owner: Address,
    pub shares: i128,
    pub auto_compound: bool,
}

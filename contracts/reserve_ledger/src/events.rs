use crate::storage::Role;
use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct PermissionChangedEvent {
    pub role: Role,
    pub principal: Address,
    pub enabled: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DepositEvent {
    pub depositor: Address,
    pub asset: Address,
    pub amount: i128,
    pub value: i128,
    pub payout: i128,
    pub profit: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WithdrawalEvent {
    pub spender: Address,
    pub asset: Address,
    pub amount: i128,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DebtEvent {
    pub debtor: Address,
    pub asset: Address,
    pub amount: i128,
    pub value: i128,
    pub outstanding: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RewardsMintedEvent {
    pub manager: Address,
    pub recipient: Address,
    pub amount: i128,
}

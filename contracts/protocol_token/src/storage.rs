use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Decimals,
    TotalSupply,
    Operators(Address),
    Balance(Address),
    Initialized,
}

use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketCreatedEvent {
    pub market_id: u32,
    pub quote_asset: Address,
    pub capacity: i128,
    pub capacity_in_quote: bool,
    pub initial_price: i128,
    pub max_payout: i128,
    pub max_debt: i128,
    pub conclusion: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BondedEvent {
    pub market_id: u32,
    pub note_id: u64,
    pub depositor: Address,
    pub quote_amount: i128,
    pub payout: i128,
    pub price: i128,
    pub vesting_end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TunedEvent {
    pub market_id: u32,
    pub old_control_variable: i128,
    pub new_control_variable: i128,
    pub max_payout: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct NoteRedeemedEvent {
    pub note_id: u64,
    pub owner: Address,
    pub released: i128,
    pub redeemed: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketConcludedEvent {
    pub market_id: u32,
    pub sold: i128,
    pub purchased: i128,
}

use soroban_sdk::{contracttype, Address};

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals
pub const BASIS_POINTS: i128 = 10_000; // 100% = 10,000 basis points

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarketStatus {
    /// Market accepts deposits
    Active = 0,
    /// Capacity exhausted, conclusion reached, or closed by governance.
    /// Terminal.
    Concluded = 1,
}

/// Arguments to `create_market`
#[contracttype]
#[derive(Clone, Debug)]
pub struct MarketParams {
    /// Asset buyers pay with
    pub quote_asset: Address,
    /// Amount to sell, in quote units if `capacity_in_quote`, else in payout units
    pub capacity: i128,
    pub capacity_in_quote: bool,
    /// Opening price: quote units per payout unit, scaled by SCALE
    pub initial_price: i128,
    /// Headroom of max debt over the payout capacity, in basis points
    pub debt_buffer_bps: i128,
    /// Linear vesting length in seconds (ignored when unlocking at conclusion)
    pub vesting: u64,
    /// false: notes unlock entirely at `conclusion`
    pub linear_vesting: bool,
    /// Unix timestamp after which the market takes no deposits
    pub conclusion: u64,
    /// Ideal spacing between deposits, in seconds
    pub deposit_interval: u64,
    /// Spacing between control variable tunes, in seconds
    pub tune_interval: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Terms {
    /// Scalar multiplied by the debt ratio to produce the price (SCALE)
    pub control_variable: i128,
    /// Control variable at creation; tuning steers relative to it
    pub base_control_variable: i128,
    pub linear_vesting: bool,
    pub vesting: u64,
    pub conclusion: u64,
    /// Circuit breaker on outstanding debt, in payout units
    pub max_debt: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    pub start: u64,
    pub deposit_interval: u64,
    pub tune_interval: u64,
    /// Seconds over which outstanding debt decays to zero
    pub decay_window: u64,
    pub last_decay: u64,
    pub next_tune: u64,
}

/// A control variable decrease being phased in
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Adjustment {
    /// Amount still to be removed from the control variable
    pub change: i128,
    pub last_adjustment: u64,
    pub time_to_adjusted: u64,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Market {
    pub id: u32,
    pub quote_asset: Address,
    /// Remaining capacity, monotonically decreasing
    pub capacity: i128,
    pub capacity_in_quote: bool,
    /// Outstanding debt in payout units, decays over the decay window
    pub total_debt: i128,
    /// Debt carried when selling exactly at the ideal pace
    pub baseline_debt: i128,
    /// Full capacity expressed in payout units
    pub target_total: i128,
    /// Payout units issued so far
    pub sold: i128,
    /// Quote units taken in so far
    pub purchased: i128,
    /// Largest payout a single deposit may take
    pub max_payout: i128,
    pub status: MarketStatus,
    pub terms: Terms,
    pub schedule: Schedule,
    pub adjustment: Adjustment,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Note {
    pub id: u64,
    pub market_id: u32,
    pub owner: Address,
    /// Protocol tokens owed in total
    pub payout: i128,
    pub start: u64,
    pub vesting_end: u64,
    /// false: nothing releases before `vesting_end`
    pub linear: bool,
    /// Released so far, never above `payout`
    pub redeemed: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Governor,
    Ledger,
    Token,
    MarketCounter,
    Market(u32),
    NoteCounter,
    Note(u64),
    OwnerNotes(Address),
    Initialized,
}

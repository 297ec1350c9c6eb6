use soroban_sdk::{contracttype, Address};

/// Capabilities a principal (account, contract or asset) can hold
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// May deposit enabled reserve assets and receive minted payout
    ReserveDepositor,
    /// May burn protocol tokens to withdraw reserve assets
    ReserveSpender,
    /// Asset accepted as reserve backing
    ReserveToken,
    /// May manage reserve parameters
    ReserveManager,
    /// May deposit enabled liquidity assets
    LiquidityDepositor,
    /// Pooled asset accepted as backing, appraised by a calculator
    LiquidityToken,
    /// May manage liquidity parameters
    LiquidityManager,
    /// May borrow reserves against a governor-set limit
    ReserveDebtor,
    /// May mint rewards out of excess reserves
    RewardManager,
}

/// How an asset amount is converted into ledger units
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Valuation {
    /// (asset_decimals, unit_decimals)
    Normalize(u32, u32),
    /// External calculator contract exposing `valuation(asset, amount)`
    Calculator(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerState {
    /// Appraised value of everything held as backing, in ledger units
    pub total_reserves: i128,
    /// Outstanding reserves lent to debtors, in ledger units
    pub total_debt: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Governor,
    Token,
    TokenDecimals,
    State,
    Permission(Role, Address),
    Valuation(Address),
    Debt(Address),
    DebtLimit(Address),
    Initialized,
}

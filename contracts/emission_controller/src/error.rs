use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // VALIDATION ERRORS (20-29)
    // ============================================
    /// Rate above its maximum, negative bounty, pool weights over 100%,
    /// zero epoch length, or overflow
    InvalidParameters = 20,

    // ============================================
    // DISTRIBUTION ERRORS (30-39)
    // ============================================
    /// Next distribution time not reached
    TooEarly = 30,
    /// Emission exceeds the ledger's excess reserves
    InsufficientReserves = 31,

    // ============================================
    // DOWNSTREAM ERRORS (40-49)
    // ============================================
    /// Reserve ledger refused a reserves query or reward mint
    LedgerRejected = 40,
    /// Staking vault refused the reward credit
    VaultRejected = 41,
}

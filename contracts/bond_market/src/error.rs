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
    // AUTHORIZATION ERRORS (10-15)
    // ============================================
    /// Claimant does not own the note
    PermissionDenied = 10,

    // ============================================
    // MARKET ERRORS (20-29)
    // ============================================
    /// Market not found
    MarketNotFound = 20,
    /// Market concluded, past its conclusion time, or out of capacity
    MarketConcluded = 21,
    /// Market cannot be concluded yet
    TooEarly = 22,

    // ============================================
    // PURCHASE ERRORS (30-39)
    // ============================================
    /// Purchase would overrun remaining capacity, the per-interval payout
    /// cap, or the market's max debt
    CapacityExceeded = 30,
    /// Current price is above the buyer's max price
    SlippageExceeded = 31,
    /// Non-positive amounts, bad market parameters, or arithmetic overflow
    InvalidParameters = 32,

    // ============================================
    // NOTE ERRORS (40-49)
    // ============================================
    /// Note not found
    NoteNotFound = 40,
    /// Full release requested before the note's vesting end
    InsufficientVesting = 41,

    // ============================================
    // LEDGER ERRORS (50-59)
    // ============================================
    /// Reserve ledger refused to appraise or accept the quote asset
    LedgerRejected = 50,
}

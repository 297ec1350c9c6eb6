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
    /// Caller is not the configured emission controller
    PermissionDenied = 10,

    // ============================================
    // VALIDATION ERRORS (20-29)
    // ============================================
    /// Non-positive amount, amount too small for one share, or overflow
    InvalidParameters = 20,

    // ============================================
    // POSITION ERRORS (30-39)
    // ============================================
    /// Withdrawal attempted during warmup
    InsufficientVesting = 30,
    /// Owner has no stake
    NoPosition = 31,
    /// More shares requested than held, or reward not backed by tokens
    InsufficientBalance = 32,
}

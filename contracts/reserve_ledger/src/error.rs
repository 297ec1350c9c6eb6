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
    /// Principal lacks the role required for this operation, or the asset
    /// is not an enabled reserve/liquidity asset
    PermissionDenied = 10,

    // ============================================
    // PARAMETER ERRORS (20-29)
    // ============================================
    /// Non-positive amount, declared value above appraisal, missing
    /// calculator, or arithmetic overflow
    InvalidParameters = 20,

    // ============================================
    // RESERVE ERRORS (30-39)
    // ============================================
    /// Request exceeds excess reserves, total reserves or a debt limit
    InsufficientReserves = 30,
}

//! Engine error type.

use crate::types::{Address, AssetId, PoolId};

/// All errors returned by the engine.
///
/// Every variant aborts the enclosing operation; nothing is retried
/// internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CiswapError {
    // ── Preconditions ────────────────────────────────────────────────────────
    #[error("Swap input must be greater than zero")]
    InsufficientInput,

    #[error("Computed output is zero")]
    InsufficientOutput,

    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Pool reserves are empty or uninitialized")]
    InvalidReserves,

    #[error("Requested output exceeds available reserves")]
    InsufficientLiquidity,

    #[error("Pool {0} not found")]
    PoolNotFound(PoolId),

    #[error("Pool already exists for {0} / {1}")]
    PoolAlreadyExists(AssetId, AssetId),

    #[error("Pool assets must differ")]
    IdenticalAssets,

    #[error("Position {seq} not found in pool {pool_id}")]
    PositionNotFound { pool_id: PoolId, seq: u64 },

    // ── Invariants ───────────────────────────────────────────────────────────
    #[error("Real reserve {available} cannot cover redemption of {requested}")]
    RedemptionInsufficient { requested: u64, available: u64 },

    #[error("Invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("Insufficient balance of {asset} for {owner}: need {required}, have {available}")]
    InsufficientBalance {
        asset: AssetId,
        owner: Address,
        required: u64,
        available: u64,
    },

    // ── Authorization ────────────────────────────────────────────────────────
    #[error("{0} does not own this position")]
    NotOwner(Address),

    #[error("{0} is not the protocol admin")]
    Unauthorized(Address),

    #[error("{0} is a pool custody account")]
    CustodyAccount(Address),

    // ── Slippage ─────────────────────────────────────────────────────────────
    #[error("Output below minimum, slippage exceeded: got {actual}, minimum {minimum}")]
    SlippageExceeded { actual: u64, minimum: u64 },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Math overflow")]
    MathOverflow,
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, CiswapError>;

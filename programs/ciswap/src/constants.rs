/// Derivation seeds
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool_authority";
pub const FEE_STORE_SEED: &[u8] = b"fee_store";
pub const VIRTUAL_SEED: &[u8] = b"virtual";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const ADMIN_SEED: &[u8] = b"admin";
pub const NATIVE_ASSET_SEED: &[u8] = b"native";

/// Position token names are `"{POSITION_NAME_PREFIX}-{pool_id}-{seq}"`
pub const POSITION_NAME_PREFIX: &str = "ciswap-lp";

/// Default swap fee: 0.30 %
pub const FEE_RATE_DEFAULT_BPS: u64 = 30;
/// Upper bound accepted for a configured fee rate (10 %)
pub const FEE_RATE_MAX_BPS: u64 = 1_000;

/// Denominator for basis-point math (u128 to avoid up-cast noise)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Share of every collected fee handed to liquidity providers, in percent.
/// The rest stays in the reserves.
pub const LP_SHARE_DEFAULT_PCT: u64 = 10;
pub const PCT_DENOMINATOR: u128 = 100;

/// Locked-liquidity multiplier: 1.25, scaled by 1_000_000
pub const VIRTUAL_MULTIPLIER: u128 = 1_250_000;
pub const VIRTUAL_MULTIPLIER_SCALE: u128 = 1_000_000;

/// Q64.64 fixed-point scale (fee growth accumulators)
pub const Q64: u128 = 1u128 << 64;

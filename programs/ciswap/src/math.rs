//! Pool math: invariant, swap and liquidity quotes, fee splits.
//!
//! Everything here is pure. Each function checks its numeric preconditions
//! and returns an error instead of saturating. Reserve products are computed
//! in u128, so `(reserve + debt)` pairs of u64 never lose precision.

use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    error::{CiswapError, Result},
    state::Reserves,
    types::Direction,
};

// ─── Integer square root (Babylonian method) ──────────────────────────────
pub fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    // ceil(n / 2) without the overflow of (n + 1) >> 1 at u128::MAX
    let mut y = (n >> 1) + (n & 1);
    while y < x {
        x = y;
        y = (y + n / y) >> 1;
    }
    x
}

fn ceil_div(numerator: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(CiswapError::InvalidReserves);
    }
    let q = numerator / denominator;
    Ok(if numerator % denominator == 0 { q } else { q + 1 })
}

// ─── Invariant ─────────────────────────────────────────────────────────────

/// Combined reserve the invariant sees for one side.
pub fn actual(reserve: u64, debt: u64) -> u128 {
    reserve as u128 + debt as u128
}

/// `(actual_x, actual_y)`; both must be non-zero.
pub fn actual_reserves(reserves: &Reserves) -> Result<(u128, u128)> {
    let actual_x = actual(reserves.reserve_x, reserves.reserve_debt_x);
    let actual_y = actual(reserves.reserve_y, reserves.reserve_debt_y);
    if actual_x == 0 || actual_y == 0 {
        return Err(CiswapError::InvalidReserves);
    }
    Ok((actual_x, actual_y))
}

/// K = actual_x * actual_y
pub fn k(reserves: &Reserves) -> Result<u128> {
    let (actual_x, actual_y) = actual_reserves(reserves)?;
    actual_x
        .checked_mul(actual_y)
        .ok_or(CiswapError::MathOverflow)
}

pub fn k_sqrt(reserves: &Reserves) -> Result<u128> {
    Ok(isqrt(k(reserves)?))
}

/// Permanently locked liquidity floor: `floor(sqrt(debt_x * debt_y)) * 1.25`.
pub fn locked_liquidity(debt_x: u64, debt_y: u64) -> Result<u128> {
    if debt_x == 0 || debt_y == 0 {
        return Err(CiswapError::InvalidAmount("initial virtual reserves must be non-zero"));
    }
    let root = isqrt(debt_x as u128 * debt_y as u128);
    Ok(root
        .checked_mul(VIRTUAL_MULTIPLIER)
        .ok_or(CiswapError::MathOverflow)?
        / VIRTUAL_MULTIPLIER_SCALE)
}

fn oriented(direction: Direction, reserves: &Reserves) -> Result<(u128, u128)> {
    let (actual_x, actual_y) = actual_reserves(reserves)?;
    Ok(match direction {
        Direction::XToY => (actual_x, actual_y),
        Direction::YToX => (actual_y, actual_x),
    })
}

// ─── Swap quotes ───────────────────────────────────────────────────────────

/// Output that keeps K constant after `amount_in` joins the input side.
///
/// `out = actual_out - ceil(K / (actual_in + amount_in))`; rounding the K
/// term up keeps the pool whole.
pub fn amount_out_raw(amount_in: u64, direction: Direction, reserves: &Reserves) -> Result<u64> {
    if amount_in == 0 {
        return Err(CiswapError::InsufficientInput);
    }
    let (actual_in, actual_out) = oriented(direction, reserves)?;
    let k = actual_in
        .checked_mul(actual_out)
        .ok_or(CiswapError::MathOverflow)?;
    let new_in = actual_in
        .checked_add(amount_in as u128)
        .ok_or(CiswapError::MathOverflow)?;
    let new_out = ceil_div(k, new_in)?;
    let raw = actual_out
        .checked_sub(new_out)
        .ok_or(CiswapError::InvariantViolation("output side grew on swap"))?;
    if raw == 0 {
        return Err(CiswapError::InsufficientOutput);
    }
    u64::try_from(raw).map_err(|_| CiswapError::MathOverflow)
}

/// Input required for a raw (pre-fee) output of `amount_out`.
///
/// Inverse of [`amount_out_raw`]: `ceil(K / (actual_out - amount_out)) - actual_in`.
pub fn amount_in(amount_out: u64, direction: Direction, reserves: &Reserves) -> Result<u64> {
    if amount_out == 0 {
        return Err(CiswapError::InsufficientOutput);
    }
    let (actual_in, actual_out) = oriented(direction, reserves)?;
    if amount_out as u128 >= actual_out {
        return Err(CiswapError::InsufficientLiquidity);
    }
    let k = actual_in
        .checked_mul(actual_out)
        .ok_or(CiswapError::MathOverflow)?;
    let needed = ceil_div(k, actual_out - amount_out as u128)?;
    let required = needed
        .checked_sub(actual_in)
        .ok_or(CiswapError::MathOverflow)?;
    u64::try_from(required).map_err(|_| CiswapError::MathOverflow)
}

/// Split an output into `(real, virtual)`.
///
/// Real reserve is used first; any shortfall is paid in virtual units.
pub fn split_real_virtual(total_out: u64, real_reserve: u64) -> (u64, u64) {
    if total_out <= real_reserve {
        (total_out, 0)
    } else {
        (real_reserve, total_out - real_reserve)
    }
}

// ─── Fees ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSplit {
    pub net: u64,
    pub fee: u64,
}

/// `fee = gross * fee_bps / 10_000` (floor), `net = gross - fee`.
pub fn fee_split(gross: u64, fee_bps: u64) -> Result<FeeSplit> {
    if fee_bps as u128 > BPS_DENOMINATOR {
        return Err(CiswapError::InvalidConfig(format!("fee rate {fee_bps} bps exceeds 100%")));
    }
    let fee = (gross as u128 * fee_bps as u128 / BPS_DENOMINATOR) as u64;
    Ok(FeeSplit { net: gross - fee, fee })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LpSplit {
    /// Moved to the fee store and distributed to positions.
    pub lp: u64,
    /// Left in the reserves.
    pub protocol: u64,
}

/// `lp = fee * lp_share_pct / 100` (floor), `protocol = fee - lp`.
pub fn protocol_lp_split(fee: u64, lp_share_pct: u64) -> Result<LpSplit> {
    if lp_share_pct as u128 > PCT_DENOMINATOR {
        return Err(CiswapError::InvalidConfig(format!("lp share {lp_share_pct}% exceeds 100%")));
    }
    let lp = (fee as u128 * lp_share_pct as u128 / PCT_DENOMINATOR) as u64;
    Ok(LpSplit { lp, protocol: fee - lp })
}

// ─── Liquidity quote ───────────────────────────────────────────────────────

/// Counter-amount that matches the current ratio: `amount_x * reserve_y / reserve_x`.
pub fn quote(amount_x: u64, reserve_x: u128, reserve_y: u128) -> Result<u64> {
    if amount_x == 0 {
        return Err(CiswapError::InvalidAmount("quote amount must be non-zero"));
    }
    if reserve_x == 0 || reserve_y == 0 {
        return Err(CiswapError::InvalidReserves);
    }
    let quoted = (amount_x as u128)
        .checked_mul(reserve_y)
        .ok_or(CiswapError::MathOverflow)?
        / reserve_x;
    u64::try_from(quoted).map_err(|_| CiswapError::MathOverflow)
}

// ─── Full swap quote ───────────────────────────────────────────────────────

/// Result of swap output and fee calculations, shared by the swap handler
/// and the read-only quote views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub direction: Direction,
    pub amount_in: u64,
    /// Output that keeps K constant, before fees.
    pub amount_out_raw: u64,
    /// Portion of the raw output paid from the real reserve, before fees.
    pub real_gross: u64,
    /// Portion of the raw output paid in virtual units, before fees.
    pub virtual_gross: u64,
    pub real_fee: LpSplit,
    pub virtual_fee: LpSplit,
    /// Real units delivered to the recipient.
    pub out: u64,
    /// Virtual units delivered to the recipient.
    pub debt_out: u64,
}

impl SwapQuote {
    pub fn total_fee(&self) -> u64 {
        self.real_fee.lp + self.real_fee.protocol + self.virtual_fee.lp + self.virtual_fee.protocol
    }
}

/// Compute raw output, real/virtual split, fees and the LP/protocol split.
///
/// * `fee_bps`      – swap fee in basis points
/// * `lp_share_pct` – share of the fee handed to positions; pass 0 when the
///                    pool has no positions so the whole fee stays in reserves
pub fn quote_swap(
    amount_in: u64,
    direction: Direction,
    reserves: &Reserves,
    fee_bps: u64,
    lp_share_pct: u64,
) -> Result<SwapQuote> {
    let amount_out_raw = amount_out_raw(amount_in, direction, reserves)?;
    let out_side = direction.output_side();
    let (real_gross, virtual_gross) = split_real_virtual(amount_out_raw, reserves.real(out_side));

    let real = fee_split(real_gross, fee_bps)?;
    let virt = fee_split(virtual_gross, fee_bps)?;

    Ok(SwapQuote {
        direction,
        amount_in,
        amount_out_raw,
        real_gross,
        virtual_gross,
        real_fee: protocol_lp_split(real.fee, lp_share_pct)?,
        virtual_fee: protocol_lp_split(virt.fee, lp_share_pct)?,
        out: real.net,
        debt_out: virt.net,
    })
}

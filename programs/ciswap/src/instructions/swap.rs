use tracing::info;

use super::Context;
use crate::{
    bank::Bank,
    config::ProtocolConfig,
    error::{CiswapError, Result},
    events::CiswapEvent,
    fees::Bucket,
    math::{self, SwapQuote},
    state::Pool,
    types::{Address, Direction},
};

/// Fee share handed to positions. A pool without positions keeps the whole
/// fee in its reserves.
pub fn lp_share_pct(pool: &Pool, config: &ProtocolConfig) -> u64 {
    if pool.positions.total_liquidity() == 0 {
        0
    } else {
        config.lp_share_pct
    }
}

/// Quote a swap against the pool's current reserves.
pub fn quote(pool: &Pool, config: &ProtocolConfig, amount_in: u64, direction: Direction) -> Result<SwapQuote> {
    math::quote_swap(
        amount_in,
        direction,
        &pool.reserves(),
        config.fee_bps,
        lp_share_pct(pool, config),
    )
}

/// Swap `amount_in` of the input asset against the virtual-reserve invariant.
///
/// Output is paid from the real reserve first; any shortfall is paid in the
/// output side's virtual asset. The fee is taken separately from each part:
///   - LP share (`lp_share_pct`): moved to the fee store and credited to
///     positions through `fee_growth_global`.
///   - Remainder: stays in the reserves, growing K.
///
/// Effective flow:
///   1. sender → custody        : amount_in (real, input side)
///   2. custody → recipient     : out (real) + debt_out (virtual)
///   3. custody → fee store     : LP share of each fee
#[allow(clippy::too_many_arguments)]
pub fn handler<B: Bank>(
    ctx: Context<'_, B>,
    sender: Address,
    amount_in: u64,
    direction: Direction,
    recipient: Address,
    min_out: u64,
    min_debt_out: u64,
) -> Result<((u64, u64), CiswapEvent)> {
    ctx.pool.check_counterparty(&sender)?;
    ctx.pool.check_counterparty(&recipient)?;
    let q = quote(ctx.pool, ctx.config, amount_in, direction)?;

    if q.out < min_out {
        return Err(CiswapError::SlippageExceeded { actual: q.out, minimum: min_out });
    }
    if q.debt_out < min_debt_out {
        return Err(CiswapError::SlippageExceeded {
            actual: q.debt_out,
            minimum: min_debt_out,
        });
    }

    // ── New reserves ──────────────────────────────────────────────────────────
    let in_side = direction.input_side();
    let out_side = direction.output_side();
    let real_leaving = q.out + q.real_fee.lp;
    let virtual_leaving = q.debt_out + q.virtual_fee.lp;

    let mut next = ctx.pool.reserves();
    *next.real_mut(in_side) = next
        .real(in_side)
        .checked_add(amount_in)
        .ok_or(CiswapError::MathOverflow)?;
    *next.real_mut(out_side) = next
        .real(out_side)
        .checked_sub(real_leaving)
        .ok_or(CiswapError::InvariantViolation("real output exceeds real reserve"))?;
    *next.debt_mut(out_side) = next
        .debt(out_side)
        .checked_sub(virtual_leaving)
        .ok_or(CiswapError::InvariantViolation("virtual output exceeds virtual reserve"))?;

    // ── Transfers ─────────────────────────────────────────────────────────────
    let pool = &mut *ctx.pool;
    let asset_in = pool.asset(in_side);
    let asset_out = pool.asset(out_side);
    let virtual_out = pool.virtual_asset(out_side);

    ctx.bank.transfer(&asset_in, &sender, &pool.authority, amount_in)?;
    ctx.bank.transfer(&asset_out, &pool.authority, &recipient, q.out)?;
    ctx.bank.transfer(&virtual_out, &pool.authority, &recipient, q.debt_out)?;
    ctx.bank.transfer(&asset_out, &pool.authority, &pool.fee_store, q.real_fee.lp)?;
    ctx.bank.transfer(&virtual_out, &pool.authority, &pool.fee_store, q.virtual_fee.lp)?;

    // ── Commit ────────────────────────────────────────────────────────────────
    let k_sqrt_delta = pool.ledger.commit(next, ctx.now)?;

    let liquidity = pool.positions.total_liquidity();
    pool.fees.credit(Bucket::real(out_side), q.real_fee.lp, liquidity)?;
    pool.fees.credit(Bucket::debt(out_side), q.virtual_fee.lp, liquidity)?;

    let fee_real = q.real_fee.lp + q.real_fee.protocol;
    let fee_virtual = q.virtual_fee.lp + q.virtual_fee.protocol;

    info!(
        pool_id = pool.id,
        %sender,
        %recipient,
        ?direction,
        amount_in,
        out = q.out,
        debt_out = q.debt_out,
        fee_real,
        fee_virtual,
        lp_fee_real = q.real_fee.lp,
        lp_fee_virtual = q.virtual_fee.lp,
        k_sqrt_delta = %k_sqrt_delta,
        "swap"
    );

    let event = CiswapEvent::Swapped {
        pool_id: pool.id,
        sender,
        recipient,
        direction,
        amount_in,
        out: q.out,
        debt_out: q.debt_out,
        fee_real,
        fee_virtual,
        k_sqrt_delta,
        timestamp: ctx.now,
    };
    Ok(((q.out, q.debt_out), event))
}

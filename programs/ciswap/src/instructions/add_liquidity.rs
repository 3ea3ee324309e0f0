use tracing::info;

use super::Context;
use crate::{
    bank::Bank,
    error::{CiswapError, Result},
    events::CiswapEvent,
    math,
    state::Reserves,
    types::Address,
};

/// Amounts that can be deposited without moving the price.
///
/// Quote Y from the offered X first; if that needs more Y than offered,
/// quote X from the offered Y instead.
pub fn optimal_amounts(reserves: &Reserves, amount_x: u64, amount_y: u64) -> Result<(u64, u64)> {
    let (actual_x, actual_y) = math::actual_reserves(reserves)?;
    let y_optimal = math::quote(amount_x, actual_x, actual_y)?;
    if y_optimal <= amount_y {
        return Ok((amount_x, y_optimal));
    }
    let x_optimal = math::quote(amount_y, actual_y, actual_x)?;
    if x_optimal > amount_x {
        return Err(CiswapError::InvalidAmount("quoted amount exceeds supplied amount"));
    }
    Ok((x_optimal, amount_y))
}

/// Deposit matched real amounts and credit the growth of `k_sqrt` to the
/// provider's position.
///
/// Only the matched amounts are pulled from the provider; the rest of the
/// offer never leaves their balance.
pub fn handler<B: Bank>(
    ctx: Context<'_, B>,
    provider: Address,
    amount_x: u64,
    amount_y: u64,
) -> Result<((u64, u64), CiswapEvent)> {
    ctx.pool.check_counterparty(&provider)?;
    let reserves = ctx.pool.reserves();
    let (used_x, used_y) = optimal_amounts(&reserves, amount_x, amount_y)?;
    if used_x == 0 || used_y == 0 {
        return Err(CiswapError::InvalidAmount("deposit rounds to zero at the pool ratio"));
    }

    let mut next = reserves;
    next.reserve_x = next.reserve_x.checked_add(used_x).ok_or(CiswapError::MathOverflow)?;
    next.reserve_y = next.reserve_y.checked_add(used_y).ok_or(CiswapError::MathOverflow)?;

    // Reject before any asset moves if the deposit is too small to register.
    let k_sqrt = math::k_sqrt(&next)?;
    if k_sqrt <= ctx.pool.ledger.k_sqrt_last {
        return Err(CiswapError::InvalidAmount("deposit does not increase liquidity"));
    }

    let authority = ctx.pool.authority;
    ctx.bank.transfer(&ctx.pool.asset_x, &provider, &authority, used_x)?;
    ctx.bank.transfer(&ctx.pool.asset_y, &provider, &authority, used_y)?;

    let liquidity = ctx.pool.ledger.commit(next, ctx.now)?;
    let pool = &mut *ctx.pool;
    let (position, created) =
        pool.positions
            .upsert_position(provider, liquidity, &pool.fees.fee_growth_global)?;

    info!(
        pool_id = pool.id,
        %provider,
        %position,
        created,
        used_x,
        used_y,
        liquidity = %liquidity,
        k_sqrt = %pool.ledger.k_sqrt_last,
        "liquidity added"
    );

    let event = CiswapEvent::LiquidityAdded {
        pool_id: pool.id,
        provider,
        position,
        amount_x: used_x,
        amount_y: used_y,
        liquidity,
        timestamp: ctx.now,
    };
    Ok(((used_x, used_y), event))
}

use tracing::info;

use super::Context;
use crate::{
    bank::Bank,
    error::{CiswapError, Result},
    events::CiswapEvent,
    types::{Address, Side},
};

/// Convert virtual units held by `sender` into real assets, one for one.
///
/// Per side with a non-zero amount:
///   1. burn `amount` virtual units from the sender
///   2. mint `amount` virtual units into custody (virtual supply unchanged)
///   3. custody → recipient : `amount` real units
///
/// The real reserve shrinks and the virtual reserve grows by the same
/// amount, so combined reserves and K are unchanged.
pub fn handler<B: Bank>(
    ctx: Context<'_, B>,
    sender: Address,
    amount_debt_x: u64,
    amount_debt_y: u64,
    recipient: Address,
) -> Result<((u64, u64), CiswapEvent)> {
    ctx.pool.check_counterparty(&sender)?;
    ctx.pool.check_counterparty(&recipient)?;
    if amount_debt_x == 0 && amount_debt_y == 0 {
        return Err(CiswapError::InvalidAmount("redemption amounts must not both be zero"));
    }

    let pool = &mut *ctx.pool;
    let mut next = pool.reserves();

    for (side, amount) in [(Side::X, amount_debt_x), (Side::Y, amount_debt_y)] {
        if amount == 0 {
            continue;
        }
        let available = next.real(side);
        if amount > available {
            return Err(CiswapError::RedemptionInsufficient { requested: amount, available });
        }
        *next.real_mut(side) = available - amount;
        *next.debt_mut(side) = next
            .debt(side)
            .checked_add(amount)
            .ok_or(CiswapError::MathOverflow)?;

        let virtual_asset = pool.virtual_asset(side);
        ctx.bank.burn(&virtual_asset, &sender, amount)?;
        ctx.bank.mint(&virtual_asset, &pool.authority, amount)?;
        ctx.bank.transfer(&pool.asset(side), &pool.authority, &recipient, amount)?;
    }

    pool.ledger.commit(next, ctx.now)?;

    info!(
        pool_id = pool.id,
        %sender,
        %recipient,
        amount_debt_x,
        amount_debt_y,
        "redeemed"
    );

    let event = CiswapEvent::Redeemed {
        pool_id: pool.id,
        sender,
        recipient,
        amount_debt_x,
        amount_debt_y,
        timestamp: ctx.now,
    };
    Ok(((amount_debt_x, amount_debt_y), event))
}

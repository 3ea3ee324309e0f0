use tracing::info;

use super::Context;
use crate::{
    bank::Bank,
    error::Result,
    events::CiswapEvent,
    positions::PositionKey,
    types::Address,
};

/// Hand position `seq` to `new_owner`. Owed fees and the growth snapshot
/// travel with it.
pub fn handler<B: Bank>(
    ctx: Context<'_, B>,
    owner: Address,
    seq: u64,
    new_owner: Address,
) -> Result<(PositionKey, CiswapEvent)> {
    ctx.pool.check_counterparty(&new_owner)?;
    let position = ctx.pool.positions.transfer(seq, &owner, new_owner)?;

    info!(%position, from = %owner, to = %new_owner, "position transferred");

    let event = CiswapEvent::PositionTransferred {
        position,
        from: owner,
        to: new_owner,
        timestamp: ctx.now,
    };
    Ok((position, event))
}

use tracing::info;

use super::Context;
use crate::{
    bank::Bank,
    error::{CiswapError, Result},
    events::CiswapEvent,
    fees::{self, Bucket, FeeAmounts},
    types::Address,
};

/// Pay out every fee owed to `sender`'s positions in the pool.
///
/// Each position is synced first: fees earned since its last snapshot are
/// added to `fee_owed` and the snapshot moves to the current global growth.
/// The total then leaves the fee store and every `fee_owed` is zeroed.
pub fn handler<B: Bank>(
    ctx: Context<'_, B>,
    sender: Address,
    recipient: Address,
) -> Result<(FeeAmounts, CiswapEvent)> {
    let pool = &mut *ctx.pool;
    pool.check_counterparty(&sender)?;
    pool.check_counterparty(&recipient)?;
    let seqs: Vec<u64> = pool.positions.owned_by(&sender).map(|p| p.key.seq).collect();
    if seqs.is_empty() {
        return Err(CiswapError::NotOwner(sender));
    }

    // Sync fees owed
    let global = pool.fees.fee_growth_global;
    let mut total = FeeAmounts::default();
    for &seq in &seqs {
        let info = pool.positions.get_position_info(seq, &sender)?;
        let earned = fees::accrued(info.liquidity_added, &global, &info.fee_growth_inside)?;
        let owed = info.fee_owed.checked_add(&earned)?;
        pool.positions.update_fee_owed(seq, &sender, owed)?;
        pool.positions.update_fee_growth_inside(seq, &sender, global)?;
        total = total.checked_add(&owed)?;
    }

    pool.fees.withdraw(&total)?;
    for bucket in Bucket::ALL {
        ctx.bank.transfer(&pool.bucket_asset(bucket), &pool.fee_store, &recipient, total.get(bucket))?;
    }
    for &seq in &seqs {
        pool.positions.reset_fee_owed(seq, &sender)?;
    }

    info!(
        pool_id = pool.id,
        %sender,
        %recipient,
        positions = seqs.len(),
        x = total.x,
        y = total.y,
        debt_x = total.debt_x,
        debt_y = total.debt_y,
        "fees collected"
    );

    let event = CiswapEvent::FeesCollected {
        pool_id: pool.id,
        owner: sender,
        recipient,
        amounts: total,
        timestamp: ctx.now,
    };
    Ok((total, event))
}

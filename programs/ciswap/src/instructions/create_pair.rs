use tracing::info;

use crate::{
    bank::Bank,
    config::ProtocolConfig,
    error::{CiswapError, Result},
    events::CiswapEvent,
    state::{Pool, ReserveLedger},
    types::{Address, AssetId, PoolId},
};

/// Build pool `pool_id` for `asset_x / asset_y`, seeded with virtual reserves.
///
///   1. creator → treasury : `creation_fee` native units
///   2. mint `initial_debt_x` / `initial_debt_y` virtual units into custody
///
/// The returned pool is not registered yet; the caller inserts it.
#[allow(clippy::too_many_arguments)]
pub fn handler<B: Bank>(
    bank: &mut B,
    config: &ProtocolConfig,
    now: u64,
    pool_id: PoolId,
    creator: Address,
    asset_x: AssetId,
    asset_y: AssetId,
    initial_debt_x: u64,
    initial_debt_y: u64,
) -> Result<(Pool, CiswapEvent)> {
    if asset_x == asset_y {
        return Err(CiswapError::IdenticalAssets);
    }
    let ledger = ReserveLedger::new(initial_debt_x, initial_debt_y, now)?;
    let pool = Pool::new(pool_id, creator, asset_x, asset_y, ledger);

    if config.creation_fee > 0 {
        bank.transfer(&config.native_asset, &creator, &config.treasury, config.creation_fee)?;
    }
    bank.mint(&pool.virtual_x, &pool.authority, initial_debt_x)?;
    bank.mint(&pool.virtual_y, &pool.authority, initial_debt_y)?;

    info!(
        pool_id,
        %creator,
        %asset_x,
        %asset_y,
        initial_debt_x,
        initial_debt_y,
        k_sqrt_last = %pool.ledger.k_sqrt_last,
        k_sqrt_locked = %pool.ledger.k_sqrt_locked,
        "pair created"
    );

    let event = CiswapEvent::PairCreated {
        pool_id,
        creator,
        asset_x,
        asset_y,
        virtual_x: pool.virtual_x,
        virtual_y: pool.virtual_y,
        initial_debt_x,
        initial_debt_y,
        timestamp: now,
    };
    Ok((pool, event))
}

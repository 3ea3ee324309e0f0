use serde::Serialize;

use crate::{
    fees::FeeAmounts,
    positions::PositionKey,
    types::{Address, AssetId, Direction, PoolId},
};

/// Record of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CiswapEvent {
    PairCreated {
        pool_id: PoolId,
        creator: Address,
        asset_x: AssetId,
        asset_y: AssetId,
        virtual_x: AssetId,
        virtual_y: AssetId,
        initial_debt_x: u64,
        initial_debt_y: u64,
        timestamp: u64,
    },
    LiquidityAdded {
        pool_id: PoolId,
        provider: Address,
        position: PositionKey,
        amount_x: u64,
        amount_y: u64,
        liquidity: u128,
        timestamp: u64,
    },
    Swapped {
        pool_id: PoolId,
        sender: Address,
        recipient: Address,
        direction: Direction,
        amount_in: u64,
        out: u64,
        debt_out: u64,
        fee_real: u64,
        fee_virtual: u64,
        k_sqrt_delta: u128,
        timestamp: u64,
    },
    Redeemed {
        pool_id: PoolId,
        sender: Address,
        recipient: Address,
        amount_debt_x: u64,
        amount_debt_y: u64,
        timestamp: u64,
    },
    FeesCollected {
        pool_id: PoolId,
        owner: Address,
        recipient: Address,
        amounts: FeeAmounts,
        timestamp: u64,
    },
    PositionTransferred {
        position: PositionKey,
        from: Address,
        to: Address,
        timestamp: u64,
    },
    ConfigUpdated {
        admin: Address,
        fee_bps: u64,
        lp_share_pct: u64,
        creation_fee: u64,
    },
}

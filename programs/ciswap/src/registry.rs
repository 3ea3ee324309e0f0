use std::collections::HashMap;

use crate::{
    error::{CiswapError, Result},
    state::Pool,
    types::{AssetId, PoolId},
};

/// Pools keyed by id, plus an index so a pair is registered only once
/// (in either asset order). Ids are dense and never reused.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: HashMap<PoolId, Pool>,
    pairs: HashMap<(AssetId, AssetId), PoolId>,
    next_id: PoolId,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next created pool will receive.
    pub fn next_pool_id(&self) -> PoolId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn find_pair(&self, asset_a: &AssetId, asset_b: &AssetId) -> Option<PoolId> {
        self.pairs
            .get(&(*asset_a, *asset_b))
            .or_else(|| self.pairs.get(&(*asset_b, *asset_a)))
            .copied()
    }

    /// Reject a pair that cannot be created.
    pub fn check_new_pair(&self, asset_x: &AssetId, asset_y: &AssetId) -> Result<()> {
        if asset_x == asset_y {
            return Err(CiswapError::IdenticalAssets);
        }
        if self.find_pair(asset_x, asset_y).is_some() {
            return Err(CiswapError::PoolAlreadyExists(*asset_x, *asset_y));
        }
        Ok(())
    }

    /// Register a pool built for [`next_pool_id`](Self::next_pool_id).
    pub fn insert(&mut self, pool: Pool) -> Result<PoolId> {
        if pool.id != self.next_id {
            return Err(CiswapError::InvariantViolation("pool id out of sequence"));
        }
        self.check_new_pair(&pool.asset_x, &pool.asset_y)?;
        let id = pool.id;
        self.pairs.insert((pool.asset_x, pool.asset_y), id);
        self.pools.insert(id, pool);
        self.next_id += 1;
        Ok(id)
    }

    pub fn get(&self, pool_id: PoolId) -> Result<&Pool> {
        self.pools.get(&pool_id).ok_or(CiswapError::PoolNotFound(pool_id))
    }

    pub fn get_mut(&mut self, pool_id: PoolId) -> Result<&mut Pool> {
        self.pools
            .get_mut(&pool_id)
            .ok_or(CiswapError::PoolNotFound(pool_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }
}

//! Liquidity positions.
//!
//! Positions live in a per-pool arena indexed by a stable sequence number;
//! `(pool_id, seq)` names the position token. Ownership is an explicit field
//! and every mutating call checks it against the caller.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    constants::POSITION_NAME_PREFIX,
    error::{CiswapError, Result},
    fees::{self, FeeAmounts, FeeGrowth},
    types::{Address, PoolId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    pub pool_id: PoolId,
    pub seq: u64,
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", POSITION_NAME_PREFIX, self.pool_id, self.seq)
    }
}

// ─── Position ──────────────────────────────────────────────────────────────
// Tracks one provider's liquidity contribution in a single pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub key: PositionKey,
    pub owner: Address,
    /// Contribution to the pool's k_sqrt
    pub liquidity_added: u128,
    /// Fee-growth snapshots at last sync
    pub fee_growth_inside: FeeGrowth,
    /// Accrued but uncollected fees
    pub fee_owed: FeeAmounts,
}

impl Position {
    /// Move fees earned since the last snapshot into `fee_owed`.
    /// Call before any change to `liquidity_added`.
    pub fn accrue(&mut self, global: &FeeGrowth) -> Result<()> {
        let earned = fees::accrued(self.liquidity_added, global, &self.fee_growth_inside)?;
        self.fee_owed = self.fee_owed.checked_add(&earned)?;
        self.fee_growth_inside = *global;
        Ok(())
    }
}

// ─── PositionLedger ────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLedger {
    pool_id: PoolId,
    positions: Vec<Position>,
    /// Seqs held by each owner, ascending
    by_owner: HashMap<Address, Vec<u64>>,
    /// Sum of `liquidity_added` over every position
    total_liquidity: u128,
}

/// Saved state of the positions held by a set of owners. Restoring it undoes
/// any change an operation made to those owners' positions.
#[derive(Debug, Clone)]
pub struct PositionCheckpoint {
    len: usize,
    total_liquidity: u128,
    positions: Vec<Position>,
    owners: Vec<(Address, Option<Vec<u64>>)>,
}

impl PositionLedger {
    pub fn new(pool_id: PoolId) -> Self {
        Self {
            pool_id,
            positions: Vec::new(),
            by_owner: HashMap::new(),
            total_liquidity: 0,
        }
    }

    pub fn total_liquidity(&self) -> u128 {
        self.total_liquidity
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// Positions held by `owner`, lowest seq first.
    pub fn owned_by<'a>(&'a self, owner: &Address) -> impl Iterator<Item = &'a Position> + 'a {
        self.by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|&seq| self.positions.get(seq as usize))
    }

    /// Save every position `owners` hold, plus the arena length and total.
    /// Positions minted after the checkpoint are dropped on restore.
    pub fn checkpoint(&self, owners: &[Address]) -> PositionCheckpoint {
        let owners: Vec<_> = owners
            .iter()
            .map(|owner| (*owner, self.by_owner.get(owner).cloned()))
            .collect();
        let positions = owners
            .iter()
            .filter_map(|(_, seqs)| seqs.as_ref())
            .flatten()
            .filter_map(|&seq| self.positions.get(seq as usize).cloned())
            .collect();
        PositionCheckpoint {
            len: self.positions.len(),
            total_liquidity: self.total_liquidity,
            positions,
            owners,
        }
    }

    pub fn restore(&mut self, checkpoint: PositionCheckpoint) {
        self.positions.truncate(checkpoint.len);
        for position in checkpoint.positions {
            if let Some(slot) = self.positions.get_mut(position.key.seq as usize) {
                *slot = position;
            }
        }
        for (owner, seqs) in checkpoint.owners {
            match seqs {
                Some(seqs) => self.by_owner.insert(owner, seqs),
                None => self.by_owner.remove(&owner),
            };
        }
        self.total_liquidity = checkpoint.total_liquidity;
    }

    pub fn get(&self, seq: u64) -> Result<&Position> {
        usize::try_from(seq)
            .ok()
            .and_then(|i| self.positions.get(i))
            .ok_or(CiswapError::PositionNotFound { pool_id: self.pool_id, seq })
    }

    fn get_owned_mut(&mut self, seq: u64, caller: &Address) -> Result<&mut Position> {
        let pool_id = self.pool_id;
        let position = usize::try_from(seq)
            .ok()
            .and_then(|i| self.positions.get_mut(i))
            .ok_or(CiswapError::PositionNotFound { pool_id, seq })?;
        if position.owner != *caller {
            return Err(CiswapError::NotOwner(*caller));
        }
        Ok(position)
    }

    /// Credit `liquidity_delta` to `owner`'s position, minting one if the
    /// owner holds none in this pool. Returns the key and whether it was
    /// minted.
    ///
    /// A new position snapshots `global` so it earns only fees collected
    /// after it was opened; an existing one accrues before growing.
    pub fn upsert_position(
        &mut self,
        owner: Address,
        liquidity_delta: u128,
        global: &FeeGrowth,
    ) -> Result<(PositionKey, bool)> {
        let total = self
            .total_liquidity
            .checked_add(liquidity_delta)
            .ok_or(CiswapError::MathOverflow)?;

        let existing = self.by_owner.get(&owner).and_then(|seqs| seqs.first()).copied();
        if let Some(seq) = existing {
            let position = self.get_owned_mut(seq, &owner)?;
            position.accrue(global)?;
            position.liquidity_added = position
                .liquidity_added
                .checked_add(liquidity_delta)
                .ok_or(CiswapError::MathOverflow)?;
            let key = position.key;
            self.total_liquidity = total;
            return Ok((key, false));
        }

        let key = PositionKey {
            pool_id: self.pool_id,
            seq: self.positions.len() as u64,
        };
        self.positions.push(Position {
            key,
            owner,
            liquidity_added: liquidity_delta,
            fee_growth_inside: *global,
            fee_owed: FeeAmounts::default(),
        });
        self.by_owner.entry(owner).or_default().push(key.seq);
        self.total_liquidity = total;
        Ok((key, true))
    }

    /// Snapshot of a position's liquidity and fee state.
    pub fn get_position_info(&self, seq: u64, caller: &Address) -> Result<Position> {
        let position = self.get(seq)?;
        if position.owner != *caller {
            return Err(CiswapError::NotOwner(*caller));
        }
        Ok(position.clone())
    }

    pub fn update_fee_owed(&mut self, seq: u64, caller: &Address, fee_owed: FeeAmounts) -> Result<()> {
        self.get_owned_mut(seq, caller)?.fee_owed = fee_owed;
        Ok(())
    }

    pub fn update_fee_growth_inside(
        &mut self,
        seq: u64,
        caller: &Address,
        fee_growth_inside: FeeGrowth,
    ) -> Result<()> {
        self.get_owned_mut(seq, caller)?.fee_growth_inside = fee_growth_inside;
        Ok(())
    }

    /// Overwrite a position's liquidity, keeping the pool total in step.
    pub fn update_liquidity(&mut self, seq: u64, caller: &Address, liquidity: u128) -> Result<()> {
        let previous = self.get_owned_mut(seq, caller)?.liquidity_added;
        let total = (self.total_liquidity - previous)
            .checked_add(liquidity)
            .ok_or(CiswapError::MathOverflow)?;
        self.get_owned_mut(seq, caller)?.liquidity_added = liquidity;
        self.total_liquidity = total;
        Ok(())
    }

    pub fn reset_fee_owed(&mut self, seq: u64, caller: &Address) -> Result<()> {
        self.get_owned_mut(seq, caller)?.fee_owed = FeeAmounts::default();
        Ok(())
    }

    /// Hand the position to `new_owner`.
    pub fn transfer(&mut self, seq: u64, caller: &Address, new_owner: Address) -> Result<PositionKey> {
        let position = self.get_owned_mut(seq, caller)?;
        position.owner = new_owner;
        let key = position.key;

        if let Some(seqs) = self.by_owner.get_mut(caller) {
            seqs.retain(|&s| s != seq);
            if seqs.is_empty() {
                self.by_owner.remove(caller);
            }
        }
        let seqs = self.by_owner.entry(new_owner).or_default();
        if let Err(at) = seqs.binary_search(&seq) {
            seqs.insert(at, seq);
        }
        Ok(key)
    }
}

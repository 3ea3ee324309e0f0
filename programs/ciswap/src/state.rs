use serde::{Deserialize, Serialize};

use crate::{
    error::{CiswapError, Result},
    fees::{Bucket, FeeAccounting},
    math,
    positions::{PositionCheckpoint, PositionLedger},
    types::{Address, AssetId, PoolId, Side},
};

// ─── Reserves ──────────────────────────────────────────────────────────────
// Real balances plus virtual (debt) balances; the invariant prices against
// their sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve_x: u64,
    pub reserve_y: u64,
    pub reserve_debt_x: u64,
    pub reserve_debt_y: u64,
}

impl Reserves {
    pub fn real(&self, side: Side) -> u64 {
        match side {
            Side::X => self.reserve_x,
            Side::Y => self.reserve_y,
        }
    }

    pub fn debt(&self, side: Side) -> u64 {
        match side {
            Side::X => self.reserve_debt_x,
            Side::Y => self.reserve_debt_y,
        }
    }

    pub fn real_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::X => &mut self.reserve_x,
            Side::Y => &mut self.reserve_y,
        }
    }

    pub fn debt_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::X => &mut self.reserve_debt_x,
            Side::Y => &mut self.reserve_debt_y,
        }
    }
}

// ─── ReserveLedger ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveLedger {
    pub reserves: Reserves,
    /// sqrt(K) at the last reserve-changing event; never decreases.
    pub k_sqrt_last: u128,
    /// Liquidity floor fixed at creation from the initial virtual reserves.
    pub k_sqrt_locked: u128,
    pub block_timestamp_last: u64,
}

impl ReserveLedger {
    /// Ledger seeded with virtual reserves only.
    pub fn new(initial_debt_x: u64, initial_debt_y: u64, now: u64) -> Result<Self> {
        let reserves = Reserves {
            reserve_debt_x: initial_debt_x,
            reserve_debt_y: initial_debt_y,
            ..Reserves::default()
        };
        Ok(Self {
            k_sqrt_locked: math::locked_liquidity(initial_debt_x, initial_debt_y)?,
            k_sqrt_last: math::k_sqrt(&reserves)?,
            reserves,
            block_timestamp_last: now,
        })
    }

    /// Replace the reserves and return the growth of `k_sqrt` they cause.
    ///
    /// Fails if the new reserves would shrink the invariant.
    pub fn commit(&mut self, reserves: Reserves, now: u64) -> Result<u128> {
        let k_sqrt = math::k_sqrt(&reserves)?;
        let delta = k_sqrt
            .checked_sub(self.k_sqrt_last)
            .ok_or(CiswapError::InvariantViolation("k_sqrt decreased"))?;
        self.reserves = reserves;
        self.k_sqrt_last = k_sqrt;
        self.block_timestamp_last = self.block_timestamp_last.max(now);
        Ok(delta)
    }
}

// ─── Pool ──────────────────────────────────────────────────────────────────
// One entry of the registry: identifiers, reserve state, fee accounting and
// the positions of every liquidity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub creator: Address,
    pub asset_x: AssetId,
    pub asset_y: AssetId,
    /// Virtual assets minted for each side at creation
    pub virtual_x: AssetId,
    pub virtual_y: AssetId,
    /// Custody account holding real and virtual reserves
    pub authority: Address,
    /// Account holding fees owed to positions
    pub fee_store: Address,
    pub ledger: ReserveLedger,
    pub fees: FeeAccounting,
    pub positions: PositionLedger,
}

impl Pool {
    pub fn new(
        id: PoolId,
        creator: Address,
        asset_x: AssetId,
        asset_y: AssetId,
        ledger: ReserveLedger,
    ) -> Self {
        Self {
            id,
            creator,
            asset_x,
            asset_y,
            virtual_x: AssetId::virtual_asset(id, Side::X),
            virtual_y: AssetId::virtual_asset(id, Side::Y),
            authority: Address::pool_authority(id),
            fee_store: Address::fee_store(id),
            ledger,
            fees: FeeAccounting::default(),
            positions: PositionLedger::new(id),
        }
    }

    pub fn reserves(&self) -> Reserves {
        self.ledger.reserves
    }

    pub fn asset(&self, side: Side) -> AssetId {
        match side {
            Side::X => self.asset_x,
            Side::Y => self.asset_y,
        }
    }

    pub fn virtual_asset(&self, side: Side) -> AssetId {
        match side {
            Side::X => self.virtual_x,
            Side::Y => self.virtual_y,
        }
    }

    /// Reject the pool's own custody accounts as a counterparty. A transfer
    /// from custody to itself moves nothing, so the ledger would drift from
    /// the bank.
    pub fn check_counterparty(&self, address: &Address) -> Result<()> {
        if *address == self.authority || *address == self.fee_store {
            return Err(CiswapError::CustodyAccount(*address));
        }
        Ok(())
    }

    /// Save the reserve ledger, fee accounting and the positions of
    /// `owners`. Enough to roll back any operation that only touches them.
    pub fn checkpoint(&self, owners: &[Address]) -> PoolCheckpoint {
        PoolCheckpoint {
            ledger: self.ledger.clone(),
            fees: self.fees.clone(),
            positions: self.positions.checkpoint(owners),
        }
    }

    pub fn restore(&mut self, checkpoint: PoolCheckpoint) {
        self.ledger = checkpoint.ledger;
        self.fees = checkpoint.fees;
        self.positions.restore(checkpoint.positions);
    }

    /// Asset held by a fee bucket.
    pub fn bucket_asset(&self, bucket: Bucket) -> AssetId {
        match bucket {
            Bucket::X => self.asset_x,
            Bucket::Y => self.asset_y,
            Bucket::DebtX => self.virtual_x,
            Bucket::DebtY => self.virtual_y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolCheckpoint {
    ledger: ReserveLedger,
    fees: FeeAccounting,
    positions: PositionCheckpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_records_sqrt_and_floor() {
        let ledger = ReserveLedger::new(200_000_000, 100_000_000, 7).unwrap();
        assert_eq!(ledger.k_sqrt_last, 141_421_356);
        assert_eq!(ledger.k_sqrt_locked, 176_776_695);
        assert_eq!(ledger.reserves.reserve_x, 0);
        assert_eq!(ledger.block_timestamp_last, 7);
    }

    #[test]
    fn commit_reports_growth_and_keeps_latest_timestamp() {
        let mut ledger = ReserveLedger::new(200_000_000, 100_000_000, 10).unwrap();
        let mut next = ledger.reserves;
        next.reserve_x = 100_000_000;
        next.reserve_y = 50_000_000;
        assert_eq!(ledger.commit(next, 5).unwrap(), 212_132_034 - 141_421_356);
        assert_eq!(ledger.k_sqrt_last, 212_132_034);
        assert_eq!(ledger.block_timestamp_last, 10);
    }

    #[test]
    fn commit_rejects_shrinking_invariant() {
        let mut ledger = ReserveLedger::new(200, 100, 0).unwrap();
        let mut next = ledger.reserves;
        next.reserve_debt_x = 100;
        assert_eq!(
            ledger.commit(next, 1),
            Err(CiswapError::InvariantViolation("k_sqrt decreased"))
        );
        assert_eq!(ledger.reserves.reserve_debt_x, 200);
    }

    #[test]
    fn custody_accounts_are_not_counterparties() {
        let ledger = ReserveLedger::new(200, 100, 0).unwrap();
        let pool = Pool::new(
            3,
            Address::derive(&[b"creator"]),
            AssetId::derive(&[b"X"]),
            AssetId::derive(&[b"Y"]),
            ledger,
        );

        assert_eq!(
            pool.check_counterparty(&pool.authority),
            Err(CiswapError::CustodyAccount(pool.authority))
        );
        assert_eq!(
            pool.check_counterparty(&pool.fee_store),
            Err(CiswapError::CustodyAccount(pool.fee_store))
        );
        assert_eq!(pool.check_counterparty(&Address::derive(&[b"trader"])), Ok(()));
    }
}

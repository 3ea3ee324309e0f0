//! Fee accounting.
//!
//! Each pool keeps four Q64.64 accumulators, one per fee bucket (real X,
//! real Y, virtual X, virtual Y). An accumulator holds the cumulative fee
//! earned per unit of position liquidity since the pool was created. A
//! position's entitlement is `liquidity × (global − snapshot) >> 64`.

use serde::{Deserialize, Serialize};

use crate::{
    constants::Q64,
    error::{CiswapError, Result},
    types::Side,
};

/// Fee bucket: which asset a fee was collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    X,
    Y,
    DebtX,
    DebtY,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::X, Bucket::Y, Bucket::DebtX, Bucket::DebtY];

    pub fn real(side: Side) -> Self {
        match side {
            Side::X => Bucket::X,
            Side::Y => Bucket::Y,
        }
    }

    pub fn debt(side: Side) -> Self {
        match side {
            Side::X => Bucket::DebtX,
            Side::Y => Bucket::DebtY,
        }
    }
}

/// Q64.64 fee-per-liquidity values, one per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeGrowth {
    pub x: u128,
    pub y: u128,
    pub debt_x: u128,
    pub debt_y: u128,
}

impl FeeGrowth {
    pub fn get(&self, bucket: Bucket) -> u128 {
        match bucket {
            Bucket::X => self.x,
            Bucket::Y => self.y,
            Bucket::DebtX => self.debt_x,
            Bucket::DebtY => self.debt_y,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut u128 {
        match bucket {
            Bucket::X => &mut self.x,
            Bucket::Y => &mut self.y,
            Bucket::DebtX => &mut self.debt_x,
            Bucket::DebtY => &mut self.debt_y,
        }
    }
}

/// Token amounts, one per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeAmounts {
    pub x: u64,
    pub y: u64,
    pub debt_x: u64,
    pub debt_y: u64,
}

impl FeeAmounts {
    pub fn get(&self, bucket: Bucket) -> u64 {
        match bucket {
            Bucket::X => self.x,
            Bucket::Y => self.y,
            Bucket::DebtX => self.debt_x,
            Bucket::DebtY => self.debt_y,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut u64 {
        match bucket {
            Bucket::X => &mut self.x,
            Bucket::Y => &mut self.y,
            Bucket::DebtX => &mut self.debt_x,
            Bucket::DebtY => &mut self.debt_y,
        }
    }

    pub fn is_zero(&self) -> bool {
        Bucket::ALL.iter().all(|b| self.get(*b) == 0)
    }

    pub fn checked_add(&self, other: &FeeAmounts) -> Result<FeeAmounts> {
        let mut sum = *self;
        for bucket in Bucket::ALL {
            let slot = sum.get_mut(bucket);
            *slot = slot
                .checked_add(other.get(bucket))
                .ok_or(CiswapError::MathOverflow)?;
        }
        Ok(sum)
    }
}

/// Q64.64 growth for `fee` spread over `liquidity` units.
///
/// Divide-first to avoid u128 overflow: `q * Q64 + r * Q64 / liquidity`.
pub fn growth_delta(fee: u64, liquidity: u128) -> Result<u128> {
    if liquidity == 0 {
        return Err(CiswapError::InvariantViolation("fee credited to a pool without liquidity"));
    }
    let fee = fee as u128;
    let q = fee / liquidity;
    let r = fee % liquidity;
    q.checked_mul(Q64)
        .ok_or(CiswapError::MathOverflow)?
        .checked_add(
            r.checked_mul(Q64).ok_or(CiswapError::MathOverflow)? / liquidity,
        )
        .ok_or(CiswapError::MathOverflow)
}

/// Fees earned by `liquidity` between the `inside` snapshot and `global`.
pub fn accrued(liquidity: u128, global: &FeeGrowth, inside: &FeeGrowth) -> Result<FeeAmounts> {
    let mut owed = FeeAmounts::default();
    for bucket in Bucket::ALL {
        let delta = global
            .get(bucket)
            .checked_sub(inside.get(bucket))
            .ok_or(CiswapError::InvariantViolation("fee growth snapshot ahead of global"))?;
        let amount = liquidity
            .checked_mul(delta)
            .ok_or(CiswapError::MathOverflow)?
            >> 64;
        *owed.get_mut(bucket) = u64::try_from(amount).map_err(|_| CiswapError::MathOverflow)?;
    }
    Ok(owed)
}

// ─── FeeAccounting ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeAccounting {
    /// Cumulative fee per unit of position liquidity, Q64.64
    pub fee_growth_global: FeeGrowth,
    /// Fees moved to the fee store and not yet collected
    pub fee_store: FeeAmounts,
}

impl FeeAccounting {
    /// Record `fee` collected into `bucket`, shared by `liquidity` units.
    pub fn credit(&mut self, bucket: Bucket, fee: u64, liquidity: u128) -> Result<()> {
        if fee == 0 {
            return Ok(());
        }
        let delta = growth_delta(fee, liquidity)?;
        let growth = self.fee_growth_global.get_mut(bucket);
        *growth = growth.checked_add(delta).ok_or(CiswapError::MathOverflow)?;
        let stored = self.fee_store.get_mut(bucket);
        *stored = stored.checked_add(fee).ok_or(CiswapError::MathOverflow)?;
        Ok(())
    }

    /// Remove collected fees from the store.
    ///
    /// Growth is floored per credit and accrual is floored per position, so
    /// positions are owed slightly less than the store holds. That residue
    /// stays in the fee store; `residual` reports it.
    pub fn withdraw(&mut self, amounts: &FeeAmounts) -> Result<()> {
        self.fee_store = self.residual(amounts)?;
        Ok(())
    }

    /// Store balance left over once every position is paid `owed`.
    pub fn residual(&self, owed: &FeeAmounts) -> Result<FeeAmounts> {
        let mut left = self.fee_store;
        for bucket in Bucket::ALL {
            let slot = left.get_mut(bucket);
            *slot = slot
                .checked_sub(owed.get(bucket))
                .ok_or(CiswapError::InvariantViolation("fees owed exceed fee store"))?;
        }
        Ok(left)
    }
}

//! Asset movement.
//!
//! The engine never owns balances itself; it moves them through a [`Bank`]
//! supplied by the host. [`MemoryBank`] is a complete in-process
//! implementation. [`Journal`] wraps any bank for one operation and can undo
//! everything it applied if the operation fails.

use std::collections::HashMap;

use tracing::error;

use crate::{
    error::{CiswapError, Result},
    types::{Address, AssetId},
};

/// Fungible balances by opaque asset identifier.
pub trait Bank {
    fn balance(&self, owner: &Address, asset: &AssetId) -> u64;

    /// Total minted minus burned.
    fn supply(&self, asset: &AssetId) -> u64;

    fn transfer(&mut self, asset: &AssetId, from: &Address, to: &Address, amount: u64) -> Result<()>;

    fn mint(&mut self, asset: &AssetId, to: &Address, amount: u64) -> Result<()>;

    fn burn(&mut self, asset: &AssetId, from: &Address, amount: u64) -> Result<()>;
}

// ─── MemoryBank ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    balances: HashMap<(Address, AssetId), u64>,
    supply: HashMap<AssetId, u64>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    fn debit(&mut self, asset: &AssetId, owner: &Address, amount: u64) -> Result<()> {
        let available = self.balance(owner, asset);
        if available < amount {
            return Err(CiswapError::InsufficientBalance {
                asset: *asset,
                owner: *owner,
                required: amount,
                available,
            });
        }
        self.balances.insert((*owner, *asset), available - amount);
        Ok(())
    }

    fn credit(&mut self, asset: &AssetId, owner: &Address, amount: u64) -> Result<()> {
        let slot = self.balances.entry((*owner, *asset)).or_insert(0);
        *slot = slot.checked_add(amount).ok_or(CiswapError::MathOverflow)?;
        Ok(())
    }
}

impl Bank for MemoryBank {
    fn balance(&self, owner: &Address, asset: &AssetId) -> u64 {
        self.balances.get(&(*owner, *asset)).copied().unwrap_or(0)
    }

    fn supply(&self, asset: &AssetId) -> u64 {
        self.supply.get(asset).copied().unwrap_or(0)
    }

    fn transfer(&mut self, asset: &AssetId, from: &Address, to: &Address, amount: u64) -> Result<()> {
        let available = self.balance(from, asset);
        if available < amount {
            return Err(CiswapError::InsufficientBalance {
                asset: *asset,
                owner: *from,
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        // credit can only overflow; check before debiting
        if self.balance(to, asset).checked_add(amount).is_none() {
            return Err(CiswapError::MathOverflow);
        }
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn mint(&mut self, asset: &AssetId, to: &Address, amount: u64) -> Result<()> {
        let supply = self
            .supply(asset)
            .checked_add(amount)
            .ok_or(CiswapError::MathOverflow)?;
        self.credit(asset, to, amount)?;
        self.supply.insert(*asset, supply);
        Ok(())
    }

    fn burn(&mut self, asset: &AssetId, from: &Address, amount: u64) -> Result<()> {
        self.debit(asset, from, amount)?;
        let supply = self.supply(asset).saturating_sub(amount);
        self.supply.insert(*asset, supply);
        Ok(())
    }
}

// ─── Journal ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
enum Entry {
    Transfer { asset: AssetId, from: Address, to: Address, amount: u64 },
    Mint { asset: AssetId, to: Address, amount: u64 },
    Burn { asset: AssetId, from: Address, amount: u64 },
}

/// Records every operation applied to the wrapped bank so a failed
/// operation can be undone. Zero-amount moves are skipped.
pub struct Journal<'a, B: Bank> {
    bank: &'a mut B,
    applied: Vec<Entry>,
}

impl<'a, B: Bank> Journal<'a, B> {
    pub fn new(bank: &'a mut B) -> Self {
        Self { bank, applied: Vec::new() }
    }

    /// Keep everything applied so far.
    pub fn commit(self) {}

    /// Undo every applied operation, newest first.
    pub fn rollback(self) {
        let Journal { bank, applied } = self;
        for entry in applied.into_iter().rev() {
            let undone = match &entry {
                Entry::Transfer { asset, from, to, amount } => bank.transfer(asset, to, from, *amount),
                Entry::Mint { asset, to, amount } => bank.burn(asset, to, *amount),
                Entry::Burn { asset, from, amount } => bank.mint(asset, from, *amount),
            };
            if let Err(err) = undone {
                error!(?entry, %err, "failed to roll back bank operation");
            }
        }
    }
}

impl<B: Bank> Bank for Journal<'_, B> {
    fn balance(&self, owner: &Address, asset: &AssetId) -> u64 {
        self.bank.balance(owner, asset)
    }

    fn supply(&self, asset: &AssetId) -> u64 {
        self.bank.supply(asset)
    }

    fn transfer(&mut self, asset: &AssetId, from: &Address, to: &Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.bank.transfer(asset, from, to, amount)?;
        self.applied.push(Entry::Transfer { asset: *asset, from: *from, to: *to, amount });
        Ok(())
    }

    fn mint(&mut self, asset: &AssetId, to: &Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.bank.mint(asset, to, amount)?;
        self.applied.push(Entry::Mint { asset: *asset, to: *to, amount });
        Ok(())
    }

    fn burn(&mut self, asset: &AssetId, from: &Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.bank.burn(asset, from, amount)?;
        self.applied.push(Entry::Burn { asset: *asset, from: *from, amount });
        Ok(())
    }
}

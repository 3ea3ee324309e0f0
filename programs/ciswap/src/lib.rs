//! ciswap: constant-product AMM over real plus virtual (debt) reserves.
//!
//! Entry points:
//!   create_pair         register a pair seeded with virtual reserves
//!   add_liquidity       deposit at the pool ratio; credit a position
//!   swap                trade against the invariant; shortfall paid in virtual units
//!   redeem              convert virtual units back into real assets
//!   collect_fees        pay out fees owed to the caller's positions
//!   transfer_position   hand a position to another address
//!   set_config          admin-only configuration replacement
//!
//! Every entry point is all-or-nothing: on error the pool entry and every
//! bank operation it performed are rolled back and no event is recorded.

pub mod bank;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fees;
pub mod instructions;
pub mod math;
pub mod positions;
pub mod registry;
pub mod state;
pub mod types;

use tracing::{debug, info};

pub use bank::{Bank, Journal, MemoryBank};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ProtocolConfig;
pub use error::{CiswapError, Result};
pub use events::CiswapEvent;
pub use fees::FeeAmounts;
pub use math::SwapQuote;
pub use positions::{Position, PositionKey};
pub use state::{Pool, Reserves};
pub use types::{Address, AssetId, Direction, PoolId, Side};

use instructions::{add_liquidity, collect_fees, create_pair, redeem, swap, transfer_position, Context};
use registry::PoolRegistry;

pub struct Ciswap<B: Bank, C: Clock> {
    config: ProtocolConfig,
    registry: PoolRegistry,
    bank: B,
    clock: C,
    events: Vec<CiswapEvent>,
}

impl<B: Bank, C: Clock> Ciswap<B, C> {
    pub fn new(config: ProtocolConfig, bank: B, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: PoolRegistry::new(),
            bank,
            clock,
            events: Vec::new(),
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Direct bank access for the host (funding accounts, settling outside
    /// the engine). Engine state is not consulted.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Take every event recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<CiswapEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Administration ──────────────────────────────────────────────────────

    pub fn set_config(&mut self, caller: Address, config: ProtocolConfig) -> Result<()> {
        if caller != self.config.admin {
            debug!(%caller, "set_config rejected");
            return Err(CiswapError::Unauthorized(caller));
        }
        if let Err(err) = config.validate() {
            debug!(%caller, %err, "set_config rejected");
            return Err(err);
        }

        info!(
            admin = %caller,
            fee_bps = config.fee_bps,
            lp_share_pct = config.lp_share_pct,
            creation_fee = config.creation_fee,
            "config updated"
        );
        self.events.push(CiswapEvent::ConfigUpdated {
            admin: caller,
            fee_bps: config.fee_bps,
            lp_share_pct: config.lp_share_pct,
            creation_fee: config.creation_fee,
        });
        self.config = config;
        Ok(())
    }

    // ─── Entry points ────────────────────────────────────────────────────────

    /// Register `asset_x / asset_y` and return its pool id.
    pub fn create_pair(
        &mut self,
        creator: Address,
        asset_x: AssetId,
        asset_y: AssetId,
        initial_debt_x: u64,
        initial_debt_y: u64,
    ) -> Result<PoolId> {
        let now = self.clock.unix_timestamp();
        let pool_id = self.registry.next_pool_id();
        if let Err(err) = self.registry.check_new_pair(&asset_x, &asset_y) {
            debug!(pool_id, %err, "create_pair rejected");
            return Err(err);
        }

        let mut journal = Journal::new(&mut self.bank);
        let result = create_pair::handler(
            &mut journal,
            &self.config,
            now,
            pool_id,
            creator,
            asset_x,
            asset_y,
            initial_debt_x,
            initial_debt_y,
        )
        .and_then(|(pool, event)| Ok((self.registry.insert(pool)?, event)));

        match result {
            Ok((pool_id, event)) => {
                journal.commit();
                self.events.push(event);
                Ok(pool_id)
            }
            Err(err) => {
                journal.rollback();
                debug!(pool_id, %err, "create_pair rejected");
                Err(err)
            }
        }
    }

    /// Deposit up to `amount_x` / `amount_y` at the pool ratio.
    /// Returns the amounts actually pulled from `provider`.
    pub fn add_liquidity(
        &mut self,
        provider: Address,
        pool_id: PoolId,
        amount_x: u64,
        amount_y: u64,
    ) -> Result<(u64, u64)> {
        self.with_pool(pool_id, "add_liquidity", &[provider], |ctx| {
            add_liquidity::handler(ctx, provider, amount_x, amount_y)
        })
    }

    /// Returns `(out, debt_out)`: real and virtual units paid to `recipient`.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        sender: Address,
        pool_id: PoolId,
        amount_in: u64,
        direction: Direction,
        recipient: Address,
        min_out: u64,
        min_debt_out: u64,
    ) -> Result<(u64, u64)> {
        self.with_pool(pool_id, "swap", &[], |ctx| {
            swap::handler(ctx, sender, amount_in, direction, recipient, min_out, min_debt_out)
        })
    }

    /// Returns the real amounts released to `recipient`.
    pub fn redeem(
        &mut self,
        sender: Address,
        pool_id: PoolId,
        amount_debt_x: u64,
        amount_debt_y: u64,
        recipient: Address,
    ) -> Result<(u64, u64)> {
        self.with_pool(pool_id, "redeem", &[], |ctx| {
            redeem::handler(ctx, sender, amount_debt_x, amount_debt_y, recipient)
        })
    }

    pub fn collect_fees(&mut self, sender: Address, pool_id: PoolId, recipient: Address) -> Result<FeeAmounts> {
        self.with_pool(pool_id, "collect_fees", &[sender], |ctx| {
            collect_fees::handler(ctx, sender, recipient)
        })
    }

    pub fn transfer_position(
        &mut self,
        owner: Address,
        pool_id: PoolId,
        seq: u64,
        new_owner: Address,
    ) -> Result<PositionKey> {
        self.with_pool(pool_id, "transfer_position", &[owner, new_owner], |ctx| {
            transfer_position::handler(ctx, owner, seq, new_owner)
        })
    }

    /// Run `op` against one pool with all-or-nothing semantics.
    ///
    /// `owners` lists every address whose positions `op` may change; only
    /// those positions are saved for rollback.
    fn with_pool<T>(
        &mut self,
        pool_id: PoolId,
        name: &'static str,
        owners: &[Address],
        op: impl FnOnce(Context<'_, Journal<'_, B>>) -> Result<(T, CiswapEvent)>,
    ) -> Result<T> {
        let now = self.clock.unix_timestamp();
        let pool = self.registry.get_mut(pool_id)?;
        let checkpoint = pool.checkpoint(owners);
        let mut journal = Journal::new(&mut self.bank);

        let result = op(Context {
            pool: &mut *pool,
            bank: &mut journal,
            config: &self.config,
            now,
        });

        match result {
            Ok((value, event)) => {
                journal.commit();
                self.events.push(event);
                Ok(value)
            }
            Err(err) => {
                journal.rollback();
                pool.restore(checkpoint);
                debug!(pool_id, %err, "{name} rejected");
                Err(err)
            }
        }
    }

    // ─── Views ───────────────────────────────────────────────────────────────

    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool> {
        self.registry.get(pool_id)
    }

    pub fn find_pair(&self, asset_a: &AssetId, asset_b: &AssetId) -> Option<PoolId> {
        self.registry.find_pair(asset_a, asset_b)
    }

    /// Full quote for a swap of `amount_in`, without executing it.
    pub fn simulate_swap(&self, pool_id: PoolId, amount_in: u64, direction: Direction) -> Result<SwapQuote> {
        swap::quote(self.registry.get(pool_id)?, &self.config, amount_in, direction)
    }

    /// `(out, debt_out)` a swap of `amount_in` would pay, after fees.
    pub fn get_amount_out(&self, pool_id: PoolId, amount_in: u64, direction: Direction) -> Result<(u64, u64)> {
        let q = self.simulate_swap(pool_id, amount_in, direction)?;
        Ok((q.out, q.debt_out))
    }

    /// Input needed for a raw (pre-fee) output of `amount_out`.
    pub fn get_amount_in(&self, pool_id: PoolId, amount_out: u64, direction: Direction) -> Result<u64> {
        math::amount_in(amount_out, direction, &self.registry.get(pool_id)?.reserves())
    }

    /// Balances actually held in pool custody, read from the bank.
    pub fn token_balances(&self, pool_id: PoolId) -> Result<Reserves> {
        let pool = self.registry.get(pool_id)?;
        Ok(Reserves {
            reserve_x: self.bank.balance(&pool.authority, &pool.asset_x),
            reserve_y: self.bank.balance(&pool.authority, &pool.asset_y),
            reserve_debt_x: self.bank.balance(&pool.authority, &pool.virtual_x),
            reserve_debt_y: self.bank.balance(&pool.authority, &pool.virtual_y),
        })
    }

    /// Reserves as recorded by the pool's ledger.
    pub fn token_reserves(&self, pool_id: PoolId) -> Result<Reserves> {
        Ok(self.registry.get(pool_id)?.reserves())
    }

    pub fn k_sqrt_last(&self, pool_id: PoolId) -> Result<u128> {
        Ok(self.registry.get(pool_id)?.ledger.k_sqrt_last)
    }

    pub fn position_info(&self, pool_id: PoolId, seq: u64) -> Result<&Position> {
        self.registry.get(pool_id)?.positions.get(seq)
    }

    pub fn positions_of(&self, pool_id: PoolId, owner: &Address) -> Result<Vec<PositionKey>> {
        Ok(self
            .registry
            .get(pool_id)?
            .positions
            .owned_by(owner)
            .map(|p| p.key)
            .collect())
    }

    /// Fees `owner` would receive from position `seq` if collected now.
    pub fn pending_fees(&self, owner: &Address, pool_id: PoolId, seq: u64) -> Result<FeeAmounts> {
        let pool = self.registry.get(pool_id)?;
        let info = pool.positions.get_position_info(seq, owner)?;
        let earned = fees::accrued(
            info.liquidity_added,
            &pool.fees.fee_growth_global,
            &info.fee_growth_inside,
        )?;
        info.fee_owed.checked_add(&earned)
    }

    /// Fee-store balance no position can claim: the floor-rounding residue
    /// left after every position's pending fees.
    pub fn fee_residual(&self, pool_id: PoolId) -> Result<FeeAmounts> {
        let pool = self.registry.get(pool_id)?;
        let mut owed = FeeAmounts::default();
        for position in pool.positions.iter() {
            let earned = fees::accrued(
                position.liquidity_added,
                &pool.fees.fee_growth_global,
                &position.fee_growth_inside,
            )?;
            owed = owed.checked_add(&position.fee_owed)?.checked_add(&earned)?;
        }
        pool.fees.residual(&owed)
    }
}

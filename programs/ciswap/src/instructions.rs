pub mod create_pair;
pub mod add_liquidity;
pub mod swap;
pub mod redeem;
pub mod collect_fees;
pub mod transfer_position;

use crate::{bank::Bank, config::ProtocolConfig, state::Pool};

/// Everything a pool-scoped handler may touch: the pool entry, the bank,
/// the running configuration and the operation timestamp.
///
/// The caller owns atomicity. Handlers mutate freely and return `Err` on the
/// first failure; the caller discards both the pool changes and the bank
/// operations when that happens.
pub struct Context<'a, B: Bank> {
    pub pool: &'a mut Pool,
    pub bank: &'a mut B,
    pub config: &'a ProtocolConfig,
    pub now: u64,
}

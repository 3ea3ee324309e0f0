//! Property-based tests for the pool math and the engine's invariants.

use ciswap::math::{self, fee_split, protocol_lp_split, quote, quote_swap};
use ciswap::{
    Address, AssetId, Bank, Ciswap, Direction, ManualClock, MemoryBank, PoolId, ProtocolConfig,
    Reserves,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::XToY), Just(Direction::YToX)]
}

/// Reserves with both combined sides non-zero.
fn reserves() -> impl Strategy<Value = Reserves> {
    (0u64..1_000_000_000_000, 0u64..1_000_000_000_000, 1u64..1_000_000_000_000, 1u64..1_000_000_000_000)
        .prop_map(|(reserve_x, reserve_y, reserve_debt_x, reserve_debt_y)| Reserves {
            reserve_x,
            reserve_y,
            reserve_debt_x,
            reserve_debt_y,
        })
}

fn swaps() -> impl Strategy<Value = Vec<(u64, Direction)>> {
    prop::collection::vec((1u64..1_000_000_000, direction()), 1..24)
}

// ============================================================================
// Engine fixture
// ============================================================================

fn user(name: &str) -> Address {
    Address::derive(&[b"user", name.as_bytes()])
}

fn asset(name: &str) -> AssetId {
    AssetId::derive(&[b"asset", name.as_bytes()])
}

fn engine_with_pool(debt_x: u64, debt_y: u64, deposit: u64) -> (Ciswap<MemoryBank, ManualClock>, PoolId) {
    let mut engine =
        Ciswap::new(ProtocolConfig::default(), MemoryBank::new(), ManualClock::new(0)).unwrap();
    let pool_id = engine
        .create_pair(user("creator"), asset("X"), asset("Y"), debt_x, debt_y)
        .unwrap();
    for name in ["lp", "trader"] {
        engine.bank_mut().mint(&asset("X"), &user(name), 1 << 50).unwrap();
        engine.bank_mut().mint(&asset("Y"), &user(name), 1 << 50).unwrap();
    }
    // a deposit too small to register is fine; the pool just has no positions
    let _ = engine.add_liquidity(user("lp"), pool_id, deposit, deposit);
    (engine, pool_id)
}

// ============================================================================
// Pool math
// ============================================================================

proptest! {
    #[test]
    fn prop_isqrt_is_floor_sqrt(n in any::<u128>()) {
        let r = math::isqrt(n);
        prop_assert!(r * r <= n);
        if let Some(next) = (r + 1).checked_mul(r + 1) {
            prop_assert!(next > n);
        }
    }

    #[test]
    fn prop_fee_splits_conserve_amounts(
        gross in any::<u64>(),
        fee_bps in 1u64..=1_000,
        lp_share_pct in 0u64..=100,
    ) {
        let split = fee_split(gross, fee_bps).unwrap();
        prop_assert_eq!(split.net + split.fee, gross);
        let lp = protocol_lp_split(split.fee, lp_share_pct).unwrap();
        prop_assert_eq!(lp.lp + lp.protocol, split.fee);
    }

    #[test]
    fn prop_quote_round_trip_within_rounding(
        x in 1u64..1_000_000_000_000,
        reserve_x in 1u64..1_000_000_000_000,
        reserve_y in 1u64..1_000_000_000_000,
    ) {
        let (rx, ry) = (reserve_x as u128, reserve_y as u128);
        // y must be non-zero and fit in u64
        prop_assume!(x as u128 * ry >= rx);
        prop_assume!(x as u128 * ry / rx <= u64::MAX as u128);
        let y = quote(x, rx, ry).unwrap();
        let back = quote(y, ry, rx).unwrap();
        prop_assert!(back <= x);
        prop_assert!(((x - back) as u128) <= rx / ry + 1);
    }

    #[test]
    fn prop_swap_quote_splits_real_then_virtual(
        r in reserves(),
        amount_in in 1u64..1_000_000_000_000,
        dir in direction(),
        fee_bps in 1u64..=1_000,
        lp_share_pct in 0u64..=100,
    ) {
        let Ok(q) = quote_swap(amount_in, dir, &r, fee_bps, lp_share_pct) else {
            return Ok(());
        };
        let real = r.real(dir.output_side());
        prop_assert!(q.out + q.real_fee.lp + q.real_fee.protocol <= real);
        prop_assert_eq!(q.real_gross + q.virtual_gross, q.amount_out_raw);
        prop_assert_eq!(q.out + q.debt_out, q.amount_out_raw - q.total_fee());
        if q.amount_out_raw <= real {
            prop_assert_eq!(q.virtual_gross, 0);
        } else {
            prop_assert_eq!(q.real_gross, real);
        }
    }

    #[test]
    fn prop_amount_out_keeps_k(
        r in reserves(),
        amount_in in 1u64..1_000_000_000_000,
        dir in direction(),
    ) {
        let Ok(out) = math::amount_out_raw(amount_in, dir, &r) else {
            return Ok(());
        };
        let mut next = r;
        *next.real_mut(dir.input_side()) += amount_in;
        // remove the whole raw output from the output side's combined reserve
        let side = dir.output_side();
        let (real_part, virtual_part) = math::split_real_virtual(out, r.real(side));
        *next.real_mut(side) -= real_part;
        *next.debt_mut(side) -= virtual_part;
        prop_assert!(math::k(&next).unwrap() >= math::k(&r).unwrap());
    }
}

// ============================================================================
// Engine invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_k_sqrt_never_decreases(
        debt_x in 1_000_000u64..1_000_000_000_000,
        debt_y in 1_000_000u64..1_000_000_000_000,
        deposit in 0u64..1_000_000_000_000,
        ops in swaps(),
    ) {
        let (mut engine, pool_id) = engine_with_pool(debt_x, debt_y, deposit);
        let mut last = engine.k_sqrt_last(pool_id).unwrap();
        for (amount_in, dir) in ops {
            let _ = engine.swap(user("trader"), pool_id, amount_in, dir, user("trader"), 0, 0);
            let k_sqrt = engine.k_sqrt_last(pool_id).unwrap();
            prop_assert!(k_sqrt >= last);
            last = k_sqrt;

            prop_assert_eq!(
                engine.token_balances(pool_id).unwrap(),
                engine.token_reserves(pool_id).unwrap()
            );
            let pool = engine.pool(pool_id).unwrap();
            prop_assert_eq!(
                engine.bank().balance(&pool.fee_store, &asset("Y")),
                pool.fees.fee_store.y
            );
        }
    }

    #[test]
    fn prop_owed_fees_never_exceed_fee_store(
        deposit in 1_000_000u64..1_000_000_000_000,
        second in 1_000_000u64..1_000_000_000_000,
        ops in swaps(),
    ) {
        let (mut engine, pool_id) = engine_with_pool(500_000_000, 700_000_000, deposit);
        engine.bank_mut().mint(&asset("X"), &user("late"), second).unwrap();
        engine.bank_mut().mint(&asset("Y"), &user("late"), 1 << 50).unwrap();

        for (i, (amount_in, dir)) in ops.into_iter().enumerate() {
            if i == 2 {
                let _ = engine.add_liquidity(user("late"), pool_id, second, 1 << 50);
            }
            let _ = engine.swap(user("trader"), pool_id, amount_in, dir, user("trader"), 0, 0);
        }

        let pool = engine.pool(pool_id).unwrap();
        let mut owed = ciswap::FeeAmounts::default();
        for position in pool.positions.iter() {
            let pending = engine
                .pending_fees(&position.owner, pool_id, position.key.seq)
                .unwrap();
            owed = owed.checked_add(&pending).unwrap();
        }
        let store = pool.fees.fee_store;
        prop_assert!(owed.x <= store.x);
        prop_assert!(owed.y <= store.y);
        prop_assert!(owed.debt_x <= store.debt_x);
        prop_assert!(owed.debt_y <= store.debt_y);
    }

    #[test]
    fn prop_rejected_swap_mutates_nothing(
        debt_x in 1_000_000u64..1_000_000_000_000,
        debt_y in 1_000_000u64..1_000_000_000_000,
        deposit in 0u64..1_000_000_000_000,
        amount_in in 1u64..1_000_000_000,
        dir in direction(),
    ) {
        let (mut engine, pool_id) = engine_with_pool(debt_x, debt_y, deposit);
        let Ok((out, _)) = engine.get_amount_out(pool_id, amount_in, dir) else {
            return Ok(());
        };
        engine.drain_events();
        let before = engine.pool(pool_id).unwrap().clone();
        let trader_x = engine.bank().balance(&user("trader"), &asset("X"));
        let trader_y = engine.bank().balance(&user("trader"), &asset("Y"));

        let result = engine.swap(user("trader"), pool_id, amount_in, dir, user("trader"), out + 1, 0);
        prop_assert!(result.is_err());
        prop_assert_eq!(engine.pool(pool_id).unwrap(), &before);
        prop_assert_eq!(engine.bank().balance(&user("trader"), &asset("X")), trader_x);
        prop_assert_eq!(engine.bank().balance(&user("trader"), &asset("Y")), trader_y);
        prop_assert!(engine.drain_events().is_empty());
    }
}

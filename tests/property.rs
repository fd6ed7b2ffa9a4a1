use matchbook::book::{OrderBook, Side, NULL_ORDER_ID};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum ScriptedOp {
    Submit { px: u32, qty: u32, side: Side, ts: u64 },
    Cancel { id: u64 },
    Modify { id: u64, qty: u32 },
}

fn apply(book: &mut OrderBook, op: ScriptedOp) {
    match op {
        ScriptedOp::Submit { px, qty, side, ts } => {
            book.submit(px, qty, side, ts);
        }
        ScriptedOp::Cancel { id } => {
            book.cancel(id);
        }
        ScriptedOp::Modify { id, qty } => {
            book.modify(id, qty);
        }
    }
}

fn any_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn any_op() -> impl Strategy<Value = ScriptedOp> {
    prop_oneof![
        (1u32..200u32, 0u32..5_000u32, any_side(), 0u64..1_000_000u64)
            .prop_map(|(px, qty, side, ts)| ScriptedOp::Submit { px, qty, side, ts }),
        (1u64..2_000u64).prop_map(|id| ScriptedOp::Cancel { id }),
        (1u64..2_000u64, 0u32..5_000u32).prop_map(|(id, qty)| ScriptedOp::Modify { id, qty }),
    ]
}

proptest! {
    #[test]
    fn book_invariants_hold(ops in prop::collection::vec(any_op(), 1..2_000)) {
        let mut book = OrderBook::new();
        book.reserve_orders(10_000);

        for op in ops {
            apply(&mut book, op);
        }
        book.assert_invariants();
    }

    #[test]
    fn invariants_hold_after_every_op(ops in prop::collection::vec(any_op(), 1..200)) {
        let mut book = OrderBook::new();

        for op in ops {
            apply(&mut book, op);
            book.assert_invariants();
        }
    }

    #[test]
    fn identical_scripts_replay_identically(ops in prop::collection::vec(any_op(), 1..500)) {
        let mut a = OrderBook::new();
        let mut b = OrderBook::new();

        for op in ops {
            apply(&mut a, op);
            apply(&mut b, op);
        }

        prop_assert_eq!(a.trades(), b.trades());
        prop_assert_eq!(a.best_bid(), b.best_bid());
        prop_assert_eq!(a.best_ask(), b.best_ask());
        prop_assert_eq!(a.open_orders(), b.open_orders());
    }

    // Conservation over submit/cancel flows: everything submitted is either
    // traded (counted once per side), still resting, or left with a cancel.
    #[test]
    fn quantity_is_conserved(ops in prop::collection::vec(any_flow_op(), 1..1_000)) {
        let mut book = OrderBook::new();
        let mut submitted: u64 = 0;
        let mut cancelled: u64 = 0;

        for op in ops {
            match op {
                ScriptedOp::Submit { px, qty, side, ts } => {
                    if book.submit(px, qty, side, ts) != NULL_ORDER_ID {
                        submitted += u64::from(qty);
                    }
                }
                ScriptedOp::Cancel { id } => {
                    if let Some(o) = book.order(id) {
                        cancelled += u64::from(o.remaining());
                    }
                    book.cancel(id);
                }
                ScriptedOp::Modify { .. } => unreachable!("flow ops exclude modify"),
            }
        }

        let resting: u64 = book
            .levels(Side::Buy, 0)
            .iter()
            .chain(book.levels(Side::Sell, 0).iter())
            .map(|l| l.qty)
            .sum();
        let traded: u64 = 2 * book.trades().iter().map(|t| u64::from(t.quantity)).sum::<u64>();

        prop_assert_eq!(submitted, traded + resting + cancelled);
    }
}

fn any_flow_op() -> impl Strategy<Value = ScriptedOp> {
    prop_oneof![
        (1u32..200u32, 0u32..5_000u32, any_side(), 0u64..1_000_000u64)
            .prop_map(|(px, qty, side, ts)| ScriptedOp::Submit { px, qty, side, ts }),
        (1u64..2_000u64).prop_map(|id| ScriptedOp::Cancel { id }),
    ]
}

//! Property tests: random interleavings of snapshots, quote streams and own
//! order batches checked against a plain map model of venue and own depth.

use depth_aggregator::{
    AggregatedBook, LocalOrderUpdate, Operation, PriceLevel, Price, QuoteStream, Side, Size,
    Snapshot,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

type Key = (Side, i64);

#[derive(Debug, Clone)]
enum Step {
    Snapshot(Vec<(Side, i64, i64)>),
    Quotes { replay: bool, levels: Vec<(Side, i64, i64)> },
    Local(Vec<(Side, i64, i64, bool)>),
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        prop::collection::vec((arb_side(), 95i64..105, 1i64..5), 0..8).prop_map(Step::Snapshot),
        (any::<bool>(), prop::collection::vec((arb_side(), 95i64..105, 0i64..5), 0..8))
            .prop_map(|(replay, levels)| Step::Quotes { replay, levels }),
        prop::collection::vec((arb_side(), 95i64..105, 1i64..4, any::<bool>()), 1..5)
            .prop_map(Step::Local),
    ]
}

fn price(n: i64) -> Price {
    Price::new(Decimal::from(n))
}

fn size(n: i64) -> Size {
    Size::new(Decimal::from(n))
}

fn to_levels(levels: &[(Side, i64, i64)], side: Side) -> Vec<PriceLevel> {
    levels
        .iter()
        .filter(|(s, _, _)| *s == side)
        .map(|(_, p, q)| PriceLevel::new(price(*p), size(*q)))
        .collect()
}

#[derive(Default)]
struct Model {
    external: Option<HashMap<Key, i64>>,
    local: HashMap<Key, i64>,
    feed_clock: u64,
    local_clock: u64,
}

type Observed = (Snapshot, Vec<(Price, Size)>, Vec<(Price, Size)>);

fn observe(book: &AggregatedBook) -> Observed {
    (
        book.current_aggregated_snapshot(),
        book.local().levels(Side::Bid).collect(),
        book.local().levels(Side::Ask).collect(),
    )
}

fn check_side_invariants(book: &AggregatedBook) -> Result<(), TestCaseError> {
    for side_book in [book.local(), book.aggregated()] {
        for side in Side::BOTH {
            let levels: Vec<(Price, Size)> = side_book.levels(side).collect();
            for (_, s) in &levels {
                prop_assert!(s.is_positive(), "stored level with size {}", s);
            }
            for pair in levels.windows(2) {
                match side {
                    Side::Bid => prop_assert!(pair[0].0 > pair[1].0),
                    Side::Ask => prop_assert!(pair[0].0 < pair[1].0),
                }
            }
        }
    }
    Ok(())
}

fn check_merge_invariant(book: &AggregatedBook, model: &Model) -> Result<(), TestCaseError> {
    let Some(external) = &model.external else {
        prop_assert!(book.aggregated().is_empty());
        return Ok(());
    };
    let keys: HashSet<Key> = external.keys().chain(model.local.keys()).copied().collect();
    for (side, p) in &keys {
        let expected = external.get(&(*side, *p)).copied().unwrap_or(0)
            + model.local.get(&(*side, *p)).copied().unwrap_or(0);
        let actual = book.aggregated().quantity(*side, &price(*p));
        if expected == 0 {
            prop_assert_eq!(actual, None);
        } else {
            prop_assert_eq!(actual, Some(size(expected)));
        }
    }
    for side in Side::BOTH {
        for (p, _) in book.aggregated().levels(side) {
            let n = p.value().mantissa() as i64;
            prop_assert!(keys.contains(&(side, n)), "untracked level {} {}", side, p);
        }
    }
    Ok(())
}

fn apply_step(book: &mut AggregatedBook, model: &mut Model, step: &Step) -> Result<(), TestCaseError> {
    match step {
        Step::Snapshot(levels) => {
            model.feed_clock += 1;
            book.ingest_snapshot(&Snapshot::new(
                "binance",
                "BTC_USDT",
                model.feed_clock,
                to_levels(levels, Side::Bid),
                to_levels(levels, Side::Ask),
            ));
            let mut external = HashMap::new();
            for (side, p, q) in levels {
                external.insert((*side, *p), *q);
            }
            model.external = Some(external);
        }
        Step::Quotes { replay, levels } => {
            let replay = *replay && model.feed_clock > 0;
            if !replay {
                model.feed_clock += 1;
            }
            let before = observe(book);
            let emitted = book
                .ingest_quote_stream(&QuoteStream::new(
                    "binance",
                    "BTC_USDT",
                    model.feed_clock,
                    to_levels(levels, Side::Bid),
                    to_levels(levels, Side::Ask),
                ))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            match (&mut model.external, replay) {
                (Some(external), false) => {
                    let emitted = emitted.ok_or_else(|| TestCaseError::fail("fresh stream emitted nothing"))?;
                    prop_assert_eq!(emitted.bids.len() + emitted.asks.len(), levels.len());
                    for (side, p, q) in levels {
                        if *q == 0 {
                            external.remove(&(*side, *p));
                        } else {
                            external.insert((*side, *p), *q);
                        }
                    }
                }
                _ => {
                    prop_assert!(emitted.is_none());
                    prop_assert_eq!(observe(book), before);
                }
            }
        }
        Step::Local(items) => {
            let mut updates = Vec::new();
            let mut staged = model.local.clone();
            let mut valid = true;
            for (side, p, q, is_delete) in items {
                model.local_clock += 1;
                let operation = if *is_delete { Operation::Delete } else { Operation::Add };
                updates.push(LocalOrderUpdate::new(
                    model.local_clock,
                    *side,
                    price(*p),
                    size(*q),
                    operation,
                ));
                let held = staged.get(&(*side, *p)).copied().unwrap_or(0);
                let updated = if *is_delete { held - q } else { held + q };
                if *is_delete && (held == 0 || updated < 0) {
                    valid = false;
                }
                if updated <= 0 {
                    staged.remove(&(*side, *p));
                } else {
                    staged.insert((*side, *p), updated);
                }
            }

            let before = observe(book);
            let result = book.ingest_local_order_updates(&updates);
            if valid {
                prop_assert!(result.is_ok());
                model.local = staged;
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(observe(book), before);
                // Rejected timestamps are reused by the next batch
                model.local_clock -= items.len() as u64;
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_book_matches_model(steps in prop::collection::vec(arb_step(), 1..40)) {
        let mut book = AggregatedBook::create("BTC_USDT", &[]).unwrap();
        let mut model = Model::default();

        for step in &steps {
            apply_step(&mut book, &mut model, step)?;
            check_side_invariants(&book)?;
            check_merge_invariant(&book, &model)?;
        }
    }

    #[test]
    fn prop_snapshot_iterates_best_first(levels in prop::collection::vec((arb_side(), 1i64..10_000, 1i64..100), 0..64)) {
        let mut book = AggregatedBook::create("BTC_USDT", &[]).unwrap();
        book.ingest_snapshot(&Snapshot::new(
            "binance",
            "BTC_USDT",
            1,
            to_levels(&levels, Side::Bid),
            to_levels(&levels, Side::Ask),
        ));
        let view = book.current_aggregated_snapshot();
        prop_assert!(view.bids.windows(2).all(|w| w[0].price > w[1].price));
        prop_assert!(view.asks.windows(2).all(|w| w[0].price < w[1].price));
        if let Some(best) = view.bids.first() {
            prop_assert_eq!(Some((best.price, best.size)), book.best_bid());
        }
    }
}

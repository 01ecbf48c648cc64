use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depth_aggregator::orderbook::{AggregatedBook, LocalOrderUpdate, PriceLevel, QuoteStream, Side, Snapshot};
use depth_aggregator::types::{Price, Size};

fn create_price(value: &str) -> Price {
    Price::from_str(value).unwrap()
}

fn create_size(value: &str) -> Size {
    Size::from_str(value).unwrap()
}

fn price_at(ticks: usize) -> Price {
    create_price(&format!("{}.{:02}", ticks / 100, ticks % 100))
}

fn create_large_snapshot(levels: usize) -> Snapshot {
    let mut bids = Vec::with_capacity(levels);
    let mut asks = Vec::with_capacity(levels);

    for i in 0..levels {
        // Bids 100.00, 99.99, ... and asks 100.01, 100.02, ...
        bids.push(PriceLevel::new(price_at(10000 - i), create_size(&format!("{}", i + 1))));
        asks.push(PriceLevel::new(price_at(10001 + i), create_size(&format!("{}", i + 1))));
    }

    Snapshot::new("binance", "BTC_USDT", 1, bids, asks)
}

fn create_quote_streams(count: usize) -> Vec<QuoteStream> {
    (0..count)
        .map(|i| {
            // Touch the top 20 levels, zeroing every tenth
            let qty = if i % 10 == 0 { 0 } else { (i + 1) % 10 + 1 };
            QuoteStream::new(
                "binance",
                "BTC_USDT",
                2 + i as u64,
                vec![PriceLevel::new(price_at(10000 - (i % 20)), create_size(&qty.to_string()))],
                vec![PriceLevel::new(price_at(10001 + (i % 20)), create_size(&qty.to_string()))],
            )
        })
        .collect()
}

fn create_local_orders(count: usize) -> Vec<LocalOrderUpdate> {
    (0..count)
        .map(|i| {
            let side = if i % 2 == 0 { Side::Bid } else { Side::Ask };
            let ticks = if side == Side::Bid { 10000 - (i % 10) } else { 10001 + (i % 10) };
            LocalOrderUpdate::add(1 + i as u64, side, price_at(ticks), create_size("0.5"))
        })
        .collect()
}

fn seeded_book(levels: usize) -> AggregatedBook {
    let mut book = AggregatedBook::create("BTC_USDT", &create_local_orders(20)).unwrap();
    book.ingest_snapshot(&create_large_snapshot(levels));
    book
}

fn bench_ingest_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregated_ingest_snapshot");

    for levels in [10, 100, 1000].iter() {
        let snapshot = create_large_snapshot(*levels);

        group.bench_with_input(format!("levels_{}", levels), levels, |b, _| {
            b.iter_with_setup(
                || AggregatedBook::create("BTC_USDT", &create_local_orders(20)).unwrap(),
                |mut book| {
                    book.ingest_snapshot(black_box(&snapshot));
                    black_box(book)
                },
            )
        });
    }

    group.finish();
}

fn bench_ingest_quote_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregated_ingest_quote_stream");

    for updates in [10, 100, 1000].iter() {
        let streams = create_quote_streams(*updates);

        group.bench_with_input(format!("updates_{}", updates), updates, |b, _| {
            b.iter_with_setup(
                || seeded_book(1000),
                |mut book| {
                    for stream in &streams {
                        let _ = black_box(book.ingest_quote_stream(black_box(stream)));
                    }
                    black_box(book)
                },
            )
        });
    }

    group.finish();
}

fn bench_ingest_local_orders(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregated_ingest_local_orders");

    for orders in [10, 100].iter() {
        let batch: Vec<LocalOrderUpdate> = create_local_orders(*orders)
            .into_iter()
            .map(|mut order| {
                order.timestamp += 1_000;
                order
            })
            .collect();

        group.bench_with_input(format!("orders_{}", orders), orders, |b, _| {
            b.iter_with_setup(
                || seeded_book(1000),
                |mut book| {
                    let _ = black_box(book.ingest_local_order_updates(black_box(&batch)));
                    black_box(book)
                },
            )
        });
    }

    group.finish();
}

fn bench_read_views(c: &mut Criterion) {
    let book = seeded_book(1000);

    c.bench_function("aggregated_best_prices", |b| {
        b.iter(|| black_box((book.best_bid(), book.best_ask(), book.spread())))
    });

    let mut group = c.benchmark_group("aggregated_top_levels");
    for n in [1, 5, 10, 20].iter() {
        group.bench_with_input(format!("top_{}", n), n, |b, &n| {
            b.iter(|| {
                let bids = book.aggregated().bids().top(black_box(n));
                let asks = book.aggregated().asks().top(black_box(n));
                black_box((bids, asks))
            })
        });
    }
    group.finish();

    c.bench_function("aggregated_full_snapshot", |b| {
        b.iter(|| black_box(book.current_aggregated_snapshot()))
    });
}

criterion_group!(
    benches,
    bench_ingest_snapshot,
    bench_ingest_quote_stream,
    bench_ingest_local_orders,
    bench_read_views
);
criterion_main!(benches);

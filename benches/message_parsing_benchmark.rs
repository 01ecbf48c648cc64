use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depth_aggregator::feed::DepthMessage;

const UPDATE: &str = r#"{
    "action": "update",
    "data": [{
        "bids": [
            ["0.0024", "10", "0", "1"],
            ["0.0023", "100", "0", "3"],
            ["0.0022", "50", "0", "2"],
            ["0.0021", "200", "0", "5"],
            ["0.0020", "150", "0", "1"],
            ["0.0019", "75", "0", "1"],
            ["0.0018", "300", "0", "7"],
            ["0.0017", "125", "0", "2"],
            ["0.0016", "80", "0", "1"],
            ["0.0015", "90", "0", "1"]
        ],
        "asks": [
            ["0.0026", "100", "0", "2"],
            ["0.0027", "10", "0", "1"],
            ["0.0028", "50", "0", "1"],
            ["0.0029", "200", "0", "4"],
            ["0.0030", "150", "0", "3"],
            ["0.0031", "75", "0", "1"],
            ["0.0032", "300", "0", "6"],
            ["0.0033", "125", "0", "2"],
            ["0.0034", "80", "0", "1"],
            ["0.0035", "90", "0", "1"]
        ]
    }]
}"#;

fn bench_depth_message_parsing(c: &mut Criterion) {
    c.bench_function("depth_message_parsing", |b| {
        b.iter(|| {
            let message = DepthMessage::from_json(black_box(UPDATE)).unwrap();
            black_box(message)
        })
    });
}

fn bench_message_to_quote_stream(c: &mut Criterion) {
    let message = DepthMessage::from_json(UPDATE).unwrap();

    c.bench_function("depth_message_to_quote_stream", |b| {
        b.iter(|| {
            let stream = message.to_quote_stream("binance", "BNB_BTC", 1).unwrap();
            black_box(stream)
        })
    });
}

criterion_group!(
    benches,
    bench_depth_message_parsing,
    bench_message_to_quote_stream
);
criterion_main!(benches);

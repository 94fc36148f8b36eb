//! Criterion benchmarks for the relay channel hot path.
//!
//! Every relay message costs one frame parse and one AES-GCM decryption, and
//! every connection costs one key derivation.
//!
//! Run with:
//! ```bash
//! cargo bench --package airtype-core --bench crypto_bench
//! ```

use airtype_core::{parse_frame, RelayCryptoSession, RelayFrame};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_derive(c: &mut Criterion) {
    c.bench_function("derive_session", |b| {
        b.iter(|| RelayCryptoSession::derive(black_box("correct horse battery staple")))
    });
}

fn bench_receive(c: &mut Criterion) {
    let session = RelayCryptoSession::derive("bench");
    let mut group = c.benchmark_group("parse_and_decrypt");

    for len in [16usize, 256, 4096] {
        let text = "a".repeat(len);
        let wire = session
            .encrypt(&text)
            .expect("encryption must succeed")
            .to_json();

        group.bench_with_input(BenchmarkId::from_parameter(len), &wire, |b, wire| {
            b.iter(|| match parse_frame(black_box(wire)) {
                Ok(RelayFrame::Text(sealed)) => session.decrypt(&sealed.iv, &sealed.data).ok(),
                _ => None,
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_derive, bench_receive);
criterion_main!(benches);

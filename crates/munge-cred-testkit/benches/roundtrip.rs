//! Encode/decode throughput against the in-memory authority.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use munge_cred::authority::AuthorityConfig;
use munge_cred::{with_payload, Credential};
use munge_cred_testkit::TestFixture;

fn bench_encode(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let mut group = c.benchmark_group("encode");

    for size in [0usize, 64, 4096] {
        let request = Credential::new([with_payload(vec![0xA5u8; size])]);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| fixture.service.encode(black_box(request)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    // Replay detection would reject every iteration after the first.
    let fixture = TestFixture::with_config(AuthorityConfig {
        replay_detection: false,
        ..AuthorityConfig::default()
    });
    let mut group = c.benchmark_group("decode");

    for size in [0usize, 64, 4096] {
        let request = Credential::new([with_payload(vec![0xA5u8; size])]);
        let token = fixture
            .service
            .encode(&request)
            .expect("encode benchmark token");
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &token, |b, token| {
            b.iter(|| fixture.service.decode(black_box(token)))
        });
    }
    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let request = Credential::new([with_payload(&b"Hello World"[..])]);

    c.bench_function("roundtrip", |b| {
        b.iter(|| {
            let token = fixture.service.encode(&request)?;
            fixture.service.decode(token)
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_roundtrip);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ibc_engine::encoder::{encode_fixed, encode_synthesis};
use ibc_engine::pipeline::encoding_to_smt2_script;
use ibc_engine::sanity::check_chain;
use ibc_engine::systems;

fn bench_encoding(c: &mut Criterion) {
    let lv = systems::lotka_volterra().expect("built-in");
    let chain = systems::lotka_volterra_chain();

    c.bench_function("encode_synthesis_lv_k1", |b| {
        b.iter(|| encode_synthesis(black_box(&lv), black_box(1)))
    });
    c.bench_function("encode_synthesis_lv_k3", |b| {
        b.iter(|| encode_synthesis(black_box(&lv), black_box(3)))
    });
    c.bench_function("encode_fixed_lv", |b| {
        b.iter(|| encode_fixed(black_box(&lv), black_box(&chain)))
    });

    let (encoding, _) = encode_synthesis(&lv, 1);
    c.bench_function("smt2_script_lv_k1", |b| {
        b.iter(|| encoding_to_smt2_script(black_box(&encoding)))
    });
}

fn bench_sanity(c: &mut Criterion) {
    let lv = systems::lotka_volterra().expect("built-in");
    let chain = systems::lotka_volterra_chain();
    c.bench_function("sanity_lv_100", |b| {
        b.iter(|| check_chain(black_box(&lv), black_box(&chain), 100))
    });
}

criterion_group!(benches, bench_encoding, bench_sanity);
criterion_main!(benches);

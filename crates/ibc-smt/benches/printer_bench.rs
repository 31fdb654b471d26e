use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ibc_smt::backends::smtlib_printer::to_smtlib;
use ibc_smt::terms::SmtTerm;

/// Dense cubic in two variables with symbolic coefficients, the shape of a
/// Lotka-Volterra barrier template.
fn cubic_template() -> SmtTerm {
    let v = || SmtTerm::var("x0");
    let p = || SmtTerm::var("x1");
    let monomials = vec![
        SmtTerm::real_int(1),
        v(),
        p(),
        v().mul(v()),
        v().mul(p()),
        p().mul(p()),
        v().mul(v()).mul(v()),
        v().mul(v()).mul(p()),
        v().mul(p()).mul(p()),
        p().mul(p()).mul(p()),
    ];
    let mut sum = SmtTerm::real_int(0);
    for (i, m) in monomials.into_iter().enumerate() {
        sum = sum.add(SmtTerm::var(format!("c_k00_b000_m{i:03}")).mul(m));
    }
    SmtTerm::forall_reals(
        &["x0".to_string(), "x1".to_string()],
        SmtTerm::and(vec![
            SmtTerm::var("x0").ge(SmtTerm::real_int(0)),
            SmtTerm::var("x0").le(SmtTerm::real_int(10)),
        ])
        .implies(sum.le(SmtTerm::real_int(0))),
    )
}

fn bench_print_cubic_template(c: &mut Criterion) {
    let term = cubic_template();
    c.bench_function("print_cubic_template", |b| {
        b.iter(|| to_smtlib(black_box(&term)))
    });
}

criterion_group!(benches, bench_print_cubic_template);
criterion_main!(benches);

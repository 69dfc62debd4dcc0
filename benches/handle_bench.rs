use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rc_handle::Strong;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

// Copy-cost comparison against the standard shared pointers and a raw
// pointer baseline.
fn bench_clone(c: &mut Criterion) {
    c.bench_function("strong_clone", |b| {
        let p = Strong::new(0i32);
        b.iter(|| {
            let copy = p.clone();
            black_box(&copy);
        })
    });

    c.bench_function("rc_clone", |b| {
        let p = Rc::new(0i32);
        b.iter(|| {
            let copy = p.clone();
            black_box(&copy);
        })
    });

    c.bench_function("arc_clone", |b| {
        let p = Arc::new(0i32);
        b.iter(|| {
            let copy = p.clone();
            black_box(&copy);
        })
    });

    c.bench_function("raw_copy", |b| {
        let x = 0i32;
        b.iter(|| {
            let copy = &x as *const i32;
            black_box(copy);
        })
    });
}

// Construction cost: value allocation plus a separate control block,
// versus Rc's single combined allocation.
fn bench_new(c: &mut Criterion) {
    c.bench_function("strong_new", |b| {
        b.iter(|| black_box(Strong::new(0u64)))
    });

    c.bench_function("rc_new", |b| b.iter(|| black_box(Rc::new(0u64))));
}

fn bench_upgrade(c: &mut Criterion) {
    c.bench_function("strong_upgrade", |b| {
        let p = Strong::new(0i32);
        let w = p.downgrade();
        b.iter(|| {
            let s = w.upgrade().unwrap();
            black_box(&s);
        })
    });

    c.bench_function("rc_upgrade", |b| {
        let p = Rc::new(0i32);
        let w = Rc::downgrade(&p);
        b.iter(|| {
            let s = w.upgrade().unwrap();
            black_box(&s);
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_clone, bench_new, bench_upgrade
}
criterion_main!(benches);

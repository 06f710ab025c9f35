use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rcu_cell::RcuCell;
use std::sync::Arc;

fn publish_n_to_m_readers(base: usize, n: usize, m: usize) {
    let cell = Arc::new(RcuCell::new(0usize));

    let mut readers = Vec::with_capacity(m);
    for _ in 0..m {
        let cell = cell.clone();
        readers.push(std::thread::spawn(move || {
            let mut prev = 0;
            loop {
                let snapshot = cell.read();
                let i = *snapshot;
                snapshot.release();
                if prev > i {
                    panic!("{} > {}", prev, i);
                }
                if i == base + n {
                    break;
                }
                prev = i;
            }
        }));
    }

    let writer = std::thread::spawn({
        let cell = cell.clone();
        move || {
            for i in (base + 1)..=(base + n) {
                cell.update(i);
            }
        }
    });

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    Arc::try_unwrap(cell)
        .unwrap_or_else(|_| panic!("readers should have all joined"))
        .dispose();
}

fn n1000_m10(c: &mut Criterion) {
    c.bench_function("n1000_m10", |b| {
        b.iter(|| publish_n_to_m_readers(black_box(1), 1000, 10))
    });
}

fn n100_m10(c: &mut Criterion) {
    c.bench_function("n100_m10", |b| {
        b.iter(|| publish_n_to_m_readers(black_box(1), 100, 10))
    });
}

criterion_group!(benches, n100_m10, n1000_m10);
criterion_main!(benches);

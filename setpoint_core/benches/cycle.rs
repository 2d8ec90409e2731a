use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use setpoint_core::estimator::update_parameters;
use setpoint_core::{
    Coefficients, ForgettingFactor, HistoricalObservation, TrimRespondController,
};
use setpoint_traits::Snapshot;

// Deterministic damper positions in [0.3, 0.95)
fn synth_population(n: usize, seed: u32) -> Vec<f64> {
    // tiny PRNG
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            state = x;
            0.3 + 0.65 * (f64::from(x) / (f64::from(u32::MAX) + 1.0))
        })
        .collect()
}

pub fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim_respond_cycle");
    for n in [40usize, 400, 4000] {
        let snapshot = Snapshot::new(synth_population(n, 0xC0FF_EE11)).with_condition(65.0);
        group.bench_function(format!("devices_{n}"), |b| {
            b.iter_batched(
                || {
                    TrimRespondController::builder()
                        .with_limits(0.5, 1.5)
                        .with_initial(1.0)
                        .active(true)
                        .try_build()
                        .expect("controller")
                },
                |mut ctrl| black_box(ctrl.cycle(black_box(&snapshot))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

pub fn bench_update(c: &mut Criterion) {
    let history: Vec<HistoricalObservation> = (0..365)
        .map(|i| {
            let i = f64::from(i);
            HistoricalObservation {
                zone_temp: 45.0 + (i * 0.37).sin() * 5.0,
                outdoor_temp: 10.0 + (i * 0.11).cos() * 15.0,
                duration_min: 100.0 + (i * 0.23).sin() * 20.0,
            }
        })
        .collect();
    let ff = ForgettingFactor::new(0.1).expect("ff");
    c.bench_function("estimator_update_365", |b| {
        b.iter(|| {
            let mut state = Coefficients::default();
            black_box(update_parameters(&mut state, black_box(&history), 70.0, ff));
            state
        });
    });
}

criterion_group!(benches, bench_cycle, bench_update);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;
use std::time::Duration;

use daidalus::coordinator::Daidalus;
use daidalus::dimension::Dimension;
use daidalus::geometry::Vec3;
use daidalus::{AircraftState, Position};

/// Benchmarks the bands engine across the four dimensions with a handful
/// of randomly placed traffic aircraft.
fn criterion_benchmark_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("bands");
    let mut rng = rand::thread_rng();

    for traffic_count in [1usize, 4, 8] {
        let bench_name = format!("traffic={traffic_count:02}");
        let mut d = Daidalus::new();
        d.set_ownship(AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
            Vec3::new(0.0, 150.0, 0.0),
            0.0,
        ));
        for i in 0..traffic_count {
            let x = rng.gen_range(-20_000.0..20_000.0);
            let y = rng.gen_range(-20_000.0..20_000.0);
            let vx = rng.gen_range(-150.0..150.0);
            let vy = rng.gen_range(-150.0..150.0);
            d.add_traffic(AircraftState::new(
                format!("t{i}"),
                Position::Euclidean(Vec3::new(x, y, 3000.0)),
                Vec3::new(vx, vy, 0.0),
                0.0,
            ));
        }

        group.bench_function(&bench_name, |b| {
            b.iter(|| {
                for dim in Dimension::ALL {
                    let _ = d.bands(dim, 0.0);
                }
            })
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_secs(1));
    targets = criterion_benchmark_bands
}

criterion_main!(benches);

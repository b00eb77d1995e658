use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use nmea_bridge::{
    decode, encode, Encoding, MovingTrajectory, ShipState, Trajectory, WindowOpts,
};
use rand::Rng;

fn random_states(num: usize, nr_of_actuators: usize) -> Vec<ShipState> {
    let mut rng = rand::thread_rng();
    (0..num)
        .map(|i| {
            let actuators: Vec<f64> = (0..nr_of_actuators)
                .map(|_| rng.gen_range(-100.0..100.0))
                .collect();
            ShipState::new(
                1.7e9 + i as f64,
                rng.gen_range(-90.0..90.0),
                rng.gen_range(-180.0..180.0),
                rng.gen(),
                Some(rng.gen()),
                rng.gen(),
                actuators,
                nr_of_actuators,
            )
            .unwrap()
        })
        .collect()
}

fn bench_trajectory_codec(c: &mut Criterion) {
    let traj = Trajectory::new(random_states(30, 7));

    let mut group = c.benchmark_group("trajectory");
    for (name, encoding) in [("sentence", Encoding::Sentence), ("json", Encoding::Json)] {
        let text = encode(&traj, encoding).unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("encode_{name}"), |b| {
            b.iter(|| encode(&traj, encoding).unwrap());
        });
        group.bench_function(format!("decode_{name}"), |b| {
            b.iter(|| decode::<Trajectory>(&text, encoding));
        });
    }
    group.finish();
}

fn bench_window_advance(c: &mut Criterion) {
    let data = random_states(1000, 7);
    let opts = WindowOpts::builder().horizon(300.0).interval(1.0).build();

    let mut group = c.benchmark_group("window");
    group.throughput(Throughput::Elements(data.len() as u64));
    group.bench_function("advance_all", |b| {
        b.iter(|| {
            let mut window = MovingTrajectory::new(data.clone(), opts).unwrap();
            for current in &data {
                window.advance(current);
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_trajectory_codec, bench_window_advance);
criterion_main!(benches);

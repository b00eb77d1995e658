mod common;

use nmea_bridge::dataset::{downsample, prune_uneventful};
use nmea_bridge::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn window_never_exceeds_horizon() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let spacing = f64::from(rng.gen_range(1u8..=10));
        let horizon = spacing * f64::from(rng.gen_range(0u8..=12));
        let num = rng.gen_range(1..80);
        let data = common::dataset(&mut rng, num, spacing);

        let opts = WindowOpts::builder()
            .horizon(horizon)
            .interval(spacing)
            .build();
        let mut window = MovingTrajectory::new(data.clone(), opts).unwrap();

        for current in &data {
            window.advance(current);
            let times = window.snapshot().timestamps();
            assert_eq!(times.len(), window.len());
            if times.is_empty() {
                continue;
            }
            assert_eq!(times[0], current.time(), "current position leads the window");
            assert!(
                times.iter().all(|t| *t <= current.time() + horizon),
                "window {times:?} exceeds horizon {horizon} at {}",
                current.time()
            );
            assert!(
                times.windows(2).all(|w| w[0] < w[1]),
                "window {times:?} not strictly increasing"
            );
        }
    }
}

#[test]
fn every_waypoint_is_emitted_once() {
    let mut rng = StdRng::seed_from_u64(7);
    let data = common::dataset(&mut rng, 40, 5.0);
    let opts = WindowOpts::builder().horizon(25.0).interval(5.0).build();
    let mut window = MovingTrajectory::new(data.clone(), opts).unwrap();

    let mut seen: Vec<f64> = Vec::new();
    for current in &data {
        window.advance(current);
        for state in window.snapshot().iter() {
            if seen.last().map_or(true, |last| state.time() > *last) {
                seen.push(state.time());
            }
        }
    }
    let expected: Vec<f64> = data.iter().map(ShipState::time).collect();
    assert_eq!(seen, expected);
    assert_eq!(window.remaining(), 0);
}

#[test]
fn replay_publishes_over_a_loopback() {
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Capture(Mutex<Vec<(String, Vec<u8>)>>);

    impl Transport for Capture {
        fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
            self.0.lock().unwrap().push((topic.into(), payload.to_vec()));
            Ok(())
        }
        fn subscribe(&self, _topic: &str) -> Result<()> {
            Ok(())
        }
    }

    let mut rng = StdRng::seed_from_u64(11);
    let (data, interval) = downsample(common::dataset(&mut rng, 60, 1.0), 5.0);
    assert_eq!(interval, 5.0);
    let horizon_data = prune_uneventful(data.clone(), 0.1);

    let opts = BridgeOpts::builder().encoding(Encoding::Json).build();
    let publisher = Publisher::<Trajectory>::new(&opts);
    let subscriber = Arc::new(Subscriber::<Trajectory>::new(&opts).unwrap());
    let mut conn = Connection::new(Capture::default());
    conn.register(subscriber.clone());
    conn.connect().unwrap();

    let window_opts = WindowOpts::builder().horizon(20.0).interval(interval).build();
    let mut window = MovingTrajectory::new(horizon_data, window_opts).unwrap();
    let mut sent = Vec::new();
    for current in &data {
        window.advance(current);
        if window.is_empty() {
            break;
        }
        let snapshot = window.snapshot();
        conn.publish(&publisher, &snapshot).unwrap();
        sent.push(snapshot);
    }

    let published: Vec<_> = conn.transport().0.lock().unwrap().drain(..).collect();
    assert_eq!(published.len(), sent.len());
    for (topic, payload) in &published {
        assert_eq!(topic, "trajectory/topic");
        conn.dispatch(topic, payload);
    }
    assert_eq!(subscriber.drain(), sent);
}

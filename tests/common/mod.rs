#![allow(dead_code)]
use nmea_bridge::{ShipState, Trajectory, WindState};
use rand::Rng;
use std::f64::consts::PI;

pub fn ship_state<R: Rng>(rng: &mut R, time: f64, nr_of_actuators: usize) -> ShipState {
    let actuators: Vec<f64> = (0..nr_of_actuators)
        .map(|_| rng.gen_range(-100.0..100.0))
        .collect();
    let cog = if rng.gen_bool(0.2) {
        None
    } else {
        Some(rng.gen_range(-PI..PI))
    };
    ShipState::new(
        time,
        rng.gen_range(-90.0..90.0),
        rng.gen_range(-180.0..180.0),
        rng.gen_range(-PI..PI),
        cog,
        rng.gen_range(0.0..15.0),
        actuators,
        nr_of_actuators,
    )
    .unwrap()
}

/// A state as it survives the trajectory sentence format, i.e., without course or speed.
pub fn waypoint<R: Rng>(rng: &mut R, time: f64, nr_of_actuators: usize) -> ShipState {
    let state = ship_state(rng, time, nr_of_actuators);
    ShipState::new(
        state.time(),
        state.latitude(),
        state.longitude(),
        state.heading(),
        None,
        0.0,
        state.actuators().clone(),
        nr_of_actuators,
    )
    .unwrap()
}

pub fn wind_state<R: Rng>(rng: &mut R) -> WindState {
    WindState::new(
        rng.gen_range(1.6e9..1.8e9),
        rng.gen_range(0.0..30.0),
        rng.gen_range(-PI..PI),
    )
}

pub fn trajectory<R: Rng>(rng: &mut R, num: usize, nr_of_actuators: usize) -> Trajectory {
    let start: f64 = rng.gen_range(1.6e9..1.8e9);
    Trajectory::new(
        (0..num)
            .map(|i| waypoint(rng, start + i as f64 * 10.0, nr_of_actuators))
            .collect(),
    )
}

/// Uniformly spaced dataset with integer-valued timestamps.
pub fn dataset<R: Rng>(rng: &mut R, num: usize, spacing: f64) -> Vec<ShipState> {
    (0..num)
        .map(|i| ship_state(rng, i as f64 * spacing, 7))
        .collect()
}

//! Preparation of recorded datasets before windowing.
use tracing::debug;

use crate::model::ShipState;

/// Thin `rows` so they are spaced at least `interval` seconds apart.
///
/// The dataset spacing is taken from the first two rows. If `interval` exceeds it every
/// `floor(interval / spacing)`-th row is kept, otherwise all rows are kept. Returns the kept
/// rows and the effective interval, which is the dataset spacing when no thinning happens.
#[must_use]
pub fn downsample(rows: Vec<ShipState>, interval: f64) -> (Vec<ShipState>, f64) {
    if rows.len() < 2 {
        return (rows, interval);
    }
    let spacing = rows[1].time() - rows[0].time();
    if spacing <= 0.0 {
        return (rows, interval);
    }
    if interval <= spacing {
        return (rows, spacing);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let step = (interval / spacing) as usize;
    let total = rows.len();
    let kept: Vec<ShipState> = rows.into_iter().step_by(step.max(1)).collect();
    debug!(step, total, kept = kept.len(), "downsampled dataset");
    (kept, interval)
}

/// Drop rows whose actuators have not changed since the last kept row.
///
/// The first row is always kept. A later row is kept if any actuator differs from the
/// last kept row by more than `percentage / 100`.
#[must_use]
pub fn prune_uneventful(rows: Vec<ShipState>, percentage: f64) -> Vec<ShipState> {
    let threshold = percentage / 100.0;
    let total = rows.len();
    let mut kept: Vec<ShipState> = Vec::with_capacity(total);
    for row in rows {
        let changed = match kept.last() {
            None => true,
            Some(prev) => row
                .actuators()
                .as_slice()
                .iter()
                .zip(prev.actuators().as_slice())
                .any(|(cur, prev)| (cur - prev).abs() > threshold),
        };
        if changed {
            kept.push(row);
        }
    }
    debug!(total, kept = kept.len(), "pruned uneventful rows");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: f64, actuators: Vec<f64>) -> ShipState {
        let num = actuators.len();
        ShipState::new(time, 0.0, 0.0, 0.0, None, 0.0, actuators, num).unwrap()
    }

    fn rows(num: usize, spacing: f64) -> Vec<ShipState> {
        (0..num)
            .map(|i| row(i as f64 * spacing, vec![0.0]))
            .collect()
    }

    #[test]
    fn test_downsample() {
        let (kept, interval) = downsample(rows(10, 1.0), 3.0);
        assert_eq!(interval, 3.0);
        let times: Vec<f64> = kept.iter().map(ShipState::time).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_downsample_finer_than_dataset() {
        let (kept, interval) = downsample(rows(4, 10.0), 5.0);
        assert_eq!(kept.len(), 4);
        assert_eq!(interval, 10.0);
    }

    #[test]
    fn test_downsample_short_dataset() {
        let (kept, interval) = downsample(rows(1, 10.0), 5.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(interval, 5.0);
    }

    #[test]
    fn test_prune_uneventful() {
        let data = vec![
            row(0.0, vec![10.0, 0.0]),
            row(1.0, vec![10.05, 0.0]),
            row(2.0, vec![10.2, 0.0]),
            row(3.0, vec![10.2, 0.0]),
            row(4.0, vec![10.2, -0.5]),
        ];
        let kept: Vec<f64> = prune_uneventful(data, 10.0)
            .iter()
            .map(ShipState::time)
            .collect();
        assert_eq!(kept, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_prune_empty() {
        assert!(prune_uneventful(Vec::new(), 1.0).is_empty());
    }
}

//! Sliding time-horizon trajectory windowing.
//!
//! [MovingTrajectory] consumes a time-ordered dataset one "current position" at a time and
//! maintains a bounded window that starts at the current position and extends `horizon`
//! seconds ahead. Dataset waypoints are handed to the window at most once.
use serde::{Deserialize, Serialize};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::error::{Error, Result};
use crate::model::{ShipState, Trajectory};

/// Window configuration.
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WindowOpts {
    /// Look-ahead horizon in seconds.
    #[builder(default = 300.0)]
    pub horizon: f64,
    /// Expected spacing of current position updates in seconds.
    #[builder(default = 10.0)]
    pub interval: f64,
}

impl Default for WindowOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WindowOpts {
    /// # Errors
    /// [Error::Config] if the horizon is negative or not finite, or the interval is not
    /// positive or not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(Error::Config(format!("invalid horizon {}", self.horizon)));
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(Error::Config(format!("invalid interval {}", self.interval)));
        }
        Ok(())
    }
}

/// A bounded-horizon trajectory derived from a dataset.
///
/// The window is empty until the first call to [MovingTrajectory::advance]. After each
/// advance the current position is the first waypoint of the window.
///
/// Current positions are located in the dataset by exact timestamp equality. If several
/// dataset rows share a timestamp the first one is used.
///
/// # Example
/// ```
/// use nmea_bridge::{MovingTrajectory, ShipState, WindowOpts};
///
/// let dataset: Vec<ShipState> = (0..5)
///     .map(|i| ShipState::new(f64::from(i) * 10.0, 63.4, 10.4, 0.0, None, 1.0, 0.5, 1).unwrap())
///     .collect();
/// let opts = WindowOpts::builder().horizon(20.0).interval(10.0).build();
/// let mut window = MovingTrajectory::new(dataset.clone(), opts).unwrap();
///
/// window.advance(&dataset[0]);
/// assert_eq!(window.snapshot().timestamps(), vec![0.0, 10.0, 20.0]);
/// window.advance(&dataset[1]);
/// assert_eq!(window.snapshot().timestamps(), vec![10.0, 20.0, 30.0]);
/// ```
#[derive(Debug, Clone)]
pub struct MovingTrajectory {
    // dataset waypoints not yet consumed, in order
    full: Vec<ShipState>,
    // current window, in order
    moving: Vec<ShipState>,
    opts: WindowOpts,
}

impl MovingTrajectory {
    /// Create a window over `dataset`, which must be ordered by time.
    ///
    /// # Errors
    /// [Error::Config] if `opts` are invalid.
    pub fn new(dataset: Vec<ShipState>, opts: WindowOpts) -> Result<Self> {
        opts.validate()?;
        Ok(MovingTrajectory {
            full: dataset,
            moving: Vec::default(),
            opts,
        })
    }

    /// Move the window so it starts at `current`.
    pub fn advance(&mut self, current: &ShipState) {
        let time = current.time();

        #[allow(clippy::float_cmp)]
        let start = self
            .full
            .iter()
            .position(|s| s.time() == time)
            .unwrap_or(0);
        let end = self
            .full
            .iter()
            .position(|s| s.time() >= time + self.opts.horizon)
            .or(self.full.len().checked_sub(1));
        let revealed: &[ShipState] = match end {
            Some(end) if start <= end => &self.full[start..=end],
            _ => &[],
        };

        #[allow(clippy::float_cmp)]
        let only_current = self.moving.len() == 1 && self.moving[0].time() == time;
        if self.moving.is_empty() {
            self.moving = revealed.to_vec();
        } else if only_current {
            // horizon consumed down to the current position
            self.moving.clear();
        } else {
            let passed = self
                .moving
                .iter()
                .position(|s| s.time() >= time)
                .unwrap_or(self.moving.len());
            self.moving.drain(..passed);
            self.moving.extend_from_slice(revealed);
        }

        if let Some(end) = end {
            self.full.drain(..=end);
        }

        #[allow(clippy::float_cmp)]
        let missing_current = self.moving.first().is_some_and(|s| s.time() != time);
        if missing_current {
            self.moving.insert(0, current.clone());
        }

        debug!(
            time,
            datetime = ?current.datetime(),
            window = self.moving.len(),
            remaining = self.full.len(),
            "advanced moving trajectory"
        );
    }

    /// The current window as a new [Trajectory].
    #[must_use]
    pub fn snapshot(&self) -> Trajectory {
        Trajectory::new(self.moving.clone())
    }

    /// Number of waypoints in the current window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moving.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moving.is_empty()
    }

    /// Number of dataset waypoints not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.full.len()
    }

    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.opts.horizon
    }

    #[must_use]
    pub fn interval(&self) -> f64 {
        self.opts.interval
    }

    /// Advance through `dataset` one row at a time, yielding each resulting snapshot, until
    /// the window empties or the dataset is exhausted.
    ///
    /// # Errors
    /// [Error::Config] if `opts` are invalid.
    pub fn replay(dataset: Vec<ShipState>, opts: WindowOpts) -> Result<Replay> {
        Ok(Replay {
            window: MovingTrajectory::new(dataset.clone(), opts)?,
            rows: dataset.into_iter(),
        })
    }
}

/// Iterator returned by [MovingTrajectory::replay].
pub struct Replay {
    window: MovingTrajectory,
    rows: std::vec::IntoIter<ShipState>,
}

impl Iterator for Replay {
    type Item = Trajectory;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rows.next()?;
        self.window.advance(&current);
        if self.window.is_empty() {
            None
        } else {
            Some(self.window.snapshot())
        }
    }
}

//! Vessel telemetry entities.
//!
//! All entities validate their invariants at construction time and are not
//! mutated afterwards. Fields are exposed through accessors only.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Actuator values of a single [ShipState].
///
/// A state with a single actuator may carry it as a bare scalar. Equality compares the
/// ordered values, so `Scalar(x) == Values(vec![x])`.
///
/// Always serialized as a sequence. A bare number is accepted when deserializing.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Actuators {
    Scalar(f64),
    Values(Vec<f64>),
}

impl Actuators {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Actuators::Scalar(val) => std::slice::from_ref(val),
            Actuators::Values(vals) => vals,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Actuators::Scalar(_))
    }
}

impl Serialize for Actuators {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

impl PartialEq for Actuators {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl From<f64> for Actuators {
    fn from(val: f64) -> Self {
        Actuators::Scalar(val)
    }
}

impl From<Vec<f64>> for Actuators {
    fn from(vals: Vec<f64>) -> Self {
        Actuators::Values(vals)
    }
}

fn epoch_datetime(time: f64) -> Option<DateTime<Utc>> {
    if !time.is_finite() {
        return None;
    }
    let secs = time.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = (((time - secs) * 1e9) as u32).min(999_999_999);
    #[allow(clippy::cast_possible_truncation)]
    let secs = secs as i64;
    DateTime::from_timestamp(secs, nanos)
}

/// State of a vessel at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    time: f64,
    latitude: f64,
    longitude: f64,
    heading: f64,
    cog: Option<f64>,
    sog: f64,
    actuators: Actuators,
    nr_of_actuators: usize,
}

impl ShipState {
    /// Create a new state.
    ///
    /// `time` is UTC epoch seconds, `latitude`/`longitude` decimal degrees, `heading` and
    /// `cog` radians, and `sog` m/s.
    ///
    /// # Errors
    /// [Error::Validation] if `nr_of_actuators` is 0, if a scalar actuator is given with
    /// `nr_of_actuators != 1`, or if the number of actuator values differs from
    /// `nr_of_actuators`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: f64,
        latitude: f64,
        longitude: f64,
        heading: f64,
        cog: Option<f64>,
        sog: f64,
        actuators: impl Into<Actuators>,
        nr_of_actuators: usize,
    ) -> Result<Self> {
        let actuators = actuators.into();
        if nr_of_actuators == 0 {
            return Err(Error::validation("nr_of_actuators", 1, 0));
        }
        match &actuators {
            Actuators::Scalar(_) if nr_of_actuators != 1 => {
                return Err(Error::validation("nr_of_actuators", 1, nr_of_actuators));
            }
            Actuators::Values(vals) if vals.len() != nr_of_actuators => {
                return Err(Error::validation(
                    "actuator_values",
                    nr_of_actuators,
                    vals.len(),
                ));
            }
            _ => {}
        }
        Ok(ShipState {
            time,
            latitude,
            longitude,
            heading,
            cog,
            sog,
            actuators,
            nr_of_actuators,
        })
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Course over ground, if available.
    #[must_use]
    pub fn cog(&self) -> Option<f64> {
        self.cog
    }

    /// Speed over ground.
    #[must_use]
    pub fn sog(&self) -> f64 {
        self.sog
    }

    #[must_use]
    pub fn actuators(&self) -> &Actuators {
        &self.actuators
    }

    #[must_use]
    pub fn nr_of_actuators(&self) -> usize {
        self.nr_of_actuators
    }

    /// The state time as a UTC datetime, or `None` if it cannot be represented.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        epoch_datetime(self.time)
    }
}

/// State of the wind at a point in time.
///
/// `direction` is in radians from north (0) to east (pi/2).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindState {
    pub time: f64,
    pub speed: f64,
    pub direction: f64,
}

impl WindState {
    #[must_use]
    pub fn new(time: f64, speed: f64, direction: f64) -> Self {
        WindState {
            time,
            speed,
            direction,
        }
    }

    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        epoch_datetime(self.time)
    }
}

/// Actuator values of a column-oriented trajectory.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorColumns {
    /// One value per waypoint. Requires a single actuator.
    Flat(Vec<f64>),
    /// One inner sequence of `nr_of_actuators` values per waypoint.
    Nested(Vec<Vec<f64>>),
}

/// Column-oriented (parallel sequence) form of a [Trajectory].
///
/// Columns carry no course or speed over ground. Waypoints built from columns have
/// no `cog` and a `sog` of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryColumns {
    pub timestamps: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub headings: Vec<f64>,
    pub actuator_values: ActuatorColumns,
    pub nr_of_actuators: usize,
}

/// Ordered sequence of waypoints. Insertion order is temporal order; waypoints are never
/// re-sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    ship_states: Vec<ShipState>,
}

impl Trajectory {
    #[must_use]
    pub fn new(ship_states: Vec<ShipState>) -> Self {
        Trajectory { ship_states }
    }

    /// Build a trajectory from parallel sequences.
    ///
    /// # Errors
    /// [Error::Validation] naming the first column whose length differs from the number of
    /// timestamps, or the first actuator row whose length differs from `nr_of_actuators`.
    /// Nothing is truncated or padded.
    pub fn from_columns(columns: TrajectoryColumns) -> Result<Self> {
        let TrajectoryColumns {
            timestamps,
            latitudes,
            longitudes,
            headings,
            actuator_values,
            nr_of_actuators,
        } = columns;
        let num = timestamps.len();

        for (field, len) in [
            ("latitudes", latitudes.len()),
            ("longitudes", longitudes.len()),
            ("headings", headings.len()),
        ] {
            if len != num {
                return Err(Error::validation(field, num, len));
            }
        }

        let actuators: Vec<Actuators> = match actuator_values {
            ActuatorColumns::Flat(vals) => {
                if nr_of_actuators != 1 {
                    return Err(Error::validation("nr_of_actuators", 1, nr_of_actuators));
                }
                if vals.len() != num {
                    return Err(Error::validation("actuator_values", num, vals.len()));
                }
                vals.into_iter().map(Actuators::Scalar).collect()
            }
            ActuatorColumns::Nested(rows) => {
                if rows.len() != num {
                    return Err(Error::validation("actuator_values", num, rows.len()));
                }
                if let Some((idx, row)) = rows
                    .iter()
                    .enumerate()
                    .find(|(_, row)| row.len() != nr_of_actuators)
                {
                    return Err(Error::validation(
                        format!("actuator_values[{idx}]"),
                        nr_of_actuators,
                        row.len(),
                    ));
                }
                rows.into_iter().map(Actuators::Values).collect()
            }
        };

        let ship_states = timestamps
            .into_iter()
            .zip(latitudes)
            .zip(longitudes)
            .zip(headings)
            .zip(actuators)
            .map(|((((time, lat), lon), heading), actuators)| {
                ShipState::new(time, lat, lon, heading, None, 0.0, actuators, nr_of_actuators)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Trajectory { ship_states })
    }

    /// Convert into parallel sequences.
    ///
    /// Actuators are [ActuatorColumns::Flat] when every waypoint carries a scalar actuator,
    /// otherwise [ActuatorColumns::Nested]. Course and speed over ground are not represented.
    ///
    /// # Errors
    /// [Error::Validation] if waypoints disagree on the number of actuators.
    pub fn columns(&self) -> Result<TrajectoryColumns> {
        let nr_of_actuators = self.ship_states.first().map_or(1, ShipState::nr_of_actuators);
        if let Some((idx, expected, actual)) = self.arity_mismatch() {
            return Err(Error::validation(
                format!("ship_states[{idx}].nr_of_actuators"),
                expected,
                actual,
            ));
        }

        let all_scalar = self.ship_states.iter().all(|s| s.actuators.is_scalar());
        let actuator_values = if all_scalar {
            ActuatorColumns::Flat(
                self.ship_states
                    .iter()
                    .map(|s| s.actuators.as_slice()[0])
                    .collect(),
            )
        } else {
            ActuatorColumns::Nested(
                self.ship_states
                    .iter()
                    .map(|s| s.actuators.as_slice().to_vec())
                    .collect(),
            )
        };

        Ok(TrajectoryColumns {
            timestamps: self.timestamps(),
            latitudes: self.ship_states.iter().map(ShipState::latitude).collect(),
            longitudes: self.ship_states.iter().map(ShipState::longitude).collect(),
            headings: self.ship_states.iter().map(ShipState::heading).collect(),
            actuator_values,
            nr_of_actuators,
        })
    }

    /// First waypoint whose actuator count differs from that of the first waypoint, as
    /// `(index, expected, actual)`.
    pub(crate) fn arity_mismatch(&self) -> Option<(usize, usize, usize)> {
        let expected = self.ship_states.first()?.nr_of_actuators;
        self.ship_states
            .iter()
            .enumerate()
            .find(|(_, s)| s.nr_of_actuators != expected)
            .map(|(idx, s)| (idx, expected, s.nr_of_actuators))
    }

    #[must_use]
    pub fn ship_states(&self) -> &[ShipState] {
        &self.ship_states
    }

    #[must_use]
    pub fn into_ship_states(self) -> Vec<ShipState> {
        self.ship_states
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ship_states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ship_states.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShipState> {
        self.ship_states.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&ShipState> {
        self.ship_states.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ShipState> {
        self.ship_states.last()
    }

    #[must_use]
    pub fn timestamps(&self) -> Vec<f64> {
        self.ship_states.iter().map(ShipState::time).collect()
    }
}

impl From<Vec<ShipState>> for Trajectory {
    fn from(ship_states: Vec<ShipState>) -> Self {
        Trajectory::new(ship_states)
    }
}

impl IntoIterator for Trajectory {
    type Item = ShipState;
    type IntoIter = std::vec::IntoIter<ShipState>;

    fn into_iter(self) -> Self::IntoIter {
        self.ship_states.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a ShipState;
    type IntoIter = std::slice::Iter<'a, ShipState>;

    fn into_iter(self) -> Self::IntoIter {
        self.ship_states.iter()
    }
}

use crate::error::{Error, Result};
use crate::model::{Actuators, ShipState, Trajectory, WindState};

/// Waypoint separator within a `CUSTRAJ` body.
const WAYPOINT_DELIM: char = ';';

/// Fields preceding the actuators in a `CUSSTATE` body.
const SHIP_STATE_FIXED_FIELDS: usize = 6;
/// Fields preceding the actuators in a `CUSTRAJ` waypoint.
const WAYPOINT_FIXED_FIELDS: usize = 4;

/// Conversion between an entity and the comma separated fields of a sentence body, i.e.,
/// everything between the type token and the checksum delimiter.
pub trait SentenceBody: Sized {
    /// # Errors
    /// [Error::Encode] if the entity cannot be represented as a sentence body.
    fn sentence_body(&self) -> Result<String>;

    /// # Errors
    /// [Error::Format] if fields are missing or not numeric, [Error::Schema] if trajectory
    /// waypoints disagree on the number of actuators.
    fn from_sentence_body(body: &str) -> Result<Self>;
}

fn parse_num(field: &str, name: &str) -> Result<f64> {
    field
        .trim()
        .parse()
        .map_err(|_| Error::Format(format!("invalid {name} {field:?}")))
}

fn parse_actuators(fields: &[&str]) -> Result<Actuators> {
    let vals = fields
        .iter()
        .map(|f| parse_num(f, "actuator value"))
        .collect::<Result<Vec<f64>>>()?;
    if vals.len() == 1 {
        Ok(Actuators::Scalar(vals[0]))
    } else {
        Ok(Actuators::Values(vals))
    }
}

fn push_actuators(out: &mut Vec<String>, actuators: &Actuators) {
    out.extend(actuators.as_slice().iter().map(f64::to_string));
}

impl SentenceBody for ShipState {
    /// `time,latitude,longitude,heading,cog,sog,a1,...,aN`; an absent `cog` is an empty field.
    fn sentence_body(&self) -> Result<String> {
        let mut fields = vec![
            self.time().to_string(),
            self.latitude().to_string(),
            self.longitude().to_string(),
            self.heading().to_string(),
            self.cog().map(|cog| cog.to_string()).unwrap_or_default(),
            self.sog().to_string(),
        ];
        push_actuators(&mut fields, self.actuators());
        Ok(fields.join(","))
    }

    fn from_sentence_body(body: &str) -> Result<Self> {
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() <= SHIP_STATE_FIXED_FIELDS {
            return Err(Error::Format(format!(
                "ship state needs at least {} fields, got {}",
                SHIP_STATE_FIXED_FIELDS + 1,
                fields.len()
            )));
        }
        let cog = if fields[4].trim().is_empty() {
            None
        } else {
            Some(parse_num(fields[4], "cog")?)
        };
        let actuator_fields = &fields[SHIP_STATE_FIXED_FIELDS..];
        ShipState::new(
            parse_num(fields[0], "time")?,
            parse_num(fields[1], "latitude")?,
            parse_num(fields[2], "longitude")?,
            parse_num(fields[3], "heading")?,
            cog,
            parse_num(fields[5], "sog")?,
            parse_actuators(actuator_fields)?,
            actuator_fields.len(),
        )
    }
}

impl SentenceBody for WindState {
    /// `time,speed,direction`
    fn sentence_body(&self) -> Result<String> {
        Ok(format!("{},{},{}", self.time, self.speed, self.direction))
    }

    fn from_sentence_body(body: &str) -> Result<Self> {
        let fields: Vec<&str> = body.split(',').collect();
        let [time, speed, direction] = fields[..] else {
            return Err(Error::Format(format!(
                "wind state needs 3 fields, got {}",
                fields.len()
            )));
        };
        Ok(WindState::new(
            parse_num(time, "time")?,
            parse_num(speed, "speed")?,
            parse_num(direction, "direction")?,
        ))
    }
}

impl SentenceBody for Trajectory {
    /// `;` separated waypoints of `time,latitude,longitude,heading,a1[,a2,...]`.
    ///
    /// Course and speed over ground are not part of the waypoint format. All waypoints must
    /// have the same number of actuators.
    fn sentence_body(&self) -> Result<String> {
        if let Some((idx, expected, actual)) = self.arity_mismatch() {
            return Err(Error::Encode(format!(
                "waypoint {idx} has {actual} actuators, expected {expected}"
            )));
        }
        let body = self
            .iter()
            .map(|state| {
                let mut fields = vec![
                    state.time().to_string(),
                    state.latitude().to_string(),
                    state.longitude().to_string(),
                    state.heading().to_string(),
                ];
                push_actuators(&mut fields, state.actuators());
                fields.join(",")
            })
            .collect::<Vec<_>>()
            .join(&WAYPOINT_DELIM.to_string());
        Ok(body)
    }

    /// Decoded waypoints have no `cog` and a `sog` of 0.
    fn from_sentence_body(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Trajectory::default());
        }

        let mut arity: Option<usize> = None;
        let mut ship_states = Vec::default();
        for (idx, waypoint) in body.split(WAYPOINT_DELIM).enumerate() {
            let fields: Vec<&str> = waypoint.split(',').collect();
            if fields.len() <= WAYPOINT_FIXED_FIELDS {
                return Err(Error::Format(format!(
                    "waypoint {idx} needs at least {} fields, got {}",
                    WAYPOINT_FIXED_FIELDS + 1,
                    fields.len()
                )));
            }
            let actuator_fields = &fields[WAYPOINT_FIXED_FIELDS..];
            match arity {
                None => arity = Some(actuator_fields.len()),
                Some(expected) if expected != actuator_fields.len() => {
                    return Err(Error::Schema(format!(
                        "waypoint {idx} has {} actuators, expected {expected}",
                        actuator_fields.len()
                    )));
                }
                Some(_) => {}
            }
            ship_states.push(ShipState::new(
                parse_num(fields[0], "time")?,
                parse_num(fields[1], "latitude")?,
                parse_num(fields[2], "longitude")?,
                parse_num(fields[3], "heading")?,
                None,
                0.0,
                parse_actuators(actuator_fields)?,
                actuator_fields.len(),
            )?);
        }
        Ok(Trajectory::new(ship_states))
    }
}

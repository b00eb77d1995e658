//! JSON envelope format.
//!
//! ```text
//! {"type": "SHIP_STATE", "body": {"time": T, "latitude": LA, "longitude": LO, "heading": H,
//!     "cog": C, "sog": S, "nr_of_actuators": N, "actuator_values": [...]}}
//! {"type": "WIND_STATE", "body": {"time": T, "speed": S, "direction": D}}
//! {"type": "TRAJ", "body": [{"type": "SHIP_STATE", "body": {...}}, ...]}
//! ```
//! Decoding requires every key of a body to be present. `cog` may be `null`. JSON has no
//! representation for non-finite numbers, so encoding fails on them instead of writing `null`.
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::codec::{Decoded, Message, MessageKind};
use crate::error::{Error, Result};
use crate::model::{Actuators, ShipState, Trajectory, WindState};

pub const SHIP_STATE_KEYS: [&str; 8] = [
    "time",
    "latitude",
    "longitude",
    "heading",
    "cog",
    "sog",
    "nr_of_actuators",
    "actuator_values",
];

pub const WIND_STATE_KEYS: [&str; 3] = ["time", "speed", "direction"];

const ENVELOPE_KEYS: [&str; 2] = ["type", "body"];

/// A typed envelope as written on the wire.
#[derive(Serialize, Debug)]
pub struct Envelope<'a, B> {
    #[serde(rename = "type")]
    kind: &'a str,
    body: B,
}

/// Body of a `SHIP_STATE` envelope.
#[derive(Serialize, Deserialize, Debug)]
pub struct ShipStateBody {
    time: f64,
    latitude: f64,
    longitude: f64,
    heading: f64,
    cog: Option<f64>,
    sog: f64,
    nr_of_actuators: usize,
    actuator_values: Actuators,
}

impl TryFrom<&ShipState> for ShipStateBody {
    type Error = Error;

    fn try_from(state: &ShipState) -> Result<Self> {
        for (idx, val) in state.actuators().as_slice().iter().enumerate() {
            finite(&format!("actuator_values[{idx}]"), *val)?;
        }
        Ok(ShipStateBody {
            time: finite("time", state.time())?,
            latitude: finite("latitude", state.latitude())?,
            longitude: finite("longitude", state.longitude())?,
            heading: finite("heading", state.heading())?,
            cog: state.cog().map(|cog| finite("cog", cog)).transpose()?,
            sog: finite("sog", state.sog())?,
            nr_of_actuators: state.nr_of_actuators(),
            actuator_values: state.actuators().clone(),
        })
    }
}

fn finite(field: &str, val: f64) -> Result<f64> {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(Error::Encode(format!("{field} is not finite: {val}")))
    }
}

/// Conversion between an entity and the `body` of its envelope.
pub trait EnvelopeBody: Sized {
    type Body: Serialize;

    /// # Errors
    /// [Error::Encode] if the entity has no JSON representation.
    fn envelope_body(&self) -> Result<Self::Body>;

    /// # Errors
    /// [Error::Schema] if required keys are missing or have the wrong JSON type,
    /// [Error::TypeMismatch] if a nested envelope has the wrong type tag, and
    /// [Error::Validation] if the values violate an entity invariant.
    fn from_envelope_body(body: Value) -> Result<Self>;
}

fn require_keys(value: &Value, keys: &[&str], context: &str) -> Result<()> {
    let Some(obj) = value.as_object() else {
        return Err(Error::Schema(format!("{context} is not an object")));
    };
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| !obj.contains_key(*key))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Schema(format!(
            "{context} missing keys {}",
            missing.join(", ")
        )))
    }
}

fn from_value<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|err| Error::Schema(format!("{context}: {err}")))
}

/// Split an envelope into its type tag and body.
fn open(value: Value, context: &str) -> Result<(String, Value)> {
    require_keys(&value, &ENVELOPE_KEYS, context)?;
    let Value::Object(mut obj) = value else {
        return Err(Error::Schema(format!("{context} is not an object")));
    };
    let kind = match obj.remove("type") {
        Some(Value::String(kind)) => kind,
        _ => return Err(Error::Schema(format!("{context} type is not a string"))),
    };
    let body = obj.remove("body").unwrap_or(Value::Null);
    Ok((kind, body))
}

fn check_kind(expected: MessageKind, actual: String) -> Result<()> {
    if actual == expected.envelope_tag() {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: expected.envelope_tag().to_string(),
            actual,
        })
    }
}

impl EnvelopeBody for ShipState {
    type Body = ShipStateBody;

    fn envelope_body(&self) -> Result<Self::Body> {
        ShipStateBody::try_from(self)
    }

    fn from_envelope_body(body: Value) -> Result<Self> {
        require_keys(&body, &SHIP_STATE_KEYS, "SHIP_STATE body")?;
        let body: ShipStateBody = from_value(body, "SHIP_STATE body")?;
        ShipState::new(
            body.time,
            body.latitude,
            body.longitude,
            body.heading,
            body.cog,
            body.sog,
            body.actuator_values,
            body.nr_of_actuators,
        )
    }
}

impl EnvelopeBody for WindState {
    type Body = WindState;

    fn envelope_body(&self) -> Result<Self::Body> {
        finite("time", self.time)?;
        finite("speed", self.speed)?;
        finite("direction", self.direction)?;
        Ok(self.clone())
    }

    fn from_envelope_body(body: Value) -> Result<Self> {
        require_keys(&body, &WIND_STATE_KEYS, "WIND_STATE body")?;
        from_value(body, "WIND_STATE body")
    }
}

impl EnvelopeBody for Trajectory {
    type Body = Vec<Envelope<'static, ShipStateBody>>;

    fn envelope_body(&self) -> Result<Self::Body> {
        if let Some((idx, expected, actual)) = self.arity_mismatch() {
            return Err(Error::Encode(format!(
                "waypoint {idx} has {actual} actuators, expected {expected}"
            )));
        }
        self.iter()
            .map(|state| -> Result<_> {
                Ok(Envelope {
                    kind: MessageKind::ShipState.envelope_tag(),
                    body: ShipStateBody::try_from(state)?,
                })
            })
            .collect()
    }

    fn from_envelope_body(body: Value) -> Result<Self> {
        let Value::Array(waypoints) = body else {
            return Err(Error::Schema("TRAJ body is not an array".into()));
        };
        let ship_states = waypoints
            .into_iter()
            .enumerate()
            .map(|(idx, waypoint)| {
                let (kind, body) = open(waypoint, &format!("TRAJ waypoint {idx}"))?;
                check_kind(MessageKind::ShipState, kind)?;
                ShipState::from_envelope_body(body)
            })
            .collect::<Result<Vec<_>>>()?;
        let traj = Trajectory::new(ship_states);
        if let Some((idx, expected, actual)) = traj.arity_mismatch() {
            return Err(Error::Schema(format!(
                "waypoint {idx} has {actual} actuators, expected {expected}"
            )));
        }
        Ok(traj)
    }
}

/// Encode `msg` as a JSON envelope.
///
/// # Errors
/// [Error::Encode] if `msg` holds a non-finite number, a trajectory's waypoints disagree
/// on the number of actuators, or serialization fails.
pub fn encode<M: Message>(msg: &M) -> Result<String> {
    let envelope = Envelope {
        kind: M::KIND.envelope_tag(),
        body: msg.envelope_body()?,
    };
    serde_json::to_string(&envelope).map_err(|err| Error::Encode(err.to_string()))
}

/// Decode a JSON envelope of kind `M::KIND`.
///
/// Every diagnostic is also logged as a warning.
#[must_use]
pub fn decode<M: Message>(text: &str) -> Decoded<M> {
    let zult = decode_inner(text);
    if let Err(ref err) = zult {
        warn!(kind = %M::KIND, encoding = "json", "{err}");
    }
    match zult {
        Ok(value) => Decoded {
            value: Some(value),
            diagnostics: Vec::default(),
        },
        Err(err) => Decoded::failed(err),
    }
}

fn decode_inner<M: Message>(text: &str) -> Result<M> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| Error::Format(format!("invalid JSON: {err}")))?;
    let (kind, body) = open(value, "envelope")?;
    check_kind(M::KIND, kind)?;
    M::from_envelope_body(body)
}

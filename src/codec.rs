//! Encoding and decoding of entities to the sentence and envelope wire formats.
//!
//! Decoding is total: malformed input never panics or returns `Err`. Instead a
//! [Decoded] is returned carrying the value, if one could be produced, along with any
//! diagnostics. A checksum mismatch is the only diagnostic that still yields a value.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::envelope::{self, EnvelopeBody};
use crate::error::{Error, Result};
use crate::model::{ShipState, Trajectory, WindState};
use crate::sentence::{self, SentenceBody};

/// The kinds of messages exchanged over the bus.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ShipState,
    WindState,
    Trajectory,
}

impl MessageKind {
    /// Type token used by the sentence format, e.g., `CUSSTATE`.
    #[must_use]
    pub fn sentence_tag(self) -> &'static str {
        match self {
            MessageKind::ShipState => "CUSSTATE",
            MessageKind::WindState => "CUSWIND",
            MessageKind::Trajectory => "CUSTRAJ",
        }
    }

    /// Type tag used by the envelope format, e.g., `SHIP_STATE`.
    #[must_use]
    pub fn envelope_tag(self) -> &'static str {
        match self {
            MessageKind::ShipState => "SHIP_STATE",
            MessageKind::WindState => "WIND_STATE",
            MessageKind::Trajectory => "TRAJ",
        }
    }

    /// Standard topic for this kind.
    #[must_use]
    pub fn topic(self) -> &'static str {
        match self {
            MessageKind::ShipState => "ship_state/topic",
            MessageKind::WindState => "wind_state/topic",
            MessageKind::Trajectory => "trajectory/topic",
        }
    }

    /// Lookup a kind by either its sentence or envelope tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            MessageKind::ShipState,
            MessageKind::WindState,
            MessageKind::Trajectory,
        ]
        .into_iter()
        .find(|kind| kind.sentence_tag() == tag || kind.envelope_tag() == tag)
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.envelope_tag())
    }
}

/// Wire encodings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// `$TYPE,...*XX` checksummed sentence.
    #[default]
    Sentence,
    /// `{"type": ..., "body": ...}` JSON envelope.
    Json,
}

/// An entity that can be exchanged in either wire encoding.
pub trait Message: SentenceBody + EnvelopeBody {
    const KIND: MessageKind;
}

impl Message for ShipState {
    const KIND: MessageKind = MessageKind::ShipState;
}

impl Message for WindState {
    const KIND: MessageKind = MessageKind::WindState;
}

impl Message for Trajectory {
    const KIND: MessageKind = MessageKind::Trajectory;
}

/// Result of decoding wire text.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// The decoded value, if the text could be decoded.
    pub value: Option<T>,
    /// Everything noteworthy found while decoding, in the order found.
    pub diagnostics: Vec<Error>,
}

impl<T> Decoded<T> {
    pub(crate) fn failed(err: Error) -> Self {
        Decoded {
            value: None,
            diagnostics: vec![err],
        }
    }

    /// Consume, discarding any diagnostics.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        self.value
    }

    /// True if decoding produced a value and no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.value.is_some() && self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn has_checksum_warning(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Error::Checksum { .. }))
    }
}

/// Encode `msg` using `encoding`.
///
/// # Errors
/// [Error::Encode] if `msg` cannot be represented in `encoding`, e.g., a trajectory whose
/// waypoints disagree on the number of actuators, or a non-finite value in JSON.
pub fn encode<M: Message>(msg: &M, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Sentence => sentence::encode(msg),
        Encoding::Json => envelope::encode(msg),
    }
}

/// Decode `text` as a message of kind `M::KIND` using `encoding`.
#[must_use]
pub fn decode<M: Message>(text: &str, encoding: Encoding) -> Decoded<M> {
    match encoding {
        Encoding::Sentence => sentence::decode(text),
        Encoding::Json => envelope::decode(text),
    }
}

/// Classify `text` by kind and encoding without decoding the body.
///
/// Returns `None` if the text looks like neither encoding or carries an unknown type.
#[must_use]
pub fn peek_kind(text: &str) -> Option<(MessageKind, Encoding)> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix('$') {
        let end = rest.find([',', '*']).unwrap_or(rest.len());
        return MessageKind::from_tag(&rest[..end]).map(|kind| (kind, Encoding::Sentence));
    }
    if text.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        let tag = value.get("type")?.as_str()?;
        return MessageKind::from_tag(tag).map(|kind| (kind, Encoding::Json));
    }
    None
}

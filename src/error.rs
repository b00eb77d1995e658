#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An entity constructor was given inconsistent fields.
    #[error("invalid {field}: expected {expected}, got {actual}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Expected length or count
        expected: usize,
        /// Length or count we got
        actual: usize,
    },

    /// Wire text does not follow the expected grammar.
    #[error("malformed message: {0}")]
    Format(String),

    /// Envelope is missing required keys, or sentence waypoints disagree on actuator arity.
    #[error("schema violation: {0}")]
    Schema(String),

    #[error("expected message type {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Advisory only. Decoding continues when this is reported.
    #[error("checksum mismatch: transmitted {transmitted:?}, computed {computed:02X}")]
    Checksum { transmitted: String, computed: u8 },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure reported by the publish/subscribe transport.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("encode error: {0}")]
    Encode(String),
}

impl Error {
    pub(crate) fn validation(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::Validation {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// True for diagnostics that do not prevent a value from being decoded.
    #[must_use]
    pub fn is_advisory(&self) -> bool {
        matches!(self, Error::Checksum { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

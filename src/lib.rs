//! Vessel telemetry codecs for publish/subscribe transports.
//!
//! Ship states, wind states, and multi-waypoint trajectories are translated between the
//! in-process [model] and two wire encodings:
//!
//! * [sentence]: `$CUSSTATE,...*XX` style sentences with an XOR checksum.
//! * [envelope]: `{"type": "SHIP_STATE", "body": {...}}` JSON envelopes.
//!
//! Decoding never fails hard; see [Decoded]. The [window] module derives a bounded
//! look-ahead trajectory from a recorded dataset, and [bridge] adapts the codecs to an
//! application provided transport.
//!
//! # Example
//! ```
//! use nmea_bridge::{decode, encode, Encoding, WindState};
//!
//! let wind = WindState::new(1_700_000_000.0, 5.5, 0.75);
//! let text = encode(&wind, Encoding::Sentence).unwrap();
//! assert!(text.starts_with("$CUSWIND,1700000000,5.5,0.75*"));
//!
//! let decoded = decode::<WindState>(&text, Encoding::Sentence);
//! assert!(decoded.is_clean());
//! assert_eq!(decoded.value, Some(wind));
//! ```
mod error;

pub mod bridge;
pub mod codec;
pub mod dataset;
pub mod envelope;
pub mod model;
pub mod sentence;
pub mod window;

pub use bridge::{BridgeOpts, Connection, MessageHandler, Publisher, Subscriber, Transport};
pub use codec::{decode, encode, peek_kind, Decoded, Encoding, Message, MessageKind};
pub use error::{Error, Result};
pub use model::{Actuators, ActuatorColumns, ShipState, Trajectory, TrajectoryColumns, WindState};
pub use window::{MovingTrajectory, WindowOpts};

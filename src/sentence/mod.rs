//! Checksum-delimited sentence format.
//!
//! ```text
//! $<TYPE>,<field1>,<field2>,...[;<field1>,...]*<XX>
//! ```
//! Where `XX` is the two digit uppercase hex XOR checksum of all characters between `$`
//! and `*`. A checksum mismatch is reported as a diagnostic but does not prevent decoding.
mod body;
mod checksum;

pub use body::SentenceBody;
pub use checksum::checksum;

use tracing::{trace, warn};

use crate::codec::{Decoded, Message};
use crate::error::{Error, Result};

/// Start delimiter
pub const START: char = '$';
/// Checksum delimiter
pub const CHECKSUM_DELIM: char = '*';

/// A sentence split into its parts. Borrows from the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Message type token, e.g., `CUSWIND`.
    pub tag: &'a str,
    /// Everything after the first comma following the tag.
    pub body: &'a str,
    /// Checksum field as transmitted.
    pub transmitted: &'a str,
    content: &'a str,
}

impl<'a> Sentence<'a> {
    /// Split `text` into tag, body, and checksum. Surrounding whitespace, such as a trailing
    /// CRLF, is ignored.
    ///
    /// # Errors
    /// [Error::Format] if the start or checksum delimiters, or the type token, are missing.
    pub fn parse(text: &'a str) -> Result<Self> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix(START) else {
            return Err(Error::Format(format!("missing '{START}' start delimiter")));
        };
        let Some((content, transmitted)) = rest.rsplit_once(CHECKSUM_DELIM) else {
            return Err(Error::Format(format!(
                "missing '{CHECKSUM_DELIM}' checksum delimiter"
            )));
        };
        let (tag, body) = content.split_once(',').unwrap_or((content, ""));
        if tag.is_empty() {
            return Err(Error::Format("missing message type".into()));
        }
        Ok(Sentence {
            tag,
            body,
            transmitted,
            content,
        })
    }

    /// Checks the transmitted checksum.
    ///
    /// # Errors
    /// [Error::Checksum] if it does not match the computed checksum.
    pub fn verify(&self) -> Result<()> {
        checksum::verify(self.content, self.transmitted).map_err(|computed| Error::Checksum {
            transmitted: self.transmitted.to_string(),
            computed,
        })
    }
}

/// Frame `body` as a sentence of type `tag`, appending the checksum.
#[must_use]
pub fn frame(tag: &str, body: &str) -> String {
    let content = format!("{tag},{body}");
    let sum = checksum(&content);
    format!("{START}{content}{CHECKSUM_DELIM}{sum:02X}")
}

/// Encode `msg` as a sentence.
///
/// # Errors
/// [Error::Encode] if `msg` has no sentence representation.
pub fn encode<M: Message>(msg: &M) -> Result<String> {
    Ok(frame(M::KIND.sentence_tag(), &msg.sentence_body()?))
}

/// Decode a sentence of kind `M::KIND`.
///
/// Every diagnostic is also logged as a warning.
#[must_use]
pub fn decode<M: Message>(text: &str) -> Decoded<M> {
    let decoded = decode_inner(text);
    for diag in &decoded.diagnostics {
        warn!(kind = %M::KIND, encoding = "sentence", "{diag}");
    }
    decoded
}

fn decode_inner<M: Message>(text: &str) -> Decoded<M> {
    let sentence = match Sentence::parse(text) {
        Ok(sentence) => sentence,
        Err(err) => return Decoded::failed(err),
    };
    trace!(tag = sentence.tag, "parsed sentence");

    let mut diagnostics = Vec::default();
    if let Err(err) = sentence.verify() {
        diagnostics.push(err);
    }

    let expected = M::KIND.sentence_tag();
    if sentence.tag != expected {
        diagnostics.push(Error::TypeMismatch {
            expected: expected.to_string(),
            actual: sentence.tag.to_string(),
        });
        return Decoded {
            value: None,
            diagnostics,
        };
    }

    let value = match M::from_sentence_body(sentence.body) {
        Ok(value) => Some(value),
        Err(err) => {
            diagnostics.push(err);
            None
        }
    };
    Decoded { value, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WindState;

    #[test]
    fn test_parse() {
        let sentence = Sentence::parse("$CUSWIND,1,2,3*4D\r\n").unwrap();
        assert_eq!(sentence.tag, "CUSWIND");
        assert_eq!(sentence.body, "1,2,3");
        assert_eq!(sentence.transmitted, "4D");
        assert_eq!(sentence.verify(), Ok(()));
    }

    #[test]
    fn test_frame() {
        assert_eq!(frame("CUSWIND", "1,2,3"), "$CUSWIND,1,2,3*4D");
    }

    #[test]
    fn test_decode_corrupt_checksum() {
        let decoded = decode::<WindState>("$CUSWIND,1,2,3*00");
        assert_eq!(decoded.value, Some(WindState::new(1.0, 2.0, 3.0)));
        assert_eq!(
            decoded.diagnostics,
            vec![Error::Checksum {
                transmitted: "00".into(),
                computed: 0x4D
            }]
        );
    }

    #[test]
    fn test_decode_type_mismatch() {
        let text = frame("CUSSTATE", "1,2,3");
        let decoded = decode::<WindState>(&text);
        assert!(decoded.value.is_none());
        assert_eq!(
            decoded.diagnostics,
            vec![Error::TypeMismatch {
                expected: "CUSWIND".into(),
                actual: "CUSSTATE".into()
            }]
        );
    }
}

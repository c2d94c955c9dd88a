//! Enumeration types for the lexidrift simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// The communicative intent of a message.
///
/// A closed set: exactly these five variants exist, and parsing any other
/// tag fails (see [`ParseMessageTypeError`]). The variant shapes the
/// content a sender drafts but carries no semantics beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// An opening salutation.
    Greeting,
    /// A query built from an interrogative plus a vocabulary word.
    Question,
    /// A declarative pairing of vocabulary words.
    Statement,
    /// A politeness-marked ask.
    Request,
    /// A short reply.
    Response,
}

impl MessageType {
    /// All variants, in declaration order, for uniform random choice.
    pub const ALL: [Self; 5] = [
        Self::Greeting,
        Self::Question,
        Self::Statement,
        Self::Request,
        Self::Response,
    ];

    /// The lowercase wire tag for this variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Question => "question",
            Self::Statement => "statement",
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl core::fmt::Display for MessageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string tag does not name a [`MessageType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type tag: {tag}")]
pub struct ParseMessageTypeError {
    /// The tag that failed to parse.
    pub tag: String,
}

impl core::str::FromStr for MessageType {
    type Err = ParseMessageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greeting" => Ok(Self::Greeting),
            "question" => Ok(Self::Question),
            "statement" => Ok(Self::Statement),
            "request" => Ok(Self::Request),
            "response" => Ok(Self::Response),
            other => Err(ParseMessageTypeError {
                tag: String::from(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_has_five_distinct_variants() {
        let mut tags: Vec<&str> = MessageType::ALL.iter().map(|m| m.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 5);
    }

    #[test]
    fn parse_known_tags() {
        for variant in MessageType::ALL {
            let parsed: Result<MessageType, _> = variant.as_str().parse();
            assert_eq!(parsed.ok(), Some(variant));
        }
    }

    #[test]
    fn parse_unknown_tag_rejected() {
        let parsed: Result<MessageType, _> = "chant".parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&MessageType::Greeting).ok();
        assert_eq!(json.as_deref(), Some("\"greeting\""));
    }
}

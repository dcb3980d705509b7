//! Message identity and metadata shared by every JSON-RPC exchange.

use serde::{Deserialize, Serialize};

/// A JSON-RPC request identifier.
///
/// MCP permits string or numeric ids on the wire; we additionally allow a
/// `Uuid` variant for ids the core mints itself for outbound calls (§4.G),
/// serialized as a string so it stays wire-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
    /// UUID identifier, serialized as its string form
    Uuid(
        #[serde(with = "uuid_as_string")]
        uuid::Uuid,
    ),
}

mod uuid_as_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(d)?;
        Uuid::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}

impl MessageId {
    /// Mint a fresh id for an outbound request originated by the server.
    #[must_use]
    pub fn new_outbound() -> Self {
        Self::Uuid(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_id_round_trips() {
        let id = MessageId::String("abc".into());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn number_id_round_trips() {
        let id = MessageId::Number(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn outbound_ids_are_unique() {
        let a = MessageId::new_outbound();
        let b = MessageId::new_outbound();
        assert_ne!(a, b);
    }
}

use serde_json::Value;
use std::fmt;

const MAX_ROOM_LEN: usize = 64;

/// A normalized pad identifier: lowercase ASCII letters, digits, `-` and `_`,
/// at most 64 characters, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// Normalize raw client input. Disallowed characters are stripped, the
    /// result is truncated, and `None` is returned when nothing is left.
    pub fn parse(input: &str) -> Option<Self> {
        let room: String = input
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
            .take(MAX_ROOM_LEN)
            .collect();

        if room.is_empty() {
            None
        } else {
            Some(Self(room))
        }
    }

    /// Normalize a room field from a JSON frame. Scalars are taken in their
    /// textual form, except falsy ones (`0`, `false`, `null`) which are
    /// rejected like the empty string. Objects and arrays are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Self::parse(&n.to_string()),
            Value::Bool(true) => Self::parse("true"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoomId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

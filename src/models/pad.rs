use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The single unit of truth for a pad: its current text and how many
/// accepted edits produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub version: u64,
}

impl PadRecord {
    pub fn new(text: impl Into<String>, version: u64) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }
}

/// Response for a pad lookup
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PadResponse {
    pub room: String,
    pub text: String,
    pub version: u64,
    /// Connections currently attached to the pad
    pub members: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty_pad() {
        let record: PadRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, PadRecord::default());

        let record: PadRecord = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(record, PadRecord::new("hi", 0));
    }

    #[test]
    fn negative_version_is_rejected() {
        assert!(serde_json::from_str::<PadRecord>(r#"{"text":"x","version":-1}"#).is_err());
    }
}

use serde::{Deserialize, Deserializer, Serializer};

pub const NEVER: &str = "never";

/// `Option<String>` timestamp that persists `None` as `"never"`.
pub mod never_or_timestamp {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(NEVER))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|value| !value.is_empty() && value != NEVER))
    }
}

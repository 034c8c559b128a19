use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Checks `[A-Za-z0-9][A-Za-z0-9_-]*`.
pub fn validate_workspace_name(value: &str) -> Result<(), String> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err("workspace name must be non-empty".to_string());
    };
    if !first.is_ascii_alphanumeric() {
        return Err("workspace name must start with an ASCII letter or digit".to_string());
    }
    if chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
        return Ok(());
    }
    Err("workspace name must use only ASCII letters, digits, '-' or '_'".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkspaceName(String);

impl WorkspaceName {
    pub fn parse(raw: &str) -> Result<Self, String> {
        validate_workspace_name(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::borrow::Borrow<str> for WorkspaceName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for WorkspaceName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<'de> Deserialize<'de> for WorkspaceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .map_err(|err| D::Error::custom(format!("invalid workspace name `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_names_matching_the_workspace_pattern() {
        for name in ["work", "Work2", "9lives", "a-b_c", "x"] {
            assert!(WorkspaceName::parse(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn rejects_empty_and_punctuated_names() {
        for name in ["", " ", "-lead", "_lead", "has space", "dot.name", "slash/name"] {
            assert!(WorkspaceName::parse(name).is_err(), "{name:?} should fail");
        }
    }

    #[test]
    fn deserialize_reports_the_offending_value() {
        let err = serde_json::from_str::<WorkspaceName>("\"bad name\"").expect_err("invalid");
        assert!(err.to_string().contains("bad name"));
    }
}

//! Hierarchical topic names such as `shortbread_v1/landuse`.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ComposeError;

/// Validated topic name made of `/`-separated segments.
///
/// Segments are non-empty and use lowercase ASCII letters, digits, `_` and
/// `-`.
///
/// # Examples
/// ```
/// use spirit_core::TopicName;
///
/// let name = TopicName::new("shortbread_v1/landuse").expect("valid name");
/// assert_eq!(name.namespace(), Some("shortbread_v1"));
/// assert_eq!(name.local_name(), "landuse");
/// assert!(TopicName::new("shortbread_v1/").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TopicName(String);

impl TopicName {
    /// Validate and wrap a topic name.
    pub fn new(value: impl Into<String>) -> Result<Self, ComposeError> {
        let value = value.into();
        if let Some(reason) = invalid_reason(&value) {
            return Err(ComposeError::InvalidTopicName { value, reason });
        }
        Ok(Self(value))
    }

    /// Borrow the full name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last `/`, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(namespace, _)| namespace)
    }

    /// The final segment.
    pub fn local_name(&self) -> &str {
        self.0
            .rsplit_once('/')
            .map_or(self.0.as_str(), |(_, local)| local)
    }
}

fn invalid_reason(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("must not be empty");
    }
    for segment in value.split('/') {
        if segment.is_empty() {
            return Some("segments must not be empty");
        }
        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
        if !segment.chars().all(allowed) {
            return Some("segments may only contain lowercase ASCII letters, digits, '_' and '-'");
        }
    }
    None
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TopicName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TopicName {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for TopicName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("landuse", None, "landuse")]
    #[case("core/name-with-fallback", Some("core"), "name-with-fallback")]
    #[case("a/b/c", Some("a/b"), "c")]
    fn splits_namespace_from_local_name(
        #[case] raw: &str,
        #[case] namespace: Option<&str>,
        #[case] local: &str,
    ) {
        let name = TopicName::new(raw).unwrap();
        assert_eq!(name.namespace(), namespace);
        assert_eq!(name.local_name(), local);
    }

    #[rstest]
    #[case("")]
    #[case("/landuse")]
    #[case("shortbread_v1//landuse")]
    #[case("Shortbread/landuse")]
    #[case("shortbread v1/landuse")]
    fn rejects_malformed_names(#[case] raw: &str) {
        assert!(matches!(
            TopicName::new(raw),
            Err(ComposeError::InvalidTopicName { .. })
        ));
    }

    #[test]
    fn deserialising_validates() {
        let ok: TopicName = serde_json::from_str("\"core/name-with-fallback\"").unwrap();
        assert_eq!(ok.as_str(), "core/name-with-fallback");
        assert!(serde_json::from_str::<TopicName>("\"Bad Name\"").is_err());
    }
}

//! Per-load topic options.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{ComposeError, TopicName};

/// Options passed to a topic when it is loaded.
///
/// The map is untyped; each topic parses it into its own struct with
/// [`TopicConfig::parse`].
///
/// # Examples
/// ```
/// use serde::Deserialize;
/// use spirit_core::{TopicConfig, TopicName};
///
/// #[derive(Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Options {
///     name: String,
/// }
///
/// let topic = TopicName::new("shortbread_v1/ocean").expect("valid name");
/// let config: TopicConfig = serde_json::from_str(r#"{"name": "sea"}"#).expect("json object");
/// let options: Options = config.parse(&topic).expect("valid options");
/// assert_eq!(options.name, "sea");
///
/// let bad: TopicConfig = serde_json::from_str(r#"{"colour": "blue"}"#).expect("json object");
/// assert!(bad.parse::<Options>(&topic).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicConfig(Map<String, JsonValue>);

impl TopicConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether no option is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw option value.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Deserialise the options into `T`, reporting failures against `topic`.
    pub fn parse<T: DeserializeOwned>(&self, topic: &TopicName) -> Result<T, ComposeError> {
        serde_json::from_value(JsonValue::Object(self.0.clone())).map_err(|err| {
            ComposeError::InvalidConfiguration {
                topic: topic.clone(),
                message: err.to_string(),
            }
        })
    }

    /// Fail unless the configuration is empty.
    pub fn require_empty(&self, topic: &TopicName) -> Result<(), ComposeError> {
        match self.0.keys().next() {
            None => Ok(()),
            Some(key) => Err(ComposeError::InvalidConfiguration {
                topic: topic.clone(),
                message: format!("topic takes no options, got '{key}'"),
            }),
        }
    }
}

impl From<Map<String, JsonValue>> for TopicConfig {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

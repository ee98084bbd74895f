//! Ordered tag-key fallbacks such as `name_de` → `name:de`, then `name`.

use std::collections::BTreeMap;

use crate::schema::validate_identifier;
use crate::{ComposeError, SchemaError, Tags, TopicName};

/// Output key together with its ordered candidate tag keys.
///
/// # Examples
/// ```
/// use spirit_core::KeyFallbackSpec;
/// use spirit_core::test_support::tags;
///
/// # fn main() -> Result<(), spirit_core::SchemaError> {
/// let spec = KeyFallbackSpec::new("name_de", ["name:de", "name"])?;
/// assert_eq!(spec.resolve(&tags([("name", "Wald")])), Some("Wald"));
/// assert_eq!(spec.resolve(&tags([("name", "Wald"), ("name:de", "Forst")])), Some("Forst"));
/// assert_eq!(spec.resolve(&tags([])), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFallbackSpec {
    output: String,
    candidates: Vec<String>,
}

impl KeyFallbackSpec {
    /// Build a spec. The output key must be a valid column identifier and at
    /// least one candidate is required.
    pub fn new<I, S>(output: impl Into<String>, candidates: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output = output.into();
        validate_identifier(&output)?;
        let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        if candidates.is_empty() {
            return Err(SchemaError::EmptyFallback { output });
        }
        Ok(Self { output, candidates })
    }

    /// Output key.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Candidate tag keys in priority order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Value of the first candidate present in `tags`.
    pub fn resolve<'t>(&self, tags: &'t Tags) -> Option<&'t str> {
        self.candidates
            .iter()
            .find_map(|key| tags.get(key))
            .map(String::as_str)
    }
}

/// Registry of fallback specs keyed by output key.
#[derive(Debug, Clone, Default)]
pub struct KeyFallbackResolver {
    specs: BTreeMap<String, KeyFallbackSpec>,
}

impl KeyFallbackResolver {
    /// Register `spec` on behalf of `topic`.
    ///
    /// Registering an identical spec again is a no-op.
    pub fn register(&mut self, topic: &TopicName, spec: KeyFallbackSpec) -> Result<(), ComposeError> {
        match self.specs.get(spec.output()) {
            Some(existing) if existing == &spec => Ok(()),
            Some(existing) => Err(ComposeError::ConflictingFallback {
                topic: topic.clone(),
                key: spec.output,
                existing: existing.candidates.clone(),
                candidates: spec.candidates,
            }),
            None => {
                log::debug!(
                    "topic '{topic}' registered fallback '{}' -> [{}]",
                    spec.output,
                    spec.candidates.join(", ")
                );
                self.specs.insert(spec.output.clone(), spec);
                Ok(())
            }
        }
    }

    /// Resolve `output_key` against `tags`.
    ///
    /// `None` means no candidate is present, or no spec is registered for
    /// the key.
    pub fn resolve<'t>(&self, output_key: &str, tags: &'t Tags) -> Option<&'t str> {
        self.specs.get(output_key)?.resolve(tags)
    }

    /// Spec registered for `output_key`.
    pub fn spec(&self, output_key: &str) -> Option<&KeyFallbackSpec> {
        self.specs.get(output_key)
    }

    /// Registered output keys in sorted order.
    pub fn output_keys(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Whether any spec is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

//! Composition driver: load a theme's topics in order and freeze the result.
//!
//! # Examples
//! ```
//! use spirit_core::{ThemeDefinition, TopicCatalog, TopicDescriptor, TopicName, compose};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = TopicCatalog::default();
//! catalog.register(TopicDescriptor::new(TopicName::new("demo/empty")?, "", |_, _| Ok(())))?;
//!
//! let theme: ThemeDefinition = serde_json::from_str(r#"{"topics": [{"name": "demo/empty"}]}"#)?;
//! let composed = compose(&catalog, &theme.topics)?;
//! assert!(composed.schema().is_empty());
//! assert!(composed.warnings().is_empty());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::CallbackPipeline;
use crate::{
    ComposeError, Composer, IngestError, InputObject, KeyFallbackResolver, RowSink, Schema,
    TopicCatalog, TopicConfig, TopicName,
};

/// One topic to load, with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRequest {
    /// Catalog name of the topic.
    pub name: TopicName,
    /// Options passed to the topic's initialiser.
    #[serde(default)]
    pub config: TopicConfig,
}

impl TopicRequest {
    /// Request `name` with no options.
    pub fn new(name: TopicName) -> Self {
        Self {
            name,
            config: TopicConfig::new(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_config(mut self, config: TopicConfig) -> Self {
        self.config = config;
        self
    }
}

/// Ordered topic list making up a theme, usually read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeDefinition {
    /// Topics in load order.
    pub topics: Vec<TopicRequest>,
}

/// A topic was loaded before a topic it declares it runs after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingWarning {
    topic: TopicName,
    should_follow: TopicName,
}

impl OrderingWarning {
    pub(crate) const fn new(topic: TopicName, should_follow: TopicName) -> Self {
        Self {
            topic,
            should_follow,
        }
    }

    /// Topic whose callbacks run too early.
    pub const fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Topic it was expected to follow.
    pub const fn should_follow(&self) -> &TopicName {
        &self.should_follow
    }
}

impl fmt::Display for OrderingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "topic '{}' was loaded before '{}' and its callbacks will run first",
            self.topic, self.should_follow
        )
    }
}

/// Frozen result of a successful composition.
///
/// Only a composed theme can process objects, so the schema cannot change
/// once ingestion starts.
#[derive(Debug, Clone)]
pub struct ComposedTheme {
    schema: Schema,
    pipeline: CallbackPipeline,
    fallbacks: KeyFallbackResolver,
    load_order: Vec<TopicName>,
    warnings: Vec<OrderingWarning>,
}

impl ComposedTheme {
    pub(crate) const fn new(
        schema: Schema,
        pipeline: CallbackPipeline,
        fallbacks: KeyFallbackResolver,
        load_order: Vec<TopicName>,
        warnings: Vec<OrderingWarning>,
    ) -> Self {
        Self {
            schema,
            pipeline,
            fallbacks,
            load_order,
            warnings,
        }
    }

    /// Frozen output schema.
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Callback lists per geometry class.
    pub const fn pipeline(&self) -> &CallbackPipeline {
        &self.pipeline
    }

    /// Registered key fallbacks.
    pub const fn fallbacks(&self) -> &KeyFallbackResolver {
        &self.fallbacks
    }

    /// Topics in the order their initialisers completed.
    pub fn load_order(&self) -> &[TopicName] {
        &self.load_order
    }

    /// Ordering problems found during composition.
    pub fn warnings(&self) -> &[OrderingWarning] {
        &self.warnings
    }

    /// Run `object` through the pipeline and hand every row to `sink`.
    ///
    /// Returns the number of rows written.
    pub fn process(&self, object: &InputObject, sink: &mut dyn RowSink) -> Result<usize, IngestError> {
        let rows = self.pipeline.run(&self.schema, object)?;
        let written = rows.len();
        for row in rows {
            sink.accept(row)?;
        }
        Ok(written)
    }
}

/// Load every requested topic, strictly in order, and freeze the result.
///
/// The first failure aborts composition; nothing partially built escapes.
pub fn compose(catalog: &TopicCatalog, requests: &[TopicRequest]) -> Result<ComposedTheme, ComposeError> {
    let mut composer = Composer::new(catalog);
    for request in requests {
        composer.load(&request.name, &request.config)?;
    }
    let theme = composer.finish();
    log::info!(
        "composed {} topics into {} tables",
        theme.load_order().len(),
        theme.schema().len()
    );
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TopicDescriptor;

    #[test]
    fn theme_requests_default_to_empty_config() {
        let theme: ThemeDefinition =
            serde_json::from_str(r#"{"topics": [{"name": "a/b"}, {"name": "a/c", "config": {"k": 1}}]}"#)
                .unwrap();
        assert!(theme.topics[0].config.is_empty());
        assert!(!theme.topics[1].config.is_empty());
    }

    #[test]
    fn theme_rejects_invalid_topic_names() {
        assert!(serde_json::from_str::<ThemeDefinition>(r#"{"topics": [{"name": "A B"}]}"#).is_err());
    }

    #[test]
    fn first_failure_aborts_composition() {
        let mut catalog = TopicCatalog::default();
        catalog
            .register(TopicDescriptor::new(TopicName::new("a/ok").unwrap(), "", |_, _| Ok(())))
            .unwrap();
        let requests = [
            TopicRequest::new(TopicName::new("a/ok").unwrap()),
            TopicRequest::new(TopicName::new("a/missing").unwrap()),
        ];
        assert!(matches!(
            compose(&catalog, &requests),
            Err(ComposeError::UnknownTopic { name }) if name == "a/missing"
        ));
    }
}

//! Explicit catalog of the topics a composition may load.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{TopicContext, TopicConfig, TopicName};
use crate::ComposeError;

/// Topic initialiser, run once when the topic is loaded.
pub type TopicInit = fn(&mut TopicContext<'_>, &TopicConfig) -> Result<(), ComposeError>;

/// A loadable topic.
#[derive(Debug, Clone)]
pub struct TopicDescriptor {
    name: TopicName,
    summary: &'static str,
    runs_after: Vec<TopicName>,
    init: TopicInit,
}

impl TopicDescriptor {
    /// Describe a topic with the initialiser that contributes its schema
    /// and callbacks.
    pub fn new(name: TopicName, summary: &'static str, init: TopicInit) -> Self {
        Self {
            name,
            summary,
            runs_after: Vec::new(),
            init,
        }
    }

    /// Declare that this topic's callbacks expect `other`'s callbacks to
    /// have run first for the same object.
    #[must_use]
    pub fn with_runs_after(mut self, other: TopicName) -> Self {
        self.runs_after.push(other);
        self
    }

    /// Topic name.
    pub const fn name(&self) -> &TopicName {
        &self.name
    }

    /// One-line description.
    pub const fn summary(&self) -> &'static str {
        self.summary
    }

    /// Topics that should be loaded before this one.
    pub fn runs_after(&self) -> &[TopicName] {
        &self.runs_after
    }

    pub(crate) const fn init(&self) -> TopicInit {
        self.init
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two descriptors share one name.
    #[error("topic '{name}' is registered twice")]
    DuplicateTopic {
        /// Clashing name.
        name: TopicName,
    },
    /// A descriptor could not be built.
    #[error("invalid topic descriptor: {0}")]
    InvalidDescriptor(#[from] ComposeError),
}

/// Namespace → name → descriptor mapping populated at start-up.
///
/// # Examples
/// ```
/// use spirit_core::{ComposeError, TopicCatalog, TopicDescriptor, TopicName};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut catalog = TopicCatalog::default();
/// catalog.register(TopicDescriptor::new(
///     TopicName::new("demo/empty")?,
///     "does nothing",
///     |_, _| Ok(()),
/// ))?;
/// assert!(catalog.resolve("demo/empty").is_ok());
/// assert!(matches!(
///     catalog.resolve("demo/missing"),
///     Err(ComposeError::UnknownTopic { .. })
/// ));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    namespaces: BTreeMap<String, BTreeMap<String, TopicDescriptor>>,
}

impl TopicCatalog {
    /// Add a descriptor.
    pub fn register(&mut self, descriptor: TopicDescriptor) -> Result<(), CatalogError> {
        let namespace = descriptor.name().namespace().unwrap_or_default().to_owned();
        let local = descriptor.name().local_name().to_owned();
        let topics = self.namespaces.entry(namespace).or_default();
        if topics.contains_key(&local) {
            return Err(CatalogError::DuplicateTopic {
                name: descriptor.name,
            });
        }
        topics.insert(local, descriptor);
        Ok(())
    }

    /// Look up a topic by its full name.
    pub fn resolve(&self, name: &str) -> Result<&TopicDescriptor, ComposeError> {
        let name = TopicName::new(name)?;
        self.namespaces
            .get(name.namespace().unwrap_or_default())
            .and_then(|topics| topics.get(name.local_name()))
            .ok_or_else(|| ComposeError::UnknownTopic {
                name: name.to_string(),
            })
    }

    /// Every registered topic name, sorted by namespace then name.
    pub fn names(&self) -> impl Iterator<Item = &TopicName> {
        self.descriptors().map(TopicDescriptor::name)
    }

    /// Every registered descriptor, sorted by namespace then name.
    pub fn descriptors(&self) -> impl Iterator<Item = &TopicDescriptor> {
        self.namespaces.values().flat_map(BTreeMap::values)
    }

    /// Number of registered topics.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Topic loading with at-most-once semantics and cycle detection.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::{TopicCatalog, TopicConfig, TopicName};
use crate::compose::{ComposedTheme, OrderingWarning};
use crate::pipeline::CallbackPipeline;
use crate::{
    ColumnDefinition, ComposeError, Emitter, GeometryClass, IndexDefinition, IngestError,
    InputObject, KeyFallbackResolver, KeyFallbackSpec, PassData, SchemaError, SchemaRegistry,
    TableDefinition, TableHandle,
};

/// Result of a successful [`Composer::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The topic's initialiser ran.
    Loaded,
    /// The topic was already loaded; nothing changed.
    AlreadyLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
}

#[derive(Debug, Default)]
struct Session {
    registry: SchemaRegistry,
    pipeline: CallbackPipeline,
    fallbacks: KeyFallbackResolver,
    states: HashMap<TopicName, LoadState>,
    stack: Vec<TopicName>,
    load_order: Vec<TopicName>,
}

impl Session {
    fn load(
        &mut self,
        catalog: &TopicCatalog,
        name: &str,
        config: &TopicConfig,
    ) -> Result<LoadOutcome, ComposeError> {
        let descriptor = catalog.resolve(name)?;
        let topic = descriptor.name().clone();
        match self.states.get(&topic) {
            Some(LoadState::Loaded) => {
                if !config.is_empty() {
                    warn!("topic '{topic}' is already loaded; ignoring the new configuration");
                }
                return Ok(LoadOutcome::AlreadyLoaded);
            }
            Some(LoadState::Loading) => {
                let mut chain = self.stack.clone();
                chain.push(topic);
                return Err(ComposeError::CyclicTopicLoad { chain });
            }
            None => {}
        }

        debug!("loading topic '{topic}'");
        let checkpoint = self.checkpoint();
        self.states.insert(topic.clone(), LoadState::Loading);
        self.stack.push(topic.clone());
        let result = {
            let mut context = TopicContext {
                catalog,
                session: self,
                topic: topic.clone(),
            };
            (descriptor.init())(&mut context, config)
        };
        self.stack.pop();

        match result {
            Ok(()) => {
                self.states.insert(topic.clone(), LoadState::Loaded);
                self.load_order.push(topic);
                Ok(LoadOutcome::Loaded)
            }
            Err(err) => {
                debug!("topic '{topic}' failed to load; discarding its contributions");
                self.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            registry: self.registry.clone(),
            pipeline: self.pipeline.clone(),
            fallbacks: self.fallbacks.clone(),
            states: self.states.clone(),
            load_order: self.load_order.len(),
        }
    }

    /// Undo everything recorded since `checkpoint`, including topics the
    /// failed topic required.
    fn restore(&mut self, checkpoint: Checkpoint) {
        self.registry = checkpoint.registry;
        self.pipeline = checkpoint.pipeline;
        self.fallbacks = checkpoint.fallbacks;
        self.states = checkpoint.states;
        self.load_order.truncate(checkpoint.load_order);
    }
}

/// Session state captured before a topic's initialiser runs.
struct Checkpoint {
    registry: SchemaRegistry,
    pipeline: CallbackPipeline,
    fallbacks: KeyFallbackResolver,
    states: HashMap<TopicName, LoadState>,
    load_order: usize,
}

/// Loads topics from a catalog and accumulates their contributions.
///
/// # Examples
/// ```
/// use spirit_core::{Composer, LoadOutcome, TopicCatalog, TopicConfig, TopicDescriptor, TopicName};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut catalog = TopicCatalog::default();
/// catalog.register(TopicDescriptor::new(TopicName::new("demo/empty")?, "", |_, _| Ok(())))?;
///
/// let mut composer = Composer::new(&catalog);
/// assert_eq!(composer.load("demo/empty", &TopicConfig::new())?, LoadOutcome::Loaded);
/// assert_eq!(composer.load("demo/empty", &TopicConfig::new())?, LoadOutcome::AlreadyLoaded);
/// assert_eq!(composer.finish().load_order().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Composer<'c> {
    catalog: &'c TopicCatalog,
    session: Session,
}

impl<'c> Composer<'c> {
    /// Start an empty composition over `catalog`.
    pub fn new(catalog: &'c TopicCatalog) -> Self {
        Self {
            catalog,
            session: Session::default(),
        }
    }

    /// Load `name` with `config`, unless it is already loaded.
    ///
    /// A request for a topic that is still loading fails with
    /// [`ComposeError::CyclicTopicLoad`]. A failed load leaves the topic
    /// unloaded and discards its contributions, including those of the
    /// topics it required.
    pub fn load(&mut self, name: &str, config: &TopicConfig) -> Result<LoadOutcome, ComposeError> {
        self.session.load(self.catalog, name, config)
    }

    /// Whether `name` has finished loading.
    pub fn is_loaded(&self, name: &str) -> bool {
        TopicName::new(name).is_ok_and(|topic| {
            self.session.states.get(&topic) == Some(&LoadState::Loaded)
        })
    }

    /// Freeze the accumulated contributions.
    ///
    /// Topics loaded before a topic they declare `runs_after` produce an
    /// [`OrderingWarning`]; the composition still succeeds.
    pub fn finish(self) -> ComposedTheme {
        let Session {
            registry,
            pipeline,
            fallbacks,
            load_order,
            ..
        } = self.session;
        let warnings = ordering_warnings(self.catalog, &load_order);
        for warning in &warnings {
            warn!("{warning}");
        }
        ComposedTheme::new(registry.freeze(), pipeline, fallbacks, load_order, warnings)
    }
}

fn ordering_warnings(catalog: &TopicCatalog, load_order: &[TopicName]) -> Vec<OrderingWarning> {
    let position = |name: &TopicName| load_order.iter().position(|loaded| loaded == name);
    let mut warnings = Vec::new();
    for (index, topic) in load_order.iter().enumerate() {
        let Ok(descriptor) = catalog.resolve(topic) else {
            continue;
        };
        for earlier in descriptor.runs_after() {
            if position(earlier).is_some_and(|other| other > index) {
                warnings.push(OrderingWarning::new(topic.clone(), earlier.clone()));
            }
        }
    }
    warnings
}

/// Handle through which a topic's initialiser contributes to the
/// composition.
///
/// Every change is attributed to the topic being loaded.
pub struct TopicContext<'a> {
    catalog: &'a TopicCatalog,
    session: &'a mut Session,
    topic: TopicName,
}

impl std::fmt::Debug for TopicContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicContext")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl TopicContext<'_> {
    /// Topic being loaded.
    pub const fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Declare a table owned by this topic.
    pub fn declare_table(&mut self, definition: TableDefinition) -> Result<TableHandle, ComposeError> {
        let result = self.session.registry.declare_table(&self.topic, definition);
        result.map_err(|source| self.schema_error(source))
    }

    /// Append a column to a table this topic declared.
    pub fn add_column(&mut self, table: TableHandle, column: ColumnDefinition) -> Result<(), ComposeError> {
        let result = self.session.registry.add_column(&self.topic, table, column);
        result.map_err(|source| self.schema_error(source))
    }

    /// Append an index to a table this topic declared.
    pub fn add_index(&mut self, table: TableHandle, index: IndexDefinition) -> Result<(), ComposeError> {
        let result = self.session.registry.add_index(&self.topic, table, index);
        result.map_err(|source| self.schema_error(source))
    }

    /// Current definition of a declared table.
    pub fn table(&self, table: TableHandle) -> Result<&TableDefinition, ComposeError> {
        self.session
            .registry
            .table(table)
            .map_err(|source| self.schema_error(source))
    }

    /// Register a callback for one geometry class.
    pub fn register<F>(&mut self, class: GeometryClass, callback: F)
    where
        F: Fn(&InputObject, &mut PassData, &mut Emitter<'_>) -> Result<(), IngestError>
            + Send
            + Sync
            + 'static,
    {
        self.session
            .pipeline
            .register(class, self.topic.clone(), callback);
    }

    /// Register one callback for several geometry classes.
    pub fn register_classes<F>(&mut self, classes: &[GeometryClass], callback: F)
    where
        F: Fn(&InputObject, &mut PassData, &mut Emitter<'_>) -> Result<(), IngestError>
            + Send
            + Sync
            + 'static,
    {
        let shared: crate::Callback = Arc::new(callback);
        for &class in classes {
            self.session
                .pipeline
                .push(class, self.topic.clone(), Arc::clone(&shared));
        }
    }

    /// Register a key fallback.
    pub fn add_fallback(&mut self, spec: KeyFallbackSpec) -> Result<(), ComposeError> {
        self.session.fallbacks.register(&self.topic, spec)
    }

    /// Fallbacks registered so far.
    pub fn fallbacks(&self) -> &KeyFallbackResolver {
        &self.session.fallbacks
    }

    /// Load another topic from within this topic's initialiser.
    pub fn require(&mut self, name: &str, config: &TopicConfig) -> Result<LoadOutcome, ComposeError> {
        self.session.load(self.catalog, name, config)
    }

    /// Whether `name` has finished loading.
    pub fn is_loaded(&self, name: &str) -> bool {
        TopicName::new(name).is_ok_and(|topic| {
            self.session.states.get(&topic) == Some(&LoadState::Loaded)
        })
    }

    fn schema_error(&self, source: SchemaError) -> ComposeError {
        ComposeError::Schema {
            topic: self.topic.clone(),
            source,
        }
    }
}

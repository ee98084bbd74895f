//! Topic names, configuration, the catalog and the loader.

mod catalog;
mod config;
mod loader;
mod name;

pub use catalog::{CatalogError, TopicCatalog, TopicDescriptor, TopicInit};
pub use config::TopicConfig;
pub use loader::{Composer, LoadOutcome, TopicContext};
pub use name::TopicName;

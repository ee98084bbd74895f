//! Built-in topics for the Shortbread v1 tile schema.
//!
//! [`builtin_catalog`] registers every topic under its catalog name:
//!
//! | Topic | Table | Options |
//! |---|---|---|
//! | `core/name-with-fallback` | none | `keys`: output key → candidate tags |
//! | `shortbread_v1/landuse` | `landuse` | none |
//! | `shortbread_v1/pois` | `pois` | none |
//! | `shortbread_v1/addresses` | `addresses` | none |
//! | `shortbread_v1/ocean` | `ocean` | `name`: table name |
//!
//! Load order matters. Name-bearing topics read the fallback keys present
//! when they load, and `addresses` must follow `pois`.
//!
//! # Examples
//! ```
//! use spirit_core::{TopicName, TopicRequest, compose};
//! use spirit_topics::builtin_catalog;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = builtin_catalog()?;
//! let requests = [
//!     TopicRequest::new(TopicName::new("core/name-with-fallback")?),
//!     TopicRequest::new(TopicName::new("shortbread_v1/landuse")?),
//! ];
//! let theme = compose(&catalog, &requests)?;
//! assert!(theme.schema().table("landuse").is_some());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod addresses;
pub mod landuse;
pub mod name_fallback;
pub mod ocean;
pub mod pois;

use spirit_core::{CatalogError, TopicCatalog};

/// Catalog holding every built-in topic.
pub fn builtin_catalog() -> Result<TopicCatalog, CatalogError> {
    let descriptors = [
        name_fallback::descriptor()?,
        landuse::descriptor()?,
        pois::descriptor()?,
        addresses::descriptor()?,
        ocean::descriptor()?,
    ];
    let mut catalog = TopicCatalog::default();
    for descriptor in descriptors {
        catalog.register(descriptor)?;
    }
    log::debug!("built-in catalog holds {} topics", catalog.len());
    Ok(catalog)
}

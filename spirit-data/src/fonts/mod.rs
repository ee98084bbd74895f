//! Font download and glyph conversion for map styles.
//!
//! [`fetch_fonts`] walks the `sources` of a [`FontConfig`]. Each font is
//! downloaded into a cache under the fonts directory using a conditional
//! request, converted into glyph PBFs by a [`GlyphBuilder`] and, for archive
//! sources, accompanied by the configured archive members. A rerun against
//! an unchanged source transfers nothing and leaves existing glyphs alone.

mod cache;
mod error;
mod glyphs;
mod ops;
mod source;
mod types;

#[doc(hidden)]
pub mod test_support;
#[doc(hidden)]
pub use test_support::block_on_for_tests;

pub use error::{FontError, GlyphBuildError, TransportError};
pub use glyphs::{CommandGlyphBuilder, GlyphBuilder};
pub use ops::fetch_fonts;
pub use source::{
    DEFAULT_USER_AGENT, DefaultFontSource, FetchOutcome, FileFontSource, FontSource,
    HttpFontSource,
};
pub use types::{
    ArchiveFormat, ArchiveSpec, FetchOptions, FetchReport, FontConfig, FontOutcome, FontSettings,
    FontSourceSpec, FontStatus,
};

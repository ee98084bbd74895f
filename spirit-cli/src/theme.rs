//! Theme file loading.

use camino::Utf8Path;
use spirit_core::{ComposedTheme, ThemeDefinition, compose};
use spirit_topics::builtin_catalog;

use crate::CliError;

/// Read a JSON theme definition and compose it against the built-in topics.
///
/// Composition logs its own ordering warnings and summary.
pub(crate) fn load_theme(path: &Utf8Path) -> Result<ComposedTheme, CliError> {
    let text = spirit_fs::read_to_string(path).map_err(|source| CliError::ReadTheme {
        path: path.to_path_buf(),
        source,
    })?;
    let definition: ThemeDefinition =
        serde_json::from_str(&text).map_err(|source| CliError::ParseTheme {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog = builtin_catalog()?;
    compose(&catalog, &definition.topics).map_err(|source| CliError::Compose {
        path: path.to_path_buf(),
        source,
    })
}

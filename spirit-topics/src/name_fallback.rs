//! `core/name-with-fallback`: localised name columns with ordered fallbacks.
//!
//! The topic registers one [`KeyFallbackSpec`] per output key and a
//! callback for every geometry class that stores each resolved value in
//! the pass data. Topics loaded afterwards read the values through
//! [`name_columns`] and [`name_values`].

use std::collections::BTreeMap;

use serde::Deserialize;
use spirit_core::{
    ComposeError, GeometryClass, InputObject, KeyFallbackSpec, PassData, RowValues, TopicConfig,
    TopicContext, TopicDescriptor, TopicName,
};

/// Catalog name of the topic.
pub const NAME: &str = "core/name-with-fallback";

const PASS_PREFIX: &str = "fallback/";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Options {
    #[serde(default = "default_keys")]
    keys: BTreeMap<String, Vec<String>>,
}

fn default_keys() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        ("name".to_owned(), vec!["name".to_owned()]),
        (
            "name_de".to_owned(),
            vec!["name:de".to_owned(), "name".to_owned()],
        ),
        (
            "name_en".to_owned(),
            vec!["name:en".to_owned(), "name".to_owned()],
        ),
    ])
}

pub(crate) fn descriptor() -> Result<TopicDescriptor, ComposeError> {
    Ok(TopicDescriptor::new(
        TopicName::new(NAME)?,
        "name columns resolved through ordered tag fallbacks",
        init,
    ))
}

fn init(ctx: &mut TopicContext<'_>, config: &TopicConfig) -> Result<(), ComposeError> {
    let options: Options = config.parse(ctx.topic())?;
    let mut specs = Vec::with_capacity(options.keys.len());
    for (output, candidates) in options.keys {
        let spec = KeyFallbackSpec::new(output, candidates).map_err(|source| ComposeError::Schema {
            topic: ctx.topic().clone(),
            source,
        })?;
        ctx.add_fallback(spec.clone())?;
        specs.push(spec);
    }
    ctx.register_classes(&GeometryClass::ALL, move |object, pass, _| {
        for spec in &specs {
            let key = pass_key(spec.output());
            if let Some(value) = spec.resolve(object.tags()) {
                pass.set(key.as_str(), value);
            }
            pass.claim(key);
        }
        Ok(())
    });
    Ok(())
}

fn pass_key(output: &str) -> String {
    format!("{PASS_PREFIX}{output}")
}

/// Name columns a topic should declare.
///
/// These are the registered fallback output keys, or a single `name`
/// column when no fallback topic has been loaded.
pub fn name_columns(ctx: &TopicContext<'_>) -> Vec<String> {
    let keys: Vec<String> = ctx.fallbacks().output_keys().map(str::to_owned).collect();
    if keys.is_empty() {
        vec!["name".to_owned()]
    } else {
        keys
    }
}

/// Name value for `column`.
///
/// A column covered by a fallback takes the resolved value, which may be
/// absent. Any other column reads the object's tag of the same name.
pub fn name_value<'a>(object: &'a InputObject, pass: &'a PassData, column: &str) -> Option<&'a str> {
    let key = pass_key(column);
    if pass.is_claimed(&key) {
        pass.get(&key)
    } else {
        object.tag(column)
    }
}

/// Add every present name value to `values`.
///
/// Returns the values and whether any name was found.
pub fn name_values(
    object: &InputObject,
    pass: &PassData,
    columns: &[String],
    values: RowValues,
) -> (RowValues, bool) {
    columns.iter().fold((values, false), |(row, found), column| {
        match name_value(object, pass, column) {
            Some(name) => (row.set(column.as_str(), name), true),
            None => (row, found),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_catalog;
    use spirit_core::{Composer, test_support::StaticGeometry, test_support::object};

    fn composer_with(config: &TopicConfig) -> Result<spirit_core::ComposedTheme, ComposeError> {
        let catalog = builtin_catalog().expect("built-in catalog");
        let mut composer = Composer::new(&catalog);
        composer.load(NAME, config)?;
        Ok(composer.finish())
    }

    #[test]
    fn default_keys_register_three_fallbacks() {
        let theme = composer_with(&TopicConfig::new()).expect("composes");
        let keys: Vec<_> = theme.fallbacks().output_keys().collect();
        assert_eq!(keys, ["name", "name_de", "name_en"]);
    }

    #[test]
    fn configured_keys_replace_the_defaults() {
        let config: TopicConfig =
            serde_json::from_str(r#"{"keys": {"name": ["name", "name:en", "name:de"]}}"#).expect("json");
        let theme = composer_with(&config).expect("composes");
        let spec = theme.fallbacks().spec("name").expect("name fallback");
        assert_eq!(spec.candidates(), ["name", "name:en", "name:de"]);
        assert_eq!(theme.fallbacks().output_keys().count(), 1);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let config = TopicConfig::new().with("languages", "de");
        assert!(matches!(
            composer_with(&config),
            Err(ComposeError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn empty_candidate_lists_are_rejected() {
        let config: TopicConfig = serde_json::from_str(r#"{"keys": {"name": []}}"#).expect("json");
        assert!(matches!(composer_with(&config), Err(ComposeError::Schema { .. })));
    }

    #[test]
    fn name_value_prefers_the_resolved_fallback() {
        let cafe = object(
            1,
            GeometryClass::Point,
            [("name", "Cafe"), ("name:de", "Kaffeehaus")],
            StaticGeometry::point(0.0, 0.0),
        );
        let mut pass = PassData::default();
        assert_eq!(name_value(&cafe, &pass, "name_de"), None);
        pass.set(pass_key("name_de"), "Kaffeehaus");
        pass.claim(pass_key("name_de"));
        assert_eq!(name_value(&cafe, &pass, "name_de"), Some("Kaffeehaus"));
        assert_eq!(name_value(&cafe, &pass, "name"), Some("Cafe"));
    }

    #[test]
    fn unresolved_fallback_hides_the_raw_tag() {
        let park = object(
            2,
            GeometryClass::Area,
            [("leisure", "park"), ("name", "Lakeside")],
            StaticGeometry::square(1.0),
        );
        let mut pass = PassData::default();
        pass.claim(pass_key("name"));
        assert_eq!(name_value(&park, &pass, "name"), None);
        assert_eq!(name_value(&park, &pass, "name_en"), None);
    }
}

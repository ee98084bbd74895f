//! Tag helpers for classifying OSM elements.
//!
//! A closed way describes an area when it has at least four refs, is not
//! tagged `area=no`, and is either tagged `area=yes` or carries one of the
//! [`AREA_KEYS`].

use spirit_core::Tags;

/// Keys whose presence turns a closed way into an area.
pub const AREA_KEYS: &[&str] = &[
    "aeroway",
    "amenity",
    "building",
    "building:part",
    "landuse",
    "leisure",
    "man_made",
    "military",
    "natural",
    "place",
    "shop",
    "tourism",
    "water",
];

pub(super) fn collect_tags<'a, T>(tags: T) -> Tags
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

pub(super) fn is_area(tags: &Tags, refs: &[i64]) -> bool {
    let closed = refs.len() >= 4 && refs.first() == refs.last();
    if !closed {
        return false;
    }
    match tags.get("area").map(String::as_str) {
        Some("no") => false,
        Some("yes") => true,
        _ => AREA_KEYS.iter().any(|key| tags.contains_key(*key)),
    }
}

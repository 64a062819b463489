//! Shared helpers for integration tests.
//!
//! Integration tests under `tests/` compile as independent crates. This module
//! is included via `mod common;` in individual test files to share fixtures and
//! helpers while keeping test modules small and avoiding duplication.

use anyhow::{Context, Result};
use diplomat::eval::{Properties, Value, evaluate};
use diplomat::expression::Expression;
use diplomat::localize::localize_layers;
use diplomat::style::Layer;
use std::path::PathBuf;

/// Build an owned locale list.
pub fn locales(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| (*tag).to_owned()).collect()
}

/// Build feature properties from string pairs.
pub fn properties(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), serde_json::Value::from(*value)))
        .collect()
}

/// Localize `text_field` in a one-layer style and return the rewritten field.
pub fn localized_text_field(text_field: Expression, tags: &[&str]) -> Result<Expression> {
    let mut layers = vec![Layer::symbol("label", None, text_field)];
    localize_layers(&mut layers, &locales(tags));
    layers
        .first()
        .and_then(Layer::text_field)
        .cloned()
        .context("localized layer should keep its text field")
}

/// Localize `text_field`, then evaluate it for a feature.
pub fn evaluate_localized(
    text_field: Expression,
    tags: &[&str],
    feature: &Properties,
) -> Result<Value> {
    let localized = localized_text_field(text_field, tags)?;
    evaluate(&localized, feature).context("evaluate localized text field")
}

/// Path to a file under `tests/data`.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

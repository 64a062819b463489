//! CLI parsing helpers for clap value parsers.

use crate::eval::Properties;
use url::Url;

/// Accept a comma-separated locale list.
///
/// Tags are passed through verbatim; only a list with no tags at all is
/// rejected.
pub(super) fn parse_language_list(s: &str) -> Result<String, String> {
    if s.split(',').all(|tag| tag.trim().is_empty()) {
        return Err(String::from("language list must contain at least one tag"));
    }
    Ok(s.to_owned())
}

pub(super) fn parse_url(s: &str) -> Result<String, String> {
    Url::parse(s)
        .map(|_| s.to_owned())
        .map_err(|err| format!("invalid URL '{s}': {err}"))
}

/// Parse feature properties given as a JSON object.
pub(super) fn parse_properties(s: &str) -> Result<Properties, String> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("properties must be a JSON object, got {other}")),
        Err(err) => Err(format!("invalid properties JSON: {err}")),
    }
}

//! Localized name field lookups and collation rules.
//!
//! Vector tiles carry one name field per language (`name:en`, `name:de`, ...)
//! plus the local name in `name`. OpenMapTiles transportation layers also
//! keep a handful of legacy underscore fields (`name_en`, `name_de`).

use crate::expression::{self, Expression};
use crate::locale_resolution::is_english;
use serde_json::json;

/// Unqualified field holding the local name.
pub const NAME_FIELD: &str = "name";

/// Locales that have a legacy underscore-joined name field.
pub const LEGACY_LOCALES: &[&str] = &["de", "en"];

/// Field holding the name in a given locale, for example `name:en-US`.
#[must_use]
pub fn locale_field(locale: &str) -> String {
    format!("{NAME_FIELD}:{locale}")
}

/// Legacy field holding the name in a given locale, when one exists.
#[must_use]
pub fn legacy_field(locale: &str) -> Option<String> {
    LEGACY_LOCALES
        .contains(&locale)
        .then(|| format!("{NAME_FIELD}_{locale}"))
}

/// Build the name fields tried for a ranked locale list, most preferred first.
#[must_use]
pub fn name_fields(locales: &[String], include_legacy_fields: bool) -> Vec<String> {
    let mut fields = Vec::with_capacity(locales.len().saturating_mul(2).saturating_add(1));
    for locale in locales {
        fields.push(locale_field(locale));
        if include_legacy_fields && let Some(legacy) = legacy_field(locale) {
            fields.push(legacy);
        }
    }
    fields.push(NAME_FIELD.to_owned());
    fields
}

/// Build a `coalesce` expression over the localized name fields.
///
/// Each locale contributes its `name:<locale>` field in rank order. With
/// `include_legacy_fields`, locales listed in [`LEGACY_LOCALES`] are followed
/// by their legacy field. The local `name` field comes last.
///
/// # Examples
///
/// ```rust
/// use diplomat::localized_name::localized_name_expression;
/// use serde_json::json;
///
/// let locales = ["en-US".to_owned(), "en".to_owned()];
/// assert_eq!(
///     localized_name_expression(&locales, true),
///     json!(["coalesce", ["get", "name:en-US"], ["get", "name:en"], ["get", "name_en"], ["get", "name"]]),
/// );
/// ```
#[must_use]
pub fn localized_name_expression(locales: &[String], include_legacy_fields: bool) -> Expression {
    expression::op(
        "coalesce",
        name_fields(locales, include_legacy_fields)
            .iter()
            .map(|field| expression::get(field)),
    )
}

/// Build a case-insensitive `collator` expression for the top-ranked locale.
///
/// Diacritics are ignored only when `diacritic_insensitive` is requested and
/// the top-ranked locale is English; every other language treats accented
/// letters as distinct. An empty locale list omits the `locale` option so the
/// renderer's default applies.
///
/// # Examples
///
/// ```rust
/// use diplomat::localized_name::collator_expression;
/// use serde_json::json;
///
/// assert_eq!(
///     collator_expression(&["en-US".to_owned()], true),
///     json!(["collator", {"case-sensitive": false, "diacritic-sensitive": false, "locale": "en-US"}]),
/// );
/// ```
#[must_use]
pub fn collator_expression(locales: &[String], diacritic_insensitive: bool) -> Expression {
    let top = locales.first();
    let diacritic_sensitive = !(diacritic_insensitive && top.is_some_and(|tag| is_english(tag)));
    let mut options = json!({
        "case-sensitive": false,
        "diacritic-sensitive": diacritic_sensitive,
    });
    if let (Some(tag), Some(map)) = (top, options.as_object_mut()) {
        map.insert("locale".to_owned(), Expression::from(tag.as_str()));
    }
    expression::op("collator", [options])
}

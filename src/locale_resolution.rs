//! Locale resolution helpers for label localization.
//!
//! These helpers centralize how the ranked locale list is built from the
//! available preference sources: an explicit override (usually the
//! `language` parameter of a map URL fragment) wins outright, otherwise the
//! ordered user-agent preferences are used. Every tag is followed by its
//! primary language so labels can fall back from `en-US` to `en`.

use ortho_config::LanguageIdentifier;
use std::str::FromStr;
use tracing::debug;
use url::{Url, form_urlencoded};

/// URL fragment parameter that carries the locale override.
pub const LANGUAGE_PARAMETER: &str = "language";

/// Ordered language preferences supplied by the host environment.
pub trait LanguagePreferences {
    /// Preferred languages, most preferred first.
    fn languages(&self) -> Vec<String>;

    /// The single most preferred language, when known.
    fn language(&self) -> Option<String>;
}

/// Language preferences backed by `sys-locale`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemPreferences;

impl LanguagePreferences for SystemPreferences {
    fn languages(&self) -> Vec<String> {
        sys_locale::get_locales()
            .filter_map(|raw| normalize_locale_tag(&raw))
            .collect()
    }

    fn language(&self) -> Option<String> {
        sys_locale::get_locale().and_then(|raw| normalize_locale_tag(&raw))
    }
}

/// Fixed language preferences, for hosts that already know them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticPreferences {
    languages: Vec<String>,
    language: Option<String>,
}

impl StaticPreferences {
    /// Build preferences from an ordered list and a most preferred language.
    #[must_use]
    pub fn new<I, S>(languages: I, language: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            language: language.map(ToOwned::to_owned),
        }
    }
}

impl LanguagePreferences for StaticPreferences {
    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn language(&self) -> Option<String> {
        self.language.clone()
    }
}

/// Normalize a raw system locale string into a valid BCP 47 language tag.
///
/// This strips encoding suffixes (for example `.UTF-8`), removes variant
/// sections (for example `@latin`), replaces underscores with hyphens, and
/// validates the result using `LanguageIdentifier`. Override values are not
/// passed through here; they are accepted verbatim.
///
/// # Examples
///
/// ```rust
/// use diplomat::locale_resolution::normalize_locale_tag;
///
/// assert_eq!(normalize_locale_tag("en_US.UTF-8"), Some("en-US".to_string()));
/// assert_eq!(normalize_locale_tag("es-ES"), Some("es-ES".to_string()));
/// assert_eq!(normalize_locale_tag("C"), None);
/// ```
#[must_use]
pub fn normalize_locale_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed.split(['.', '@']).next().unwrap_or_default().trim();
    if stripped.is_empty() {
        return None;
    }
    let candidate = stripped.replace('_', "-");
    LanguageIdentifier::from_str(&candidate)
        .ok()
        .map(|lang| lang.to_string())
}

/// Read the locale override from a query-style URL fragment.
///
/// Empty or absent values yield `None`. Anything else is returned verbatim
/// after form decoding, without validation.
///
/// # Examples
///
/// ```rust
/// use diplomat::locale_resolution::language_from_fragment;
///
/// assert_eq!(language_from_fragment("map=1/2/3&language=tlh").as_deref(), Some("tlh"));
/// assert_eq!(language_from_fragment("map=1/2/3&language="), None);
/// assert_eq!(language_from_fragment("map=1/2/3"), None);
/// ```
#[must_use]
pub fn language_from_fragment(fragment: &str) -> Option<String> {
    let query = fragment.strip_prefix('#').unwrap_or(fragment);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == LANGUAGE_PARAMETER)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Read the locale override from the fragment of a map URL.
///
/// # Examples
///
/// ```rust
/// use diplomat::locale_resolution::language_from_url;
/// use url::Url;
///
/// let url = Url::parse("http://localhost:1776/#map=1/2/3&language=the King's English").unwrap();
/// assert_eq!(language_from_url(&url).as_deref(), Some("the King's English"));
/// ```
#[must_use]
pub fn language_from_url(url: &Url) -> Option<String> {
    url.fragment().and_then(language_from_fragment)
}

/// Return the primary language subtag of a locale tag.
///
/// The tag is cut at the first `-` or `_` and lowercased, so extension and
/// private-use sequences never survive. Text whose first subtag is not two to
/// eight ASCII letters is not a language tag and is returned unchanged.
///
/// ```rust
/// use diplomat::locale_resolution::primary_language;
///
/// assert_eq!(primary_language("zh-u-nu-hant"), "zh");
/// assert_eq!(primary_language("EN_us"), "en");
/// assert_eq!(primary_language("tlh"), "tlh");
/// assert_eq!(primary_language("the King's English"), "the King's English");
/// ```
#[must_use]
pub fn primary_language(tag: &str) -> String {
    let subtag = tag.split(['-', '_']).next().unwrap_or_default();
    if (2..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
        subtag.to_ascii_lowercase()
    } else {
        tag.to_owned()
    }
}

/// Return `true` when the tag's primary language is English.
#[must_use]
pub fn is_english(tag: &str) -> bool {
    primary_language(tag) == "en"
}

fn base_locales(override_language: Option<&str>, preferences: &impl LanguagePreferences) -> Vec<String> {
    let overridden: Vec<String> = override_language
        .into_iter()
        .flat_map(|list| list.split(','))
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if !overridden.is_empty() {
        return overridden;
    }
    let mut locales = preferences.languages();
    if let Some(preferred) = preferences.language()
        && !preferred.is_empty()
        && !locales.contains(&preferred)
    {
        locales.push(preferred);
    }
    locales
}

/// Resolve the ranked locale list used to localize labels.
///
/// An override is a comma-separated list that replaces the preferences
/// entirely. An override without any non-empty tag counts as no override. Otherwise the preferred languages are used, with
/// the most preferred language appended when it is missing. Each tag is then
/// followed by its primary language, and only the first occurrence of any tag
/// is kept.
///
/// # Examples
///
/// ```rust
/// use diplomat::locale_resolution::{StaticPreferences, ranked_locales};
///
/// let preferences = StaticPreferences::new(["tlh-UN", "ase"], Some("tlh"));
/// assert_eq!(ranked_locales(None, &preferences), ["tlh-UN", "tlh", "ase"]);
///
/// let overridden = ranked_locales(Some("fr-CA,de"), &preferences);
/// assert_eq!(overridden, ["fr-CA", "fr", "de"]);
/// ```
#[must_use]
pub fn ranked_locales(
    override_language: Option<&str>,
    preferences: &impl LanguagePreferences,
) -> Vec<String> {
    let mut ranked: Vec<String> = Vec::new();
    for tag in base_locales(override_language, preferences) {
        let primary = primary_language(&tag);
        for candidate in [tag, primary] {
            if !candidate.is_empty() && !ranked.contains(&candidate) {
                ranked.push(candidate);
            }
        }
    }
    debug!(
        override_language = override_language.unwrap_or_default(),
        locales = ?ranked,
        "resolved ranked locales"
    );
    ranked
}

/// Resolve the ranked locales for a map URL and the host preferences.
#[must_use]
pub fn ranked_locales_for_url(url: &Url, preferences: &impl LanguagePreferences) -> Vec<String> {
    let override_language = language_from_url(url);
    ranked_locales(override_language.as_deref(), preferences)
}

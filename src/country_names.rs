//! Country names for country label layers.
//!
//! Country labels are drawn from a code → name table rather than from tile
//! properties. The table follows the reader's top-ranked language, falling
//! back through the other ranked languages to English, and is presented in
//! capitals. English names get double spaces between words to match the
//! letter-spaced capitals of country labels.

use crate::locale_resolution::primary_language;
use lru::LruCache;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use tracing::debug;

/// Language used when no ranked language has a table.
pub const FALLBACK_LANGUAGE: &str = "en";

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Country code → display name.
pub type CountryNameTable = BTreeMap<String, String>;

/// Source of country display names per primary language.
pub trait CountryNameProvider {
    /// Return the names for `primary_language`, or `None` when unknown.
    fn localized_names(&self, primary_language: &str) -> Option<CountryNameTable>;
}

/// Country names loaded from a `{language: {code: name}}` JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StaticCountryNames {
    tables: BTreeMap<String, CountryNameTable>,
}

impl StaticCountryNames {
    /// Parse a `{language: {code: name}}` JSON document.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `json` is not an object of objects of
    /// strings.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Build a provider from tables keyed by primary language.
    #[must_use]
    pub const fn new(tables: BTreeMap<String, CountryNameTable>) -> Self {
        Self { tables }
    }
}

impl CountryNameProvider for StaticCountryNames {
    fn localized_names(&self, primary_language: &str) -> Option<CountryNameTable> {
        self.tables
            .get(primary_language)
            .or_else(|| self.tables.get(&primary_language.to_ascii_lowercase()))
            .cloned()
    }
}

/// Present a country name the way country labels draw it.
///
/// ```rust
/// use diplomat::country_names::present_name;
///
/// assert_eq!(present_name("United States", "en"), "UNITED  STATES");
/// assert_eq!(present_name("Usono", "eo"), "USONO");
/// ```
#[must_use]
pub fn present_name(name: &str, primary_language: &str) -> String {
    let upper = name.to_uppercase();
    if primary_language == FALLBACK_LANGUAGE {
        upper.replace(' ', "  ")
    } else {
        upper
    }
}

fn candidate_languages(locales: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(locales.len().saturating_add(1));
    let ranked = locales.iter().map(|tag| primary_language(tag));
    for language in ranked.chain([FALLBACK_LANGUAGE.to_owned()]) {
        if !language.is_empty() && !candidates.contains(&language) {
            candidates.push(language);
        }
    }
    candidates
}

/// Country names for the current locale list, cached per language.
#[derive(Debug)]
pub struct CountryNames<P> {
    provider: P,
    cache: LruCache<String, CountryNameTable>,
    language: Option<String>,
    names: CountryNameTable,
}

impl<P: CountryNameProvider> CountryNames<P> {
    /// Create an empty name set backed by `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: LruCache::new(CACHE_CAPACITY),
            language: None,
            names: CountryNameTable::new(),
        }
    }

    /// Load the names for a ranked locale list.
    ///
    /// Returns the primary language of the table now in use, or `None` when
    /// no candidate language has a table, in which case the names are
    /// cleared.
    pub fn refresh(&mut self, locales: &[String]) -> Option<&str> {
        let resolved = candidate_languages(locales)
            .into_iter()
            .find_map(|language| self.table_for(&language).map(|names| (language, names)));
        match resolved {
            Some((language, names)) => {
                debug!(language = %language, count = names.len(), "loaded country names");
                self.names = names;
                self.language = Some(language);
            }
            None => {
                debug!(locales = ?locales, "no country names for ranked locales");
                self.names.clear();
                self.language = None;
            }
        }
        self.language.as_deref()
    }

    fn table_for(&mut self, language: &str) -> Option<CountryNameTable> {
        if let Some(cached) = self.cache.get(language) {
            return Some(cached.clone());
        }
        let presented: CountryNameTable = self
            .provider
            .localized_names(language)?
            .into_iter()
            .map(|(code, name)| {
                let shown = present_name(&name, language);
                (code, shown)
            })
            .collect();
        self.cache.put(language.to_owned(), presented.clone());
        Some(presented)
    }

    /// Look up the presented name for a country code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// All presented names for the current language.
    #[must_use]
    pub const fn names(&self) -> &CountryNameTable {
        &self.names
    }

    /// Primary language of the current table.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Borrow the underlying provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

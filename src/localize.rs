//! Rewriting of style layers for a ranked locale list.
//!
//! Style authors place marker bindings in their text fields, for example
//!
//! ```json
//! ["let", "diplomat__localizedName", "", ["var", "diplomat__localizedName"]]
//! ```
//!
//! and [`localize_layers`] replaces the value bound to each marker with an
//! expression built for the reader's locales. Markers are recognized by
//! variable name, so rewriting an already localized style again simply
//! re-targets it.

use crate::country_names::{CountryNameProvider, CountryNameTable, CountryNames};
use crate::expression::{Expression, Marker};
use crate::gloss::{GlossLayout, localized_name_with_local_gloss};
use crate::localized_name::{collator_expression, localized_name_expression};
use crate::style::Layer;
use tracing::{debug, info};

/// Source layer whose features also carry legacy name fields.
pub const TRANSPORTATION_NAME_LAYER: &str = "transportation_name";

/// Expressions substituted for each marker.
#[derive(Debug, Clone, Copy)]
struct Substitutions<'a> {
    locales: &'a [String],
    include_legacy_fields: bool,
}

impl Substitutions<'_> {
    fn expression_for(self, marker: Marker) -> Option<Expression> {
        let Self {
            locales,
            include_legacy_fields,
        } = self;
        match marker {
            Marker::Name => Some(localized_name_expression(locales, include_legacy_fields)),
            Marker::Gloss => Some(localized_name_with_local_gloss(
                locales,
                include_legacy_fields,
                GlossLayout::Stacked,
            )),
            Marker::InlineGloss => Some(localized_name_with_local_gloss(
                locales,
                include_legacy_fields,
                GlossLayout::Inline,
            )),
            Marker::LocalizedCollator => Some(collator_expression(locales, false)),
            Marker::DiacriticInsensitiveCollator => Some(collator_expression(locales, true)),
            Marker::Unrecognized => None,
        }
    }

    /// Rewrite markers in `expr`, returning how many were substituted.
    ///
    /// Substituted values are not searched again. `literal` operands and
    /// option objects are never entered.
    fn rewrite(self, expr: &mut Expression) -> usize {
        let Some((head, operands)) = expr.as_array_mut().and_then(|items| items.split_first_mut())
        else {
            return 0;
        };
        match head.as_str() {
            None | Some("literal") => 0,
            Some("let") if !operands.len().is_multiple_of(2) => self.rewrite_let(operands),
            Some(_) => operands.iter_mut().map(|operand| self.rewrite(operand)).sum(),
        }
    }

    fn rewrite_let(self, operands: &mut [Expression]) -> usize {
        let Some((body, pairs)) = operands.split_last_mut() else {
            return 0;
        };
        let mut count: usize = 0;
        for pair in pairs.chunks_exact_mut(2) {
            let [name, value] = pair else {
                continue;
            };
            let marker = name.as_str().map_or(Marker::Unrecognized, Marker::of_variable);
            match self.expression_for(marker) {
                Some(replacement) => {
                    *value = replacement;
                    count = count.saturating_add(1);
                }
                None => count = count.saturating_add(self.rewrite(value)),
            }
        }
        count.saturating_add(self.rewrite(body))
    }
}

/// Rewrite the markers in one expression.
///
/// Returns the number of marker bindings substituted. Expressions without
/// markers are left untouched.
pub fn localize_expression(
    expr: &mut Expression,
    locales: &[String],
    include_legacy_fields: bool,
) -> usize {
    Substitutions {
        locales,
        include_legacy_fields,
    }
    .rewrite(expr)
}

/// Rewrite every layer's text field in place for `locales`.
///
/// Layers drawn from [`TRANSPORTATION_NAME_LAYER`] also consult the legacy
/// name fields. Returns the total number of marker bindings substituted.
pub fn localize_layers(layers: &mut [Layer], locales: &[String]) -> usize {
    let mut total: usize = 0;
    for layer in layers.iter_mut() {
        let include_legacy_fields = layer.source_layer.as_deref() == Some(TRANSPORTATION_NAME_LAYER);
        let id = layer.id.clone().unwrap_or_default();
        let Some(text_field) = layer.text_field_mut() else {
            continue;
        };
        let count = localize_expression(text_field, locales, include_legacy_fields);
        if count > 0 {
            debug!(layer = %id, substitutions = count, legacy = include_legacy_fields, "localized text field");
        }
        total = total.saturating_add(count);
    }
    total
}

/// Return localized copies of `layers`, leaving the originals untouched.
#[must_use]
pub fn localized_layers(layers: &[Layer], locales: &[String]) -> Vec<Layer> {
    let mut copies = layers.to_vec();
    localize_layers(&mut copies, locales);
    copies
}

/// Localizes layers and keeps the country names in step.
#[derive(Debug)]
pub struct LabelLocalizer<P> {
    country_names: CountryNames<P>,
}

impl<P: CountryNameProvider> LabelLocalizer<P> {
    /// Create a localizer that reads country names from `provider`.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            country_names: CountryNames::new(provider),
        }
    }

    /// Rewrite `layers` for `locales` and refresh the country names.
    ///
    /// Returns the number of marker bindings substituted.
    pub fn localize(&mut self, layers: &mut [Layer], locales: &[String]) -> usize {
        let substitutions = localize_layers(layers, locales);
        let language = self.country_names.refresh(locales).unwrap_or_default().to_owned();
        info!(
            locales = ?locales,
            substitutions,
            country_names = %language,
            "localized layers"
        );
        substitutions
    }

    /// Presented name of a country for the last localized locale list.
    #[must_use]
    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.country_names.get(code)
    }

    /// All presented country names for the last localized locale list.
    #[must_use]
    pub const fn country_names(&self) -> &CountryNameTable {
        self.country_names.names()
    }
}

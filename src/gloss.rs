//! Localized labels glossed with the local name.
//!
//! A glossed label shows the name in the reader's language and, in smaller
//! type between bidi-isolated parentheses, the name(s) used locally:
//!
//! ```text
//! Null Island
//! (Terra Nullius • 空虛島)
//! ```
//!
//! Local alternates that only differ from the label by case, by diacritics
//! (where the locale allows) or by a trailing qualifier ("Washington" under
//! "Washington, D.C.") are not repeated in the gloss.

use crate::expression::{self, Expression, equals, length, minus, op, plus, slice, var};
use crate::list_values::{list_values_expression, list_values_expression_omitting};
use crate::localized_name::{NAME_FIELD, collator_expression, localized_name_expression};
use serde_json::json;

/// Separator between glossed local names.
pub const GLOSS_SEPARATOR: &str = " • ";

/// Text scale applied to the gloss.
pub const GLOSS_SCALE: f64 = 0.8;

/// Opening parenthesis followed by FIRST STRONG ISOLATE.
pub const GLOSS_OPEN: &str = "(\u{2068}";

/// POP DIRECTIONAL ISOLATE followed by a closing parenthesis.
pub const GLOSS_CLOSE: &str = "\u{2069})";

/// Characters that may separate a name from a trailing qualifier.
const QUALIFIER_BOUNDARY: &str = " ,";

const LOCALIZED_VAR: &str = "diplomat__localized";
const LOCAL_VAR: &str = "diplomat__local";
const LABEL_VAR: &str = "diplomat__label";
const GLOSS_VAR: &str = "diplomat__gloss";

/// Placement of the gloss relative to the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlossLayout {
    /// Gloss on its own line; unlocalized alternates one per line.
    #[default]
    Stacked,
    /// Gloss on the label's line; unlocalized alternates joined by a bullet.
    Inline,
}

impl GlossLayout {
    const fn gloss_break(self) -> &'static str {
        match self {
            Self::Stacked => "\n",
            Self::Inline => " ",
        }
    }

    const fn alternate_separator(self) -> &'static str {
        match self {
            Self::Stacked => "\n",
            Self::Inline => GLOSS_SEPARATOR,
        }
    }
}

/// Collators used to compare a local name with the localized label.
#[derive(Debug, Clone, PartialEq)]
pub struct NameCollators {
    /// Case-insensitive, diacritic-sensitive.
    pub localized: Expression,
    /// Case-insensitive; diacritic-insensitive for English.
    pub diacritic_insensitive: Expression,
}

impl NameCollators {
    /// Collators for the top-ranked locale of `locales`.
    #[must_use]
    pub fn for_locales(locales: &[String]) -> Self {
        Self {
            localized: collator_expression(locales, false),
            diacritic_insensitive: collator_expression(locales, true),
        }
    }
}

/// True when `label` starts with `name` followed by a qualifier boundary.
fn extends_prefix(name: &Expression, label: &Expression, collator: &Expression) -> Expression {
    let name_length = length(name.clone());
    op(
        "all",
        [
            op(">", [name_length.clone(), Expression::from(0)]),
            op("<", [name_length.clone(), length(label.clone())]),
            equals(
                slice(label.clone(), Expression::from(0), Some(name_length.clone())),
                name.clone(),
                Some(collator.clone()),
            ),
            op(
                "in",
                [
                    slice(
                        label.clone(),
                        name_length.clone(),
                        Some(plus(name_length, Expression::from(1))),
                    ),
                    Expression::from(QUALIFIER_BOUNDARY),
                ],
            ),
        ],
    )
}

/// True when `label` ends with `name` preceded by a space.
fn extends_suffix(name: &Expression, label: &Expression, collator: &Expression) -> Expression {
    let name_length = length(name.clone());
    let offset = minus(length(label.clone()), name_length.clone());
    op(
        "all",
        [
            op(">", [name_length.clone(), Expression::from(0)]),
            op("<", [name_length, length(label.clone())]),
            equals(
                slice(label.clone(), offset.clone(), None),
                name.clone(),
                Some(collator.clone()),
            ),
            equals(
                slice(
                    label.clone(),
                    minus(offset.clone(), Expression::from(1)),
                    Some(offset),
                ),
                Expression::from(" "),
                None,
            ),
        ],
    )
}

/// Build a boolean expression that is true when `name` duplicates `label`.
///
/// Names are equivalent when they compare equal under `collator`, or when
/// `label` is `name` extended by a qualifier: a prefix match followed by a
/// space or comma ("New York" / "New York City", "Washington" /
/// "Washington, D.C."), or a suffix match preceded by a space ("Querétaro" /
/// "Santiago de Querétaro"). A label that merely starts with the same
/// letters ("Córdoba" / "Córdobaaa") is not equivalent.
#[must_use]
pub fn names_equivalent(name: &Expression, label: &Expression, collator: &Expression) -> Expression {
    op(
        "any",
        [
            equals(name.clone(), label.clone(), Some(collator.clone())),
            extends_prefix(name, label, collator),
            extends_suffix(name, label, collator),
        ],
    )
}

/// Build the label text, borrowing the local spelling when it is equivalent.
///
/// "Montreal" becomes "Montréal" and "Quebec City" becomes "Québec City" in
/// English, while "Null Island" stays as is next to a local "NULL Island".
fn label_expression(collators: &NameCollators) -> Expression {
    let localized = var(LOCALIZED_VAR);
    let local = var(LOCAL_VAR);
    let local_length = length(local.clone());
    op(
        "case",
        [
            op("in", [Expression::from(";"), local.clone()]),
            localized.clone(),
            equals(localized.clone(), local.clone(), Some(collators.localized.clone())),
            localized.clone(),
            equals(
                localized.clone(),
                local.clone(),
                Some(collators.diacritic_insensitive.clone()),
            ),
            local.clone(),
            extends_prefix(&local, &localized, &collators.diacritic_insensitive),
            expression::concat(vec![
                local.clone(),
                slice(localized.clone(), local_length.clone(), None),
            ]),
            extends_suffix(&local, &localized, &collators.diacritic_insensitive),
            expression::concat(vec![
                slice(
                    localized.clone(),
                    Expression::from(0),
                    Some(minus(length(localized.clone()), local_length)),
                ),
                local,
            ]),
            localized,
        ],
    )
}

fn single_section(text: Expression) -> Expression {
    op("format", [text, json!({})])
}

fn glossed_sections(layout: GlossLayout) -> Expression {
    op(
        "format",
        [
            var(LABEL_VAR),
            json!({}),
            Expression::from(layout.gloss_break()),
            json!({}),
            Expression::from(GLOSS_OPEN),
            json!({}),
            var(GLOSS_VAR),
            json!({ "font-scale": GLOSS_SCALE }),
            Expression::from(GLOSS_CLOSE),
            json!({}),
        ],
    )
}

/// Build a label that glosses the localized name with the local name(s).
///
/// The expression evaluates to a `format` value:
///
/// - without a localized name, the local alternates joined one per line
///   (stacked) or by a bullet (inline), as one section;
/// - when every local alternate duplicates the label, the label alone;
/// - otherwise the label, a break, and the remaining alternates joined by
///   [`GLOSS_SEPARATOR`] at [`GLOSS_SCALE`] inside bidi-isolated
///   parentheses (five sections).
#[must_use]
pub fn localized_name_with_local_gloss(
    locales: &[String],
    include_legacy_fields: bool,
    layout: GlossLayout,
) -> Expression {
    let collators = NameCollators::for_locales(locales);
    let localized = var(LOCALIZED_VAR);
    let local = var(LOCAL_VAR);

    let gloss = list_values_expression_omitting(
        local.clone(),
        Expression::from(GLOSS_SEPARATOR),
        |alternate| names_equivalent(alternate, &localized, &collators.diacritic_insensitive),
    );
    let glossed = op(
        "let",
        [
            Expression::from(LABEL_VAR),
            label_expression(&collators),
            Expression::from(GLOSS_VAR),
            gloss,
            op(
                "case",
                [
                    equals(var(GLOSS_VAR), Expression::from(""), None),
                    single_section(var(LABEL_VAR)),
                    glossed_sections(layout),
                ],
            ),
        ],
    );
    let unlocalized = single_section(list_values_expression(
        local.clone(),
        Expression::from(layout.alternate_separator()),
        None,
    ));

    op(
        "let",
        [
            Expression::from(LOCALIZED_VAR),
            op(
                "to-string",
                [localized_name_expression(locales, include_legacy_fields)],
            ),
            Expression::from(LOCAL_VAR),
            op("to-string", [expression::get(NAME_FIELD)]),
            op(
                "case",
                [
                    equals(localized, local, None),
                    unlocalized,
                    glossed,
                ],
            ),
        ],
    )
}

//! Expression tree model and marker vocabulary.
//!
//! Label rules are MapLibre-style expressions: a node is either a literal or a
//! JSON array whose first element names an operator. This module provides the
//! constructors used by the builders, the reserved variable names that style
//! authors bind as placeholders, and the [`Marker`] classifier the rewriter
//! switches on.
//!
//! ```rust
//! use diplomat::expression::{self, Marker};
//!
//! let placeholder = expression::localized_name();
//! assert_eq!(Marker::classify(&placeholder), Marker::Name);
//! assert_eq!(Marker::classify(&expression::get("name")), Marker::Unrecognized);
//! ```

use serde_json::json;

/// JSON representation of an expression node.
pub type Expression = serde_json::Value;

/// Variable bound to the localized name chain.
pub const LOCALIZED_NAME: &str = "diplomat__localizedName";
/// Variable bound to the localized name with a stacked local-language gloss.
pub const LOCALIZED_NAME_WITH_LOCAL_GLOSS: &str = "diplomat__localizedNameWithLocalGloss";
/// Variable bound to the localized name with an inline local-language gloss.
pub const LOCALIZED_NAME_INLINE: &str = "diplomat__localizedNameInline";
/// Variable bound to a collator for the preferred locale.
pub const LOCALIZED_COLLATOR: &str = "diplomat__localizedCollator";
/// Variable bound to a collator that ignores diacritics where the locale allows.
pub const DIACRITIC_INSENSITIVE_COLLATOR: &str = "diplomat__diacriticInsensitiveCollator";

/// Placeholder shape recognized by the rewriter.
///
/// Classification is by the reserved variable name of a `let` binding, so an
/// already rewritten binding is still recognized and can be re-targeted at a
/// new locale list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Localized name chain.
    Name,
    /// Localized name with a stacked gloss.
    Gloss,
    /// Localized name with a gloss on the same line.
    InlineGloss,
    /// Collator honouring the preferred locale.
    LocalizedCollator,
    /// Collator that ignores diacritics for English.
    DiacriticInsensitiveCollator,
    /// Anything else.
    Unrecognized,
}

impl Marker {
    /// Classify a variable name bound by a `let` expression.
    #[must_use]
    pub fn of_variable(name: &str) -> Self {
        match name {
            LOCALIZED_NAME => Self::Name,
            LOCALIZED_NAME_WITH_LOCAL_GLOSS => Self::Gloss,
            LOCALIZED_NAME_INLINE => Self::InlineGloss,
            LOCALIZED_COLLATOR => Self::LocalizedCollator,
            DIACRITIC_INSENSITIVE_COLLATOR => Self::DiacriticInsensitiveCollator,
            _ => Self::Unrecognized,
        }
    }

    /// Classify a whole expression.
    ///
    /// Only a `let` with exactly one binding is a marker shape; use
    /// [`bindings`] and [`Marker::of_variable`] to inspect lets that bind
    /// several variables.
    #[must_use]
    pub fn classify(expr: &Expression) -> Self {
        let mut names = bindings(expr).map(|(name, _)| name);
        match (names.next(), names.next()) {
            (Some(name), None) => Self::of_variable(name),
            _ => Self::Unrecognized,
        }
    }
}

/// Return the operator name of an expression node, if it has one.
#[must_use]
pub fn operator(expr: &Expression) -> Option<&str> {
    expr.as_array()?.first()?.as_str()
}

fn let_bindings(items: &[Expression]) -> Option<&[Expression]> {
    match items.split_first() {
        Some((op, rest)) if op.as_str() == Some("let") && !rest.len().is_multiple_of(2) => {
            rest.split_last().map(|(_, pairs)| pairs)
        }
        _ => None,
    }
}

/// Iterate over the `(name, value)` pairs bound by a `let` expression.
///
/// Yields nothing for any other shape.
pub fn bindings(expr: &Expression) -> impl Iterator<Item = (&str, &Expression)> {
    expr.as_array()
        .and_then(|items| let_bindings(items))
        .unwrap_or_default()
        .chunks_exact(2)
        .filter_map(|pair| match pair {
            [name, value] => name.as_str().map(|n| (n, value)),
            _ => None,
        })
}

/// Replace the value bound to `name` in a `let` expression.
///
/// Returns `true` when a binding was updated. Any other shape is left
/// untouched.
///
/// ```rust
/// use diplomat::expression::update_variable;
/// use serde_json::json;
///
/// let mut expr = json!(["let", "one", "won", ["var", "one"]]);
/// assert!(update_variable(&mut expr, "one", json!(1)));
/// assert_eq!(expr, json!(["let", "one", 1, ["var", "one"]]));
///
/// let mut other = json!(["get", "one"]);
/// assert!(!update_variable(&mut other, "one", json!(1)));
/// ```
pub fn update_variable(expr: &mut Expression, name: &str, value: Expression) -> bool {
    let Some(pairs) = binding_pairs_mut(expr) else {
        return false;
    };
    for pair in pairs.chunks_exact_mut(2) {
        if let [bound_name, bound_value] = pair
            && bound_name.as_str() == Some(name)
        {
            *bound_value = value;
            return true;
        }
    }
    false
}

/// Mutable view of the alternating name/value slots of a `let` expression.
pub(crate) fn binding_pairs_mut(expr: &mut Expression) -> Option<&mut [Expression]> {
    let items = expr.as_array_mut()?;
    if items.first().and_then(Expression::as_str) != Some("let") || !items.len().is_multiple_of(2) {
        return None;
    }
    let body = items.len().checked_sub(1)?;
    items.get_mut(1..body)
}

/// `["get", field]`.
#[must_use]
pub fn get(field: &str) -> Expression {
    json!(["get", field])
}

/// `["var", name]`.
#[must_use]
pub fn var(name: &str) -> Expression {
    json!(["var", name])
}

/// Build an operator node from its operands.
#[must_use]
pub fn op(name: &str, operands: impl IntoIterator<Item = Expression>) -> Expression {
    let mut items = vec![Expression::from(name)];
    items.extend(operands);
    Expression::Array(items)
}

/// `["let", name, value, body]`.
#[must_use]
pub fn let_in(name: &str, value: Expression, body: Expression) -> Expression {
    op("let", [Expression::from(name), value, body])
}

/// `["concat", ...]`, collapsing a single operand to itself.
#[must_use]
pub fn concat(mut parts: Vec<Expression>) -> Expression {
    if parts.len() == 1
        && let Some(only) = parts.pop()
    {
        return only;
    }
    op("concat", parts)
}

/// `["slice", input, start]` or `["slice", input, start, end]`.
#[must_use]
pub fn slice(input: Expression, start: Expression, end: Option<Expression>) -> Expression {
    op("slice", [input, start].into_iter().chain(end))
}

/// `["+", a, b]`.
#[must_use]
pub fn plus(a: Expression, b: Expression) -> Expression {
    op("+", [a, b])
}

/// `["-", a, b]`.
#[must_use]
pub fn minus(a: Expression, b: Expression) -> Expression {
    op("-", [a, b])
}

/// `["length", input]`.
#[must_use]
pub fn length(input: Expression) -> Expression {
    op("length", [input])
}

/// `["==", a, b]`, optionally compared with a collator.
#[must_use]
pub fn equals(a: Expression, b: Expression, collator: Option<Expression>) -> Expression {
    op("==", [a, b].into_iter().chain(collator))
}

fn placeholder(name: &str) -> Expression {
    let_in(name, Expression::from(""), var(name))
}

/// Placeholder that evaluates to the localized name once rewritten.
///
/// Before rewriting it evaluates to an empty string.
#[must_use]
pub fn localized_name() -> Expression {
    placeholder(LOCALIZED_NAME)
}

/// Placeholder for a localized name glossed with the local name below it.
#[must_use]
pub fn localized_name_with_local_gloss() -> Expression {
    placeholder(LOCALIZED_NAME_WITH_LOCAL_GLOSS)
}

/// Placeholder for a localized name glossed with the local name on one line.
#[must_use]
pub fn localized_name_inline() -> Expression {
    placeholder(LOCALIZED_NAME_INLINE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn update_variable_replaces_the_value_at_the_correct_index() {
        let mut expr = json!([
            "let", "one", "won", "two", "too", "three", "tree", ["get", "fore"]
        ]);
        assert!(update_variable(&mut expr, "one", json!(1)));
        assert!(update_variable(&mut expr, "two", json!(2)));
        assert!(update_variable(&mut expr, "three", json!(3)));
        assert_eq!(
            expr,
            json!(["let", "one", 1, "two", 2, "three", 3, ["get", "fore"]])
        );
    }

    #[rstest]
    #[case::not_a_let(json!(["get", "fore"]))]
    #[case::literal(json!("fore"))]
    #[case::missing_body(json!(["let", "fore", 4]))]
    #[case::empty(json!([]))]
    fn update_variable_ignores_other_shapes(#[case] original: Expression) {
        let mut expr = original.clone();
        assert!(!update_variable(&mut expr, "fore", json!(4)));
        assert_eq!(expr, original);
    }

    #[test]
    fn update_variable_does_not_touch_the_body() {
        let mut expr = json!(["let", "a", 1, "a"]);
        assert!(update_variable(&mut expr, "a", json!(2)));
        assert_eq!(expr, json!(["let", "a", 2, "a"]));
    }

    #[rstest]
    #[case(localized_name(), Marker::Name)]
    #[case(localized_name_with_local_gloss(), Marker::Gloss)]
    #[case(localized_name_inline(), Marker::InlineGloss)]
    #[case(
        json!(["let", LOCALIZED_COLLATOR, "", ["var", LOCALIZED_COLLATOR]]),
        Marker::LocalizedCollator
    )]
    #[case(
        json!(["let", DIACRITIC_INSENSITIVE_COLLATOR, "", ["var", DIACRITIC_INSENSITIVE_COLLATOR]]),
        Marker::DiacriticInsensitiveCollator
    )]
    #[case(json!(["let", "somethingElse", "", ["var", "somethingElse"]]), Marker::Unrecognized)]
    #[case(json!(["var", LOCALIZED_NAME]), Marker::Unrecognized)]
    #[case(json!("Null Island"), Marker::Unrecognized)]
    #[case(
        json!(["let", LOCALIZED_NAME, "", LOCALIZED_COLLATOR, "", ["var", LOCALIZED_NAME]]),
        Marker::Unrecognized
    )]
    fn classify_recognizes_marker_shapes(#[case] expr: Expression, #[case] expected: Marker) {
        assert_eq!(Marker::classify(&expr), expected);
    }

    #[test]
    fn classify_keeps_recognizing_rewritten_markers() {
        let mut expr = localized_name();
        update_variable(&mut expr, LOCALIZED_NAME, json!(["coalesce", ["get", "name"]]));
        assert_eq!(Marker::classify(&expr), Marker::Name);
    }

    #[test]
    fn concat_collapses_a_single_part() {
        assert_eq!(concat(vec![json!("a")]), json!("a"));
        assert_eq!(
            concat(vec![json!("a"), json!("b")]),
            json!(["concat", "a", "b"])
        );
    }
}

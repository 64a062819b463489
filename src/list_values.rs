//! Render-time formatting of semicolon-delimited tag values.
//!
//! OpenStreetMap packs several values into one tag with `;` between them and
//! writes a literal semicolon as `;;`. The expression language has no loops,
//! so [`list_values_expression`] unrolls a scanner over the raw value. Each
//! item is found by a chain of steps that share one state (decoded text,
//! search position and end delimiter): a step finds the next `;` with
//! `index-of` and either consumes an escape or records where the item ends.
//! Only once the item is complete does the scanner move on to the next one,
//! so the expression grows linearly with the number of steps.
//!
//! At most [`MAX_VALUES`] items are decoded. When a delimiter follows the last
//! decoded item, the remainder of the raw value (from that delimiter on) is
//! appended to it verbatim.

use crate::expression::{
    self, Expression, concat, equals, let_in, op, plus, slice, var,
};

/// Maximum number of items decoded from a list.
pub const MAX_VALUES: usize = 3;

/// Maximum number of `;;` escapes decoded within one item.
///
/// Past this, the rest of the raw value is kept as the final item.
pub const MAX_ESCAPES_PER_VALUE: usize = 8;

/// Delimiter between items.
pub const DELIMITER: &str = ";";

/// End position of an item whose end has not been found yet.
const SCANNING: i64 = -2;
/// End position of an item that runs to the end of the value.
const NOT_FOUND: i64 = -1;

const LIST_VAR: &str = "diplomat__valueList";
const SEPARATOR_VAR: &str = "diplomat__valueSeparator";

fn item_var(index: usize) -> String {
    format!("diplomat__value{index}")
}

fn keep_var(index: usize) -> String {
    format!("diplomat__keepValue{index}")
}

fn start_var(index: usize) -> String {
    format!("diplomat__valueStart{index}")
}

fn delimiter_var(index: usize, step: usize) -> String {
    format!("diplomat__delimiter{index}_{step}")
}

fn escape_var(index: usize, step: usize) -> String {
    format!("diplomat__escape{index}_{step}")
}

fn text_var(index: usize, step: usize) -> String {
    format!("diplomat__text{index}_{step}")
}

fn from_var(index: usize, step: usize) -> String {
    format!("diplomat__from{index}_{step}")
}

fn end_var(index: usize, step: usize) -> String {
    format!("diplomat__end{index}_{step}")
}

fn scanned_var(index: usize) -> String {
    format!("diplomat__scanned{index}")
}

fn scanned_end_var(index: usize) -> String {
    format!("diplomat__scannedEnd{index}")
}

fn case(condition: Expression, then: Expression, otherwise: Expression) -> Expression {
    op("case", [condition, then, otherwise])
}

/// Bind several names at once around `body`.
fn let_all(bindings: [(String, Expression); 3], body: Expression) -> Expression {
    let mut operands = Vec::with_capacity(7);
    for (name, value) in bindings {
        operands.push(Expression::from(name));
        operands.push(value);
    }
    operands.push(body);
    op("let", operands)
}

type Omits<'a> = &'a dyn Fn(&Expression) -> Expression;

struct ListBuilder<'a> {
    omits: Option<Omits<'a>>,
}

impl ListBuilder<'_> {
    fn list() -> Expression {
        var(LIST_VAR)
    }

    /// Scan item `index` (1-based) starting at `start`.
    fn scan(&self, index: usize, start: Expression) -> Expression {
        let_all(
            [
                (text_var(index, 0), Expression::from("")),
                (from_var(index, 0), start),
                (end_var(index, 0), Expression::from(SCANNING)),
            ],
            self.step(index, 0),
        )
    }

    /// Advance the scan of item `index` by one delimiter.
    ///
    /// The last step never decodes an escape; an item still unterminated
    /// after it keeps the rest of the raw value.
    fn step(&self, index: usize, step: usize) -> Expression {
        if step > MAX_ESCAPES_PER_VALUE {
            return self.close(index, step);
        }
        let text = var(&text_var(index, step));
        let from = var(&from_var(index, step));
        let end = var(&end_var(index, step));
        let delimiter = var(&delimiter_var(index, step));
        let escape = var(&escape_var(index, step));
        let done = op("!=", [end.clone(), Expression::from(SCANNING)]);
        let at_end = equals(delimiter.clone(), Expression::from(NOT_FOUND), None);
        let decodes = step < MAX_ESCAPES_PER_VALUE;

        let escaped_text = if decodes {
            concat(vec![
                text.clone(),
                slice(Self::list(), from.clone(), Some(plus(delimiter.clone(), Expression::from(1)))),
            ])
        } else {
            text.clone()
        };
        let next_text = op(
            "case",
            [
                done.clone(),
                text.clone(),
                at_end.clone(),
                concat(vec![text.clone(), slice(Self::list(), from.clone(), None)]),
                escape.clone(),
                escaped_text,
                concat(vec![text, slice(Self::list(), from.clone(), Some(delimiter.clone()))]),
            ],
        );
        let next_from = if decodes {
            case(
                op("all", [op("!", [done.clone()]), escape.clone()]),
                plus(delimiter.clone(), Expression::from(2)),
                from.clone(),
            )
        } else {
            from.clone()
        };
        let next_end = op(
            "case",
            [
                done,
                end,
                at_end,
                Expression::from(NOT_FOUND),
                escape,
                Expression::from(SCANNING),
                delimiter.clone(),
            ],
        );

        let next = step.saturating_add(1);
        let advanced = let_all(
            [
                (text_var(index, next), next_text),
                (from_var(index, next), next_from),
                (end_var(index, next), next_end),
            ],
            self.step(index, next),
        );
        let is_escape = op(
            "all",
            [
                op("!=", [delimiter.clone(), Expression::from(NOT_FOUND)]),
                equals(
                    slice(
                        Self::list(),
                        plus(delimiter.clone(), Expression::from(1)),
                        Some(plus(delimiter, Expression::from(2))),
                    ),
                    Expression::from(DELIMITER),
                    None,
                ),
            ],
        );
        let_in(
            &delimiter_var(index, step),
            op("index-of", [Expression::from(DELIMITER), Self::list(), from]),
            let_in(&escape_var(index, step), is_escape, advanced),
        )
    }

    /// Resolve the scanned item `index` and continue with the next one.
    fn close(&self, index: usize, step: usize) -> Expression {
        let text = var(&text_var(index, step));
        let from = var(&from_var(index, step));
        let end = var(&end_var(index, step));
        let unterminated = equals(end.clone(), Expression::from(SCANNING), None);
        let item = case(
            unterminated.clone(),
            concat(vec![text.clone(), slice(Self::list(), from, None)]),
            text,
        );
        let item_end = case(unterminated, Expression::from(NOT_FOUND), end);

        let scanned = var(&scanned_var(index));
        let delimiter = var(&scanned_end_var(index));
        let delimited = if index >= MAX_VALUES {
            let tail = slice(Self::list(), delimiter.clone(), None);
            self.finish(index, scanned.clone(), Some(tail))
        } else {
            self.next_item(index, scanned.clone(), &delimiter)
        };
        op(
            "let",
            [
                Expression::from(scanned_var(index)),
                item,
                Expression::from(scanned_end_var(index)),
                item_end,
                case(
                    equals(delimiter, Expression::from(NOT_FOUND), None),
                    self.finish(index, scanned, None),
                    delimited,
                ),
            ],
        )
    }

    /// Bind item `index` and continue with the item after `delimiter`.
    ///
    /// A single space right after the delimiter is skipped.
    fn next_item(&self, index: usize, item: Expression, delimiter: &Expression) -> Expression {
        let next = index.saturating_add(1);
        let next_char = slice(
            Self::list(),
            plus(delimiter.clone(), Expression::from(1)),
            Some(plus(delimiter.clone(), Expression::from(2))),
        );
        let start = case(
            equals(next_char, Expression::from(" "), None),
            plus(delimiter.clone(), Expression::from(2)),
            plus(delimiter.clone(), Expression::from(1)),
        );
        let continued = self.scan(next, var(&start_var(next)));
        let body = self.with_keep(index, continued);
        op(
            "let",
            [
                Expression::from(item_var(index)),
                item,
                Expression::from(start_var(next)),
                start,
                body,
            ],
        )
    }

    /// Bind the omission flag for item `index` around `body`.
    fn with_keep(&self, index: usize, body: Expression) -> Expression {
        match self.omits {
            Some(omits) => let_in(
                &keep_var(index),
                op("!", [omits(&var(&item_var(index)))]),
                body,
            ),
            None => body,
        }
    }

    /// Bind the last item and join everything decoded so far.
    ///
    /// A raw `tail` is appended to the last item and exempt from omission.
    fn finish(&self, count: usize, last_item: Expression, tail: Option<Expression>) -> Expression {
        let body = if tail.is_some() {
            self.join(count, tail)
        } else {
            self.with_keep(count, self.join(count, None))
        };
        let_in(&item_var(count), last_item, body)
    }

    fn join(&self, count: usize, tail: Option<Expression>) -> Expression {
        let separator = var(SEPARATOR_VAR);
        let mut parts = Vec::with_capacity(count.saturating_mul(2));
        let mut kept_before = Vec::with_capacity(count);
        for index in 1..=count {
            let item = var(&item_var(index));
            let raw_tail = if index == count { tail.clone() } else { None };
            let is_tail = raw_tail.is_some();
            let shown = match raw_tail {
                Some(rest) => concat(vec![item, rest]),
                None => item,
            };
            if self.omits.is_none() {
                if index > 1 {
                    parts.push(separator.clone());
                }
                parts.push(shown);
                continue;
            }
            let keep = (!is_tail).then(|| var(&keep_var(index)));
            let piece = if index == 1 {
                shown
            } else {
                let lead = case(
                    op("any", kept_before.clone()),
                    separator.clone(),
                    Expression::from(""),
                );
                concat(vec![lead, shown])
            };
            parts.push(match &keep {
                Some(flag) => case(flag.clone(), piece, Expression::from("")),
                None => piece,
            });
            kept_before.push(keep.unwrap_or(Expression::Bool(true)));
        }
        concat(parts)
    }

    fn build(&self, value_list: Expression, separator: Expression) -> Expression {
        op(
            "let",
            [
                Expression::from(LIST_VAR),
                op("to-string", [value_list]),
                Expression::from(SEPARATOR_VAR),
                separator,
                self.scan(1, Expression::from(0)),
            ],
        )
    }
}

/// Build an expression that joins the items of a `;`-delimited value.
///
/// `separator` may be a literal string or an expression. Items exactly equal
/// to `value_to_omit` are dropped before joining.
///
/// # Examples
///
/// ```rust
/// use diplomat::eval::{evaluate, Value};
/// use diplomat::list_values::list_values_expression;
/// use serde_json::{Map, json};
///
/// let expr = list_values_expression(json!("ABC;;DEF;GHI"), json!(", "), None);
/// let value = evaluate(&expr, &Map::new()).unwrap();
/// assert_eq!(value, Value::from("ABC;DEF, GHI"));
/// ```
#[must_use]
pub fn list_values_expression(
    value_list: Expression,
    separator: Expression,
    value_to_omit: Option<Expression>,
) -> Expression {
    match value_to_omit {
        Some(omitted) => {
            let omits = |item: &Expression| expression::equals(item.clone(), omitted.clone(), None);
            ListBuilder {
                omits: Some(&omits),
            }
            .build(value_list, separator)
        }
        None => ListBuilder { omits: None }.build(value_list, separator),
    }
}

/// Build a list expression that drops every item matching a predicate.
///
/// `omits` receives an expression referring to the item and returns a
/// boolean expression that is true when the item should be dropped.
#[must_use]
pub fn list_values_expression_omitting<F>(
    value_list: Expression,
    separator: Expression,
    omits: F,
) -> Expression
where
    F: Fn(&Expression) -> Expression,
{
    ListBuilder {
        omits: Some(&omits),
    }
    .build(value_list, separator)
}

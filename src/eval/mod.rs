//! Evaluation of label expressions against feature properties.
//!
//! The evaluator covers the operator subset that the builders in this crate
//! emit, with the render-time semantics a MapLibre renderer applies:
//!
//! - `let` evaluates every binding in the enclosing scope before the body;
//! - `case`, `coalesce`, `all` and `any` short-circuit;
//! - string positions (`length`, `slice`, `index-of`) count characters, and
//!   `slice` accepts negative offsets from the end;
//! - numbers are integers.
//!
//! It backs the `preview` command and lets tests check what a generated
//! expression renders for a given feature.

mod collator;
mod error;

pub use collator::{Collator, strip_diacritics};
pub use error::EvalError;

use crate::expression::Expression;
use serde_json::Map;
use std::cmp::Ordering;

/// Feature properties keyed by field name.
pub type Properties = Map<String, serde_json::Value>;

/// A run of text sharing one set of format options.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section text.
    pub text: String,
    /// Font scale relative to the layer's text size, when overridden.
    pub scale: Option<f64>,
}

/// Rich text produced by a `format` expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatted {
    /// Sections in display order.
    pub sections: Vec<Section>,
}

impl Formatted {
    /// Concatenate the text of every section.
    #[must_use]
    pub fn text(&self) -> String {
        self.sections.iter().map(|section| section.text.as_str()).collect()
    }
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing property or empty result.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Number(i64),
    /// Plain string.
    String(String),
    /// Comparison rules.
    Collator(Collator),
    /// Rich text.
    Formatted(Formatted),
}

impl Value {
    /// Render the value as label text.
    ///
    /// Returns `None` for collators, which have no text form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Number(number) => Some(number.to_string()),
            Self::String(text) => Some(text.clone()),
            Self::Formatted(formatted) => Some(formatted.text()),
            Self::Collator(_) => None,
        }
    }

    /// Return the string slice when the value is a plain string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, EvalError> {
        match json {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(flag) => Ok(Self::Bool(*flag)),
            serde_json::Value::String(text) => Ok(Self::String(text.clone())),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| EvalError::UnsupportedValue(number.to_string())),
            other => Err(EvalError::UnsupportedValue(other.to_string())),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Number(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

/// Evaluate `expr` for a feature with the given properties.
///
/// # Errors
///
/// Returns [`EvalError`] when the expression uses an operator outside the
/// supported subset, references an unbound variable, or applies an operator
/// to operands of the wrong type or count.
///
/// # Examples
///
/// ```rust
/// use diplomat::eval::{Value, evaluate};
/// use serde_json::{Map, json};
///
/// let mut properties = Map::new();
/// properties.insert("name".to_owned(), json!("Null Island"));
/// let expr = json!(["upcase", ["get", "name"]]);
/// assert_eq!(evaluate(&expr, &properties).unwrap(), Value::from("NULL ISLAND"));
/// ```
pub fn evaluate(expr: &Expression, properties: &Properties) -> Result<Value, EvalError> {
    Evaluator {
        properties,
        scope: Vec::new(),
    }
    .eval(expr)
}

fn arity(operator: &str, expected: &'static str) -> EvalError {
    EvalError::Arity {
        operator: operator.to_owned(),
        expected,
    }
}

fn mismatch(operator: &str, expected: &'static str, found: &Value) -> EvalError {
    EvalError::Type {
        operator: operator.to_owned(),
        expected,
        found: format!("{found:?}"),
    }
}

fn overflow(operator: &str) -> EvalError {
    EvalError::UnsupportedValue(format!("`{operator}` overflowed"))
}

fn char_count(text: &str) -> Result<i64, EvalError> {
    i64::try_from(text.chars().count()).map_err(|_| overflow("length"))
}

/// Resolve a possibly negative offset against a string of `len` characters.
fn clamp_offset(offset: i64, len: i64) -> usize {
    let resolved = if offset < 0 {
        len.saturating_add(offset).max(0)
    } else {
        offset.min(len)
    };
    usize::try_from(resolved).unwrap_or_default()
}

fn slice_chars(text: &str, start: i64, end: Option<i64>) -> Result<String, EvalError> {
    let len = char_count(text)?;
    let from = clamp_offset(start, len);
    let to = clamp_offset(end.unwrap_or(len), len);
    Ok(text
        .chars()
        .skip(from)
        .take(to.saturating_sub(from))
        .collect())
}

fn index_of_chars(needle: &str, haystack: &str, from: i64) -> Result<i64, EvalError> {
    let hay: Vec<char> = haystack.chars().collect();
    let pattern: Vec<char> = needle.chars().collect();
    let len = char_count(haystack)?;
    let start = clamp_offset(from.max(0), len);
    if pattern.is_empty() {
        return i64::try_from(start).map_err(|_| overflow("index-of"));
    }
    let found = hay
        .get(start..)
        .unwrap_or_default()
        .windows(pattern.len())
        .position(|window| window == pattern.as_slice());
    match found {
        Some(offset) => {
            i64::try_from(offset.saturating_add(start)).map_err(|_| overflow("index-of"))
        }
        None => Ok(-1),
    }
}

struct Evaluator<'p> {
    properties: &'p Properties,
    scope: Vec<(String, Value)>,
}

impl Evaluator<'_> {
    fn eval(&mut self, expr: &Expression) -> Result<Value, EvalError> {
        match expr {
            Expression::Array(items) => self.call(items),
            other => Value::from_json(other),
        }
    }

    fn call(&mut self, items: &[Expression]) -> Result<Value, EvalError> {
        let Some((head, operands)) = items.split_first() else {
            return Err(EvalError::MissingOperator("[]".to_owned()));
        };
        let Some(operator) = head.as_str() else {
            return Err(EvalError::MissingOperator(head.to_string()));
        };
        match operator {
            "literal" => match operands {
                [value] => Value::from_json(value),
                _ => Err(arity(operator, "one value")),
            },
            "get" => self.property(operands),
            "var" => self.variable(operands),
            "let" => self.let_scope(operands),
            "coalesce" => self.coalesce(operands),
            "case" => self.case(operands),
            "all" | "any" => self.logical(operator, operands),
            "!" => match operands {
                [operand] => Ok(Value::Bool(!self.boolean(operator, operand)?)),
                _ => Err(arity(operator, "one operand")),
            },
            "==" | "!=" => self.equality(operator, operands),
            "<" | ">" | "<=" | ">=" => self.ordering(operator, operands),
            "+" | "-" => self.arithmetic(operator, operands),
            "length" => match operands {
                [input] => Ok(Value::Number(char_count(&self.string(operator, input)?)?)),
                _ => Err(arity(operator, "one operand")),
            },
            "slice" => self.slice(operands),
            "index-of" => self.index_of(operands),
            "in" => match operands {
                [needle, haystack] => {
                    let needle_text = self.string(operator, needle)?;
                    let haystack_text = self.string(operator, haystack)?;
                    Ok(Value::Bool(haystack_text.contains(&needle_text)))
                }
                _ => Err(arity(operator, "a needle and a haystack")),
            },
            "concat" => self.concat(operands),
            "to-string" => match operands {
                [operand] => Ok(Value::String(self.text(operator, operand)?)),
                _ => Err(arity(operator, "one operand")),
            },
            "downcase" | "upcase" => match operands {
                [operand] => {
                    let text = self.string(operator, operand)?;
                    Ok(Value::String(if operator == "upcase" {
                        text.to_uppercase()
                    } else {
                        text.to_lowercase()
                    }))
                }
                _ => Err(arity(operator, "one operand")),
            },
            "format" => self.format(operands),
            "collator" => self.collator(operands),
            other => Err(EvalError::UnknownOperator(other.to_owned())),
        }
    }

    fn string(&mut self, operator: &str, expr: &Expression) -> Result<String, EvalError> {
        match self.eval(expr)? {
            Value::String(text) => Ok(text),
            other => Err(mismatch(operator, "a string", &other)),
        }
    }

    fn text(&mut self, operator: &str, expr: &Expression) -> Result<String, EvalError> {
        let value = self.eval(expr)?;
        value
            .to_text()
            .ok_or_else(|| mismatch(operator, "a value with a text form", &value))
    }

    fn number(&mut self, operator: &str, expr: &Expression) -> Result<i64, EvalError> {
        match self.eval(expr)? {
            Value::Number(number) => Ok(number),
            other => Err(mismatch(operator, "a number", &other)),
        }
    }

    fn boolean(&mut self, operator: &str, expr: &Expression) -> Result<bool, EvalError> {
        match self.eval(expr)? {
            Value::Bool(flag) => Ok(flag),
            other => Err(mismatch(operator, "a boolean", &other)),
        }
    }

    fn optional_collator(
        &mut self,
        operator: &str,
        expr: Option<&Expression>,
    ) -> Result<Option<Collator>, EvalError> {
        let Some(collator_expr) = expr else {
            return Ok(None);
        };
        match self.eval(collator_expr)? {
            Value::Collator(collator) => Ok(Some(collator)),
            other => Err(mismatch(operator, "a collator", &other)),
        }
    }

    fn property(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let [field] = operands else {
            return Err(arity("get", "one field name"));
        };
        let name = self.string("get", field)?;
        self.properties
            .get(&name)
            .map_or(Ok(Value::Null), Value::from_json)
    }

    fn variable(&self, operands: &[Expression]) -> Result<Value, EvalError> {
        let [name] = operands else {
            return Err(arity("var", "one variable name"));
        };
        let Some(key) = name.as_str() else {
            return Err(EvalError::UnsupportedValue(name.to_string()));
        };
        self.scope
            .iter()
            .rev()
            .find(|(bound, _)| bound == key)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| EvalError::UnboundVariable(key.to_owned()))
    }

    fn let_scope(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let Some((body, pairs)) = operands.split_last() else {
            return Err(arity("let", "name/value pairs and a body"));
        };
        if !pairs.len().is_multiple_of(2) {
            return Err(arity("let", "name/value pairs and a body"));
        }
        let mut bound = Vec::with_capacity(pairs.len());
        for pair in pairs.chunks_exact(2) {
            let [name, value] = pair else {
                return Err(arity("let", "name/value pairs and a body"));
            };
            let Some(key) = name.as_str() else {
                return Err(EvalError::UnsupportedValue(name.to_string()));
            };
            bound.push((key.to_owned(), self.eval(value)?));
        }
        let depth = self.scope.len();
        self.scope.extend(bound);
        let result = self.eval(body);
        self.scope.truncate(depth);
        result
    }

    fn coalesce(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        for operand in operands {
            let value = self.eval(operand)?;
            if value != Value::Null {
                return Ok(value);
            }
        }
        Ok(Value::Null)
    }

    fn case(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let Some((fallback, branches)) = operands.split_last() else {
            return Err(arity("case", "condition/output pairs and a fallback"));
        };
        for branch in branches.chunks(2) {
            let [condition, output] = branch else {
                return Err(arity("case", "condition/output pairs and a fallback"));
            };
            if self.boolean("case", condition)? {
                return self.eval(output);
            }
        }
        self.eval(fallback)
    }

    fn logical(&mut self, operator: &str, operands: &[Expression]) -> Result<Value, EvalError> {
        let short_circuit = operator == "any";
        for operand in operands {
            if self.boolean(operator, operand)? == short_circuit {
                return Ok(Value::Bool(short_circuit));
            }
        }
        Ok(Value::Bool(!short_circuit))
    }

    fn equality(&mut self, operator: &str, operands: &[Expression]) -> Result<Value, EvalError> {
        let (left, right, collator_expr) = match operands {
            [left, right] => (left, right, None),
            [left, right, collator] => (left, right, Some(collator)),
            _ => return Err(arity(operator, "two operands and an optional collator")),
        };
        let a = self.eval(left)?;
        let b = self.eval(right)?;
        let equal = match self.optional_collator(operator, collator_expr)? {
            Some(collator) => match (&a, &b) {
                (Value::String(x), Value::String(y)) => collator.equals(x, y),
                (Value::String(_), other) | (other, _) => {
                    return Err(mismatch(operator, "strings", other));
                }
            },
            None => a == b,
        };
        Ok(Value::Bool(equal == (operator == "==")))
    }

    fn ordering(&mut self, operator: &str, operands: &[Expression]) -> Result<Value, EvalError> {
        let (left, right, collator_expr) = match operands {
            [left, right] => (left, right, None),
            [left, right, collator] => (left, right, Some(collator)),
            _ => return Err(arity(operator, "two operands and an optional collator")),
        };
        let a = self.eval(left)?;
        let b = self.eval(right)?;
        let collator = self.optional_collator(operator, collator_expr)?;
        let order = match (&a, &b) {
            (Value::Number(x), Value::Number(y)) => x.cmp(y),
            (Value::String(x), Value::String(y)) => {
                collator.map_or_else(|| x.cmp(y), |rules| rules.compare(x, y))
            }
            (Value::Number(_) | Value::String(_), other) | (other, _) => {
                return Err(mismatch(operator, "two numbers or two strings", other));
            }
        };
        let holds = match operator {
            "<" => order == Ordering::Less,
            ">" => order == Ordering::Greater,
            "<=" => order != Ordering::Greater,
            _ => order != Ordering::Less,
        };
        Ok(Value::Bool(holds))
    }

    fn arithmetic(&mut self, operator: &str, operands: &[Expression]) -> Result<Value, EvalError> {
        if operator == "-" {
            return match operands {
                [operand] => {
                    let number = self.number(operator, operand)?;
                    number.checked_neg().map(Value::Number).ok_or_else(|| overflow(operator))
                }
                [left, right] => {
                    let a = self.number(operator, left)?;
                    let b = self.number(operator, right)?;
                    a.checked_sub(b).map(Value::Number).ok_or_else(|| overflow(operator))
                }
                _ => Err(arity(operator, "one or two operands")),
            };
        }
        let mut sum: i64 = 0;
        for operand in operands {
            let number = self.number(operator, operand)?;
            sum = sum.checked_add(number).ok_or_else(|| overflow(operator))?;
        }
        Ok(Value::Number(sum))
    }

    fn slice(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let (input, start, end) = match operands {
            [input, start] => (input, start, None),
            [input, start, end] => (input, start, Some(end)),
            _ => return Err(arity("slice", "an input, a start and an optional end")),
        };
        let text = self.string("slice", input)?;
        let from = self.number("slice", start)?;
        let to = end.map(|expr| self.number("slice", expr)).transpose()?;
        slice_chars(&text, from, to).map(Value::String)
    }

    fn index_of(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let (needle, haystack, from) = match operands {
            [needle, haystack] => (needle, haystack, None),
            [needle, haystack, from] => (needle, haystack, Some(from)),
            _ => return Err(arity("index-of", "a needle, a haystack and an optional start")),
        };
        let needle_text = self.string("index-of", needle)?;
        let haystack_text = self.string("index-of", haystack)?;
        let start = from
            .map(|expr| self.number("index-of", expr))
            .transpose()?
            .unwrap_or_default();
        index_of_chars(&needle_text, &haystack_text, start).map(Value::Number)
    }

    fn concat(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let mut joined = String::new();
        for operand in operands {
            joined.push_str(&self.text("concat", operand)?);
        }
        Ok(Value::String(joined))
    }

    fn format(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let mut sections = Vec::new();
        let mut rest = operands;
        while let Some((content, tail)) = rest.split_first() {
            let text = self.text("format", content)?;
            let (options, remaining) = match tail.split_first() {
                Some((Expression::Object(options), after)) => (Some(options), after),
                _ => (None, tail),
            };
            let scale = match options.and_then(|map| map.get("font-scale")) {
                None => None,
                Some(serde_json::Value::Number(number)) => number.as_f64(),
                Some(other) => return Err(EvalError::UnsupportedValue(other.to_string())),
            };
            sections.push(Section { text, scale });
            rest = remaining;
        }
        Ok(Value::Formatted(Formatted { sections }))
    }

    fn collator(&mut self, operands: &[Expression]) -> Result<Value, EvalError> {
        let [Expression::Object(options)] = operands else {
            return Err(arity("collator", "one options object"));
        };
        let mut collator = Collator::default();
        if let Some(flag) = options.get("case-sensitive") {
            collator.case_sensitive = self.boolean("collator", flag)?;
        }
        if let Some(flag) = options.get("diacritic-sensitive") {
            collator.diacritic_sensitive = self.boolean("collator", flag)?;
        }
        if let Some(locale) = options.get("locale") {
            collator.locale = Some(self.string("collator", locale)?);
        }
        Ok(Value::Collator(collator))
    }
}

//! Evaluating label expressions against feature properties.

mod common;

use anyhow::{Result, ensure};
use common::properties;
use diplomat::eval::{EvalError, Value, evaluate};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::slice_counts_characters(json!(["slice", "Đà Nẵng", 3]), Value::from("Nẵng"))]
#[case::negative_slice(json!(["slice", "Montréal", -4, -1]), Value::from("réa"))]
#[case::index_of_missing(json!(["index-of", ";", "Null Island"]), Value::Number(-1))]
#[case::index_of_from(json!(["index-of", "a", "Panama", 2]), Value::Number(3))]
#[case::length(json!(["length", "空虛島"]), Value::Number(3))]
#[case::concat_numbers(json!(["concat", "A", 1, true]), Value::from("A1true"))]
#[case::case_fallback(json!(["case", false, "no", "yes"]), Value::from("yes"))]
#[case::coalesce_skips_null(json!(["coalesce", ["get", "missing"], "x"]), Value::from("x"))]
#[case::substring_test(json!(["in", "Null", "Null Island"]), Value::from(true))]
fn evaluates_string_expressions(#[case] expr: serde_json::Value, #[case] expected: Value) -> Result<()> {
    let value = evaluate(&expr, &properties(&[]))?;
    ensure!(value == expected, "{expr}: expected {expected:?}, got {value:?}");
    Ok(())
}

#[rstest]
#[case::accent_insensitive("Montreal", "Montréal", false, true)]
#[case::accent_sensitive("Montreal", "Montréal", true, false)]
#[case::stroke_letter("Jurmala", "Jurmała", false, true)]
#[case::different_words("Derry", "Londonderry", false, false)]
fn collators_compare_names(
    #[case] a: &str,
    #[case] b: &str,
    #[case] diacritic_sensitive: bool,
    #[case] expected: bool,
) -> Result<()> {
    let expr = json!([
        "==",
        ["get", "a"],
        ["get", "b"],
        [
            "collator",
            {
                "case-sensitive": false,
                "diacritic-sensitive": diacritic_sensitive,
                "locale": "en"
            }
        ]
    ]);
    let value = evaluate(&expr, &properties(&[("a", a), ("b", b)]))?;
    ensure!(value == Value::from(expected), "{a} == {b}: got {value:?}");
    Ok(())
}

#[rstest]
fn let_bindings_see_the_outer_scope() -> Result<()> {
    let expr = json!([
        "let",
        "name",
        "outer",
        ["let", "name", "inner", "copy", ["var", "name"], ["var", "copy"]]
    ]);
    let value = evaluate(&expr, &properties(&[]))?;
    ensure!(value == Value::from("outer"), "got {value:?}");
    Ok(())
}

#[rstest]
#[case::unknown_operator(json!(["translate", "x"]), EvalError::UnknownOperator("translate".to_owned()))]
#[case::unbound_variable(json!(["var", "nowhere"]), EvalError::UnboundVariable("nowhere".to_owned()))]
fn reports_evaluation_errors(#[case] expr: serde_json::Value, #[case] expected: EvalError) -> Result<()> {
    let result = evaluate(&expr, &properties(&[]));
    ensure!(result == Err(expected), "{expr}: got {result:?}");
    Ok(())
}

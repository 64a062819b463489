//! Render-time behaviour of glossed labels.

mod common;

use anyhow::{Context, Result, bail, ensure};
use common::{evaluate_localized, properties};
use diplomat::eval::{Formatted, Value};
use diplomat::expression::{localized_name_inline, localized_name_with_local_gloss};
use diplomat::gloss::{GLOSS_CLOSE, GLOSS_OPEN, GLOSS_SCALE};
use rstest::rstest;

fn formatted(value: Value) -> Result<Formatted> {
    match value {
        Value::Formatted(formatted) => Ok(formatted),
        other => bail!("expected a formatted label, got {other:?}"),
    }
}

fn section_text(formatted: &Formatted, index: usize) -> Option<&str> {
    formatted
        .sections
        .get(index)
        .map(|section| section.text.as_str())
}

/// Label text and gloss text (when glossed) for a feature.
fn label_and_gloss(
    locale: &str,
    localized: &str,
    local: &str,
) -> Result<(String, Option<String>)> {
    let field = format!("name:{locale}");
    let feature = properties(&[("name", local), (field.as_str(), localized)]);
    let label = formatted(evaluate_localized(
        localized_name_with_local_gloss(),
        &[locale],
        &feature,
    )?)?;
    let text = section_text(&label, 0)
        .context("label should have a first section")?
        .to_owned();
    Ok((text, section_text(&label, 3).map(ToOwned::to_owned)))
}

#[rstest]
fn puts_an_unlocalized_name_by_itself() -> Result<()> {
    let feature = properties(&[("name", "Null Island")]);
    let label = formatted(evaluate_localized(
        localized_name_with_local_gloss(),
        &["en"],
        &feature,
    )?)?;
    ensure!(label.sections.len() == 1, "got {label:?}");
    ensure!(section_text(&label, 0) == Some("Null Island"), "got {label:?}");
    Ok(())
}

#[rstest]
fn spreads_multiple_unlocalized_names_across_lines() -> Result<()> {
    let feature = properties(&[("name", "Null Island;Insula Nullius")]);
    let label = formatted(evaluate_localized(
        localized_name_with_local_gloss(),
        &["en"],
        &feature,
    )?)?;
    ensure!(label.sections.len() == 1, "got {label:?}");
    ensure!(
        section_text(&label, 0) == Some("Null Island\nInsula Nullius"),
        "got {label:?}"
    );
    Ok(())
}

#[rstest]
fn glosses_an_anglicized_name_with_the_local_name() -> Result<()> {
    let feature = properties(&[("name:en", "Null Island"), ("name", "Insula Nullius")]);
    let label = formatted(evaluate_localized(
        localized_name_with_local_gloss(),
        &["en"],
        &feature,
    )?)?;
    let texts: Vec<&str> = label.sections.iter().map(|s| s.text.as_str()).collect();
    ensure!(
        texts == ["Null Island", "\n", GLOSS_OPEN, "Insula Nullius", GLOSS_CLOSE],
        "unexpected sections {texts:?}"
    );
    let scale = label
        .sections
        .get(3)
        .and_then(|section| section.scale)
        .context("gloss should be scaled")?;
    ensure!(scale < 1.0, "gloss scale {scale} should shrink the text");
    ensure!(
        label.sections.iter().filter(|s| s.scale.is_some()).count() == 1,
        "only the gloss should be scaled"
    );
    Ok(())
}

#[rstest]
#[case::identical("en", "Null Island", "Null Island", "Null Island", None)]
#[case::case_only("en", "Null Island", "NULL Island", "Null Island", None)]
#[case::accent("en", "Montreal", "Montréal", "Montréal", None)]
#[case::accent_with_qualifier("en", "Quebec City", "Québec", "Québec City", None)]
#[case::vietnamese("en", "Da Nang", "Đà Nẵng", "Đà Nẵng", None)]
#[case::stroke_letters("en", "Nūll Island", "Ñüłl Íşlåńđ", "Ñüłl Íşlåńđ", None)]
#[case::suffix_word("en", "New York City", "New York", "New York City", None)]
#[case::comma_qualifier("en", "Washington, D.C.", "Washington", "Washington, D.C.", None)]
#[case::prefix_words("en", "Santiago de Querétaro", "Querétaro", "Santiago de Querétaro", None)]
#[case::not_a_word_boundary("en", "Córdobaaa", "Córdoba", "Córdobaaa", Some("Córdoba"))]
#[case::slash_alternates("en", "Derry", "Derry/Londonderry", "Derry", Some("Derry/Londonderry"))]
fn deduplicates_matching_anglicized_and_local_names(
    #[case] locale: &str,
    #[case] localized: &str,
    #[case] local: &str,
    #[case] expected_label: &str,
    #[case] expected_gloss: Option<&str>,
) -> Result<()> {
    let (label, gloss) = label_and_gloss(locale, localized, local)?;
    ensure!(
        label == expected_label && gloss.as_deref() == expected_gloss,
        "{localized:?}/{local:?}: expected ({expected_label:?}, {expected_gloss:?}), got ({label:?}, {gloss:?})"
    );
    Ok(())
}

#[rstest]
#[case::spanish_accent("es", "Los Ángeles", "Los Angeles")]
#[case::spanish_montreal("es", "Montreal", "Montréal")]
#[case::spanish_quebec("es", "Quebec", "Québec")]
#[case::polish_macron("pl", "Ryga", "Rīga")]
#[case::polish_stroke("pl", "Jurmała", "Jūrmala")]
fn glosses_non_english_names_with_lookalike_local_names(
    #[case] locale: &str,
    #[case] localized: &str,
    #[case] local: &str,
) -> Result<()> {
    let (label, gloss) = label_and_gloss(locale, localized, local)?;
    ensure!(
        label == localized && gloss.as_deref() == Some(local),
        "expected ({localized:?}, {local:?}), got ({label:?}, {gloss:?})"
    );
    Ok(())
}

#[rstest]
#[case::two_locals("Terra Nullius;空虛島", Some("Terra Nullius • 空虛島"))]
#[case::duplicate_first("Null Island;Terra Nullius;空虛島", Some("Terra Nullius • 空虛島"))]
#[case::duplicate_middle("Terra Nullius;Null Island;空虛島", Some("Terra Nullius • 空虛島"))]
#[case::duplicate_last("Terra Nullius;空虛島;Null Island", Some("Terra Nullius • 空虛島"))]
#[case::all_duplicates("Null Island;Null Island;Null Island", None)]
fn glosses_multiple_local_names(
    #[case] local: &str,
    #[case] expected_gloss: Option<&str>,
) -> Result<()> {
    let (label, gloss) = label_and_gloss("en", "Null Island", local)?;
    ensure!(label == "Null Island", "unexpected label {label:?}");
    ensure!(
        gloss.as_deref() == expected_gloss,
        "expected gloss {expected_gloss:?}, got {gloss:?}"
    );
    Ok(())
}

#[rstest]
fn inline_gloss_stays_on_the_label_line() -> Result<()> {
    let feature = properties(&[("name:en", "Null Island"), ("name", "Insula Nullius")]);
    let label = formatted(evaluate_localized(localized_name_inline(), &["en"], &feature)?)?;
    ensure!(section_text(&label, 1) == Some(" "), "got {label:?}");
    ensure!(
        label.text() == format!("Null Island {GLOSS_OPEN}Insula Nullius{GLOSS_CLOSE}"),
        "got {label:?}"
    );
    ensure!(
        label.sections.get(3).and_then(|s| s.scale) == Some(GLOSS_SCALE),
        "gloss should use the gloss scale"
    );
    Ok(())
}

#[rstest]
fn inline_unlocalized_names_share_one_line() -> Result<()> {
    let feature = properties(&[("name", "Null Island;Insula Nullius")]);
    let label = formatted(evaluate_localized(localized_name_inline(), &["en"], &feature)?)?;
    ensure!(
        label.text() == "Null Island • Insula Nullius",
        "got {label:?}"
    );
    Ok(())
}

//! Integration tests for CLI execution using `assert_cmd`.
//!
//! These tests invoke the compiled binary with an explicit `--language` (or
//! configuration layer) so results do not depend on the host locale.

mod common;

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use common::data_path;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn diplomat() -> Result<Command> {
    let mut cmd = Command::cargo_bin("diplomat").context("locate diplomat binary")?;
    cmd.env_remove("DIPLOMAT_LANGUAGE")
        .env_remove("DIPLOMAT_URL")
        .env_remove("DIPLOMAT_VERBOSE")
        .env_remove("DIPLOMAT_CONFIG_PATH");
    Ok(cmd)
}

#[test]
fn locales_subcommand_prints_ranked_locales() -> Result<()> {
    diplomat()?
        .args(["--language", "en-t-zh,zh-u-nu-hant", "locales"])
        .assert()
        .success()
        .stdout("en-t-zh\nen\nzh-u-nu-hant\nzh\n");
    Ok(())
}

#[test]
fn url_fragment_selects_the_language() -> Result<()> {
    diplomat()?
        .args(["--url", "http://localhost:1776/#map=1/2/3&language=tlh-UN,ase", "locales"])
        .assert()
        .success()
        .stdout("tlh-UN\ntlh\nase\n");
    Ok(())
}

#[test]
fn localize_streams_to_stdout_by_default() -> Result<()> {
    let output = diplomat()?
        .args(["--language", "de"])
        .arg("localize")
        .arg(data_path("style.json"))
        .output()
        .context("run diplomat localize")?;
    ensure!(output.status.success(), "localize should succeed");
    let style: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("stdout should be a style document")?;
    ensure!(
        style.pointer("/layers/3/layout/text-field/2")
            == Some(&serde_json::json!([
                "coalesce",
                ["get", "name:de"],
                ["get", "name_de"],
                ["get", "name"]
            ])),
        "road label should use German and legacy fields: {style}"
    );
    ensure!(
        style.pointer("/layers/1/layout/text-field") == Some(&serde_json::json!("Null Sea")),
        "literal labels should be untouched"
    );
    Ok(())
}

#[test]
fn localize_writes_the_output_file() -> Result<()> {
    let temp = tempdir().context("create temp dir for localize output")?;
    let output = temp.path().join("out").join("style.fr.json");
    diplomat()?
        .args(["--language", "fr"])
        .arg("localize")
        .arg(data_path("style.json"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout("");
    let text = fs::read_to_string(&output)
        .with_context(|| format!("read {}", output.display()))?;
    ensure!(text.contains("name:fr"), "output should be localized: {text}");
    Ok(())
}

#[test]
fn preview_renders_a_glossed_label() -> Result<()> {
    diplomat()?
        .args(["--language", "en"])
        .arg("preview")
        .arg(data_path("style.json"))
        .args([
            "--layer",
            "place-label",
            "--properties",
            r#"{"name": "Insula Nullius", "name:en": "Null Island"}"#,
        ])
        .assert()
        .success()
        .stdout("Null Island\n(\u{2068}Insula Nullius\u{2069})\n");
    Ok(())
}

#[test]
fn preview_reports_missing_layers() -> Result<()> {
    diplomat()?
        .args(["--language", "en"])
        .arg("preview")
        .arg(data_path("style.json"))
        .args(["--layer", "nowhere"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("layer `nowhere` not found"));
    Ok(())
}

#[test]
fn preview_rejects_non_object_properties() -> Result<()> {
    diplomat()?
        .arg("preview")
        .arg(data_path("style.json"))
        .args(["--layer", "place-label", "--properties", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("properties must be a JSON object"));
    Ok(())
}

#[test]
fn country_names_subcommand_prints_the_table() -> Result<()> {
    diplomat()?
        .args(["--language", "eo"])
        .arg("country-names")
        .arg(data_path("country_names.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""USA": "USONO""#));
    Ok(())
}

#[test]
fn configuration_layers_follow_precedence() -> Result<()> {
    let temp = tempdir().context("create temp dir for config")?;
    let config_path = temp.path().join("diplomat.toml");
    fs::write(&config_path, "language = \"eo\"\n").context("write diplomat.toml")?;

    diplomat()?
        .current_dir(temp.path())
        .env("DIPLOMAT_CONFIG_PATH", &config_path)
        .arg("locales")
        .assert()
        .success()
        .stdout("eo\n");

    diplomat()?
        .current_dir(temp.path())
        .env("DIPLOMAT_CONFIG_PATH", &config_path)
        .env("DIPLOMAT_LANGUAGE", "fr-CA")
        .arg("locales")
        .assert()
        .success()
        .stdout("fr-CA\nfr\n");

    diplomat()?
        .current_dir(temp.path())
        .env("DIPLOMAT_CONFIG_PATH", &config_path)
        .env("DIPLOMAT_LANGUAGE", "fr-CA")
        .args(["--language", "de", "locales"])
        .assert()
        .success()
        .stdout("de\n");
    Ok(())
}

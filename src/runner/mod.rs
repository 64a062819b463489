//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! resolves the reader's locales and executes the requested command.

mod error;

pub use error::RunnerError;

use crate::cli::{Cli, Commands};
use crate::country_names::StaticCountryNames;
use crate::eval::{self, Properties, Value};
use crate::locale_resolution::{
    LanguagePreferences, SystemPreferences, language_from_url, ranked_locales,
};
use crate::localize::{LabelLocalizer, localize_layers};
use crate::style::Style;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Path that selects stdout instead of a file.
pub const STDOUT_PATH: &str = "-";

/// Execute the parsed [`Cli`] command, writing results to stdout.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the requested
/// layer cannot be rendered.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_to(cli, &SystemPreferences, &mut out)
}

/// Execute the parsed [`Cli`] command with explicit preferences and output.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the requested
/// layer cannot be rendered.
pub fn run_to<W: Write>(
    cli: &Cli,
    preferences: &impl LanguagePreferences,
    out: &mut W,
) -> Result<()> {
    let locales = resolve_locales(cli, preferences)?;
    match cli.command.clone().unwrap_or(Commands::Locales) {
        Commands::Locales => write_locales(&locales, out),
        Commands::Localize { style, output } => {
            let mut document = load_style(&style)?;
            let substitutions = localize_layers(&mut document.layers, &locales);
            info!(
                style = %style.display(),
                substitutions,
                "Localized style"
            );
            write_style(&document, &output, out)
        }
        Commands::Preview {
            style,
            layer,
            properties,
        } => preview(&style, &layer, &properties, &locales, out),
        Commands::CountryNames { table } => write_country_names(&table, &locales, out),
    }
}

/// Resolve the ranked locale list for the CLI options.
///
/// `--language` wins over the `language` parameter of `--url`; without
/// either, the host preferences are used.
///
/// # Errors
///
/// Returns an error if `--url` is not a valid URL.
pub fn resolve_locales(cli: &Cli, preferences: &impl LanguagePreferences) -> Result<Vec<String>> {
    let override_language = match (&cli.language, &cli.url) {
        (Some(list), _) => Some(list.clone()),
        (None, Some(raw)) => {
            let url = Url::parse(raw).with_context(|| format!("parsing map URL {raw}"))?;
            language_from_url(&url)
        }
        (None, None) => None,
    };
    Ok(ranked_locales(override_language.as_deref(), preferences))
}

fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == STDOUT_PATH
}

fn load_style(path: &Path) -> Result<Style> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading style {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing style {}", path.display()))
}

fn write_locales<W: Write>(locales: &[String], out: &mut W) -> Result<()> {
    for locale in locales {
        writeln!(out, "{locale}").context("writing locales")?;
    }
    Ok(())
}

fn write_style<W: Write>(style: &Style, output: &Path, out: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(style).context("serializing localized style")?;
    if is_stdout_path(output) {
        writeln!(out, "{json}").context("writing localized style to stdout")?;
        return Ok(());
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent directory {}", parent.display()))?;
    }
    fs::write(output, json)
        .with_context(|| format!("failed to write localized style to {}", output.display()))?;
    info!("Wrote localized style to {}", output.display());
    Ok(())
}

fn preview<W: Write>(
    style_path: &Path,
    layer_id: &str,
    properties: &Properties,
    locales: &[String],
    out: &mut W,
) -> Result<()> {
    let mut style = load_style(style_path)?;
    localize_layers(&mut style.layers, locales);
    let layer = style
        .layer(layer_id)
        .ok_or_else(|| RunnerError::LayerNotFound {
            layer: layer_id.to_owned(),
            path: style_path.to_path_buf(),
        })?;
    let text_field = layer
        .text_field()
        .ok_or_else(|| RunnerError::MissingTextField {
            layer: layer_id.to_owned(),
        })?;
    let value = eval::evaluate(text_field, properties)
        .with_context(|| format!("evaluating label of layer {layer_id}"))?;
    if let Value::Formatted(formatted) = &value {
        debug!(sections = ?formatted.sections, "formatted label");
    }
    let text = value.to_text().ok_or_else(|| RunnerError::NotText {
        layer: layer_id.to_owned(),
    })?;
    writeln!(out, "{text}").context("writing preview")?;
    Ok(())
}

fn write_country_names<W: Write>(table: &Path, locales: &[String], out: &mut W) -> Result<()> {
    let text = fs::read_to_string(table)
        .with_context(|| format!("reading country names {}", table.display()))?;
    let provider = StaticCountryNames::from_json(&text)
        .with_context(|| format!("parsing country names {}", table.display()))?;
    let mut localizer = LabelLocalizer::new(provider);
    localizer.localize(&mut [], locales);
    let json = serde_json::to_string_pretty(localizer.country_names())
        .context("serializing country names")?;
    writeln!(out, "{json}").context("writing country names")?;
    Ok(())
}

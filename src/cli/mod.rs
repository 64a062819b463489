//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands, and merges
//! the parsed values with configuration files and `DIPLOMAT_*` environment
//! variables through `ortho_config`.

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoMergeExt, OrthoResult, sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::eval::Properties;

mod parsing;

use parsing::{parse_language_list, parse_properties, parse_url};

const APP_NAME: &str = "diplomat";
const CONFIG_ENV_VAR: &str = "DIPLOMAT_CONFIG_PATH";
const ENV_PREFIX: &str = "DIPLOMAT_";

/// Fields that only count as CLI overrides when given on the command line.
const OVERRIDABLE_FIELDS: [&str; 3] = ["language", "url", "verbose"];

/// Localize the labels of map styles for a reader's preferred languages.
#[derive(Debug, Default, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(name = "diplomat", author, version, about, long_about = None)]
#[ortho_config(prefix = "DIPLOMAT")]
pub struct Cli {
    /// Comma-separated locale override, for example `fr-CA,de`.
    ///
    /// Takes precedence over `--url` and the system preferences.
    #[arg(short, long, global = true, value_name = "LIST", value_parser = parse_language_list)]
    pub language: Option<String>,

    /// Map URL whose fragment may carry a `language` parameter.
    #[arg(long, global = true, value_name = "URL", value_parser = parse_url)]
    pub url: Option<String>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long, global = true)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Subcommand to execute; defaults to `locales` when omitted.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Locales);
        }
        self
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Print the ranked locale list, one tag per line.
    Locales,

    /// Rewrite the label expressions of a style document.
    Localize {
        /// Style JSON document to localize.
        #[arg(value_name = "STYLE")]
        style: PathBuf,

        /// Where to write the localized style.
        ///
        /// Use `-` to write to stdout.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        output: PathBuf,
    },

    /// Localize a style, then render one layer's label for a feature.
    Preview {
        /// Style JSON document to localize.
        #[arg(value_name = "STYLE")]
        style: PathBuf,

        /// Identifier of the layer whose label is rendered.
        #[arg(long, value_name = "ID")]
        layer: String,

        /// Feature properties as a JSON object.
        #[arg(long, value_name = "JSON", default_value = "{}", value_parser = parse_properties)]
        properties: Properties,
    },

    /// Print the localized country-name table as JSON.
    CountryNames {
        /// JSON document of country names keyed by language, then code.
        #[arg(value_name = "TABLE")]
        table: PathBuf,
    },
}

/// Parse CLI arguments.
///
/// Returns both the parsed CLI struct and the `ArgMatches` required for
/// configuration merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    // Clone matches before from_arg_matches_mut consumes the values.
    let matches_for_merge = matches.clone();
    let mut matches_for_parse = matches;
    let cli = Cli::from_arg_matches_mut(&mut matches_for_parse)
        .map_err(|clap_err| clap_err.with_cmd(&command))?;
    Ok((cli, matches_for_merge))
}

/// Return the prefixed environment provider for CLI configuration.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder(APP_NAME)
        .env_var(CONFIG_ENV_VAR)
        .build()
}

/// Return `true` when no CLI overrides were supplied.
///
/// The merge pipeline treats an empty JSON object as "no overrides".
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let value = sanitize_value(cli)?;
    let mut map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(ortho_config::OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };

    map.remove("command");
    for field in OVERRIDABLE_FIELDS {
        if matches.value_source(field) != Some(ValueSource::CommandLine) {
            map.remove(field);
        }
    }

    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// Precedence, lowest first: defaults, the `diplomat` configuration file
/// (or the file named by `DIPLOMAT_CONFIG_PATH`), `DIPLOMAT_*` environment
/// variables, then flags given on the command line.
///
/// # Errors
///
/// Returns an [`ortho_config::OrthoError`] if layer composition or merging
/// fails.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> OrthoResult<Cli> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let mut file_layers = config_discovery().compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        composer.push_layer(layer);
    }

    let env_provider = env_provider()
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition.into_merge_result(Cli::merge_from_layers)?;
    merged.command = command;
    Ok(merged)
}

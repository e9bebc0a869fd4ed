use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override configuration values.
///
/// Nested keys are separated by a double underscore, e.g.
/// `TRANSCODER_JOB__QUALITY=80` or `TRANSCODER_TOOLS__BIN_DIR=/opt/codecs`.
pub const ENV_PREFIX: &str = "TRANSCODER_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    extract(layered(Some(path))?)
}

/// Load configuration from an optional file, then the environment, then
/// `overrides` (typically the command line), later sources winning.
///
/// `overrides` must serialize to the same shape as [`Config`]; absent
/// fields leave earlier values in place.
pub fn load_config_with<T: Serialize>(
    path: Option<&Path>,
    overrides: &T,
) -> Result<Config, ConfigError> {
    extract(layered(path)?.merge(Serialized::globals(overrides)))
}

fn layered(path: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

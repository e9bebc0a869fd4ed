use super::{types::Config, ConfigError};
use crate::processor::DispatcherConfig;

/// Validate configuration and convert it into dispatcher settings.
///
/// Rejects unknown format names, quality outside 0 to 100 and worker
/// counts outside 1 to 64. Paths are checked later, when the dispatcher
/// is built.
pub fn validate_config(config: &Config) -> Result<DispatcherConfig, ConfigError> {
    DispatcherConfig::try_from(&config.job)
        .map_err(|e| ConfigError::ValidationError(e.to_string()))
}

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server and public ports are not 0
/// - Proxy rotation list is non-empty when proxying is enabled
/// - Retention and sweep interval are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.public.port == 0 {
        return Err(ConfigError::ValidationError(
            "public.port cannot be 0".to_string(),
        ));
    }

    if config.proxy.enabled && config.proxy.endpoints.is_empty() {
        return Err(ConfigError::ValidationError(
            "proxy.endpoints cannot be empty when proxy.enabled is true".to_string(),
        ));
    }

    if config.storage.retention_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.retention_secs cannot be 0".to_string(),
        ));
    }

    if config.storage.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.sweep_interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

use anyhow::{Context, Result};
use campus_config::domains::logging::{LogFormat, LoggingConfig};
use campus_config::Validatable;
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration
///
/// The configured directive wins; `RUST_LOG` is consulted only when the
/// directive does not parse. A second call is a no-op.
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<()> {
    config
        .validate()
        .context("Invalid logging configuration")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(&config.directive()))
        .with_ansi(config.ansi)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_config::domains::logging::LogLevel;

    #[test]
    fn test_repeated_init_is_harmless() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            ansi: false,
            ..LoggingConfig::default()
        };

        assert!(init_logging_from_config(&config).is_ok());
        assert!(init_logging_from_config(&config).is_ok());
        assert!(init_simple_tracing("warn").is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LoggingConfig {
            filter: Some("campus_rbac=debug, info".to_string()),
            ..LoggingConfig::default()
        };

        let err = init_logging_from_config(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid logging configuration"));
    }

    #[test]
    fn test_unparseable_directive_falls_back() {
        // Must not panic on garbage
        let _filter = build_filter("campus_rbac=[[[");
    }
}

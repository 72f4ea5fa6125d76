//! Configuration loading and environment variable handling

use crate::domains::CampusConfig;
use crate::error::{ConfigError, ConfigResult};
use campus_rbac::Scope;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "CAMPUS".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<CampusConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: CampusConfig = serde_yaml::from_str(&content)?;

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config)?;

        // Validate all domains
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<CampusConfig> {
        let mut config = CampusConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<CampusConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut CampusConfig) -> ConfigResult<()> {
        self.apply_rbac_overrides(&mut config.rbac)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply authorization config overrides
    fn apply_rbac_overrides(
        &self,
        config: &mut crate::domains::rbac::RbacConfig,
    ) -> ConfigResult<()> {
        if let Ok(super_scope) = self.get_env_var("SUPER_SCOPE") {
            config.super_scope = match super_scope.trim().to_lowercase().as_str() {
                "" | "none" => None,
                token => Some(Scope::from_str(token).map_err(|_| {
                    ConfigError::EnvError(format!("Invalid SUPER_SCOPE: {}", super_scope))
                })?),
            };
        }

        if let Ok(policy) = self.get_env_var("EMPTY_REQUIREMENT") {
            config.empty_requirement = policy.parse().map_err(|_| {
                ConfigError::EnvError(format!("Invalid EMPTY_REQUIREMENT: {}", policy))
            })?;
        }

        if let Ok(entry_point) = self.get_env_var("ENTRY_POINT") {
            config.entry_point = entry_point;
        }

        if let Ok(path) = self.get_env_var("REGISTRY_PATH") {
            config.registry_path = Some(PathBuf::from(path));
        }

        if let Ok(audit) = self.get_env_var("AUDIT_DECISIONS") {
            config.audit_decisions = audit
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid AUDIT_DECISIONS: {}", e)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

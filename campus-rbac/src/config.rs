//! Configuration for the RBAC system

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    error::{RbacError, RbacResult},
    models::Scope,
    registry::ScopeRegistry,
};

/// What the check answers for a requirement naming no scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyRequirementPolicy {
    /// Vacuously satisfied once an actor exists
    Allow,
    /// Treated as a denial unless the super-scope applies
    #[default]
    Deny,
}

impl std::str::FromStr for EmptyRequirementPolicy {
    type Err = RbacError;

    fn from_str(s: &str) -> RbacResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(RbacError::invalid_config(format!(
                "Invalid empty requirement policy: {}",
                other
            ))),
        }
    }
}

/// Inputs of the pure authorization check besides actor and requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    /// Scope that overrides every other check; `None` disables the override
    pub super_scope: Option<Scope>,

    /// Answer for requirements naming no scopes
    pub empty_requirement: EmptyRequirementPolicy,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            super_scope: Some(Scope::SchoolAdmin),
            empty_requirement: EmptyRequirementPolicy::Deny,
        }
    }
}

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// Administrative super-scope
    pub super_scope: Option<Scope>,

    /// Answer for requirements naming no scopes
    pub empty_requirement: EmptyRequirementPolicy,

    /// Where unauthenticated callers are sent by the route guard
    pub entry_point: String,

    /// Registry YAML file (optional, defaults to the built-in table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,

    /// Log every authorization decision at debug level
    pub audit_decisions: bool,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            super_scope: Some(Scope::SchoolAdmin),
            empty_requirement: EmptyRequirementPolicy::Deny,
            entry_point: "/login".to_string(),
            registry_path: None,
            audit_decisions: false,
        }
    }
}

impl RbacConfig {
    /// Policy handed to the authorization check
    pub fn policy(&self) -> CheckPolicy {
        CheckPolicy {
            super_scope: self.super_scope,
            empty_requirement: self.empty_requirement,
        }
    }

    /// Load the scope registry named by this configuration
    pub fn load_registry(&self) -> RbacResult<ScopeRegistry> {
        match &self.registry_path {
            Some(path) => ScopeRegistry::from_path(path),
            None => Ok(ScopeRegistry::builtin()),
        }
    }

    /// Check the configuration for values the guard cannot work with
    pub fn validate(&self) -> RbacResult<()> {
        if self.entry_point.trim().is_empty() {
            return Err(RbacError::invalid_config("entry_point cannot be empty"));
        }

        if !self.entry_point.starts_with('/') {
            return Err(RbacError::invalid_config(format!(
                "entry_point must be an absolute path, got '{}'",
                self.entry_point
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_default_config() {
        let config = RbacConfig::default();
        assert_eq!(config.super_scope, Some(Scope::SchoolAdmin));
        assert_eq!(config.empty_requirement, EmptyRequirementPolicy::Deny);
        assert_eq!(config.entry_point, "/login");
        assert!(config.validate().is_ok());
        assert_eq!(config.policy(), CheckPolicy::default());
    }

    #[test]
    fn test_entry_point_validation() {
        let mut config = RbacConfig::default();
        config.entry_point = String::new();
        assert!(config.validate().is_err());

        config.entry_point = "login".to_string();
        assert!(config.validate().is_err());

        config.entry_point = "/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = r#"
super_scope: "school:admin"
empty_requirement: allow
entry_point: /home
"#;
        let config: RbacConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.empty_requirement, EmptyRequirementPolicy::Allow);
        assert_eq!(config.entry_point, "/home");
        assert!(!config.audit_decisions);

        let config: RbacConfig = serde_yaml::from_str("super_scope: null").unwrap();
        assert_eq!(config.policy().super_scope, None);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "ALLOW".parse::<EmptyRequirementPolicy>().unwrap(),
            EmptyRequirementPolicy::Allow
        );
        assert!("maybe".parse::<EmptyRequirementPolicy>().is_err());
    }

    #[test]
    fn test_builtin_registry_without_path() {
        let registry = RbacConfig::default().load_registry().unwrap();
        assert!(registry.roles().any(|role| role == Role::Teacher));
    }
}

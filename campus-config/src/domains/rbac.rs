//! Authorization configuration

pub use campus_rbac::config::{EmptyRequirementPolicy, RbacConfig};

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};

impl Validatable for RbacConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.entry_point, "entry_point", self.domain_name())?;

        RbacConfig::validate(self).map_err(|e| self.validation_error(e.to_string()))?;

        if let Some(path) = &self.registry_path {
            if !path.is_file() {
                return Err(self.validation_error(format!(
                    "registry_path does not point to a file: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "rbac"
    }
}

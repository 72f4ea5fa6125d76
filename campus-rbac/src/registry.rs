//! Scope registry: the static Role → Resource → Actions table
//!
//! The registry backs the administrative "view permissions" report only.
//! Live authorization never consults it; use [`ScopeRegistry::parity`] to see
//! where the table and an actual scope grant disagree.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{RbacError, RbacResult},
    models::{ActionType, ResourceType, Role, Scope, SCOPE_SET_VERSION},
};

type ResourceActions = BTreeMap<ResourceType, BTreeSet<ActionType>>;

/// Immutable registry table, cheap to clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRegistry {
    entries: Arc<BTreeMap<Role, ResourceActions>>,
}

/// Shape of a registry file: role → resource → list of actions
type RegistryFile = BTreeMap<Role, BTreeMap<ResourceType, Vec<ActionType>>>;

impl ScopeRegistry {
    /// Registry shipped with the app
    pub fn builtin() -> Self {
        use ActionType::*;
        use ResourceType::*;

        const CRUD: &[ActionType] = &[Create, Read, Update, Delete];
        const CRUD_EXPORT: &[ActionType] = &[Create, Read, Update, Delete, Export];
        const ALL_ACTIONS: &[ActionType] = &[Create, Read, Update, Delete, Export, Approve];
        const ALL_RESOURCES: &[ResourceType] = &[
            Schools, Students, Staff, Classes, Attendance, Library, Courses, Fees, Content, Reports,
            Settings,
        ];

        let mut table = RegistryTableBuilder::default();

        for resource in ALL_RESOURCES {
            table.grant(Role::SuperAdmin, *resource, ALL_ACTIONS);
        }

        table
            .grant(Role::SchoolAdmin, Schools, &[Read, Update])
            .grant(Role::SchoolAdmin, Students, CRUD_EXPORT)
            .grant(Role::SchoolAdmin, Staff, CRUD_EXPORT)
            .grant(Role::SchoolAdmin, Classes, CRUD_EXPORT)
            .grant(Role::SchoolAdmin, Attendance, &[Read, Export])
            .grant(Role::SchoolAdmin, Library, &[Read])
            .grant(Role::SchoolAdmin, Courses, &[Read])
            .grant(Role::SchoolAdmin, Fees, &[Read, Export])
            .grant(Role::SchoolAdmin, Content, CRUD)
            .grant(Role::SchoolAdmin, Reports, &[Read, Export])
            .grant(Role::SchoolAdmin, Settings, &[Read, Update]);

        table
            .grant(Role::LmsAdmin, Courses, &[Create, Read, Update, Delete, Approve])
            .grant(Role::LmsAdmin, Classes, &[Read])
            .grant(Role::LmsAdmin, Students, &[Read])
            .grant(Role::LmsAdmin, Content, &[Read])
            .grant(Role::LmsAdmin, Reports, &[Read]);

        table
            .grant(Role::Bursar, Fees, &[Create, Read, Update, Export, Approve])
            .grant(Role::Bursar, Students, &[Read])
            .grant(Role::Bursar, Reports, &[Read, Export]);

        table
            .grant(Role::Teacher, Classes, &[Read])
            .grant(Role::Teacher, Students, &[Read])
            .grant(Role::Teacher, Attendance, &[Create, Read, Update])
            .grant(Role::Teacher, Courses, &[Create, Read, Update])
            .grant(Role::Teacher, Library, &[Read])
            .grant(Role::Teacher, Reports, &[Read]);

        table
            .grant(Role::Librarian, Library, CRUD)
            .grant(Role::Librarian, Students, &[Read]);

        table
            .grant(Role::FrontDesk, Students, &[Create, Read])
            .grant(Role::FrontDesk, Attendance, &[Read])
            .grant(Role::FrontDesk, Content, &[Read]);

        table
            .grant(Role::Student, Courses, &[Read])
            .grant(Role::Student, Library, &[Read])
            .grant(Role::Student, Content, &[Read]);

        table.build()
    }

    /// Load a registry from YAML
    pub fn from_yaml_str(yaml: &str) -> RbacResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(yaml)
            .map_err(|e| RbacError::invalid_registry(e.to_string()))?;

        let mut table = RegistryTableBuilder::default();
        for (role, resources) in file {
            for (resource, actions) in resources {
                validate_actions(role, resource, &actions)?;
                table.grant(role, resource, &actions);
            }
        }

        let registry = table.build();
        tracing::info!(roles = registry.entries.len(), "Loaded scope registry");
        Ok(registry)
    }

    /// Load a registry from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> RbacResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Roles with at least one entry
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.entries.keys().copied()
    }

    /// Actions listed for a role on a resource
    pub fn actions_for(&self, role: Role, resource: ResourceType) -> Option<&BTreeSet<ActionType>> {
        self.entries.get(&role).and_then(|resources| resources.get(&resource))
    }

    /// Check if the table lists an action for a role on a resource
    pub fn allows(&self, role: Role, resource: ResourceType, action: ActionType) -> bool {
        self.actions_for(role, resource)
            .map(|actions| actions.contains(&action))
            .unwrap_or(false)
    }

    /// Scopes the table implies for a role
    ///
    /// Each (resource, action) pair maps onto the scope of the resource's
    /// domain at the access level the action needs.
    pub fn implied_scopes(&self, role: Role) -> BTreeSet<Scope> {
        let Some(resources) = self.entries.get(&role) else {
            return BTreeSet::new();
        };

        resources
            .iter()
            .flat_map(|(resource, actions)| {
                actions.iter().filter_map(move |action| {
                    Scope::from_parts(resource.scope_domain(), action.required_access())
                })
            })
            .collect()
    }

    /// Compare what the table implies for a role against an actual grant
    pub fn parity(&self, role: Role, granted: &BTreeSet<Scope>) -> ParityReport {
        let implied = self.implied_scopes(role);
        ParityReport {
            role,
            registry_only: implied.difference(granted).copied().collect(),
            granted_only: granted.difference(&implied).copied().collect(),
        }
    }

    /// Read-only dump for the administrative view
    pub fn report(&self) -> RegistryReport {
        let rows = self
            .entries
            .iter()
            .flat_map(|(role, resources)| {
                resources.iter().map(move |(resource, actions)| RegistryRow {
                    role: *role,
                    resource: *resource,
                    actions: actions.iter().copied().collect(),
                })
            })
            .collect();

        RegistryReport {
            scope_set_version: SCOPE_SET_VERSION,
            rows,
        }
    }
}

fn validate_actions(role: Role, resource: ResourceType, actions: &[ActionType]) -> RbacResult<()> {
    if actions.is_empty() {
        return Err(RbacError::invalid_registry(format!(
            "{} on {} lists no actions",
            role, resource
        )));
    }

    let mut seen = BTreeSet::new();
    for action in actions {
        if !seen.insert(*action) {
            return Err(RbacError::invalid_registry(format!(
                "{} on {} lists '{}' more than once",
                role, resource, action
            )));
        }
    }

    Ok(())
}

#[derive(Default)]
struct RegistryTableBuilder {
    entries: BTreeMap<Role, ResourceActions>,
}

impl RegistryTableBuilder {
    fn grant(&mut self, role: Role, resource: ResourceType, actions: &[ActionType]) -> &mut Self {
        self.entries
            .entry(role)
            .or_default()
            .entry(resource)
            .or_default()
            .extend(actions.iter().copied());
        self
    }

    fn build(self) -> ScopeRegistry {
        ScopeRegistry {
            entries: Arc::new(self.entries),
        }
    }
}

/// One row of the registry report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRow {
    pub role: Role,
    pub resource: ResourceType,
    pub actions: Vec<ActionType>,
}

/// Registry dump, ordered by role then resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryReport {
    pub scope_set_version: u32,
    pub rows: Vec<RegistryRow>,
}

impl RegistryReport {
    pub fn to_yaml(&self) -> RbacResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> RbacResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rows for a single role
    pub fn rows_for(&self, role: Role) -> impl Iterator<Item = &RegistryRow> {
        self.rows.iter().filter(move |row| row.role == role)
    }
}

/// Where the registry and a scope grant disagree for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityReport {
    pub role: Role,
    /// Implied by the registry but not granted
    pub registry_only: BTreeSet<Scope>,
    /// Granted but not implied by the registry
    pub granted_only: BTreeSet<Scope>,
}

impl ParityReport {
    pub fn is_consistent(&self) -> bool {
        self.registry_only.is_empty() && self.granted_only.is_empty()
    }
}

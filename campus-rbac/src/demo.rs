//! Demo harness: preset actors and role switching
//!
//! Development convenience for trying the UI at different permission levels.
//! Compiled only with the `demo-harness` feature; production builds take
//! actors from the authentication service instead.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::{
    actor::Actor,
    identity::{IdentityProvider, Session},
    models::{Role, Scope},
};

/// Scopes granted to the preset actor of each role
pub fn preset_scopes(role: Role) -> BTreeSet<Scope> {
    use Scope::*;

    let scopes: &[Scope] = match role {
        Role::SuperAdmin => &[SchoolAdmin],
        Role::SchoolAdmin => &[
            SchoolRead,
            SchoolWrite,
            AttendanceRead,
            AttendanceWrite,
            LibraryRead,
            LmsRead,
            FinanceRead,
            CmsRead,
            CmsWrite,
        ],
        Role::LmsAdmin => &[SchoolRead, LmsRead, LmsWrite, CmsRead],
        Role::Bursar => &[SchoolRead, FinanceRead, FinanceWrite],
        Role::Teacher => &[
            SchoolRead,
            AttendanceRead,
            AttendanceWrite,
            LmsRead,
            LmsWrite,
            LibraryRead,
        ],
        Role::Librarian => &[SchoolRead, LibraryRead, LibraryWrite],
        Role::FrontDesk => &[SchoolRead, AttendanceRead, CmsRead],
        Role::Student => &[SchoolRead, LmsRead, LibraryRead],
    };

    scopes.iter().copied().collect()
}

/// Preset actor for a role
pub fn preset_actor(role: Role) -> Actor {
    Actor::builder(format!("demo-{}", role.as_str().replace('_', "-")), role)
        .display_name(format!("Demo {}", role.display_name()))
        .scopes(preset_scopes(role))
        .build()
}

/// Swaps the session's actor for the preset of a chosen role
#[derive(Debug, Clone)]
pub struct RoleSwitcher {
    session: Arc<Session>,
}

impl RoleSwitcher {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Replace the current actor wholesale with the preset for `role`
    ///
    /// Returns the new actor.
    pub fn switch_to(&self, role: Role) -> Arc<Actor> {
        let actor = Arc::new(preset_actor(role));
        let previous = self.session.replace_shared(Some(actor.clone()));
        info!(
            from = previous.as_ref().map(|a| a.role.as_str()).unwrap_or("signed_out"),
            to = role.as_str(),
            "Switched demo role"
        );
        actor
    }

    /// Role of the current actor, if signed in
    pub fn current_role(&self) -> Option<Role> {
        self.session.current_actor().map(|actor| actor.role)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Authorizer;

    #[test]
    fn test_every_role_has_a_preset() {
        for role in Role::ALL {
            let actor = preset_actor(role);
            assert_eq!(actor.role, role);
            assert!(!actor.scopes.is_empty());
        }
        assert_eq!(preset_actor(Role::FrontDesk).id, "demo-front-desk");
    }

    #[test]
    fn test_only_super_admin_holds_super_scope() {
        for role in Role::ALL {
            assert_eq!(
                preset_scopes(role).contains(&Scope::SchoolAdmin),
                role == Role::SuperAdmin
            );
        }
    }

    #[test]
    fn test_switch_replaces_grants() {
        let session = Arc::new(Session::new());
        let switcher = RoleSwitcher::new(session.clone());
        let authorizer = Authorizer::builder().identity(session).build().unwrap();

        switcher.switch_to(Role::Teacher);
        assert!(authorizer.can(Scope::AttendanceWrite));

        let actor = switcher.switch_to(Role::Student);
        assert_eq!(actor.role, Role::Student);
        assert_eq!(switcher.current_role(), Some(Role::Student));
        assert!(!authorizer.can(Scope::AttendanceWrite));
        assert!(!authorizer.can(Scope::LmsWrite));
        assert!(authorizer.can([Scope::LmsRead, Scope::LibraryRead]));
    }
}

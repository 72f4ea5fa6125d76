//! Scope-based access control for the Campus school-management front end
//!
//! This crate provides the authorization decision point consulted by views
//! and route guards:
//! - A closed set of scope tokens granted to the signed-in actor
//! - A pure `can` check with a configurable super-scope override
//! - Route guards, usable directly or as axum middleware
//! - A static role registry for the "view permissions" report
//!
//! The actor lives in an injected [`Session`]; there is no global state.

pub mod actor;
pub mod config;
#[cfg(feature = "demo-harness")]
pub mod demo;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod permissions;
pub mod registry;

pub use actor::{Actor, ActorBuilder};
pub use config::{CheckPolicy, EmptyRequirementPolicy, RbacConfig};
pub use error::{RbacError, RbacResult};
pub use guard::{guard_middleware, AccessDenied, GuardDecision, GuardOutcome, GuardState, RouteGuard};
pub use identity::{ActorCallback, IdentityProvider, Session};
pub use models::{ActionType, ResourceType, Role, Scope, SCOPE_SET_VERSION};
pub use permissions::{can, check, Authorizer, Decision, DenyReason, GrantReason, Requirement};
pub use registry::{ParityReport, RegistryReport, ScopeRegistry};

#[cfg(feature = "demo-harness")]
pub use demo::{preset_actor, preset_scopes, RoleSwitcher};

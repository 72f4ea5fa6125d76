//! Permission checking
//!
//! [`check`] and [`can`] are the pure decision functions. [`Authorizer`]
//! binds them to an identity provider so views can ask `can(requirement)`
//! about whoever is signed in right now.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    actor::Actor,
    config::{CheckPolicy, EmptyRequirementPolicy, RbacConfig},
    error::{RbacError, RbacResult},
    identity::IdentityProvider,
    models::Scope,
};

/// Scopes a view or action needs, all of which must be held
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    scopes: Vec<Scope>,
    unknown: Vec<String>,
}

impl Requirement {
    /// Requirement naming no scopes
    pub fn none() -> Self {
        Self::default()
    }

    /// Requirement for a single scope
    pub fn scope(scope: Scope) -> Self {
        Self {
            scopes: vec![scope],
            unknown: Vec::new(),
        }
    }

    /// Requirement for every scope in the list
    pub fn all(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            scopes: scopes.into_iter().collect(),
            unknown: Vec::new(),
        }
    }

    /// Requirement from raw tokens
    ///
    /// Tokens outside the scope set are kept as unknown; no actor holds them.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut requirement = Self::default();
        for token in tokens {
            let token = token.as_ref();
            match token.parse::<Scope>() {
                Ok(scope) => requirement.scopes.push(scope),
                Err(_) => requirement.unknown.push(token.to_string()),
            }
        }
        requirement
    }

    /// Every requested token, known scopes first
    pub fn tokens(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .map(|scope| scope.as_str())
            .chain(self.unknown.iter().map(String::as_str))
            .collect()
    }

    /// Known scopes in the requirement
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Tokens that did not parse into a scope
    pub fn unknown_tokens(&self) -> &[String] {
        &self.unknown
    }

    /// Check if the requirement names nothing at all
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty() && self.unknown.is_empty()
    }
}

impl From<Scope> for Requirement {
    fn from(scope: Scope) -> Self {
        Self::scope(scope)
    }
}

impl From<Vec<Scope>> for Requirement {
    fn from(scopes: Vec<Scope>) -> Self {
        Self::all(scopes)
    }
}

impl From<&[Scope]> for Requirement {
    fn from(scopes: &[Scope]) -> Self {
        Self::all(scopes.iter().copied())
    }
}

impl<const N: usize> From<[Scope; N]> for Requirement {
    fn from(scopes: [Scope; N]) -> Self {
        Self::all(scopes)
    }
}

impl From<&str> for Requirement {
    fn from(token: &str) -> Self {
        Self::from_tokens([token])
    }
}

impl From<&[&str]> for Requirement {
    fn from(tokens: &[&str]) -> Self {
        Self::from_tokens(tokens.iter())
    }
}

/// Why access was granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantReason {
    /// Actor holds the administrative super-scope
    SuperScope,
    /// Actor holds every required scope
    AllScopesHeld,
    /// Nothing was required and the policy allows that
    EmptyRequirement,
}

/// Why access was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No one is signed in
    NoActor,
    /// Required scopes the actor does not hold
    MissingScopes(Vec<Scope>),
    /// Required tokens outside the scope set
    UnknownScopes(Vec<String>),
    /// Nothing was required and the policy denies that
    EmptyRequirement,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Granted(GrantReason),
    Denied(DenyReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }
}

/// Decide whether `actor` satisfies `requirement`, with the reason
pub fn check(actor: Option<&Actor>, requirement: &Requirement, policy: &CheckPolicy) -> Decision {
    let Some(actor) = actor else {
        return Decision::Denied(DenyReason::NoActor);
    };

    if let Some(super_scope) = policy.super_scope {
        if actor.has_scope(super_scope) {
            return Decision::Granted(GrantReason::SuperScope);
        }
    }

    if requirement.is_empty() {
        return match policy.empty_requirement {
            EmptyRequirementPolicy::Allow => Decision::Granted(GrantReason::EmptyRequirement),
            EmptyRequirementPolicy::Deny => Decision::Denied(DenyReason::EmptyRequirement),
        };
    }

    if !requirement.unknown.is_empty() {
        return Decision::Denied(DenyReason::UnknownScopes(requirement.unknown.clone()));
    }

    let missing: Vec<Scope> = requirement
        .scopes
        .iter()
        .copied()
        .filter(|scope| !actor.has_scope(*scope))
        .collect();

    if missing.is_empty() {
        Decision::Granted(GrantReason::AllScopesHeld)
    } else {
        Decision::Denied(DenyReason::MissingScopes(missing))
    }
}

/// Decide whether `actor` satisfies `requirement`
pub fn can(actor: Option<&Actor>, requirement: &Requirement, policy: &CheckPolicy) -> bool {
    check(actor, requirement, policy).is_granted()
}

/// Authorization service bound to an identity provider
#[derive(Clone)]
pub struct Authorizer {
    identity: Arc<dyn IdentityProvider>,
    policy: CheckPolicy,
    audit_decisions: bool,
}

impl Authorizer {
    /// Create an authorizer with the default policy
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            policy: CheckPolicy::default(),
            audit_decisions: false,
        }
    }

    /// Start building an authorizer
    pub fn builder() -> AuthorizerBuilder {
        AuthorizerBuilder::default()
    }

    /// Check if the current actor satisfies the requirement
    pub fn can(&self, requirement: impl Into<Requirement>) -> bool {
        self.check(requirement).is_granted()
    }

    /// Decide for the current actor, with the reason
    pub fn check(&self, requirement: impl Into<Requirement>) -> Decision {
        let requirement = requirement.into();
        let actor = self.identity.current_actor();
        let decision = check(actor.as_deref(), &requirement, &self.policy);

        if self.audit_decisions {
            debug!(
                actor_id = actor.as_ref().map(|a| a.id.as_str()).unwrap_or("-"),
                required = ?requirement.tokens(),
                decision = ?decision,
                "Authorization decision"
            );
        }

        decision
    }

    /// Actor the next check will see
    pub fn current_actor(&self) -> Option<Arc<Actor>> {
        self.identity.current_actor()
    }

    pub fn policy(&self) -> &CheckPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("policy", &self.policy)
            .field("audit_decisions", &self.audit_decisions)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Authorizer`] that refuses to build without an identity provider
#[derive(Default)]
pub struct AuthorizerBuilder {
    identity: Option<Arc<dyn IdentityProvider>>,
    policy: CheckPolicy,
    audit_decisions: bool,
}

impl AuthorizerBuilder {
    /// Set the identity provider
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the check policy
    pub fn policy(mut self, policy: CheckPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Take policy and auditing from configuration
    pub fn config(mut self, config: &RbacConfig) -> Self {
        self.policy = config.policy();
        self.audit_decisions = config.audit_decisions;
        self
    }

    /// Log every decision at debug level
    pub fn audit_decisions(mut self, enabled: bool) -> Self {
        self.audit_decisions = enabled;
        self
    }

    /// Build the authorizer
    pub fn build(self) -> RbacResult<Authorizer> {
        let identity = self.identity.ok_or(RbacError::MissingIdentityProvider)?;
        Ok(Authorizer {
            identity,
            policy: self.policy,
            audit_decisions: self.audit_decisions,
        })
    }
}

//! The authenticated subject of a session and how to build one

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::models::{Role, Scope};

/// Currently authenticated user
///
/// Owned by the identity provider and shared read-only. A role switch or a
/// new login replaces the whole actor; nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier issued by the authentication service
    pub id: String,

    /// Name shown in the UI
    pub display_name: String,

    /// Informational role, not used for authorization
    pub role: Role,

    /// Granted scopes; unknown tokens are dropped on the way in
    #[serde(default, deserialize_with = "deserialize_scopes")]
    pub scopes: BTreeSet<Scope>,
}

impl Actor {
    /// Create an actor with no scopes
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role,
            scopes: BTreeSet::new(),
        }
    }

    /// Start building an actor
    pub fn builder(id: impl Into<String>, role: Role) -> ActorBuilder {
        ActorBuilder::new(id, role)
    }

    /// Check if the actor holds a scope
    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }

    /// Scopes as wire tokens, in scope-set order
    pub fn scope_tokens(&self) -> Vec<&'static str> {
        self.scopes.iter().map(Scope::as_str).collect()
    }
}

/// Helper to build an Actor from identity-service data
pub struct ActorBuilder {
    actor: Actor,
}

impl ActorBuilder {
    /// Start building an actor for the given id
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let id = id.into();
        Self {
            actor: Actor {
                display_name: id.clone(),
                id,
                role,
                scopes: BTreeSet::new(),
            },
        }
    }

    /// Set display name
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.actor.display_name = display_name.into();
        self
    }

    /// Grant a scope
    pub fn scope(mut self, scope: Scope) -> Self {
        self.actor.scopes.insert(scope);
        self
    }

    /// Grant several scopes
    pub fn scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.actor.scopes.extend(scopes);
        self
    }

    /// Grant scopes from raw tokens
    ///
    /// Tokens outside the closed scope set are dropped and never granted.
    pub fn scope_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        insert_known_scopes(&mut self.actor.scopes, &self.actor.id, tokens);
        self
    }

    /// Build the final actor
    pub fn build(self) -> Actor {
        self.actor
    }
}

fn insert_known_scopes<I, S>(scopes: &mut BTreeSet<Scope>, actor_id: &str, tokens: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for token in tokens {
        let token = token.as_ref();
        match token.parse::<Scope>() {
            Ok(scope) => {
                scopes.insert(scope);
            }
            Err(_) => {
                tracing::warn!(actor_id, token, "Dropping unknown scope token");
            }
        }
    }
}

fn deserialize_scopes<'de, D>(deserializer: D) -> Result<BTreeSet<Scope>, D::Error>
where
    D: Deserializer<'de>,
{
    let tokens = Vec::<String>::deserialize(deserializer)?;
    let mut scopes = BTreeSet::new();
    insert_known_scopes(&mut scopes, "-", tokens);
    Ok(scopes)
}

//! Route guard
//!
//! A guard wraps protected content and decides, on every evaluation, whether
//! to render it, send the caller to the entry point, or show the fixed
//! "Access Denied" view. Nothing is cached between evaluations.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::{
    actor::Actor,
    config::{CheckPolicy, RbacConfig},
    permissions::{check, Authorizer, Decision, DenyReason, Requirement},
};

/// Message shown in place of protected content
pub const ACCESS_DENIED_MESSAGE: &str = "Access Denied";

/// What a guard decided for one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content unchanged
    Render,
    /// Nobody is signed in; go to the entry point
    Redirect(String),
    /// Signed in but missing scopes
    AccessDenied,
}

/// Result of rendering through a guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    Rendered(T),
    Redirect(String),
    AccessDenied,
}

impl<T> GuardOutcome<T> {
    pub fn is_rendered(&self) -> bool {
        matches!(self, GuardOutcome::Rendered(_))
    }

    /// Content, if it was rendered
    pub fn rendered(self) -> Option<T> {
        match self {
            GuardOutcome::Rendered(content) => Some(content),
            _ => None,
        }
    }
}

/// Guard for one protected view or route
#[derive(Debug, Clone)]
pub struct RouteGuard {
    requirement: Requirement,
    entry_point: String,
}

impl RouteGuard {
    /// Create a guard that redirects to `/login`
    pub fn new(requirement: impl Into<Requirement>) -> Self {
        Self {
            requirement: requirement.into(),
            entry_point: RbacConfig::default().entry_point,
        }
    }

    /// Create a guard using the configured entry point
    pub fn from_config(requirement: impl Into<Requirement>, config: &RbacConfig) -> Self {
        Self::new(requirement).with_entry_point(config.entry_point.clone())
    }

    /// Override the entry point
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Decide for an explicit actor
    pub fn evaluate(&self, actor: Option<&Actor>, policy: &CheckPolicy) -> GuardDecision {
        self.decide(check(actor, &self.requirement, policy))
    }

    /// Decide for whoever the authorizer currently sees
    pub fn evaluate_with(&self, authorizer: &Authorizer) -> GuardDecision {
        self.decide(authorizer.check(self.requirement.clone()))
    }

    /// Render `child` only when access is granted
    pub fn render<T>(&self, authorizer: &Authorizer, child: impl FnOnce() -> T) -> GuardOutcome<T> {
        match self.evaluate_with(authorizer) {
            GuardDecision::Render => GuardOutcome::Rendered(child()),
            GuardDecision::Redirect(to) => GuardOutcome::Redirect(to),
            GuardDecision::AccessDenied => GuardOutcome::AccessDenied,
        }
    }

    fn decide(&self, decision: Decision) -> GuardDecision {
        match decision {
            Decision::Granted(_) => GuardDecision::Render,
            Decision::Denied(DenyReason::NoActor) => GuardDecision::Redirect(self.entry_point.clone()),
            Decision::Denied(reason) => {
                debug!(reason = ?reason, "Route guard denied access");
                GuardDecision::AccessDenied
            }
        }
    }
}

/// State for [`guard_middleware`]
#[derive(Debug, Clone)]
pub struct GuardState {
    pub authorizer: Authorizer,
    pub guard: RouteGuard,
}

impl GuardState {
    pub fn new(authorizer: Authorizer, guard: RouteGuard) -> Self {
        Self { authorizer, guard }
    }
}

/// Fixed response shown when a signed-in actor lacks scopes
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDenied;

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": "ACCESS_DENIED",
                "message": ACCESS_DENIED_MESSAGE,
            }
        });
        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

/// Middleware applying a [`RouteGuard`] to HTTP routes
///
/// Install with `axum::middleware::from_fn_with_state(GuardState, guard_middleware)`.
pub async fn guard_middleware(
    State(state): State<GuardState>,
    request: Request,
    next: Next,
) -> Response {
    match state.guard.evaluate_with(&state.authorizer) {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::Redirect(to) => Redirect::to(&to).into_response(),
        GuardDecision::AccessDenied => AccessDenied.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Session;
    use crate::models::{Role, Scope};
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn librarian() -> Actor {
        Actor::builder("l-1", Role::Librarian)
            .scopes([Scope::LibraryRead, Scope::LibraryWrite])
            .build()
    }

    fn authorizer_for(session: Arc<Session>) -> Authorizer {
        Authorizer::builder().identity(session).build().unwrap()
    }

    fn app(session: Arc<Session>, guard: RouteGuard) -> Router {
        let state = GuardState::new(authorizer_for(session), guard);
        Router::new()
            .route("/library/loans", get(|| async { "loans" }))
            .layer(from_fn_with_state(state, guard_middleware))
    }

    fn request() -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri("/library/loans")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_evaluate_decisions() {
        let guard = RouteGuard::new(Scope::LibraryWrite).with_entry_point("/home");
        let policy = CheckPolicy::default();

        assert_eq!(guard.evaluate(None, &policy), GuardDecision::Redirect("/home".into()));
        assert_eq!(guard.evaluate(Some(&librarian()), &policy), GuardDecision::Render);

        let student = Actor::builder("s-1", Role::Student).scope(Scope::LibraryRead).build();
        assert_eq!(guard.evaluate(Some(&student), &policy), GuardDecision::AccessDenied);
    }

    #[test]
    fn test_render_skips_child_when_denied() {
        let session = Arc::new(Session::new());
        let authorizer = authorizer_for(session.clone());
        let guard = RouteGuard::new(Scope::LibraryWrite);

        let mut rendered = false;
        let outcome = guard.render(&authorizer, || rendered = true);
        assert_eq!(outcome, GuardOutcome::Redirect("/login".into()));
        assert!(!rendered);

        session.login(Actor::builder("s-1", Role::Student).build());
        assert_eq!(guard.render(&authorizer, || "shelf"), GuardOutcome::AccessDenied);

        session.login(librarian());
        assert_eq!(guard.render(&authorizer, || "shelf").rendered(), Some("shelf"));
    }

    #[test]
    fn test_entry_point_from_config() {
        let config = RbacConfig {
            entry_point: "/welcome".to_string(),
            ..RbacConfig::default()
        };
        let guard = RouteGuard::from_config(Scope::SchoolRead, &config);
        assert_eq!(guard.entry_point(), "/welcome");
        assert_eq!(guard.requirement().scopes(), &[Scope::SchoolRead]);
    }

    #[tokio::test]
    async fn test_middleware_redirects_when_signed_out() {
        let app = app(Arc::new(Session::new()), RouteGuard::new(Scope::LibraryRead));
        let response = app.oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[tokio::test]
    async fn test_middleware_denies_missing_scope() {
        let session = Arc::new(Session::with_actor(
            Actor::builder("s-1", Role::Student).scope(Scope::LibraryRead).build(),
        ));
        let app = app(session, RouteGuard::new(Scope::LibraryWrite));
        let response = app.oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["message"], ACCESS_DENIED_MESSAGE);
    }

    #[tokio::test]
    async fn test_middleware_passes_through_when_granted() {
        let session = Arc::new(Session::with_actor(librarian()));
        let app = app(session, RouteGuard::new([Scope::LibraryRead, Scope::LibraryWrite]));
        let response = app.oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"loans");
    }
}

//! Identity provider seam and the in-process session that implements it

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::actor::Actor;

/// Callback invoked after the current actor is replaced
pub type ActorCallback = Arc<dyn Fn(Option<&Actor>) + Send + Sync>;

/// Source of the current actor
///
/// Production builds back this with the authentication service; the demo
/// harness backs it with preset actors.
pub trait IdentityProvider: Send + Sync {
    /// Actor for the active session, if anyone is signed in
    fn current_actor(&self) -> Option<Arc<Actor>>;

    /// Register a callback fired after every actor change
    fn on_actor_change(&self, callback: ActorCallback);
}

/// Process-local session holding the current actor
///
/// Single writer (login, logout, role switch) and many readers. Every write
/// swaps the whole `Arc<Actor>`, so readers see either the old actor or the
/// new one.
pub struct Session {
    current: watch::Sender<Option<Arc<Actor>>>,
    callbacks: Mutex<Vec<ActorCallback>>,
}

impl Session {
    /// Create a signed-out session
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Create a session that starts with an actor signed in
    pub fn with_actor(actor: Actor) -> Self {
        let session = Self::new();
        session.current.send_replace(Some(Arc::new(actor)));
        session
    }

    /// Sign an actor in, replacing whoever was signed in before
    pub fn login(&self, actor: Actor) {
        info!(actor_id = %actor.id, role = %actor.role, "Actor signed in");
        self.replace(Some(actor));
    }

    /// Sign the current actor out
    pub fn logout(&self) {
        if let Some(actor) = self.current_actor() {
            info!(actor_id = %actor.id, "Actor signed out");
        }
        self.replace(None);
    }

    /// Atomically replace the current actor and notify observers
    ///
    /// Returns the actor that was replaced.
    pub fn replace(&self, actor: Option<Actor>) -> Option<Arc<Actor>> {
        self.replace_shared(actor.map(Arc::new))
    }

    /// Same as [`Session::replace`] for an actor that is already shared
    pub fn replace_shared(&self, next: Option<Arc<Actor>>) -> Option<Arc<Actor>> {
        let previous = self.current.send_replace(next.clone());

        // Snapshot so callbacks may register further callbacks
        let callbacks: Vec<ActorCallback> = self.callbacks.lock().clone();
        for callback in callbacks {
            callback(next.as_deref());
        }

        previous
    }

    /// Check if an actor is signed in
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Receiver that observes actor changes from async code
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Actor>>> {
        self.current.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &*self.current.borrow())
            .field("callbacks", &self.callbacks.lock().len())
            .finish()
    }
}

impl IdentityProvider for Session {
    fn current_actor(&self) -> Option<Arc<Actor>> {
        self.current.borrow().clone()
    }

    fn on_actor_change(&self, callback: ActorCallback) {
        self.callbacks.lock().push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Scope};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn teacher() -> Actor {
        Actor::builder("t-1", Role::Teacher)
            .scope(Scope::AttendanceWrite)
            .build()
    }

    #[test]
    fn test_new_session_is_signed_out() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.current_actor().is_none());
    }

    #[test]
    fn test_login_and_logout() {
        let session = Session::new();
        session.login(teacher());
        assert_eq!(session.current_actor().unwrap().id, "t-1");

        session.logout();
        assert!(session.current_actor().is_none());
    }

    #[test]
    fn test_replace_returns_previous_actor() {
        let session = Session::with_actor(teacher());
        let previous = session.replace(Some(Actor::new("s-1", "Sam", Role::Student)));
        assert_eq!(previous.unwrap().id, "t-1");
        assert_eq!(session.current_actor().unwrap().id, "s-1");
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let session = Session::with_actor(teacher());
        let snapshot = session.current_actor().unwrap();

        session.replace(Some(Actor::new("s-1", "Sam", Role::Student)));

        assert_eq!(snapshot.id, "t-1");
        assert!(snapshot.has_scope(Scope::AttendanceWrite));
    }

    #[test]
    fn test_callbacks_fire_on_change() {
        let session = Session::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let counter = calls.clone();
        let ids = seen.clone();
        session.on_actor_change(Arc::new(move |actor: Option<&Actor>| {
            counter.fetch_add(1, Ordering::SeqCst);
            ids.lock().push(actor.map(|a| a.id.clone()));
        }));

        session.login(teacher());
        session.logout();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*seen.lock(), vec![Some("t-1".to_string()), None]);
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let session = Session::new();
        let mut rx = session.subscribe();

        session.login(teacher());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().id, "t-1");
    }
}

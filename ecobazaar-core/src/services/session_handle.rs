//! Shared in-memory session
//!
//! One `SessionHandle` is threaded through the access layer, the session
//! manager and the caches. The session manager is the only writer of identity
//! changes; the access layer may tear the session down on a 401.
//!
//! Every identity change bumps `generation`. Caches stamp their contents with
//! the generation they were loaded under, which makes data of a previous user
//! unreachable as soon as the session changes.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;

use crate::domain::result::{Error, Result};
use crate::domain::{ResourceId, Session, SessionPhase, SessionState, User};

#[derive(Debug)]
struct Inner {
    phase: SessionPhase,
    session: Option<Session>,
    generation: u64,
}

#[derive(Debug)]
pub struct SessionHandle {
    inner: RwLock<Inner>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Uninitialized);
        Self {
            inner: RwLock::new(Inner {
                phase: SessionPhase::Uninitialized,
                session: None,
                generation: 0,
            }),
            phase_tx,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, phase: SessionPhase) {
        self.phase_tx.send_replace(phase);
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase
    }

    /// Enter `Restoring`. Returns false if restoration already ran.
    pub(crate) fn begin_restore(&self) -> bool {
        let mut inner = self.write();
        if inner.phase != SessionPhase::Uninitialized {
            return false;
        }
        inner.phase = SessionPhase::Restoring;
        drop(inner);
        self.publish(SessionPhase::Restoring);
        true
    }

    /// Adopt a session. Returns the new generation.
    pub(crate) fn establish(&self, session: Session) -> u64 {
        let mut inner = self.write();
        inner.session = Some(session);
        inner.phase = SessionPhase::Authenticated;
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);
        self.publish(SessionPhase::Authenticated);
        generation
    }

    /// Restoration found nothing usable
    pub(crate) fn finish_anonymous(&self) {
        let mut inner = self.write();
        inner.session = None;
        inner.phase = SessionPhase::Anonymous;
        drop(inner);
        self.publish(SessionPhase::Anonymous);
    }

    /// Drop the session (logout or forced teardown). Returns true when a
    /// session was actually held.
    pub(crate) fn clear(&self) -> bool {
        let mut inner = self.write();
        let had_session = inner.session.take().is_some();
        inner.generation += 1;
        // Before restoration settles, leave the phase to the restore step
        let settled = inner.phase.is_settled();
        if settled {
            inner.phase = SessionPhase::Anonymous;
        }
        drop(inner);
        if settled {
            self.publish(SessionPhase::Anonymous);
        }
        had_session
    }

    /// Replace the user record under the write lock.
    ///
    /// `apply` computes the new record and persists it; memory is only
    /// updated once it succeeded, and no other reader or writer can observe
    /// the state in between.
    pub(crate) fn update_user(&self, apply: impl FnOnce(&User) -> Result<User>) -> Result<User> {
        let mut inner = self.write();
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| Error::not_authenticated("No user is signed in"))?;
        let updated = apply(&session.user)?;
        session.user = updated.clone();
        Ok(updated)
    }

    pub fn user(&self) -> Option<User> {
        self.read().session.as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.token.clone())
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Current generation and user id, read together
    pub fn identity(&self) -> Option<(u64, ResourceId)> {
        let inner = self.read();
        inner
            .session
            .as_ref()
            .map(|s| (inner.generation, s.user.id.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        let inner = self.read();
        inner.phase == SessionPhase::Authenticated && inner.session.is_some()
    }

    pub fn snapshot(&self) -> SessionState {
        let inner = self.read();
        SessionState {
            user: inner.session.as_ref().map(|s| s.user.clone()),
            loading: !inner.phase.is_settled(),
            is_authenticated: inner.phase == SessionPhase::Authenticated
                && inner.session.is_some(),
        }
    }

    /// Resolves once restoration reached `Authenticated` or `Anonymous`
    pub async fn ready(&self) {
        let mut rx = self.phase_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|phase| phase.is_settled()).await;
    }

    /// Id of the signed-in user once restoration settled, or
    /// `NotAuthenticated` carrying `message`
    pub async fn require_user_id(&self, message: &str) -> Result<ResourceId> {
        self.ready().await;
        self.identity()
            .map(|(_, id)| id)
            .ok_or_else(|| Error::not_authenticated(message))
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }
}

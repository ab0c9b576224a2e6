//! Session registry keyed by `SessionId`.
//!
//! The map lock is only held to look up, insert or remove a handle. Each
//! session has its own lock: mutating calls hold the write side for their
//! whole duration, `stats` takes the read side.

use crate::crypto::CommitmentHash;
use crate::game::{GameError, Session};
use crate::protocol::{GuessOutcome, RevealStatus, SessionId, SessionStats};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::info;

type SessionHandle = Arc<RwLock<Session>>;

/// Owns every live session
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session in the setup phase
    pub fn create_session(
        &self,
        min: i64,
        max: i64,
        guess_budget: u32,
    ) -> Result<SessionId, GameError> {
        let session = Session::new(min, max, guess_budget)?;
        let id = SessionId::new();
        self.write_map().insert(id, Arc::new(RwLock::new(session)));

        info!(%id, min, max, guess_budget, "session created");
        Ok(id)
    }

    pub fn setup(&self, id: SessionId, committer: &str, guesser: &str) -> Result<(), GameError> {
        self.with_session_mut(id, |session| session.setup(committer, guesser))
    }

    pub fn commit(&self, id: SessionId, value: i64) -> Result<CommitmentHash, GameError> {
        self.with_session_mut(id, |session| session.commit_secret(value))
    }

    pub fn guess(&self, id: SessionId, value: i64) -> Result<GuessOutcome, GameError> {
        self.with_session_mut(id, |session| session.guess(value))
    }

    pub fn reveal(&self, id: SessionId) -> Result<RevealStatus, GameError> {
        self.with_session_mut(id, Session::reveal_and_verify)
    }

    pub fn stats(&self, id: SessionId) -> Result<SessionStats, GameError> {
        let handle = self.handle(id)?;
        let session = handle.read().unwrap_or_else(PoisonError::into_inner);
        Ok(session.stats())
    }

    /// Retire a session. Returns whether it existed.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = self.write_map().remove(&id).is_some();
        if removed {
            info!(%id, "session retired");
        }
        removed
    }

    /// Expire and drop every session created more than `ttl` ago
    pub fn expire_older_than(&self, ttl: Duration) -> usize {
        let stale: Vec<(SessionId, SessionHandle)> = self
            .read_map()
            .iter()
            .filter(|(_, handle)| {
                handle
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .created_at()
                    .elapsed()
                    >= ttl
            })
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();

        let mut sessions = self.write_map();
        for (id, handle) in &stale {
            handle
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .expire();
            sessions.remove(id);
        }
        stale.len()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.read_map().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handle(&self, id: SessionId) -> Result<SessionHandle, GameError> {
        self.read_map()
            .get(&id)
            .cloned()
            .ok_or(GameError::SessionNotFound(id))
    }

    fn with_session_mut<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let handle = self.handle(id)?;
        let mut session = handle.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *session)
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Phase;
    use std::thread;

    #[test]
    fn test_unknown_session() {
        let registry = SessionRegistry::new();
        let id = SessionId::new();

        assert_eq!(registry.stats(id), Err(GameError::SessionNotFound(id)));
        assert_eq!(registry.guess(id, 1), Err(GameError::SessionNotFound(id)));
        assert!(!registry.remove(id));
    }

    #[test]
    fn test_create_rejects_bad_config() {
        let registry = SessionRegistry::new();
        assert!(matches!(
            registry.create_session(5, 1, 3),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let a = registry.create_session(1, 100, 3).unwrap();
        let b = registry.create_session(1, 100, 3).unwrap();

        registry.setup(a, "Alice", "Bob").unwrap();
        registry.commit(a, 10).unwrap();
        registry.guess(a, 10).unwrap();

        assert_eq!(registry.stats(a).unwrap().phase, Phase::Reveal);
        assert_eq!(registry.stats(b).unwrap().phase, Phase::Setup);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_same_committer_name_in_two_sessions() {
        let registry = SessionRegistry::new();
        let a = registry.create_session(1, 100, 3).unwrap();
        let b = registry.create_session(1, 100, 3).unwrap();
        registry.setup(a, "Alice", "Bob").unwrap();
        registry.setup(b, "Alice", "Carol").unwrap();

        let hash_a = registry.commit(a, 10).unwrap();
        let hash_b = registry.commit(b, 10).unwrap();
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_expire_older_than() {
        let registry = SessionRegistry::new();
        let id = registry.create_session(1, 100, 3).unwrap();

        assert_eq!(registry.expire_older_than(Duration::from_secs(3600)), 0);
        assert!(registry.contains(id));

        assert_eq!(registry.expire_older_than(Duration::ZERO), 1);
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_concurrent_sessions() {
        let registry = Arc::new(SessionRegistry::new());

        let workers: Vec<_> = (0..8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = registry.create_session(1, 100, 10).unwrap();
                    registry.setup(id, "committer", "guesser").unwrap();
                    registry.commit(id, 50 + n).unwrap();
                    for guess in 1..=100 {
                        if registry.guess(id, guess).unwrap().closed {
                            break;
                        }
                    }
                    registry.reveal(id).unwrap()
                })
            })
            .collect();

        for worker in workers {
            let status = worker.join().unwrap();
            let RevealStatus::Complete(outcome) = status else {
                panic!("session did not close");
            };
            assert!(outcome.commitment_valid);
            assert_eq!(outcome.winner, None);
        }
        assert_eq!(registry.len(), 8);
    }
}

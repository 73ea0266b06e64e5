//! Editing sessions held by the HTTP server.
//!
//! Every client session owns its own [`ScalarService`]; nothing is shared between
//! sessions. The registry only serializes access to the map.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ScalarLevel;
use crate::service::ScalarService;

/// One client's scalar editing session.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub service: ScalarService,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_saved_at: None,
            service: ScalarService::new(),
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            created_at: self.created_at,
            last_saved_at: self.last_saved_at,
            dirty: self.service.is_dirty(),
            counts: self.service.get_all_counts(),
            warnings: self.service.warnings().to_vec(),
        }
    }
}

/// Session status returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Unsaved changes exist.
    pub dirty: bool,
    pub counts: BTreeMap<ScalarLevel, usize>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> SessionInfo {
        let session = Session::new();
        let info = session.info();
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.insert(session.id, session);
        tracing::info!("Opened scalar session {}", info.id);
        info
    }

    /// Run `f` against the session, or return `None` if it does not exist.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.get_mut(&id).map(f)
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let removed = sessions.remove(&id).is_some();
        if removed {
            tracing::info!("Closed scalar session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_independent() {
        let registry = SessionRegistry::new();
        let first = registry.create();
        let second = registry.create();

        registry
            .with_session(first.id, |session| {
                session
                    .service
                    .add_entry(ScalarLevel::Clo, "", "Identify threats", true)
            })
            .unwrap()
            .unwrap();

        let first_count = registry
            .with_session(first.id, |s| s.service.get_level_count(ScalarLevel::Clo))
            .unwrap();
        let second_count = registry
            .with_session(second.id, |s| s.service.get_level_count(ScalarLevel::Clo))
            .unwrap();
        assert_eq!(first_count, 1);
        assert_eq!(second_count, 0);
    }

    #[test]
    fn unknown_sessions_return_none() {
        let registry = SessionRegistry::new();
        assert!(registry.with_session(Uuid::new_v4(), |_| ()).is_none());
        assert!(!registry.remove(Uuid::new_v4()));
    }

    #[test]
    fn remove_drops_the_session() {
        let registry = SessionRegistry::new();
        let info = registry.create();
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(info.id));
        assert!(registry.is_empty());
    }
}

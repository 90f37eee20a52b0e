use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::factory::error::BoxError;

/// Source of unique identifiers.
pub trait UidGenerator: Send + Sync + Debug {
    fn next_uid(&self) -> String;
}

/// Monotonic `<prefix><n>` identifiers.
#[derive(Debug)]
pub struct SequentialUidGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialUidGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialUidGenerator {
    fn default() -> Self {
        Self::new("uid-")
    }
}

impl UidGenerator for SequentialUidGenerator {
    fn next_uid(&self) -> String {
        format!("{}{}", self.prefix, self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observer of session creation and destruction.
pub trait SessionListener: Send + Sync + Debug {
    fn session_created(&self, _session_id: &str) {}

    fn session_destroyed(&self, _session_id: &str) {}
}

/// Tracks user sessions.
pub trait SessionManager: Send + Sync + Debug {
    fn add_session_listener(&self, listener: Arc<dyn SessionListener>);

    fn session_listeners(&self) -> Vec<Arc<dyn SessionListener>>;

    /// Replace the generator used for new session ids.
    fn set_uid_generator(&self, generator: Arc<dyn UidGenerator>);

    fn uid_generator(&self) -> Option<Arc<dyn UidGenerator>>;

    /// Open a session and notify listeners. Returns the session id.
    fn create_session(&self) -> Result<String, BoxError>;

    /// Close a session. Returns whether it existed.
    fn destroy_session(&self, session_id: &str) -> bool;
}

/// Session manager keeping its sessions in memory.
#[derive(Debug, Default)]
pub struct InMemorySessionManager {
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,
    uid_generator: RwLock<Option<Arc<dyn UidGenerator>>>,
    sessions: RwLock<HashSet<String>>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

impl SessionManager for InMemorySessionManager {
    fn add_session_listener(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.write().push(listener);
    }

    fn session_listeners(&self) -> Vec<Arc<dyn SessionListener>> {
        self.listeners.read().clone()
    }

    fn set_uid_generator(&self, generator: Arc<dyn UidGenerator>) {
        *self.uid_generator.write() = Some(generator);
    }

    fn uid_generator(&self) -> Option<Arc<dyn UidGenerator>> {
        self.uid_generator.read().clone()
    }

    fn create_session(&self) -> Result<String, BoxError> {
        let generator = self
            .uid_generator()
            .ok_or("session manager has no uid generator")?;
        let session_id = generator.next_uid();
        self.sessions.write().insert(session_id.clone());

        for listener in self.session_listeners() {
            listener.session_created(&session_id);
        }
        Ok(session_id)
    }

    fn destroy_session(&self, session_id: &str) -> bool {
        let existed = self.sessions.write().remove(session_id);
        if existed {
            for listener in self.session_listeners() {
                listener.session_destroyed(session_id);
            }
        }
        existed
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

pub const SESSION_COOKIE: &str = "recetario_session";

struct Entry {
    user_id: i64,
    expires_at: Instant,
}

/// In-process session table: opaque uuid token -> logged-in user.
/// Expired entries are dropped on lookup.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl Sessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn create(&self, user_id: i64) -> Uuid {
        let token = Uuid::new_v4();
        let mut inner = self.inner.lock().expect("session table poisoned");
        inner.insert(
            token,
            Entry {
                user_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    pub fn user_id(&self, token: Uuid) -> Option<i64> {
        let mut inner = self.inner.lock().expect("session table poisoned");
        match inner.get(&token) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.user_id),
            Some(_) => {
                inner.remove(&token);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, token: Uuid) {
        let mut inner = self.inner.lock().expect("session table poisoned");
        inner.remove(&token);
    }
}

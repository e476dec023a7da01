use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::{create_default_context, DialogueContext};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub context: DialogueContext,
    pub last_activity: NaiveDateTime,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_context<R>(&self, session_id: &str, f: impl FnOnce(&mut DialogueContext) -> R) -> R {
        self.with_context_at(session_id, Utc::now().naive_utc(), f)
    }

    pub(crate) fn with_context_at<R>(
        &self,
        session_id: &str,
        now: NaiveDateTime,
        f: impl FnOnce(&mut DialogueContext) -> R,
    ) -> R {
        let mut sessions = self.lock();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session {
                context: create_default_context(),
                last_activity: now,
            });

        if now - session.last_activity > self.ttl {
            tracing::debug!(session = session_id, "session expired, starting over");
            session.context = create_default_context();
        }
        session.last_activity = now;

        f(&mut session.context)
    }

    pub fn reset(&self, session_id: &str) -> bool {
        match self.lock().get_mut(session_id) {
            Some(session) => {
                session.context.reset(None);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> HashMap<String, Session> {
        self.lock().clone()
    }

    pub fn expire_idle(&self) -> usize {
        self.expire_idle_at(Utc::now().naive_utc())
    }

    pub(crate) fn expire_idle_at(&self, now: NaiveDateTime) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_activity <= self.ttl);
        before - sessions.len()
    }
}

use std::sync::Arc;

use crate::db::BookingStore;
use crate::services::clock::Clock;
use crate::services::conversation::DialogueOrchestrator;
use crate::services::session::SessionStore;

pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn orchestrator(&self) -> DialogueOrchestrator<'_> {
        DialogueOrchestrator::new(self.store.as_ref(), self.clock.as_ref())
    }
}

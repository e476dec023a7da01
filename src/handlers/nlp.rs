use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{DialogueContext, Intent, Specialty};
use crate::services::nlp::intent::{
    is_booking_id_inquiry, is_booking_request, is_cancellation_request, is_greeting,
    is_list_request, is_update_request,
};
use crate::services::nlp::vocabulary::normalize;
use crate::services::nlp::{classify, extract_booking_id, extract_specialty, DateTimeExtractor};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProcessRequest {
    pub text: String,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// POST /api/v1/nlp/process
pub async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let orchestrator = state.orchestrator();
    let message = state
        .sessions
        .with_context(&session_id, |ctx| orchestrator.process(text, ctx));
    tracing::info!(session = %session_id, "nlp turn handled");

    Ok(Json(MessageResponse {
        message,
        session_id: Some(session_id),
    }))
}

#[derive(Serialize)]
pub struct ContextView {
    pub context: DialogueContext,
    pub awaiting: Vec<&'static str>,
    pub last_activity: NaiveDateTime,
}

#[derive(Serialize)]
pub struct DebugContextsResponse {
    pub contexts: BTreeMap<String, ContextView>,
}

// GET /api/v1/nlp/debug/contexts
pub async fn debug_contexts(State(state): State<Arc<AppState>>) -> Json<DebugContextsResponse> {
    state.sessions.expire_idle();
    let contexts = state
        .sessions
        .snapshot()
        .into_iter()
        .map(|(id, session)| {
            let awaiting = session.context.awaiting_flags();
            let view = ContextView {
                context: session.context,
                awaiting,
                last_activity: session.last_activity,
            };
            (id, view)
        })
        .collect();
    Json(DebugContextsResponse { contexts })
}

// POST /api/v1/nlp/debug/reset-context/:session_id
pub async fn reset_context(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<MessageResponse> {
    let message = if state.sessions.reset(&session_id) {
        tracing::info!(session = %session_id, "context reset");
        format!("Context for session {session_id} has been reset")
    } else {
        format!("No context found for session {session_id}")
    };
    Json(MessageResponse {
        message,
        session_id: None,
    })
}

#[derive(Deserialize)]
pub struct TestIntentRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct TestIntentResponse {
    pub intent: Intent,
    pub is_booking_request: bool,
    pub is_update_request: bool,
    pub is_cancellation_request: bool,
    pub is_list_bookings_request: bool,
    pub is_booking_id_inquiry: bool,
    pub is_greeting: bool,
    pub specialty: Option<Specialty>,
    pub booking_id: Option<i64>,
    pub date_time: Option<String>,
}

// POST /api/v1/nlp/debug/test-intent
pub async fn test_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestIntentRequest>,
) -> Json<TestIntentResponse> {
    let text = normalize(&req.text);
    let extractor = DateTimeExtractor::new(state.clock.today());

    Json(TestIntentResponse {
        intent: classify(&text),
        is_booking_request: is_booking_request(&text),
        is_update_request: is_update_request(&text),
        is_cancellation_request: is_cancellation_request(&text),
        is_list_bookings_request: is_list_request(&text),
        is_booking_id_inquiry: is_booking_id_inquiry(&text),
        is_greeting: is_greeting(&text),
        specialty: extract_specialty(&text),
        booking_id: extract_booking_id(&text),
        date_time: extractor.parse_date_time(&text).map(|p| p.description),
    })
}

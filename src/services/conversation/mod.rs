pub mod booking;
pub mod manage;
pub mod messages;

use crate::db::BookingStore;
use crate::errors::StoreError;
use crate::models::{BookingFlow, DialogueContext, DialogueState, Intent};
use crate::services::clock::Clock;
use crate::services::conflict::ConflictChecker;
use crate::services::nlp::intent::{is_update_command, is_update_with_time};
use crate::services::nlp::vocabulary::{contains_any, has_cancel_term, normalize, SPECIALTY_CHANGE_MARKERS};
use crate::services::nlp::slots::extract_named_specialty;
use crate::services::nlp::{classify, DateTimeExtractor};

type Reply = Result<String, StoreError>;

/// Turns one user utterance plus the session's context into a reply,
/// moving the context to whatever slot is needed next.
pub struct DialogueOrchestrator<'a> {
    store: &'a dyn BookingStore,
    clock: &'a dyn Clock,
}

pub fn process_input(
    store: &dyn BookingStore,
    clock: &dyn Clock,
    text: &str,
    context: &mut DialogueContext,
) -> String {
    DialogueOrchestrator::new(store, clock).process(text, context)
}

impl<'a> DialogueOrchestrator<'a> {
    pub fn new(store: &'a dyn BookingStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Handle one turn. Store failures abandon the current flow and produce
    /// an apology rather than an error.
    pub fn process(&self, text: &str, ctx: &mut DialogueContext) -> String {
        let text = normalize(text);
        let intent = classify(&text);
        tracing::info!(
            intent = intent.as_str(),
            state = ctx.state().as_str(),
            "processing message"
        );

        let reply = match self.dispatch(&text, intent, ctx) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "booking store failed during dialogue");
                ctx.clear_flow();
                messages::STORE_UNAVAILABLE.to_string()
            }
        };

        debug_assert!(ctx.awaiting_flags().len() <= 1);
        tracing::debug!(state = ctx.state().as_str(), "turn complete");
        reply
    }

    fn dispatch(&self, text: &str, intent: Intent, ctx: &mut DialogueContext) -> Reply {
        // Replies to a yes/no or AM/PM question are read before anything else.
        match ctx.state().clone() {
            DialogueState::AwaitingAmPm { flow, date, hour, minute } => {
                return self.handle_ampm(text, flow, date, hour, minute, ctx);
            }
            DialogueState::ConflictDetected { flow, time } => {
                return self.handle_conflict_reply(text, flow, time, ctx);
            }
            _ => {}
        }

        if let Some(reply) = self.specialty_change(text, ctx) {
            return Ok(reply);
        }

        if !ctx.is_idle() {
            let cancel_command = ctx.awaiting_booking_id_for_cancel() && text.starts_with("cancel");
            if has_cancel_term(text) && !cancel_command {
                ctx.clear_flow();
                return Ok(messages::PROCESS_CANCELLED.to_string());
            }
            if intent == Intent::Greeting {
                ctx.clear_flow();
                return Ok(messages::GREETING.to_string());
            }
        }

        if intent == Intent::UpdateRequest && (is_update_command(text) || is_update_with_time(text)) {
            ctx.clear_flow();
            return self.handle_update_request(text, ctx);
        }

        match ctx.state().clone() {
            DialogueState::AwaitingSpecialty => self.handle_specialty(text, intent, ctx),
            DialogueState::AwaitingDate { flow } => self.handle_date(text, intent, flow, ctx),
            DialogueState::AwaitingTime { flow, date } => self.handle_time(text, flow, date, ctx),
            DialogueState::AwaitingTechnician { specialty, time, candidates } => {
                self.handle_technician(text, intent, specialty, time, &candidates, ctx)
            }
            DialogueState::AwaitingBookingIdForUpdate => self.handle_update_id(text, ctx),
            DialogueState::AwaitingBookingIdForCancel => self.handle_cancel_id(text, ctx),
            DialogueState::Idle
            | DialogueState::AwaitingAmPm { .. }
            | DialogueState::ConflictDetected { .. } => self.handle_intent(text, intent, ctx),
        }
    }

    fn specialty_change(&self, text: &str, ctx: &mut DialogueContext) -> Option<String> {
        let current = match ctx.state() {
            DialogueState::AwaitingDate { flow: BookingFlow::New { specialty } }
            | DialogueState::AwaitingTime { flow: BookingFlow::New { specialty }, .. } => *specialty,
            _ => return None,
        };
        if !contains_any(text, SPECIALTY_CHANGE_MARKERS) {
            return None;
        }
        let requested = extract_named_specialty(text).filter(|sp| *sp != current)?;

        tracing::info!(from = %current, to = %requested, "specialty changed mid-booking");
        ctx.change_specialty(requested);
        Some(messages::specialty_changed(requested))
    }

    fn handle_intent(&self, text: &str, intent: Intent, ctx: &mut DialogueContext) -> Reply {
        match intent {
            Intent::Greeting => Ok(messages::GREETING.to_string()),
            Intent::BookingRequest => self.start_booking(text, ctx),
            Intent::ListBookings => self.list_bookings(),
            Intent::CancellationRequest => self.handle_cancellation_request(text, ctx),
            Intent::UpdateRequest => self.handle_update_request(text, ctx),
            Intent::BookingIdInquiry => self.describe_last_booking(ctx),
            Intent::SpecificBookingInquiry => self.describe_booking(text),
            Intent::Unclear => self.handle_unclear(text, ctx),
        }
    }

    fn extractor(&self) -> DateTimeExtractor {
        DateTimeExtractor::new(self.clock.today())
    }

    fn checker(&self) -> ConflictChecker<'_> {
        ConflictChecker::new(self.store)
    }
}

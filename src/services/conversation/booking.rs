use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{messages, DialogueOrchestrator, Reply};
use crate::errors::StoreError;
use crate::models::{BookingFlow, DialogueContext, Intent, LastBooking, Specialty};
use crate::services::nlp::datetime::{describe_datetime, to_24_hour};
use crate::services::nlp::intent::is_greeting;
use crate::services::nlp::slots::{mentions_technician, mentions_unoffered_specialty};
use crate::services::nlp::vocabulary::{contains_any, has_cancel_term, is_affirmative, is_negative};
use crate::services::nlp::extract_specialty;
use crate::services::technician::{
    auto_assign, candidates_for, resolve_selection, wants_any_technician, Selection,
};

static MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\b|\d)([ap])\.?m\b").unwrap());

fn read_meridiem(text: &str) -> Option<bool> {
    let marked: Vec<bool> = MERIDIEM
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str() == "p")
        .collect();
    let am = marked.contains(&false) || contains_any(text, &["morning"]);
    let pm = marked.contains(&true) || contains_any(text, &["afternoon", "evening", "night"]);
    match (am, pm) {
        (true, false) => Some(false),
        (false, true) => Some(true),
        _ => None,
    }
}

impl DialogueOrchestrator<'_> {
    pub(super) fn start_booking(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        match extract_specialty(text) {
            Some(specialty) => self.start_with_specialty(specialty, text, ctx),
            None if mentions_unoffered_specialty(text).is_some() => {
                Ok(messages::UNSUPPORTED_SPECIALTY.to_string())
            }
            None => {
                ctx.await_specialty();
                Ok(messages::SPECIALTY_PROMPT.to_string())
            }
        }
    }

    fn start_with_specialty(&self, specialty: Specialty, text: &str, ctx: &mut DialogueContext) -> Reply {
        let flow = BookingFlow::New { specialty };
        tracing::info!(%specialty, "starting booking");
        ctx.await_date(flow);
        match self.advance(text, flow, None, ctx) {
            Some(reply) => reply,
            None => Ok(messages::date_prompt(specialty)),
        }
    }

    pub(super) fn handle_unclear(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        if let Some(specialty) = extract_specialty(text) {
            return self.start_with_specialty(specialty, text, ctx);
        }
        if let Some(trade) = mentions_unoffered_specialty(text) {
            tracing::debug!(trade, "unsupported specialty requested");
            return Ok(messages::UNSUPPORTED_SPECIALTY.to_string());
        }
        if mentions_technician(text) {
            ctx.await_specialty();
            return Ok(messages::GENERIC_TECHNICIAN_PROMPT.to_string());
        }
        Ok(messages::UNCLEAR_REQUEST.to_string())
    }

    pub(super) fn handle_specialty(&self, text: &str, intent: Intent, ctx: &mut DialogueContext) -> Reply {
        if matches!(
            intent,
            Intent::ListBookings
                | Intent::CancellationRequest
                | Intent::UpdateRequest
                | Intent::BookingIdInquiry
                | Intent::SpecificBookingInquiry
        ) {
            ctx.clear_flow();
            return self.handle_intent(text, intent, ctx);
        }

        if let Some(specialty) = extract_specialty(text) {
            return self.start_with_specialty(specialty, text, ctx);
        }
        if mentions_unoffered_specialty(text).is_some() {
            return Ok(messages::UNSUPPORTED_SPECIALTY.to_string());
        }
        Ok(messages::SPECIALTY_PROMPT.to_string())
    }

    pub(super) fn handle_date(
        &self,
        text: &str,
        intent: Intent,
        flow: BookingFlow,
        ctx: &mut DialogueContext,
    ) -> Reply {
        if intent == Intent::ListBookings {
            return self.list_bookings();
        }
        match self.advance(text, flow, None, ctx) {
            Some(reply) => reply,
            None => Ok(messages::INVALID_DATE_FORMAT.to_string()),
        }
    }

    pub(super) fn handle_time(
        &self,
        text: &str,
        flow: BookingFlow,
        date: NaiveDate,
        ctx: &mut DialogueContext,
    ) -> Reply {
        match self.advance(text, flow, Some(date), ctx) {
            Some(reply) => reply,
            None => Ok(messages::INVALID_TIME_FORMAT.to_string()),
        }
    }

    pub(super) fn handle_ampm(
        &self,
        text: &str,
        flow: BookingFlow,
        date: NaiveDate,
        hour: u32,
        minute: u32,
        ctx: &mut DialogueContext,
    ) -> Reply {
        if has_cancel_term(text) {
            ctx.clear_flow();
            return Ok(messages::PROCESS_CANCELLED.to_string());
        }
        // "good morning" is a greeting, not an answer
        if is_greeting(text) {
            ctx.clear_flow();
            return Ok(messages::GREETING.to_string());
        }
        let Some(pm) = read_meridiem(text) else {
            return Ok(messages::INVALID_AMPM.to_string());
        };
        match date.and_hms_opt(to_24_hour(hour, pm), minute, 0) {
            Some(time) => self.schedule_at(flow, time, ctx),
            None => {
                ctx.await_time(flow, date);
                Ok(messages::INVALID_TIME_FORMAT.to_string())
            }
        }
    }

    pub(super) fn handle_conflict_reply(
        &self,
        text: &str,
        flow: BookingFlow,
        time: NaiveDateTime,
        ctx: &mut DialogueContext,
    ) -> Reply {
        if is_affirmative(text) {
            ctx.await_time(flow, time.date());
            return Ok(messages::different_time_prompt(&flow));
        }
        if is_negative(text) || has_cancel_term(text) {
            ctx.clear_flow();
            return Ok(messages::BOOKING_PROCESS_CANCELLED.to_string());
        }
        match self.advance(text, flow, Some(time.date()), ctx) {
            Some(reply) => reply,
            None => Ok(messages::CONFLICT_FOLLOW_UP.to_string()),
        }
    }

    pub(super) fn handle_technician(
        &self,
        text: &str,
        intent: Intent,
        specialty: Specialty,
        time: NaiveDateTime,
        candidates: &[String],
        ctx: &mut DialogueContext,
    ) -> Reply {
        if intent == Intent::BookingRequest && extract_specialty(text).is_some() {
            ctx.clear_flow();
            return self.start_booking(text, ctx);
        }

        if wants_any_technician(text) {
            return match auto_assign(&self.checker(), candidates, time)? {
                Some(technician) => self.create_booking(specialty, &technician, time, ctx),
                None => {
                    ctx.await_time(BookingFlow::New { specialty }, time.date());
                    Ok(messages::NO_TECHNICIANS_FREE.to_string())
                }
            };
        }

        match resolve_selection(text, candidates) {
            Selection::Chosen(idx) => match candidates.get(idx) {
                Some(technician) => self.create_booking(specialty, technician, time, ctx),
                None => Ok(messages::selection_out_of_range(candidates.len())),
            },
            Selection::OutOfRange => Ok(messages::selection_out_of_range(candidates.len())),
            Selection::NoMatch => Ok(messages::technician_not_found(text, candidates.len())),
        }
    }

    // None when nothing usable was found, context untouched
    pub(super) fn advance(
        &self,
        text: &str,
        flow: BookingFlow,
        known_date: Option<NaiveDate>,
        ctx: &mut DialogueContext,
    ) -> Option<Reply> {
        let extractor = self.extractor();
        let parsed = extractor.parse_date_time(text);
        let ambiguous = extractor.ambiguous_hour(text);
        if parsed.is_none() && ambiguous.is_none() {
            return None;
        }

        let date = parsed.as_ref().and_then(|p| p.date).or(known_date)?;
        if date < extractor.today() {
            return Some(Ok(messages::PAST_DATE.to_string()));
        }

        if let Some(time) = parsed.and_then(|p| p.time) {
            return Some(self.schedule_at(flow, date.and_time(time), ctx));
        }
        if let Some((hour, minute)) = ambiguous {
            ctx.await_ampm(flow, date, hour, minute);
            return Some(Ok(messages::ampm_prompt(hour, minute)));
        }
        ctx.await_time(flow, date);
        Some(Ok(messages::time_prompt(&flow)))
    }

    pub(super) fn schedule_at(&self, flow: BookingFlow, time: NaiveDateTime, ctx: &mut DialogueContext) -> Reply {
        match flow {
            BookingFlow::New { specialty } => self.offer_technicians(specialty, time, ctx),
            BookingFlow::Reschedule { booking_id } => self.apply_reschedule(booking_id, time, ctx),
        }
    }

    fn offer_technicians(&self, specialty: Specialty, time: NaiveDateTime, ctx: &mut DialogueContext) -> Reply {
        if let Some(clash) = self.checker().precheck_slot(time)? {
            tracing::info!(booking_id = clash.booking_id, %time, "requested slot already taken");
            return self.report_conflict(BookingFlow::New { specialty }, time, clash.booking_time, None, ctx);
        }

        let candidates = candidates_for(specialty);
        let reply = messages::technician_options(specialty, time, &candidates);
        ctx.await_technician(specialty, time, candidates);
        Ok(reply)
    }

    fn create_booking(
        &self,
        specialty: Specialty,
        technician: &str,
        time: NaiveDateTime,
        ctx: &mut DialogueContext,
    ) -> Reply {
        match self.store.create(technician, specialty.as_str(), time) {
            Ok(booking_id) => {
                tracing::info!(booking_id, technician, %specialty, %time, "booking created");
                ctx.complete_booking(LastBooking {
                    booking_id,
                    specialty: specialty.as_str().to_string(),
                    technician_name: technician.to_string(),
                });
                Ok(messages::booking_confirmed(booking_id, technician, specialty, time))
            }
            Err(StoreError::Conflict { technician, time: busy, .. }) => self.report_conflict(
                BookingFlow::New { specialty },
                time,
                busy,
                Some(&technician),
                ctx,
            ),
            Err(e) => Err(e),
        }
    }

    pub(super) fn report_conflict(
        &self,
        flow: BookingFlow,
        requested: NaiveDateTime,
        busy: NaiveDateTime,
        technician: Option<&str>,
        ctx: &mut DialogueContext,
    ) -> Reply {
        let alternatives = self
            .checker()
            .suggest_alternatives(requested, flow.booking_id(), technician)?;
        let subject = match technician {
            Some(name) => format!("{} with {name}", describe_datetime(busy)),
            None => describe_datetime(busy),
        };
        ctx.detect_conflict(flow, requested);
        Ok(messages::conflict_detected(&subject, &alternatives))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::db::BookingStore;
    use crate::models::DialogueState;
    use crate::services::conversation::tests::Harness;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_meridiem_answers() {
        assert_eq!(read_meridiem("pm"), Some(true));
        assert_eq!(read_meridiem("a.m"), Some(false));
        assert_eq!(read_meridiem("3pm please"), Some(true));
        assert_eq!(read_meridiem("in the morning"), Some(false));
        assert_eq!(read_meridiem("evening"), Some(true));
        assert_eq!(read_meridiem("maybe"), None);
    }

    #[test]
    fn test_full_booking_in_one_sentence() {
        let mut h = Harness::new();
        let reply = h.say("I need a plumber on January 8 at 3pm");
        assert!(reply.starts_with("For Wednesday, January 08 at 3:00 PM, we have the following Plumbers available:"));
        assert!(h.ctx.awaiting_technician());

        let reply = h.say("2");
        assert_eq!(
            reply,
            "Your booking with John Pipe (Plumber) is confirmed for Wednesday, January 08 at 3:00 PM. Your booking ID is 1."
        );
        assert!(h.ctx.is_idle());
        assert_eq!(h.ctx.last_booking_id(), Some(1));
        assert_eq!(h.ctx.last_technician(), Some("John Pipe"));
    }

    #[test]
    fn test_slot_by_slot_with_ambiguous_hour() {
        let mut h = Harness::new();
        let reply = h.say("I need an electrician");
        assert_eq!(reply, messages::date_prompt(Specialty::Electrician));

        let reply = h.say("tomorrow");
        assert!(reply.starts_with("What time would you like to book the Electrician?"));
        assert_eq!(h.ctx.temp_date(), NaiveDate::from_ymd_opt(2025, 1, 7));

        let reply = h.say("3");
        assert_eq!(reply, "Is that 3:00 AM or PM? Please specify 'AM' or 'PM'.");
        assert!(h.ctx.awaiting_ampm());

        assert_eq!(h.say("later"), messages::INVALID_AMPM);
        assert!(h.ctx.awaiting_ampm());

        let reply = h.say("PM");
        assert!(reply.contains("Tuesday, January 07 at 3:00 PM"));
        assert!(h.ctx.awaiting_technician());

        let reply = h.say("Emma");
        assert!(reply.starts_with("Your booking with Emma Volt (Electrician) is confirmed"));
        let booking = h.store.get(1).unwrap().unwrap();
        assert_eq!(booking.booking_time, dt("2025-01-07 15:00"));
    }

    #[test]
    fn test_plumber_booking_turn_by_turn() {
        let mut h = Harness::new();
        h.say("I need a plumber");
        h.say("tomorrow");
        let reply = h.say("3 PM");
        assert!(reply.starts_with("For Tuesday, January 07 at 3:00 PM"));

        let reply = h.say("1");
        assert!(reply.starts_with("Your booking with Nicolas Woollett (Plumber) is confirmed"));
        let booking = h.store.get(1).unwrap().unwrap();
        assert_eq!(booking.specialty, "Plumber");
        assert_eq!(booking.technician_name, "Nicolas Woollett");
        assert_eq!(booking.booking_time, dt("2025-01-07 15:00"));
    }

    #[test]
    fn test_greeting_while_awaiting_ampm_starts_over() {
        let mut h = Harness::new();
        h.say("I need a plumber");
        h.say("tomorrow");
        h.say("3");
        assert!(h.ctx.awaiting_ampm());

        assert_eq!(h.say("good morning"), messages::GREETING);
        assert!(h.ctx.is_idle());
        assert!(h.store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_unqualified_evening_hour_defaults_to_pm() {
        let mut h = Harness::new();
        h.say("book a gardener for tomorrow");
        h.say("6");
        assert!(h.ctx.awaiting_technician());
        assert_eq!(h.ctx.temp_time().map(|t| t.to_string()), Some("18:00:00".to_string()));
    }

    #[test]
    fn test_specialty_asked_when_missing() {
        let mut h = Harness::new();
        assert_eq!(h.say("I want to book something"), messages::SPECIALTY_PROMPT);
        assert!(h.ctx.awaiting_specialty());

        let reply = h.say("a carpenter please");
        assert_eq!(reply, messages::date_prompt(Specialty::Carpenter));
        assert!(h.ctx.awaiting_date());
    }

    #[test]
    fn test_invalid_and_past_dates_keep_waiting() {
        let mut h = Harness::new();
        h.say("I need a painter");
        assert_eq!(h.say("whenever"), messages::INVALID_DATE_FORMAT);
        assert!(h.ctx.awaiting_date());
        assert_eq!(h.say("January 2"), messages::PAST_DATE);
        assert!(h.ctx.awaiting_date());
        h.say("friday");
        assert_eq!(h.say("soon"), messages::INVALID_TIME_FORMAT);
        assert!(h.ctx.awaiting_time());
    }

    #[test]
    fn test_selection_errors_keep_waiting() {
        let mut h = Harness::new();
        h.say("book a welder tomorrow at 10am");
        assert_eq!(h.say("5"), "Please select a valid number between 1 and 3.");
        assert!(h.ctx.awaiting_technician());
        let reply = h.say("Bob");
        assert!(reply.starts_with("I couldn't find a technician matching 'bob'."));
        assert!(h.ctx.awaiting_technician());
    }

    #[test]
    fn test_any_technician_is_auto_assigned() {
        let mut h = Harness::new();
        h.store.create("Peter Green", "Gardener", dt("2025-01-07 10:00")).unwrap();
        h.say("book a gardener tomorrow at 10:30am");
        let reply = h.say("anyone is fine");
        assert!(reply.starts_with("Your booking with Rose Bush (Gardener) is confirmed"));
    }

    #[test]
    fn test_overlap_with_chosen_technician_then_new_time() {
        let mut h = Harness::new();
        h.store.create("Nicolas Woollett", "Plumber", dt("2025-01-08 14:00")).unwrap();

        h.say("I need a plumber on January 8 at 2:30pm");
        assert!(h.ctx.awaiting_technician());

        let reply = h.say("1");
        assert!(reply.starts_with(
            "There is already a booking at Wednesday, January 08 at 2:00 PM with Nicolas Woollett."
        ));
        assert!(h.ctx.conflict_detected());

        let reply = h.say("yes");
        assert_eq!(reply, "Please provide a different time for your Plumber appointment.");
        assert!(h.ctx.awaiting_time());

        h.say("4pm");
        let reply = h.say("Nicolas");
        assert!(reply.contains("confirmed for Wednesday, January 08 at 4:00 PM"));
        assert_eq!(h.store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_other_technician_free_while_first_is_busy() {
        let mut h = Harness::new();
        h.store.create("Nicolas Woollett", "Plumber", dt("2025-01-08 14:00")).unwrap();

        let reply = h.say("I need a plumber on January 8 at 2:30pm");
        assert!(reply.starts_with("For Wednesday, January 08 at 2:30 PM"));
        assert!(h.ctx.awaiting_technician());

        let reply = h.say("2");
        assert_eq!(
            reply,
            "Your booking with John Pipe (Plumber) is confirmed for Wednesday, January 08 at 2:30 PM. Your booking ID is 2."
        );
        let booking = h.store.get(2).unwrap().unwrap();
        assert_eq!(booking.technician_name, "John Pipe");
        assert_eq!(booking.booking_time, dt("2025-01-08 14:30"));
        assert_eq!(h.store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_exact_slot_taken_is_caught_before_selection() {
        let mut h = Harness::new();
        h.store.create("Franky Flay", "Electrician", dt("2025-01-08 14:00")).unwrap();

        let reply = h.say("book an electrician January 8 at 2pm");
        assert!(reply.starts_with("There is already a booking at Wednesday, January 08 at 2:00 PM."));
        assert!(matches!(h.ctx.state(), DialogueState::ConflictDetected { .. }));

        assert_eq!(h.say("no"), messages::BOOKING_PROCESS_CANCELLED);
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_conflict_accepts_a_new_time_directly() {
        let mut h = Harness::new();
        h.store.create("Franky Flay", "Electrician", dt("2025-01-08 14:00")).unwrap();
        h.say("book an electrician January 8 at 2pm");
        let reply = h.say("5pm");
        assert!(reply.starts_with("For Wednesday, January 08 at 5:00 PM"));
        assert!(h.ctx.awaiting_technician());
    }
}

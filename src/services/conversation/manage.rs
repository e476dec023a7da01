use chrono::NaiveDateTime;

use super::{messages, DialogueOrchestrator, Reply};
use crate::errors::StoreError;
use crate::models::{BookingFlow, BookingUpdate, DialogueContext};
use crate::services::nlp::extract_booking_id;
use crate::services::nlp::slots::split_booking_reference;

impl DialogueOrchestrator<'_> {
    pub(super) fn list_bookings(&self) -> Reply {
        let bookings = self.store.list_all()?;
        Ok(messages::booking_list(&bookings))
    }

    pub(super) fn handle_cancellation_request(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        match extract_booking_id(text) {
            Some(booking_id) => self.cancel_booking(booking_id, ctx),
            None => {
                ctx.await_booking_id_for_cancel();
                Ok(messages::PROVIDE_BOOKING_ID_CANCEL.to_string())
            }
        }
    }

    pub(super) fn handle_cancel_id(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        match extract_booking_id(text) {
            Some(booking_id) => self.cancel_booking(booking_id, ctx),
            None => Ok(messages::PROVIDE_VALID_BOOKING_ID.to_string()),
        }
    }

    // a missing booking leaves the context where it was
    fn cancel_booking(&self, booking_id: i64, ctx: &mut DialogueContext) -> Reply {
        let Some(booking) = self.store.get(booking_id)? else {
            return Ok(messages::no_booking_found(booking_id));
        };
        if !self.store.delete(booking_id)? {
            return Ok(messages::no_booking_found(booking_id));
        }

        tracing::info!(booking_id, technician = %booking.technician_name, "booking cancelled");
        ctx.forget_booking(booking_id);
        ctx.clear_flow();
        Ok(messages::booking_cancelled(&booking))
    }

    pub(super) fn handle_update_request(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        if let Some((booking_id, rest)) = split_booking_reference(text) {
            return self.update_with(booking_id, &rest, ctx);
        }

        if self.extractor().parse_date_time(text).is_none() {
            if let Some(booking_id) = extract_booking_id(text) {
                return self.begin_update(booking_id, ctx);
            }
        }

        let bookings = self.store.list_all()?;
        if bookings.is_empty() {
            return Ok(messages::NO_BOOKINGS_TO_UPDATE.to_string());
        }
        ctx.await_booking_id_for_update();
        Ok(format!(
            "{}\n\n{}",
            messages::booking_list(&bookings),
            messages::PROVIDE_BOOKING_ID_UPDATE
        ))
    }

    pub(super) fn handle_update_id(&self, text: &str, ctx: &mut DialogueContext) -> Reply {
        match extract_booking_id(text) {
            Some(booking_id) => self.begin_update(booking_id, ctx),
            None => Ok(messages::PROVIDE_VALID_BOOKING_ID.to_string()),
        }
    }

    fn begin_update(&self, booking_id: i64, ctx: &mut DialogueContext) -> Reply {
        match self.store.get(booking_id)? {
            Some(booking) => {
                ctx.begin_update(booking_id);
                Ok(messages::update_booking_prompt(&booking))
            }
            None => Ok(messages::no_booking_found(booking_id)),
        }
    }

    fn update_with(&self, booking_id: i64, rest: &str, ctx: &mut DialogueContext) -> Reply {
        let Some(booking) = self.store.get(booking_id)? else {
            return Ok(messages::no_booking_found(booking_id));
        };

        ctx.begin_update(booking_id);
        let flow = BookingFlow::Reschedule { booking_id };
        match self.advance(rest, flow, Some(booking.booking_time.date()), ctx) {
            Some(reply) => reply,
            None => Ok(messages::update_booking_prompt(&booking)),
        }
    }

    pub(super) fn apply_reschedule(
        &self,
        booking_id: i64,
        time: NaiveDateTime,
        ctx: &mut DialogueContext,
    ) -> Reply {
        let flow = BookingFlow::Reschedule { booking_id };
        let Some(before) = self.store.get(booking_id)? else {
            ctx.clear_flow();
            return Ok(messages::update_not_found(booking_id));
        };

        let technician = before.technician_name.as_str();
        if let Some(clash) = self
            .checker()
            .check_conflict(time, Some(booking_id), Some(technician))?
        {
            return self.report_conflict(flow, time, clash.booking_time, Some(technician), ctx);
        }

        match self.store.update(booking_id, &BookingUpdate::reschedule(time)) {
            Ok(Some(after)) => {
                tracing::info!(booking_id, from = %before.booking_time, to = %time, "booking rescheduled");
                ctx.clear_flow();
                Ok(messages::booking_updated(&before, &after))
            }
            Ok(None) => {
                ctx.clear_flow();
                Ok(messages::update_not_found(booking_id))
            }
            Err(StoreError::Conflict { time: busy, .. }) => {
                self.report_conflict(flow, time, busy, Some(technician), ctx)
            }
            Err(e) => Err(e),
        }
    }

    pub(super) fn describe_last_booking(&self, ctx: &mut DialogueContext) -> Reply {
        let Some(booking_id) = ctx.last_booking_id() else {
            return Ok(messages::NO_RECENT_BOOKING.to_string());
        };
        match self.store.get(booking_id)? {
            Some(booking) => Ok(messages::most_recent_booking(&booking)),
            None => {
                ctx.forget_booking(booking_id);
                Ok(messages::NO_RECENT_BOOKING.to_string())
            }
        }
    }

    pub(super) fn describe_booking(&self, text: &str) -> Reply {
        let Some(booking_id) = extract_booking_id(text) else {
            return Ok(messages::PROVIDE_VALID_BOOKING_ID.to_string());
        };
        match self.store.get(booking_id)? {
            Some(booking) => Ok(messages::booking_line(&booking)),
            None => Ok(messages::no_booking_found(booking_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::db::BookingStore;
    use crate::services::conversation::messages;
    use crate::services::conversation::tests::Harness;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn seeded() -> Harness {
        let h = Harness::new();
        h.store.create("Nicolas Woollett", "Plumber", dt("2025-01-08 14:00")).unwrap();
        h
    }

    #[test]
    fn test_cancel_missing_booking_leaves_context() {
        let mut h = Harness::new();
        assert_eq!(h.say("cancel booking 999"), "No booking found with ID 999.");
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_cancel_asks_for_id_then_cancels() {
        let mut h = seeded();
        assert_eq!(h.say("I want to cancel my booking"), messages::PROVIDE_BOOKING_ID_CANCEL);
        assert!(h.ctx.awaiting_booking_id_for_cancel());

        assert_eq!(h.say("the one"), messages::PROVIDE_VALID_BOOKING_ID);
        let reply = h.say("1");
        assert_eq!(
            reply,
            "Your booking with Nicolas Woollett for Wednesday, January 08 at 2:00 PM has been cancelled."
        );
        assert!(h.ctx.is_idle());
        assert!(h.store.get(1).unwrap().is_none());
    }

    #[test]
    fn test_cancel_command_while_waiting_for_id() {
        let mut h = seeded();
        h.say("cancel my booking");
        let reply = h.say("cancel booking 1");
        assert!(reply.ends_with("has been cancelled."));
    }

    #[test]
    fn test_cancelling_last_booking_forgets_it() {
        let mut h = Harness::new();
        h.say("book a painter tomorrow at 9am");
        h.say("1");
        assert_eq!(h.ctx.last_booking_id(), Some(1));
        h.say("cancel booking 1");
        assert_eq!(h.ctx.last_booking_id(), None);
    }

    #[test]
    fn test_list_bookings() {
        let mut h = seeded();
        h.store.create("Emma Volt", "Electrician", dt("2025-01-07 09:00")).unwrap();
        let reply = h.say("show my bookings");
        assert_eq!(
            reply,
            "Your bookings:\n\n\
             Booking #2: Electrician with Emma Volt at Tuesday, January 07 at 9:00 AM\n\
             Booking #1: Plumber with Nicolas Woollett at Wednesday, January 08 at 2:00 PM"
        );
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_list_when_empty() {
        let mut h = Harness::new();
        assert_eq!(h.say("list my bookings"), messages::NO_BOOKINGS);
    }

    #[test]
    fn test_update_slot_by_slot() {
        let mut h = seeded();
        let reply = h.say("change booking 1");
        assert!(reply.starts_with(
            "You're updating your booking with Nicolas Woollett (Plumber) currently scheduled for Wednesday, January 08 at 2:00 PM."
        ));
        assert_eq!(h.ctx.updating_booking_id(), Some(1));
        assert!(h.ctx.awaiting_date());

        assert_eq!(h.say("January 9"), messages::UPDATE_TIME_PROMPT);
        let reply = h.say("10am");
        assert_eq!(
            reply,
            "Your booking with Nicolas Woollett has been updated from Wednesday, January 08 at 2:00 PM to Thursday, January 09 at 10:00 AM."
        );
        assert!(h.ctx.is_idle());
        assert_eq!(h.store.get(1).unwrap().unwrap().booking_time, dt("2025-01-09 10:00"));
    }

    #[test]
    fn test_update_in_one_sentence() {
        let mut h = seeded();
        let reply = h.say("Reschedule booking 1 to January 9 at 11am");
        assert!(reply.ends_with("to Thursday, January 09 at 11:00 AM."));
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_update_time_only_keeps_day() {
        let mut h = seeded();
        let reply = h.say("change booking 1 to 4pm");
        assert!(reply.ends_with("to Wednesday, January 08 at 4:00 PM."));
    }

    #[test]
    fn test_update_conflict_then_other_time() {
        let mut h = seeded();
        h.store.create("Nicolas Woollett", "Plumber", dt("2025-01-08 16:00")).unwrap();

        let reply = h.say("reschedule booking 1 to January 8 at 3:30pm");
        assert!(reply.starts_with(
            "There is already a booking at Wednesday, January 08 at 4:00 PM with Nicolas Woollett."
        ));
        assert!(h.ctx.conflict_detected());

        let reply = h.say("1pm");
        assert!(reply.ends_with("to Wednesday, January 08 at 1:00 PM."));
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_update_without_id_lists_bookings() {
        let mut h = seeded();
        let reply = h.say("I want to change my booking");
        assert!(reply.starts_with("Your bookings:\n\nBooking #1:"));
        assert!(reply.ends_with(messages::PROVIDE_BOOKING_ID_UPDATE));
        assert!(h.ctx.awaiting_booking_id_for_update());

        let reply = h.say("1");
        assert!(reply.starts_with("You're updating your booking with Nicolas Woollett"));
        assert!(h.ctx.updating_booking());
    }

    #[test]
    fn test_update_unknown_booking() {
        let mut h = Harness::new();
        assert_eq!(h.say("update booking 42"), "No booking found with ID 42.");
        assert!(h.ctx.is_idle());
    }

    #[test]
    fn test_booking_inquiries() {
        let mut h = Harness::new();
        assert_eq!(h.say("what's my booking id"), messages::NO_RECENT_BOOKING);

        h.say("I need a plumber on January 8 at 3pm");
        h.say("John Pipe");
        assert_eq!(
            h.say("what's my booking id"),
            "Your most recent booking (ID: 1) is with John Pipe (Plumber) on Wednesday, January 08 at 3:00 PM."
        );
        assert_eq!(
            h.say("show booking 1"),
            "Booking #1: Plumber with John Pipe at Wednesday, January 08 at 3:00 PM"
        );
        assert_eq!(h.say("show booking 5"), "No booking found with ID 5.");
    }
}

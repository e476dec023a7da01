use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Specialty;

/// What the date/time slots are being collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingFlow {
    New { specialty: Specialty },
    Reschedule { booking_id: i64 },
}

impl BookingFlow {
    pub fn specialty(&self) -> Option<Specialty> {
        match self {
            BookingFlow::New { specialty } => Some(*specialty),
            BookingFlow::Reschedule { .. } => None,
        }
    }

    pub fn booking_id(&self) -> Option<i64> {
        match self {
            BookingFlow::Reschedule { booking_id } => Some(*booking_id),
            BookingFlow::New { .. } => None,
        }
    }
}

/// The slot the next user turn is expected to fill. Each variant carries only
/// the values collected so far, so at most one slot is ever awaited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingSpecialty,
    AwaitingDate {
        flow: BookingFlow,
    },
    AwaitingTime {
        flow: BookingFlow,
        date: NaiveDate,
    },
    AwaitingAmPm {
        flow: BookingFlow,
        date: NaiveDate,
        hour: u32,
        minute: u32,
    },
    AwaitingTechnician {
        specialty: Specialty,
        time: NaiveDateTime,
        candidates: Vec<String>,
    },
    ConflictDetected {
        flow: BookingFlow,
        time: NaiveDateTime,
    },
    AwaitingBookingIdForUpdate,
    AwaitingBookingIdForCancel,
}

impl DialogueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingSpecialty => "awaiting_specialty",
            DialogueState::AwaitingDate { .. } => "awaiting_date",
            DialogueState::AwaitingTime { .. } => "awaiting_time",
            DialogueState::AwaitingAmPm { .. } => "awaiting_ampm",
            DialogueState::AwaitingTechnician { .. } => "awaiting_technician",
            DialogueState::ConflictDetected { .. } => "conflict_detected",
            DialogueState::AwaitingBookingIdForUpdate => "awaiting_booking_id_for_update",
            DialogueState::AwaitingBookingIdForCancel => "awaiting_booking_id_for_cancel",
        }
    }

    fn flow(&self) -> Option<&BookingFlow> {
        match self {
            DialogueState::AwaitingDate { flow }
            | DialogueState::AwaitingTime { flow, .. }
            | DialogueState::AwaitingAmPm { flow, .. }
            | DialogueState::ConflictDetected { flow, .. } => Some(flow),
            _ => None,
        }
    }
}

/// The most recently created booking, kept after the flow completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastBooking {
    pub booking_id: i64,
    pub specialty: String,
    pub technician_name: String,
}

/// Parts of the context that a partial reset may clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    State,
    LastBooking,
}

/// Per-session slot state. Owned by the caller and mutated only through the
/// transition methods below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueContext {
    state: DialogueState,
    last_booking: Option<LastBooking>,
}

pub fn create_default_context() -> DialogueContext {
    DialogueContext::default()
}

pub fn reset_context(context: &mut DialogueContext, fields: Option<&[ContextField]>) {
    context.reset(fields);
}

impl DialogueContext {
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DialogueState::Idle
    }

    pub fn last_booking(&self) -> Option<&LastBooking> {
        self.last_booking.as_ref()
    }

    // ── Transitions ──

    pub fn await_specialty(&mut self) {
        self.state = DialogueState::AwaitingSpecialty;
    }

    pub fn await_date(&mut self, flow: BookingFlow) {
        self.state = DialogueState::AwaitingDate { flow };
    }

    pub fn await_time(&mut self, flow: BookingFlow, date: NaiveDate) {
        self.state = DialogueState::AwaitingTime { flow, date };
    }

    pub fn await_ampm(&mut self, flow: BookingFlow, date: NaiveDate, hour: u32, minute: u32) {
        self.state = DialogueState::AwaitingAmPm {
            flow,
            date,
            hour,
            minute,
        };
    }

    pub fn await_technician(
        &mut self,
        specialty: Specialty,
        time: NaiveDateTime,
        candidates: Vec<String>,
    ) {
        self.state = DialogueState::AwaitingTechnician {
            specialty,
            time,
            candidates,
        };
    }

    pub fn detect_conflict(&mut self, flow: BookingFlow, time: NaiveDateTime) {
        self.state = DialogueState::ConflictDetected { flow, time };
    }

    pub fn await_booking_id_for_update(&mut self) {
        self.state = DialogueState::AwaitingBookingIdForUpdate;
    }

    pub fn await_booking_id_for_cancel(&mut self) {
        self.state = DialogueState::AwaitingBookingIdForCancel;
    }

    pub fn begin_update(&mut self, booking_id: i64) {
        self.await_date(BookingFlow::Reschedule { booking_id });
    }

    /// Restart a new-booking flow at the date slot with another specialty.
    pub fn change_specialty(&mut self, specialty: Specialty) {
        self.await_date(BookingFlow::New { specialty });
    }

    pub fn complete_booking(&mut self, booking: LastBooking) {
        self.state = DialogueState::Idle;
        self.last_booking = Some(booking);
    }

    pub fn forget_booking(&mut self, booking_id: i64) {
        if self.last_booking_id() == Some(booking_id) {
            self.last_booking = None;
        }
    }

    /// Abandon the current flow but keep booking memory.
    pub fn clear_flow(&mut self) {
        self.state = DialogueState::Idle;
    }

    /// Full reset when `fields` is `None`, otherwise only the named parts.
    pub fn reset(&mut self, fields: Option<&[ContextField]>) {
        match fields {
            None => *self = Self::default(),
            Some(fields) => {
                for field in fields {
                    match field {
                        ContextField::State => self.state = DialogueState::Idle,
                        ContextField::LastBooking => self.last_booking = None,
                    }
                }
            }
        }
    }

    // ── Flag view ──

    pub fn awaiting_specialty(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingSpecialty)
    }

    pub fn awaiting_date(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingDate { .. })
    }

    pub fn awaiting_time(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingTime { .. })
    }

    pub fn awaiting_ampm(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingAmPm { .. })
    }

    pub fn awaiting_technician(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingTechnician { .. })
    }

    pub fn awaiting_booking_id_for_update(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingBookingIdForUpdate)
    }

    pub fn awaiting_booking_id_for_cancel(&self) -> bool {
        matches!(self.state, DialogueState::AwaitingBookingIdForCancel)
    }

    pub fn conflict_detected(&self) -> bool {
        matches!(self.state, DialogueState::ConflictDetected { .. })
    }

    pub fn cancelling_booking(&self) -> bool {
        self.awaiting_booking_id_for_cancel()
    }

    pub fn updating_booking(&self) -> bool {
        self.updating_booking_id().is_some()
    }

    pub fn updating_booking_id(&self) -> Option<i64> {
        self.state.flow().and_then(BookingFlow::booking_id)
    }

    /// Names of the awaiting flags currently raised.
    pub fn awaiting_flags(&self) -> Vec<&'static str> {
        [
            ("awaiting_specialty", self.awaiting_specialty()),
            ("awaiting_date", self.awaiting_date()),
            ("awaiting_time", self.awaiting_time()),
            ("awaiting_ampm", self.awaiting_ampm()),
            ("awaiting_technician", self.awaiting_technician()),
            ("awaiting_booking_id_for_update", self.awaiting_booking_id_for_update()),
            ("awaiting_booking_id_for_cancel", self.awaiting_booking_id_for_cancel()),
        ]
        .into_iter()
        .filter_map(|(name, raised)| raised.then_some(name))
        .collect()
    }

    // ── Working values ──

    pub fn temp_specialty(&self) -> Option<Specialty> {
        match &self.state {
            DialogueState::AwaitingTechnician { specialty, .. } => Some(*specialty),
            state => state.flow().and_then(BookingFlow::specialty),
        }
    }

    pub fn temp_date(&self) -> Option<NaiveDate> {
        match &self.state {
            DialogueState::AwaitingTime { date, .. } | DialogueState::AwaitingAmPm { date, .. } => {
                Some(*date)
            }
            DialogueState::AwaitingTechnician { time, .. }
            | DialogueState::ConflictDetected { time, .. } => Some(time.date()),
            _ => None,
        }
    }

    pub fn temp_time(&self) -> Option<NaiveTime> {
        match &self.state {
            DialogueState::AwaitingTechnician { time, .. }
            | DialogueState::ConflictDetected { time, .. } => Some(time.time()),
            _ => None,
        }
    }

    pub fn temp_hour(&self) -> Option<u32> {
        match &self.state {
            DialogueState::AwaitingAmPm { hour, .. } => Some(*hour),
            _ => None,
        }
    }

    pub fn temp_minute(&self) -> Option<u32> {
        match &self.state {
            DialogueState::AwaitingAmPm { minute, .. } => Some(*minute),
            _ => None,
        }
    }

    pub fn available_technicians(&self) -> &[String] {
        match &self.state {
            DialogueState::AwaitingTechnician { candidates, .. } => candidates,
            _ => &[],
        }
    }

    pub fn last_booking_id(&self) -> Option<i64> {
        self.last_booking.as_ref().map(|b| b.booking_id)
    }

    pub fn last_specialty(&self) -> Option<&str> {
        self.last_booking.as_ref().map(|b| b.specialty.as_str())
    }

    pub fn last_technician(&self) -> Option<&str> {
        self.last_booking.as_ref().map(|b| b.technician_name.as_str())
    }
}

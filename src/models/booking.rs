use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Every booking occupies a fixed one-hour window starting at `booking_time`.
pub const BOOKING_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub technician_name: String,
    pub specialty: String,
    pub booking_time: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn end_time(&self) -> NaiveDateTime {
        self.booking_time + Duration::minutes(BOOKING_DURATION_MINUTES)
    }

    /// True when a booking starting at `candidate` would overlap this one.
    pub fn overlaps(&self, candidate: NaiveDateTime) -> bool {
        windows_overlap(self.booking_time, candidate)
    }
}

/// Half-open one-hour windows on the same calendar day. A window ending exactly
/// when the other starts does not overlap.
pub fn windows_overlap(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    let duration = Duration::minutes(BOOKING_DURATION_MINUTES);
    a.date() == b.date() && a < b + duration && b < a + duration
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub technician_name: String,
    pub specialty: String,
    pub booking_time: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingUpdate {
    pub technician_name: Option<String>,
    pub specialty: Option<String>,
    pub booking_time: Option<NaiveDateTime>,
}

impl BookingUpdate {
    pub fn reschedule(booking_time: NaiveDateTime) -> Self {
        Self {
            booking_time: Some(booking_time),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.technician_name.is_none() && self.specialty.is_none() && self.booking_time.is_none()
    }
}

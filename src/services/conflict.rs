use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::db::BookingStore;
use crate::errors::StoreError;
use crate::models::Booking;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictResult {
    pub booking_id: i64,
    pub technician_name: String,
    pub specialty: String,
    pub booking_time: NaiveDateTime,
}

impl From<&Booking> for ConflictResult {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id,
            technician_name: booking.technician_name.clone(),
            specialty: booking.specialty.clone(),
            booking_time: booking.booking_time,
        }
    }
}

const ALTERNATIVE_OFFSETS_MINUTES: [i64; 3] = [-60, 30, 60];

pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    candidate: NaiveDateTime,
    exclude_booking_id: Option<i64>,
    technician_name: Option<&str>,
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        Some(b.id) != exclude_booking_id
            && technician_name.map_or(true, |t| b.technician_name == t)
            && b.overlaps(candidate)
    })
}

pub struct ConflictChecker<'a> {
    store: &'a dyn BookingStore,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(store: &'a dyn BookingStore) -> Self {
        Self { store }
    }

    pub fn check_conflict(
        &self,
        candidate: NaiveDateTime,
        exclude_booking_id: Option<i64>,
        technician_name: Option<&str>,
    ) -> Result<Option<ConflictResult>, StoreError> {
        let same_day = self.store.list_on(candidate.date())?;
        Ok(find_conflict(&same_day, candidate, exclude_booking_id, technician_name)
            .map(ConflictResult::from))
    }

    // any booking starting exactly at `candidate` blocks the slot
    pub fn precheck_slot(
        &self,
        candidate: NaiveDateTime,
    ) -> Result<Option<ConflictResult>, StoreError> {
        let same_day = self.store.list_on(candidate.date())?;
        Ok(same_day
            .iter()
            .find(|b| b.booking_time == candidate)
            .map(ConflictResult::from))
    }

    pub fn suggest_alternatives(
        &self,
        candidate: NaiveDateTime,
        exclude_booking_id: Option<i64>,
        technician_name: Option<&str>,
    ) -> Result<Vec<NaiveDateTime>, StoreError> {
        let same_day = self.store.list_on(candidate.date())?;
        Ok(ALTERNATIVE_OFFSETS_MINUTES
            .iter()
            .map(|offset| candidate + Duration::minutes(*offset))
            .filter(|alt| alt.date() == candidate.date())
            .filter(|alt| {
                let blocked = match technician_name {
                    Some(_) => {
                        find_conflict(&same_day, *alt, exclude_booking_id, technician_name)
                            .is_some()
                    }
                    None => same_day.iter().any(|b| b.booking_time == *alt),
                };
                !blocked
            })
            .collect())
    }
}

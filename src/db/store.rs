use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::errors::StoreError;
use crate::models::{Booking, BookingUpdate};

/// Storage for bookings. `create` and `update` must re-check the
/// no-overlap rule for the technician atomically and reject with
/// [`StoreError::Conflict`] instead of trusting an earlier check.
pub trait BookingStore: Send + Sync {
    fn create(
        &self,
        technician_name: &str,
        specialty: &str,
        booking_time: NaiveDateTime,
    ) -> Result<i64, StoreError>;

    fn get(&self, id: i64) -> Result<Option<Booking>, StoreError>;

    fn update(&self, id: i64, update: &BookingUpdate) -> Result<Option<Booking>, StoreError>;

    fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// All bookings ordered by time.
    fn list_all(&self) -> Result<Vec<Booking>, StoreError>;

    fn list_on(&self, day: NaiveDate) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|b| b.booking_time.date() == day)
            .collect())
    }
}

pub struct SqliteBookingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookingStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ensure_free(
    conn: &Connection,
    technician_name: &str,
    booking_time: NaiveDateTime,
    exclude: Option<i64>,
) -> Result<(), StoreError> {
    let existing = queries::technician_bookings_on(conn, technician_name, booking_time.date())?;
    match existing
        .iter()
        .find(|b| Some(b.id) != exclude && b.overlaps(booking_time))
    {
        Some(clash) => Err(StoreError::Conflict {
            booking_id: clash.id,
            technician: technician_name.to_string(),
            time: clash.booking_time,
        }),
        None => Ok(()),
    }
}

impl BookingStore for SqliteBookingStore {
    fn create(
        &self,
        technician_name: &str,
        specialty: &str,
        booking_time: NaiveDateTime,
    ) -> Result<i64, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        ensure_free(&tx, technician_name, booking_time, None)?;
        let id = queries::insert_booking(&tx, technician_name, specialty, &booking_time)?;
        tx.commit()?;

        tracing::info!(booking_id = id, technician = technician_name, %booking_time, "booking created");
        Ok(id)
    }

    fn get(&self, id: i64) -> Result<Option<Booking>, StoreError> {
        let conn = self.lock();
        Ok(queries::get_booking(&conn, id)?)
    }

    fn update(&self, id: i64, update: &BookingUpdate) -> Result<Option<Booking>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(current) = queries::get_booking(&tx, id)? else {
            return Ok(None);
        };

        let technician = update
            .technician_name
            .as_deref()
            .unwrap_or(&current.technician_name);
        let booking_time = update.booking_time.unwrap_or(current.booking_time);
        ensure_free(&tx, technician, booking_time, Some(id))?;

        queries::update_booking(&tx, id, update)?;
        let updated = queries::get_booking(&tx, id)?;
        tx.commit()?;

        tracing::info!(booking_id = id, %booking_time, "booking updated");
        Ok(updated)
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.lock();
        let deleted = queries::delete_booking(&conn, id)?;
        if deleted {
            tracing::info!(booking_id = id, "booking deleted");
        }
        Ok(deleted)
    }

    fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let conn = self.lock();
        Ok(queries::list_bookings(&conn)?)
    }

    fn list_on(&self, day: NaiveDate) -> Result<Vec<Booking>, StoreError> {
        let conn = self.lock();
        Ok(queries::bookings_on(&conn, day)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn store() -> SqliteBookingStore {
        SqliteBookingStore::new(db::init_db(":memory:").unwrap())
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_create_rejects_overlap_for_same_technician() {
        let store = store();
        let first = store
            .create("Nicolas Woollett", "Plumber", dt("2025-06-16 14:00"))
            .unwrap();

        let err = store
            .create("Nicolas Woollett", "Plumber", dt("2025-06-16 14:30"))
            .unwrap_err();
        match err {
            StoreError::Conflict { booking_id, .. } => assert_eq!(booking_id, first),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_create_allows_other_technician_and_adjacent_slot() {
        let store = store();
        store
            .create("Nicolas Woollett", "Plumber", dt("2025-06-16 14:00"))
            .unwrap();

        assert!(store.create("John Pipe", "Plumber", dt("2025-06-16 14:30")).is_ok());
        assert!(store
            .create("Nicolas Woollett", "Plumber", dt("2025-06-16 15:00"))
            .is_ok());
    }

    #[test]
    fn test_update_excludes_itself_but_checks_others() {
        let store = store();
        let a = store
            .create("Emma Volt", "Electrician", dt("2025-06-16 09:00"))
            .unwrap();
        store
            .create("Emma Volt", "Electrician", dt("2025-06-16 11:00"))
            .unwrap();

        let moved = store
            .update(a, &BookingUpdate::reschedule(dt("2025-06-16 09:30")))
            .unwrap()
            .unwrap();
        assert_eq!(moved.booking_time, dt("2025-06-16 09:30"));

        let err = store
            .update(a, &BookingUpdate::reschedule(dt("2025-06-16 10:30")))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn test_update_missing_booking_returns_none() {
        let store = store();
        let result = store
            .update(42, &BookingUpdate::reschedule(dt("2025-06-16 09:30")))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_list_on_filters_by_day() {
        let store = store();
        store.create("John Pipe", "Plumber", dt("2025-06-16 09:00")).unwrap();
        store.create("John Pipe", "Plumber", dt("2025-06-17 09:00")).unwrap();

        let day = store.list_on(dt("2025-06-17 00:00").date()).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].booking_time, dt("2025-06-17 09:00"));
    }
}

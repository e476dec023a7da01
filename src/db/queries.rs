use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingUpdate};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, technician_name, specialty, booking_time, created_at, updated_at";

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn now() -> String {
    format_datetime(&Utc::now().naive_utc())
}

// ── Bookings ──

pub fn insert_booking(
    conn: &Connection,
    technician_name: &str,
    specialty: &str,
    booking_time: &NaiveDateTime,
) -> rusqlite::Result<i64> {
    let now = now();
    conn.execute(
        "INSERT INTO bookings (technician_name, specialty, booking_time, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![technician_name, specialty, format_datetime(booking_time), now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_booking(conn: &Connection, id: i64) -> rusqlite::Result<Option<Booking>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    )
    .optional()
}

pub fn update_booking(
    conn: &Connection,
    id: i64,
    update: &BookingUpdate,
) -> rusqlite::Result<bool> {
    let booking_time = update.booking_time.as_ref().map(format_datetime);
    let count = conn.execute(
        "UPDATE bookings SET
           technician_name = COALESCE(?1, technician_name),
           specialty = COALESCE(?2, specialty),
           booking_time = COALESCE(?3, booking_time),
           updated_at = ?4
         WHERE id = ?5",
        params![
            update.technician_name,
            update.specialty,
            booking_time,
            now(),
            id
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn list_bookings(conn: &Connection) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_time ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], parse_booking_row)?;
    rows.collect()
}

pub fn bookings_on(conn: &Connection, day: NaiveDate) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE date(booking_time) = ?1
         ORDER BY booking_time ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![day.format("%Y-%m-%d").to_string()], parse_booking_row)?;
    rows.collect()
}

pub fn technician_bookings_on(
    conn: &Connection,
    technician_name: &str,
    day: NaiveDate,
) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE technician_name = ?1 AND date(booking_time) = ?2
         ORDER BY booking_time ASC"
    ))?;
    let rows = stmt.query_map(
        params![technician_name, day.format("%Y-%m-%d").to_string()],
        parse_booking_row,
    )?;
    rows.collect()
}

pub fn count_bookings(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
}

fn parse_datetime_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        technician_name: row.get(1)?,
        specialty: row.get(2)?,
        booking_time: parse_datetime_column(row, 3)?,
        created_at: parse_datetime_column(row, 4)?,
        updated_at: parse_datetime_column(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_insert_and_get_booking() {
        let conn = db::init_db(":memory:").unwrap();
        let id = insert_booking(&conn, "John Pipe", "Plumber", &dt("2025-06-16 15:00")).unwrap();

        let booking = get_booking(&conn, id).unwrap().unwrap();
        assert_eq!(booking.technician_name, "John Pipe");
        assert_eq!(booking.specialty, "Plumber");
        assert_eq!(booking.booking_time, dt("2025-06-16 15:00"));
        assert!(get_booking(&conn, id + 1).unwrap().is_none());
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let conn = db::init_db(":memory:").unwrap();
        let id = insert_booking(&conn, "John Pipe", "Plumber", &dt("2025-06-16 15:00")).unwrap();

        let updated =
            update_booking(&conn, id, &BookingUpdate::reschedule(dt("2025-06-17 09:00"))).unwrap();
        assert!(updated);

        let booking = get_booking(&conn, id).unwrap().unwrap();
        assert_eq!(booking.technician_name, "John Pipe");
        assert_eq!(booking.booking_time, dt("2025-06-17 09:00"));
    }

    #[test]
    fn test_list_is_ordered_by_time() {
        let conn = db::init_db(":memory:").unwrap();
        insert_booking(&conn, "Emma Volt", "Electrician", &dt("2025-06-18 10:00")).unwrap();
        insert_booking(&conn, "John Pipe", "Plumber", &dt("2025-06-16 10:00")).unwrap();

        let all = list_bookings(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].technician_name, "John Pipe");

        let day = bookings_on(&conn, dt("2025-06-18 00:00").date()).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].technician_name, "Emma Volt");
    }

    #[test]
    fn test_delete_booking() {
        let conn = db::init_db(":memory:").unwrap();
        let id = insert_booking(&conn, "John Pipe", "Plumber", &dt("2025-06-16 15:00")).unwrap();
        assert!(delete_booking(&conn, id).unwrap());
        assert!(!delete_booking(&conn, id).unwrap());
        assert_eq!(count_bookings(&conn).unwrap(), 0);
    }
}

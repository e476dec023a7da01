pub mod migrations;
pub mod queries;
pub mod store;

pub use store::{BookingStore, SqliteBookingStore};

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Demo bookings inserted into an empty database.
const SAMPLE_BOOKINGS: &[(&str, &str, (i32, u32, u32), u32)] = &[
    ("Nicolas Woollett", "Plumber", (2022, 10, 15), 10),
    ("Franky Flay", "Electrician", (2022, 10, 16), 18),
    ("Griselda Dickson", "Welder", (2022, 10, 18), 11),
];

pub fn seed_sample_bookings(conn: &Connection) -> anyhow::Result<usize> {
    if queries::count_bookings(conn).context("failed to count bookings")? > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for (technician, specialty, (year, month, day), hour) in SAMPLE_BOOKINGS {
        let time = NaiveDate::from_ymd_opt(*year, *month, *day)
            .and_then(|d| d.and_hms_opt(*hour, 0, 0))
            .context("invalid sample booking time")?;
        queries::insert_booking(conn, technician, specialty, &time)
            .with_context(|| format!("failed to seed booking for {technician}"))?;
        inserted += 1;
    }

    tracing::info!("seeded {inserted} sample bookings");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_only_fills_empty_database() {
        let conn = init_db(":memory:").unwrap();
        assert_eq!(seed_sample_bookings(&conn).unwrap(), 3);
        assert_eq!(seed_sample_bookings(&conn).unwrap(), 0);

        let all = queries::list_bookings(&conn).unwrap();
        assert_eq!(all[0].technician_name, "Nicolas Woollett");
        assert_eq!(all[2].specialty, "Welder");
    }
}

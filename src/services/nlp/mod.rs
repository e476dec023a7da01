pub mod datetime;
pub mod intent;
pub mod slots;
pub mod vocabulary;

pub use datetime::{DateTimeExtractor, ParsedDateTime};
pub use intent::classify;
pub use slots::{extract_booking_id, extract_specialty};

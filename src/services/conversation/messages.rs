use chrono::NaiveDateTime;

use crate::models::{Booking, BookingFlow, Specialty};
use crate::services::nlp::datetime::{describe_date, describe_datetime, describe_time};

pub const GREETING: &str = "Hello! I can help you book a technician, check your bookings, or cancel a booking. How can I assist you today?";
pub const UNCLEAR_REQUEST: &str = "I'm not sure how to help with that. You can book a technician, check your bookings, or cancel a booking.";
pub const SPECIALTY_PROMPT: &str = "What type of technician do you need? (e.g., plumber, electrician, welder, gardener, carpenter, painter, HVAC)";
pub const GENERIC_TECHNICIAN_PROMPT: &str = "Please specify what type of technician you need (e.g., plumber, electrician, welder, gardener, carpenter, painter, HVAC).";
pub const UNSUPPORTED_SPECIALTY: &str = "I'm sorry, we don't offer that type of technician. We have plumbers, electricians, welders, gardeners, carpenters, painters, and HVAC technicians.";
pub const UPDATE_TIME_PROMPT: &str = "What time would you like to reschedule to? (e.g., '3 PM', '3:15 PM', 'morning', 'afternoon')";
pub const UPDATE_DATE_PROMPT: &str = "What day would you like to reschedule to? (e.g., 'tomorrow', 'next Monday', 'July 15')";
pub const INVALID_DATE_FORMAT: &str = "I couldn't understand that date. Please provide a valid date like 'tomorrow', 'next Monday', or 'July 15'.";
pub const INVALID_TIME_FORMAT: &str = "I couldn't understand that time. Please provide a valid time like '3:00 PM', '3:15 PM', '3:30', 'morning', or 'afternoon'.";
pub const INVALID_AMPM: &str = "I couldn't understand that. Please specify 'AM' or 'PM'.";
pub const PAST_DATE: &str = "That date is in the past. Please select a future date.";
pub const PROCESS_CANCELLED: &str = "Process cancelled.";
pub const BOOKING_PROCESS_CANCELLED: &str = "Booking process cancelled.";
pub const PROVIDE_BOOKING_ID_CANCEL: &str = "Which booking would you like to cancel? Please provide the booking ID.";
pub const PROVIDE_BOOKING_ID_UPDATE: &str = "Which booking would you like to update? Please provide the booking ID.";
pub const PROVIDE_VALID_BOOKING_ID: &str = "Please provide a valid booking ID (a number).";
pub const NO_BOOKINGS: &str = "You don't have any bookings.";
pub const NO_BOOKINGS_TO_UPDATE: &str = "You don't have any bookings to update. Would you like to schedule a new appointment?";
pub const NO_RECENT_BOOKING: &str = "I don't have any recent booking information. Would you like to make a new booking or check your existing bookings?";
pub const CONFLICT_FOLLOW_UP: &str = "Would you like to schedule at a different time? Please answer 'yes' or 'no', or give me a new time.";
pub const NO_TECHNICIANS_FREE: &str = "All of our technicians are busy at that time. What other time would work for you?";
pub const STORE_UNAVAILABLE: &str = "Sorry, I couldn't reach the booking system just now. Please try again.";

const BOOKINGS_LIST_HEADER: &str = "Your bookings:\n\n";

pub fn date_prompt(specialty: Specialty) -> String {
    format!(
        "What date would you like to book the {} for? (e.g., 'tomorrow', 'next Monday', 'July 15')",
        singular(specialty)
    )
}

pub fn time_prompt(flow: &BookingFlow) -> String {
    match flow {
        BookingFlow::New { specialty } => format!(
            "What time would you like to book the {}? (e.g., '3 PM', '3:15 PM', 'morning', 'afternoon')",
            singular(*specialty)
        ),
        BookingFlow::Reschedule { .. } => UPDATE_TIME_PROMPT.to_string(),
    }
}

pub fn ampm_prompt(hour: u32, minute: u32) -> String {
    format!("Is that {hour}:{minute:02} AM or PM? Please specify 'AM' or 'PM'.")
}

pub fn specialty_changed(specialty: Specialty) -> String {
    format!(
        "I've changed your booking to {} {} instead. {}",
        specialty.article(),
        singular(specialty),
        date_prompt(specialty)
    )
}

fn singular(specialty: Specialty) -> String {
    match specialty {
        Specialty::Hvac | Specialty::GeneralRepairs => format!("{specialty} technician"),
        other => other.to_string(),
    }
}

fn plural(specialty: Specialty) -> String {
    format!("{}s", singular(specialty))
}

pub fn technician_options(specialty: Specialty, time: NaiveDateTime, candidates: &[String]) -> String {
    let mut out = format!(
        "For {}, we have the following {} available:\n\n",
        describe_datetime(time),
        plural(specialty)
    );
    for (idx, name) in candidates.iter().enumerate() {
        out.push_str(&format!("{}. {name}\n", idx + 1));
    }
    out.push_str("\nPlease select a technician by number or name.");
    out
}

pub fn selection_out_of_range(count: usize) -> String {
    format!("Please select a valid number between 1 and {count}.")
}

pub fn technician_not_found(text: &str, count: usize) -> String {
    format!(
        "I couldn't find a technician matching '{text}'. Please select a technician by number (1-{count}) or name."
    )
}

pub fn booking_confirmed(booking_id: i64, technician: &str, specialty: Specialty, time: NaiveDateTime) -> String {
    format!(
        "Your booking with {technician} ({specialty}) is confirmed for {}, {} at {}. Your booking ID is {booking_id}.",
        time.format("%A"),
        time.format("%B %d"),
        describe_time(time.time())
    )
}

pub fn conflict_detected(subject: &str, alternatives: &[NaiveDateTime]) -> String {
    let mut out = format!(
        "There is already a booking at {subject}. Would you like to schedule at a different time?"
    );
    if !alternatives.is_empty() {
        let times: Vec<String> = alternatives.iter().map(|t| describe_time(t.time())).collect();
        out.push_str(&format!(" Nearby free times: {}.", times.join(", ")));
    }
    out
}

pub fn different_time_prompt(flow: &BookingFlow) -> String {
    match flow {
        BookingFlow::New { specialty } => {
            format!("Please provide a different time for your {specialty} appointment.")
        }
        BookingFlow::Reschedule { .. } => UPDATE_TIME_PROMPT.to_string(),
    }
}

pub fn no_booking_found(booking_id: i64) -> String {
    format!("No booking found with ID {booking_id}.")
}

pub fn update_not_found(booking_id: i64) -> String {
    format!("I couldn't find booking {booking_id}. Please try again.")
}

pub fn booking_cancelled(booking: &Booking) -> String {
    format!(
        "Your booking with {} for {} has been cancelled.",
        booking.technician_name,
        describe_datetime(booking.booking_time)
    )
}

pub fn update_booking_prompt(booking: &Booking) -> String {
    format!(
        "You're updating your booking with {} ({}) currently scheduled for {}. {UPDATE_DATE_PROMPT}",
        booking.technician_name,
        booking.specialty,
        describe_datetime(booking.booking_time)
    )
}

pub fn booking_updated(before: &Booking, after: &Booking) -> String {
    format!(
        "Your booking with {} has been updated from {} at {} to {} at {}.",
        after.technician_name,
        describe_date(before.booking_time.date()),
        describe_time(before.booking_time.time()),
        describe_date(after.booking_time.date()),
        describe_time(after.booking_time.time())
    )
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "Booking #{}: {} with {} at {}",
        booking.id,
        booking.specialty,
        booking.technician_name,
        describe_datetime(booking.booking_time)
    )
}

pub fn booking_list(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return NO_BOOKINGS.to_string();
    }
    let lines: Vec<String> = bookings.iter().map(booking_line).collect();
    format!("{BOOKINGS_LIST_HEADER}{}", lines.join("\n"))
}

pub fn most_recent_booking(booking: &Booking) -> String {
    format!(
        "Your most recent booking (ID: {}) is with {} ({}) on {}.",
        booking.id,
        booking.technician_name,
        booking.specialty,
        describe_datetime(booking.booking_time)
    )
}

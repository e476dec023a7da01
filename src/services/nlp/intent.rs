use once_cell::sync::Lazy;
use regex::Regex;

use super::vocabulary::{
    contains_any, contains_term, has_digit, normalize, BOOKING_KEYWORDS,
    BOOKING_PLURAL_KEYWORDS, BOOKING_REFERENCE_KEYWORDS, CANCEL_KEYWORDS, GREETING_KEYWORDS,
    ID_KEYWORDS, INQUIRY_KEYWORDS, LIST_BOOKINGS_EXACT_MATCHES, LIST_KEYWORDS, UPDATE_COMMANDS,
    UPDATE_KEYWORDS,
};
use crate::models::Intent;

static UPDATE_WITH_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:change|update|reschedule|modify)\b.*\b(?:booking|appointment)s?\b.*\b(?:to|for|at|on)\b.*\S",
    )
    .unwrap()
});

static SPECIFIC_BOOKING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:booking|appointment)\s*(?:#|number|no\.?|id)?\s*#?(\d+)\b").unwrap()
});

// rules overlap by keyword, first match wins
pub fn classify(text: &str) -> Intent {
    let text = normalize(text);

    if is_update_with_time(&text) {
        Intent::UpdateRequest
    } else if is_list_request(&text) {
        Intent::ListBookings
    } else if is_cancellation_request(&text) {
        Intent::CancellationRequest
    } else if is_update_request(&text) {
        Intent::UpdateRequest
    } else if is_booking_id_inquiry(&text) {
        Intent::BookingIdInquiry
    } else if is_specific_booking_inquiry(&text) {
        Intent::SpecificBookingInquiry
    } else if is_greeting(&text) {
        Intent::Greeting
    } else if is_booking_request(&text) {
        Intent::BookingRequest
    } else {
        Intent::Unclear
    }
}

pub fn is_update_with_time(text: &str) -> bool {
    UPDATE_WITH_TIME.is_match(text)
}

pub fn is_list_request(text: &str) -> bool {
    if contains_any(text, CANCEL_KEYWORDS) || contains_any(text, UPDATE_KEYWORDS) {
        return false;
    }
    if contains_any(text, LIST_BOOKINGS_EXACT_MATCHES) {
        return true;
    }
    let mentions_bookings = contains_any(text, BOOKING_REFERENCE_KEYWORDS);
    let listing = contains_any(text, LIST_KEYWORDS) && mentions_bookings && !has_digit(text);
    let owned_plural = contains_any(text, &["my", "all", "any"])
        && contains_any(text, BOOKING_PLURAL_KEYWORDS);
    listing || owned_plural
}

pub fn is_cancellation_request(text: &str) -> bool {
    contains_any(text, CANCEL_KEYWORDS)
        && (contains_any(text, BOOKING_REFERENCE_KEYWORDS)
            || contains_term(text, "id")
            || has_digit(text))
}

pub fn is_update_request(text: &str) -> bool {
    let with_reference =
        contains_any(text, UPDATE_KEYWORDS) && contains_any(text, BOOKING_REFERENCE_KEYWORDS);
    with_reference || is_update_command(text)
}

pub fn is_update_command(text: &str) -> bool {
    contains_any(text, UPDATE_COMMANDS)
}

pub fn is_booking_id_inquiry(text: &str) -> bool {
    (contains_any(text, INQUIRY_KEYWORDS) && contains_any(text, ID_KEYWORDS))
        || contains_term(text, "booking id")
}

pub fn is_specific_booking_inquiry(text: &str) -> bool {
    SPECIFIC_BOOKING.is_match(text)
}

pub fn is_greeting(text: &str) -> bool {
    contains_any(text, GREETING_KEYWORDS)
}

pub fn is_booking_request(text: &str) -> bool {
    contains_any(text, BOOKING_KEYWORDS)
}

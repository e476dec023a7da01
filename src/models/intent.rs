use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    BookingRequest,
    ListBookings,
    CancellationRequest,
    UpdateRequest,
    BookingIdInquiry,
    SpecificBookingInquiry,
    Unclear,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::BookingRequest => "booking_request",
            Intent::ListBookings => "list_bookings",
            Intent::CancellationRequest => "cancellation_request",
            Intent::UpdateRequest => "update_request",
            Intent::BookingIdInquiry => "booking_id_inquiry",
            Intent::SpecificBookingInquiry => "specific_booking_inquiry",
            Intent::Unclear => "unclear",
        }
    }
}

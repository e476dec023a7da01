pub mod booking;
pub mod dialogue;
pub mod intent;
pub mod specialty;

pub use booking::{Booking, BookingUpdate, NewBooking, BOOKING_DURATION_MINUTES};
pub use dialogue::{
    create_default_context, reset_context, BookingFlow, ContextField, DialogueContext,
    DialogueState, LastBooking,
};
pub use intent::Intent;
pub use specialty::Specialty;

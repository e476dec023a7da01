pub mod clock;
pub mod conflict;
pub mod conversation;
pub mod nlp;
pub mod session;
pub mod technician;

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

pub use models::{create_default_context, reset_context, DialogueContext};
pub use services::conversation::{process_input, DialogueOrchestrator};

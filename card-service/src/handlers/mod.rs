//! HTTP handlers for the card service.

pub mod extract;
pub mod health;

pub use extract::extract_card;
pub use health::{health_check, metrics_endpoint, not_found};

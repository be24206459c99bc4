//! API endpoint handlers.
//!
//! Handlers validate input, then hand blocking work to the processor
//! or the repositories through `ApiContext::blocking`.

pub mod alerts;
pub mod health;
pub mod patients;
pub mod predictions;

//! Outbound message channel implementations.

pub mod twilio;

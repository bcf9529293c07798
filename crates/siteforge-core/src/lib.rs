//! Business logic for Siteforge.
//!
//! The conversation state machine, prompt builder, response parser, site
//! packager, and notification dispatcher live here, together with the trait
//! definitions (ports) the infrastructure layer implements. This crate never
//! depends on any specific storage, HTTP, or provider technology.

pub mod conversation;
pub mod deploy;
pub mod generate;
pub mod notify;
pub mod outbound;
pub mod packager;
pub mod parser;
pub mod prompt;
pub mod repository;
pub mod storage;

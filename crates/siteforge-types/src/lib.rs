//! Shared domain types for Siteforge.
//!
//! This crate contains the core domain types used across the Siteforge
//! platform: User, Project, PromptRecord, the conversation state enum, the
//! inbound message record, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod message;
pub mod project;
pub mod prompt;
pub mod site;
pub mod user;

//! Conversation state machine.
//!
//! One inbound message plus the persisted user/project state in, zero or
//! more persistence mutations and outbound messages out, and -- inside an
//! active project -- the generation/packaging/deploy pipeline. Everything a
//! turn can do is decided here; transports and adapters stay dumb.

mod locks;
pub mod replies;
mod service;

pub use service::{ConversationService, TurnOutcome};

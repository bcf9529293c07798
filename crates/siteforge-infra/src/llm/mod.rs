//! Generation provider implementations.

pub mod gemini;

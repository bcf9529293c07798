//! Deploy trigger implementations.

pub mod vercel;

//! Infrastructure implementations for Siteforge.
//!
//! Concrete adapters behind the port traits defined in siteforge-core:
//! SQLite persistence, the Gemini generation client, the Twilio WhatsApp
//! sender, Supabase object storage, and the Vercel deploy-hook client, plus
//! the config loader.

pub mod config;
pub mod deploy;
pub mod llm;
pub mod messaging;
pub mod sqlite;
pub mod storage;

//! Ties a content-management platform's records to a managed translation
//! service: quote submission, launch, multi-language progress tracking, and
//! the webhook that writes finished translations back.

pub mod api;
pub mod cache;
pub mod callback;
pub mod config;
pub mod content;
pub mod errors;
pub mod languages;
pub mod progress;
pub mod security;
pub mod server;
pub mod store;
pub mod submission;

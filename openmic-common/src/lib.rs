//! # OpenMic Common Library
//!
//! Shared code for the OpenMic karaoke-request backend:
//! - Text normalization (search canonicalization, display cleanup)
//! - Database models (songs, requests) and enum types
//! - Schema initialization
//! - Queue event types consumed by the realtime notifier

pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod normalize;

pub use error::{Error, Result};

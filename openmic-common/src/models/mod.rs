//! Data models for the song catalog and the request queue

pub mod request;
pub mod song;

pub use request::*;
pub use song::*;

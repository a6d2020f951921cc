//! Live queue updates over WebSocket.

pub mod notifier;
pub mod socket;

pub use notifier::Notifier;

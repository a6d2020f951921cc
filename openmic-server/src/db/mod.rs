//! Database queries for the API server.

pub mod catalog;
pub mod requests;

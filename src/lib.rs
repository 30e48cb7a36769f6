//! Agri-Weather: crop advisories from live weather observations.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry points (server, offline trainer, chat bot).

pub mod advisory;
pub mod bot;
pub mod config;
pub mod logging;
pub mod server;
pub mod training;
pub mod types;
pub mod weather;

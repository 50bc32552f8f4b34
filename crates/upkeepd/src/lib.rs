//! Upkeep Daemon library - HTTP surface over the maintenance engine.

pub mod error;
pub mod metrics;
pub mod routes;
pub mod seed;
pub mod server;

pub use server::{app, AppState, Clock};

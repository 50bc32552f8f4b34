//! Upkeep CLI library - talks to upkeepd over HTTP.

pub mod cli;
pub mod client;
pub mod commands;
pub mod display;

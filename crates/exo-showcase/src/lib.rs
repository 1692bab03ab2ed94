#![forbid(unsafe_code)]

//! Headless showcase for the exoplanet narrative.
//!
//! Loads a catalog, replays an interaction script through the message
//! loop and prints every rendered frame as text or JSON lines. The
//! `headers` command compares the headers of two catalog exports.

pub mod cli;
pub mod headers;
pub mod render;
pub mod runner;
pub mod script;
pub mod settings;

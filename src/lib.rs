//! Task Board Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod filters;
pub mod format;
pub mod logging;
pub mod page;
pub mod store;
pub mod types;

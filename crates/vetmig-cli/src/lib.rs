//! CLI library components for the migration driver.

pub mod cli;
pub mod clients;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;

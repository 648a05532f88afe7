//! Core types and shared functionality for hueguide.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration
//! - The per-pipeline search cache and conversation history

pub mod cache;
pub mod config;
pub mod error;
pub mod history;

pub use cache::QueryCache;
pub use config::{AppConfig, ConfigError, Strategy};
pub use error::Error;
pub use history::{HistoryTurn, HistoryWindow};

//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - Persistence: SQLite and in-memory world record stores
//! - HTTP: REST API routes
//! - Scheduler: Debounced re-analysis after relationship changes
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod persistence;
pub mod scheduler;
pub mod state;

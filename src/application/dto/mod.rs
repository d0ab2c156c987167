//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP adapter can
//! serialize/deserialize without exposing typed ids on the wire.

pub mod recommendation;
pub mod world_records;

pub use recommendation::*;
pub use world_records::*;

//! Application layer - Use cases over the domain
//!
//! This layer contains:
//! - Ports: contracts the application requires from storage
//! - Services: relationship inference and the apply/dismiss workflow
//! - DTOs: request/response shapes for the HTTP surface

pub mod dto;
pub mod ports;
pub mod services;

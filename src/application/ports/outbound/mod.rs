//! Outbound ports - Interfaces that the application requires from external systems

mod world_record_port;

pub use world_record_port::WorldRecordPort;

pub mod actuator;
pub mod config;
pub mod console;
pub mod mapping;
pub mod mqtt;
pub mod profile;
pub mod telemetry;

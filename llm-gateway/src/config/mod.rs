//! Configuration types for the completion gateway.

pub mod completion_config;

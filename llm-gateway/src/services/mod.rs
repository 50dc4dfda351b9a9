//! Completion service clients.

pub mod azure_openai_service;

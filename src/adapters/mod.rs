// Adapters layer: concrete implementations for external systems (HTTP APIs, credential storage).

pub mod anthropic;
pub mod credentials;
pub mod joshua_project;

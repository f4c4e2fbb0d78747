pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    anthropic::AnthropicClient, credentials::FileCredentialStore,
    joshua_project::JoshuaProjectClient,
};
pub use crate::config::LookupConfig;
pub use crate::core::{countries::CountryResolver, engine::LookupEngine};
pub use crate::domain::model::{
    Confidence, CredentialKind, Credentials, LookupOutcome, MatchResult, PeopleGroupCandidate,
    SearchQuery,
};
pub use crate::utils::error::{LookupError, Result};

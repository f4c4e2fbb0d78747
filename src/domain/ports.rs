use crate::domain::model::{CredentialKind, Credentials, PeopleGroupCandidate};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Synchronous credential lookup, consulted right before each network call.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self, kind: CredentialKind) -> Option<String>;
}

impl CredentialProvider for Credentials {
    fn credential(&self, kind: CredentialKind) -> Option<String> {
        self.get(kind).map(str::to_string)
    }
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for Arc<T> {
    fn credential(&self, kind: CredentialKind) -> Option<String> {
        (**self).credential(kind)
    }
}

pub trait ConfigProvider: Send + Sync {
    fn demographic_base_url(&self) -> &str;
    fn demographic_timeout(&self) -> Duration;
    fn model_base_url(&self) -> &str;
    fn model_name(&self) -> &str;
    fn max_tokens(&self) -> u32;
    fn model_timeout(&self) -> Duration;
}

#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(
        &self,
        reported_name: &str,
        country: &str,
    ) -> Result<Vec<PeopleGroupCandidate>>;
}

/// A single-shot completion: one system instruction, one user message, one reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

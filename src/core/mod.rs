pub mod candidates;
pub mod countries;
pub mod engine;
pub mod resolver;

pub use crate::domain::model::{LookupOutcome, MatchResult, PeopleGroupCandidate, SearchQuery};
pub use crate::domain::ports::{CandidateSource, ConfigProvider, CredentialProvider, LanguageModel};
pub use crate::utils::error::Result;

use crate::core::resolver::MatchResolver;
use crate::domain::model::{LookupOutcome, PeopleGroupCandidate, SearchQuery};
use crate::domain::ports::{CandidateSource, LanguageModel};
use crate::utils::error::{LookupError, Result};

/// Runs one search round: fetch candidates, then let the model pick one.
pub struct LookupEngine<S: CandidateSource, M: LanguageModel> {
    source: S,
    resolver: MatchResolver<M>,
}

impl<S: CandidateSource, M: LanguageModel> LookupEngine<S, M> {
    pub fn new(source: S, model: M) -> Self {
        Self {
            source,
            resolver: MatchResolver::new(model),
        }
    }

    /// Fetch only; an empty list is returned as-is.
    pub async fn candidates(&self, query: &SearchQuery) -> Result<Vec<PeopleGroupCandidate>> {
        tracing::info!("Searching Joshua Project...");
        self.source
            .fetch_candidates(&query.reported_name, query.country_or_empty())
            .await
    }

    pub async fn run(&self, query: &SearchQuery) -> Result<LookupOutcome> {
        let candidates = self.candidates(query).await?;

        if candidates.is_empty() {
            return Err(LookupError::EmptyResultError {
                reported_name: query.reported_name.clone(),
            });
        }

        tracing::info!(
            "Found {} candidates. Asking Claude to find best match...",
            candidates.len()
        );

        let result = self.resolver.resolve(query, &candidates).await?;

        tracing::info!(
            "Matched '{}' to {} ({} confidence)",
            query.reported_name,
            result.matched_name,
            result.confidence
        );

        Ok(LookupOutcome {
            reported_name: query.reported_name.clone(),
            candidate_count: candidates.len(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Confidence;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct StubSource {
        candidates: Vec<PeopleGroupCandidate>,
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl CandidateSource for StubSource {
        async fn fetch_candidates(
            &self,
            reported_name: &str,
            country: &str,
        ) -> Result<Vec<PeopleGroupCandidate>> {
            self.seen
                .lock()
                .unwrap()
                .push((reported_name.to_string(), country.to_string()));
            Ok(self.candidates.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CandidateSource for FailingSource {
        async fn fetch_candidates(&self, _: &str, _: &str) -> Result<Vec<PeopleGroupCandidate>> {
            Err(LookupError::UpstreamError {
                service: "Joshua Project".to_string(),
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct CountingModel {
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn candidate(id: &str, name: &str) -> PeopleGroupCandidate {
        PeopleGroupCandidate {
            people_id3: id.to_string(),
            name_in_country: name.to_string(),
            country: "Afghanistan".to_string(),
            jp_scale: 1,
            frontier: "Y".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_zero_candidates_is_user_facing_error_and_skips_model() {
        let model = CountingModel::default();
        let calls = model.calls.clone();
        let engine = LookupEngine::new(StubSource::default(), model);

        let query = SearchQuery::new("Zzyzx", None, None, None).unwrap();
        let err = engine.run(&query).await.unwrap_err();

        assert!(matches!(err, LookupError::EmptyResultError { .. }));
        assert!(err
            .user_friendly_message()
            .contains("Try a shorter or different name"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_resolves_against_fetched_candidates() {
        let source = StubSource {
            candidates: vec![candidate("105780", "Hazara"), candidate("1", "Other")],
            ..Default::default()
        };
        let seen = source.seen.clone();
        let model = CountingModel {
            reply: "MATCH: Hazara\nCONFIDENCE: High".to_string(),
            ..Default::default()
        };
        let engine = LookupEngine::new(source, model);

        let query = SearchQuery::new(
            "Hazara people",
            Some("Afghanistan".to_string()),
            None,
            None,
        )
        .unwrap();
        let outcome = engine.run(&query).await.unwrap();

        assert_eq!(outcome.candidate_count, 2);
        assert_eq!(outcome.reported_name, "Hazara people");
        assert_eq!(outcome.result.people_id3, "105780");
        assert_eq!(outcome.result.confidence, Confidence::High);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[("Hazara people".to_string(), "Afghanistan".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let model = CountingModel::default();
        let calls = model.calls.clone();
        let engine = LookupEngine::new(FailingSource, model);

        let query = SearchQuery::new("Hazara", None, None, None).unwrap();
        let err = engine.run(&query).await.unwrap_err();

        assert_eq!(err.to_string(), "Joshua Project API error 500: boom");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

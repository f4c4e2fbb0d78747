use crate::core::candidates::CandidateQuery;
use crate::core::countries::CountryResolver;
use crate::domain::model::{CredentialKind, PeopleGroupCandidate};
use crate::domain::ports::{CandidateSource, ConfigProvider, CredentialProvider};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct JoshuaProjectClient<K: CredentialProvider> {
    client: Client,
    base_url: String,
    credentials: K,
    countries: CountryResolver,
}

impl<K: CredentialProvider> JoshuaProjectClient<K> {
    pub fn new<C: ConfigProvider>(
        config: &C,
        credentials: K,
        countries: CountryResolver,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.demographic_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.demographic_base_url().to_string(),
            credentials,
            countries,
        })
    }
}

#[async_trait]
impl<K: CredentialProvider> CandidateSource for JoshuaProjectClient<K> {
    async fn fetch_candidates(
        &self,
        reported_name: &str,
        country: &str,
    ) -> Result<Vec<PeopleGroupCandidate>> {
        let kind = CredentialKind::JoshuaProject;
        let api_key = self
            .credentials
            .credential(kind)
            .ok_or_else(|| LookupError::auth(kind.service_name()))?;

        let query = CandidateQuery::build(reported_name, country, &self.countries);
        let url = query.to_url(&self.base_url, &api_key)?;

        tracing::debug!(
            "Querying Joshua Project: name_search={:?}, countries={:?}",
            query.name_search,
            query.country_code
        );

        let response = self
            .client
            .get(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Joshua Project response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamError {
                service: kind.service_name().to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let json_data: serde_json::Value = response.json().await?;

        let candidates = match json_data {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value::<PeopleGroupCandidate>)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            other => {
                tracing::warn!(
                    "Joshua Project returned a non-array body ({}), treating as no matches",
                    json_kind(&other)
                );
                Vec::new()
            }
        };

        tracing::debug!("Fetched {} candidates", candidates.len());
        Ok(candidates)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

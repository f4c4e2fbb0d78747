use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::utils::error::{LookupError, Result};

/// One people-group record as returned by the Joshua Project API.
///
/// The API is loose about types: `PeopleID3` and `JPScale` arrive as numbers
/// or strings depending on the endpoint version, and any field may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleGroupCandidate {
    #[serde(rename = "PeopleID3", default, deserialize_with = "lenient_string")]
    pub people_id3: String,
    #[serde(rename = "PeopNameInCountry", default, deserialize_with = "lenient_string")]
    pub name_in_country: String,
    #[serde(
        rename = "PeopNameAcrossCountries",
        default,
        deserialize_with = "lenient_string"
    )]
    pub name_across_countries: String,
    #[serde(rename = "Ctry", default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(rename = "ROG3", default, deserialize_with = "lenient_string")]
    pub rog3: String,
    #[serde(rename = "PrimaryReligion", default, deserialize_with = "lenient_string")]
    pub primary_religion: String,
    #[serde(
        rename = "PrimaryLanguageName",
        default,
        deserialize_with = "lenient_string"
    )]
    pub primary_language: String,
    #[serde(rename = "JPScale", default, deserialize_with = "lenient_scale")]
    pub jp_scale: u8,
    #[serde(rename = "Frontier", default, deserialize_with = "lenient_string")]
    pub frontier: String,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_scale<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Exact, case-sensitive match; anything else is `None`.
    pub fn parse_exact(raw: &str) -> Option<Self> {
        match raw {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_name: String,
    pub people_id3: String,
    pub country: String,
    pub language: String,
    pub religion: String,
    pub jp_scale: u8,
    pub frontier: String,
    pub confidence: Confidence,
    pub reasoning: String,
}

/// User input for one search round. Optional fields are trimmed and dropped
/// when blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub reported_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub religion: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchQuery {
    pub fn new(
        reported_name: &str,
        country: Option<String>,
        city: Option<String>,
        religion: Option<String>,
    ) -> Result<Self> {
        let reported_name = reported_name.trim();
        if reported_name.is_empty() {
            return Err(LookupError::validation("Reported name cannot be empty"));
        }

        Ok(Self {
            reported_name: reported_name.to_string(),
            country: non_blank(country),
            city: non_blank(city),
            religion: non_blank(religion),
        })
    }

    pub fn country_or_empty(&self) -> &str {
        self.country.as_deref().unwrap_or("")
    }
}

/// The two credentials the tool needs; each is looked up by its fixed storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    JoshuaProject,
    Anthropic,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 2] = [CredentialKind::JoshuaProject, CredentialKind::Anthropic];

    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::JoshuaProject => "jp_api_key",
            Self::Anthropic => "anthropic_api_key",
        }
    }

    pub fn service_name(&self) -> &'static str {
        match self {
            Self::JoshuaProject => "Joshua Project",
            Self::Anthropic => "Anthropic",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jp_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
}

impl Credentials {
    pub fn new(jp_api_key: &str, anthropic_api_key: &str) -> Self {
        let mut credentials = Self::default();
        credentials.set(CredentialKind::JoshuaProject, jp_api_key);
        credentials.set(CredentialKind::Anthropic, anthropic_api_key);
        credentials
    }

    /// Blank values count as absent.
    pub fn get(&self, kind: CredentialKind) -> Option<&str> {
        let slot = match kind {
            CredentialKind::JoshuaProject => &self.jp_api_key,
            CredentialKind::Anthropic => &self.anthropic_api_key,
        };
        slot.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, kind: CredentialKind, value: &str) {
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match kind {
            CredentialKind::JoshuaProject => self.jp_api_key = value,
            CredentialKind::Anthropic => self.anthropic_api_key = value,
        }
    }

    pub fn is_complete(&self) -> bool {
        CredentialKind::ALL.iter().all(|k| self.get(*k).is_some())
    }
}

/// What one successful lookup hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupOutcome {
    pub reported_name: String,
    pub candidate_count: usize,
    pub result: MatchResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_deserializes_numeric_and_null_fields() {
        let json = serde_json::json!({
            "PeopleID3": 105780,
            "PeopNameInCountry": "Hazara",
            "PeopNameAcrossCountries": null,
            "Ctry": "Afghanistan",
            "ROG3": "AF",
            "PrimaryReligion": "Islam",
            "PrimaryLanguageName": "Hazaragi",
            "JPScale": "1",
            "Frontier": "Y"
        });

        let candidate: PeopleGroupCandidate = serde_json::from_value(json).unwrap();

        assert_eq!(candidate.people_id3, "105780");
        assert_eq!(candidate.name_across_countries, "");
        assert_eq!(candidate.jp_scale, 1);
        assert_eq!(candidate.frontier, "Y");
    }

    #[test]
    fn test_candidate_missing_fields_default() {
        let candidate: PeopleGroupCandidate =
            serde_json::from_value(serde_json::json!({"PeopleID3": "1"})).unwrap();
        assert_eq!(candidate.people_id3, "1");
        assert_eq!(candidate.jp_scale, 0);
        assert!(candidate.frontier.is_empty());
    }

    #[test]
    fn test_confidence_parse_is_case_sensitive() {
        assert_eq!(Confidence::parse_exact("High"), Some(Confidence::High));
        assert_eq!(Confidence::parse_exact("high"), None);
        assert_eq!(Confidence::parse_exact("Medium "), None);
    }

    #[test]
    fn test_search_query_requires_name() {
        assert!(SearchQuery::new("   ", None, None, None).is_err());

        let query = SearchQuery::new(
            "  Hazara ",
            Some(" Afghanistan ".to_string()),
            Some("   ".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(query.reported_name, "Hazara");
        assert_eq!(query.country.as_deref(), Some("Afghanistan"));
        assert_eq!(query.city, None);
    }

    #[test]
    fn test_credentials_treat_blank_as_absent() {
        let mut credentials = Credentials::new(" jp-key ", "   ");
        assert_eq!(credentials.get(CredentialKind::JoshuaProject), Some("jp-key"));
        assert_eq!(credentials.get(CredentialKind::Anthropic), None);
        assert!(!credentials.is_complete());

        credentials.set(CredentialKind::Anthropic, "sk-ant");
        assert!(credentials.is_complete());
    }
}

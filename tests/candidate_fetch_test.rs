use httpmock::prelude::*;
use pg_lookup::domain::ports::CandidateSource;
use pg_lookup::{CountryResolver, Credentials, JoshuaProjectClient, LookupConfig, LookupError};

const FIELDS: &str = "PeopleID3|PeopNameInCountry|PeopNameAcrossCountries|Ctry|ROG3|PrimaryReligion|PrimaryLanguageName|JPScale|Frontier";

fn client_for(
    server: &MockServer,
    credentials: Credentials,
) -> JoshuaProjectClient<Credentials> {
    let mut config = LookupConfig::default();
    config.demographic.base_url = server.base_url();
    JoshuaProjectClient::new(&config, credentials, CountryResolver::new()).unwrap()
}

fn hazara_json() -> serde_json::Value {
    serde_json::json!([
        {
            "PeopleID3": "105780",
            "PeopNameInCountry": "Hazara",
            "PeopNameAcrossCountries": "Hazara",
            "Ctry": "Afghanistan",
            "ROG3": "AF",
            "PrimaryReligion": "Islam",
            "PrimaryLanguageName": "Hazaragi",
            "JPScale": 1,
            "Frontier": "Y"
        }
    ])
}

#[tokio::test]
async fn test_fetch_sends_first_word_and_country_code() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/people_groups.json")
            .header("x-requested-with", "XMLHttpRequest")
            .query_param("api_key", "jp-secret")
            .query_param("limit", "50")
            .query_param("fields", FIELDS)
            .query_param("name_search", "Northern")
            .query_param("countries", "PAK");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(hazara_json());
    });

    let client = client_for(&server, Credentials::new("jp-secret", "ant"));
    let candidates = client
        .fetch_candidates("Northern Pashtun", "Pakistan")
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].people_id3, "105780");
    assert_eq!(candidates[0].primary_language, "Hazaragi");
    assert_eq!(candidates[0].jp_scale, 1);
}

#[tokio::test]
async fn test_unknown_country_still_searches() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/people_groups.json")
            .query_param("name_search", "Hazara");
        then.status(200).json_body(hazara_json());
    });

    let client = client_for(&server, Credentials::new("jp", "ant"));
    let candidates = client.fetch_candidates("Hazara", "Atlantis").await.unwrap();

    api_mock.assert();
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn test_zero_matches_is_empty_not_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/people_groups.json");
        then.status(200).json_body(serde_json::json!([]));
    });

    let client = client_for(&server, Credentials::new("jp", "ant"));
    let candidates = client.fetch_candidates("Zzyzx", "").await.unwrap();

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_non_array_body_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/people_groups.json");
        then.status(200)
            .json_body(serde_json::json!({"status": "no results"}));
    });

    let client = client_for(&server, Credentials::new("jp", "ant"));
    assert!(client.fetch_candidates("Hazara", "").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_raw_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/people_groups.json");
        then.status(403).body("Invalid api_key");
    });

    let client = client_for(&server, Credentials::new("bad", "ant"));
    let err = client.fetch_candidates("Hazara", "").await.unwrap_err();

    match &err {
        LookupError::UpstreamError {
            status, message, ..
        } => {
            assert_eq!(*status, 403);
            assert_eq!(message, "Invalid api_key");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Joshua Project API error 403: Invalid api_key");
}

#[tokio::test]
async fn test_missing_key_fails_before_any_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/v1/people_groups.json");
        then.status(200).json_body(serde_json::json!([]));
    });

    let client = client_for(&server, Credentials::default());
    let err = client.fetch_candidates("Hazara", "").await.unwrap_err();

    assert!(matches!(err, LookupError::AuthError { .. }));
    assert_eq!(err.to_string(), "Joshua Project API key not set.");
    api_mock.assert_hits(0);
}

#[tokio::test]
async fn test_network_failure_does_not_echo_api_key() {
    let mut config = LookupConfig::default();
    config.demographic.base_url = "http://127.0.0.1:1".to_string();
    let client = JoshuaProjectClient::new(
        &config,
        Credentials::new("jp-very-secret", "ant"),
        CountryResolver::new(),
    )
    .unwrap();

    let err = client.fetch_candidates("Hazara", "").await.unwrap_err();

    assert!(matches!(err, LookupError::HttpError(_)));
    assert!(!err.to_string().contains("jp-very-secret"));
    assert!(!format!("{:?}", err).contains("jp-very-secret"));
    assert!(!err.user_friendly_message().contains("jp-very-secret"));
}

use crate::core::countries::CountryResolver;
use crate::utils::error::Result;
use url::Url;

pub const PEOPLE_GROUPS_PATH: &str = "/v1/people_groups.json";
pub const RESULT_LIMIT: u32 = 50;
pub const CANDIDATE_FIELDS: &[&str] = &[
    "PeopleID3",
    "PeopNameInCountry",
    "PeopNameAcrossCountries",
    "Ctry",
    "ROG3",
    "PrimaryReligion",
    "PrimaryLanguageName",
    "JPScale",
    "Frontier",
];

/// Query parameters for one people-group search, before the API key is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    pub name_search: Option<String>,
    pub country_code: Option<String>,
}

impl CandidateQuery {
    /// Only the first word of the reported name is searched, so "Northern
    /// Pashtun" becomes `name_search=Northern`. An unresolvable country drops
    /// the country filter instead of failing.
    pub fn build(reported_name: &str, country: &str, countries: &CountryResolver) -> Self {
        let name_search = reported_name.split_whitespace().next().map(str::to_string);

        let country_code = if country.trim().is_empty() {
            None
        } else {
            let code = countries.resolve(country);
            if code.is_none() {
                tracing::debug!("Country '{}' not recognised, searching without it", country.trim());
            }
            code
        };

        Self {
            name_search,
            country_code,
        }
    }

    /// Full request URL, parameters in the order the API documents them.
    pub fn to_url(&self, base_url: &str, api_key: &str) -> Result<Url> {
        let mut url = Url::parse(base_url.trim_end_matches('/'))?;
        url.set_path(&format!(
            "{}{}",
            url.path().trim_end_matches('/'),
            PEOPLE_GROUPS_PATH
        ));

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("api_key", api_key)
                .append_pair("limit", &RESULT_LIMIT.to_string())
                .append_pair("fields", &CANDIDATE_FIELDS.join("|"));
            if let Some(name) = &self.name_search {
                pairs.append_pair("name_search", name);
            }
            if let Some(code) = &self.country_code {
                pairs.append_pair("countries", code);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_multi_word_name_uses_first_token() {
        let query = CandidateQuery::build("Northern  Pashtun people", "", &CountryResolver::new());
        assert_eq!(query.name_search.as_deref(), Some("Northern"));
    }

    #[test]
    fn test_empty_name_omits_name_search() {
        let query = CandidateQuery::build("   ", "", &CountryResolver::new());
        assert_eq!(query.name_search, None);

        let url = query.to_url("https://api.joshuaproject.net", "k").unwrap();
        assert!(!params(&url).contains_key("name_search"));
    }

    #[test]
    fn test_unknown_country_omits_filter() {
        let query = CandidateQuery::build("Hazara", "Atlantis", &CountryResolver::new());
        assert_eq!(query.country_code, None);

        let url = query.to_url("https://api.joshuaproject.net", "k").unwrap();
        assert!(url.query_pairs().all(|(k, _)| k != "countries"));
    }

    #[test]
    fn test_known_country_adds_filter() {
        let query = CandidateQuery::build("Hazara", " afghanistan ", &CountryResolver::new());
        let url = query.to_url("https://api.joshuaproject.net", "k").unwrap();
        assert_eq!(params(&url).get("countries").map(String::as_str), Some("AFG"));
    }

    #[test]
    fn test_url_shape() {
        let query = CandidateQuery::build("Hazara", "", &CountryResolver::new());
        let url = query
            .to_url("https://api.joshuaproject.net/", "secret")
            .unwrap();

        assert_eq!(url.path(), "/v1/people_groups.json");
        let params = params(&url);
        assert_eq!(params["api_key"], "secret");
        assert_eq!(params["limit"], "50");
        assert_eq!(
            params["fields"],
            "PeopleID3|PeopNameInCountry|PeopNameAcrossCountries|Ctry|ROG3|PrimaryReligion|PrimaryLanguageName|JPScale|Frontier"
        );
        assert_eq!(params["name_search"], "Hazara");
    }

    #[test]
    fn test_base_url_with_prefix_path() {
        let query = CandidateQuery::build("Hazara", "", &CountryResolver::new());
        let url = query.to_url("http://127.0.0.1:8080/proxy", "k").unwrap();
        assert_eq!(url.path(), "/proxy/v1/people_groups.json");
    }
}

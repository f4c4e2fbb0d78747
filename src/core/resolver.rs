//! Match resolution: prompt construction, reply parsing and the fallback chain
//! that fills gaps in the model's answer from the candidate records.
//!
//! The reply is a line-oriented `KEY: value` block. Parsing never fails; a
//! missing or garbled key degrades to the anchor candidate's value and then to
//! a fixed default.

use crate::domain::model::{Confidence, MatchResult, PeopleGroupCandidate, SearchQuery};
use crate::domain::ports::LanguageModel;
use crate::utils::error::{LookupError, Result};
use regex::Regex;

pub const SYSTEM_PROMPT: &str = "You are an expert in global peoples classification for Christian missions work, with deep knowledge of Joshua Project people group data. Your task is to match reported people group names to the correct official Joshua Project record. Be precise and follow the response format exactly.";

const RESPONSE_INSTRUCTIONS: &str = "Based on the reported name and any context provided, identify the single best matching Joshua Project people group.

Respond in exactly this format (replace bracketed values):
MATCH: [exact PeopNameInCountry from candidate list]
PEOPLE_ID3: [PeopleID3 value]
COUNTRY: [country name]
LANGUAGE: [language name]
RELIGION: [religion]
JP_SCALE: [number]
FRONTIER: [Y or N]
CONFIDENCE: [High, Medium, or Low]
REASONING: [one or two sentences explaining why this is the best match]";

pub const UNKNOWN_MATCH: &str = "Unknown";

/// Reply keys in the order the prompt asks for them.
pub const REPLY_KEYS: [&str; 9] = [
    "MATCH",
    "PEOPLE_ID3",
    "COUNTRY",
    "LANGUAGE",
    "RELIGION",
    "JP_SCALE",
    "FRONTIER",
    "CONFIDENCE",
    "REASONING",
];

pub fn build_prompt(query: &SearchQuery, candidates: &[PeopleGroupCandidate]) -> String {
    let context = [
        query.country.as_ref().map(|v| format!("Country: {}", v)),
        query.city.as_ref().map(|v| format!("City/Region: {}", v)),
        query.religion.as_ref().map(|v| format!("Religion: {}", v)),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n");

    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("\nAdditional context:\n{}", context)
    };

    let candidate_list = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}. Name: \"{}\" (also known as \"{}\") | Country: {} | Religion: {} | Language: {} | PeopleID3: {} | JPScale: {} | Frontier: {}",
                i + 1,
                c.name_in_country,
                c.name_across_countries,
                c.country,
                c.primary_religion,
                c.primary_language,
                c.people_id3,
                c.jp_scale,
                c.frontier
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I need to match a reported people group name to its official Joshua Project record.\n\nReported name: \"{}\"\n{}\n\nJoshua Project candidates ({} results):\n{}\n\n{}",
        query.reported_name,
        context_block,
        candidates.len(),
        candidate_list,
        RESPONSE_INSTRUCTIONS
    )
}

/// Raw values pulled out of the reply; empty when the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyFields {
    pub matched_name: String,
    pub people_id3: String,
    pub country: String,
    pub language: String,
    pub religion: String,
    pub jp_scale: String,
    pub frontier: String,
    pub confidence: String,
    pub reasoning: String,
}

/// First line-anchored `KEY: value` occurrence, trimmed.
pub fn extract_field(text: &str, key: &str) -> String {
    Regex::new(&format!(r"(?m)^{}:\s*(.+)$", regex::escape(key)))
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn parse_reply(text: &str) -> ReplyFields {
    let fields = ReplyFields {
        matched_name: extract_field(text, "MATCH"),
        people_id3: extract_field(text, "PEOPLE_ID3"),
        country: extract_field(text, "COUNTRY"),
        language: extract_field(text, "LANGUAGE"),
        religion: extract_field(text, "RELIGION"),
        jp_scale: extract_field(text, "JP_SCALE"),
        frontier: extract_field(text, "FRONTIER"),
        confidence: extract_field(text, "CONFIDENCE"),
        reasoning: extract_field(text, "REASONING"),
    };

    let missing: Vec<&str> = REPLY_KEYS
        .iter()
        .zip(fields.values())
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| *key)
        .collect();
    if !missing.is_empty() {
        tracing::warn!("Model reply is missing {}; falling back to candidate data", missing.join(", "));
    }

    fields
}

impl ReplyFields {
    fn values(&self) -> [&str; 9] {
        [
            self.matched_name.as_str(),
            self.people_id3.as_str(),
            self.country.as_str(),
            self.language.as_str(),
            self.religion.as_str(),
            self.jp_scale.as_str(),
            self.frontier.as_str(),
            self.confidence.as_str(),
            self.reasoning.as_str(),
        ]
    }
}

const SCALE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Anything but a whole number on the 1-5 scale reads as "not supplied".
fn parse_scale(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|v| SCALE_RANGE.contains(v))
}

fn pick(model_value: &str, anchor_value: Option<&str>, default: &str) -> String {
    if !model_value.is_empty() {
        return model_value.to_string();
    }
    anchor_value
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// The first candidate, in fetch order, whose identifier equals the reply's
/// PEOPLE_ID3 or whose in-country name equals the reply's MATCH. Blank reply
/// values never match.
pub fn find_anchor<'a>(
    fields: &ReplyFields,
    candidates: &'a [PeopleGroupCandidate],
) -> Option<&'a PeopleGroupCandidate> {
    candidates.iter().find(|c| {
        (!fields.people_id3.is_empty() && c.people_id3 == fields.people_id3)
            || (!fields.matched_name.is_empty() && c.name_in_country == fields.matched_name)
    })
}

pub fn normalize(fields: &ReplyFields, candidates: &[PeopleGroupCandidate]) -> MatchResult {
    let confidence = Confidence::parse_exact(&fields.confidence).unwrap_or_else(|| {
        if !fields.confidence.is_empty() {
            tracing::warn!("Unrecognised confidence '{}', using Low", fields.confidence);
        }
        Confidence::Low
    });

    let anchor = find_anchor(fields, candidates);
    if anchor.is_none() {
        tracing::warn!("Model answer does not name any candidate; no fallback record available");
    }

    // The identifier must come from this round's candidate set.
    let known_id = !fields.people_id3.is_empty()
        && candidates.iter().any(|c| c.people_id3 == fields.people_id3);
    if !fields.people_id3.is_empty() && !known_id {
        tracing::warn!(
            "Model returned PEOPLE_ID3 {} which is not among the candidates",
            fields.people_id3
        );
    }
    let people_id3 = if known_id {
        fields.people_id3.clone()
    } else {
        anchor.map(|a| a.people_id3.clone()).unwrap_or_default()
    };

    let jp_scale = parse_scale(&fields.jp_scale)
        .or_else(|| anchor.map(|a| a.jp_scale))
        .unwrap_or(0);

    MatchResult {
        matched_name: pick(
            &fields.matched_name,
            anchor.map(|a| a.name_in_country.as_str()),
            UNKNOWN_MATCH,
        ),
        people_id3,
        country: pick(&fields.country, anchor.map(|a| a.country.as_str()), ""),
        language: pick(
            &fields.language,
            anchor.map(|a| a.primary_language.as_str()),
            "",
        ),
        religion: pick(
            &fields.religion,
            anchor.map(|a| a.primary_religion.as_str()),
            "",
        ),
        jp_scale,
        frontier: pick(&fields.frontier, anchor.map(|a| a.frontier.as_str()), ""),
        confidence,
        reasoning: fields.reasoning.clone(),
    }
}

pub struct MatchResolver<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> MatchResolver<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Asks the model to pick one of `candidates` for the query. Never calls
    /// the model with an empty candidate list.
    pub async fn resolve(
        &self,
        query: &SearchQuery,
        candidates: &[PeopleGroupCandidate],
    ) -> Result<MatchResult> {
        if candidates.is_empty() {
            return Err(LookupError::validation(
                "No Joshua Project candidates found to match against.",
            ));
        }

        let prompt = build_prompt(query, candidates);
        tracing::debug!("Prompt is {} bytes for {} candidates", prompt.len(), candidates.len());

        let reply = self.model.complete(SYSTEM_PROMPT, &prompt).await?;
        tracing::debug!("Model reply: {}", reply);

        Ok(normalize(&parse_reply(&reply), candidates))
    }
}

use crate::domain::model::{LookupOutcome, PeopleGroupCandidate};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write as _;

pub const PEOPLE_GROUP_URL: &str = "https://joshuaproject.net/people_groups/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    Tsv,
}

pub fn jp_scale_label(scale: u8) -> &'static str {
    match scale {
        1 | 2 => "Unreached",
        3 => "Minimally Reached",
        4 => "Partially Reached",
        5 => "Significantly Reached",
        _ => "Unknown",
    }
}

pub fn people_group_link(people_id3: &str) -> Option<String> {
    (!people_id3.is_empty()).then(|| format!("{}{}", PEOPLE_GROUP_URL, people_id3))
}

pub fn render_outcome(outcome: &LookupOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => render_delimited(&[OutcomeRow::from(outcome)], b','),
        OutputFormat::Tsv => render_delimited(&[OutcomeRow::from(outcome)], b'\t'),
    }
}

fn render_text(outcome: &LookupOutcome) -> String {
    let r = &outcome.result;
    let mut out = String::new();

    let _ = writeln!(out, "Match Found  [{} Confidence]", r.confidence);
    let _ = writeln!(out, "Reported: \"{}\"", outcome.reported_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "  People group : {}", r.matched_name);
    if !r.people_id3.is_empty() {
        let _ = writeln!(out, "  PeopleID3    : {}", r.people_id3);
    }
    let _ = writeln!(out, "  Country      : {}", or_dash(&r.country));
    let _ = writeln!(out, "  Language     : {}", or_dash(&r.language));
    let _ = writeln!(out, "  Religion     : {}", or_dash(&r.religion));
    if r.jp_scale > 0 {
        let _ = writeln!(
            out,
            "  JP Scale     : {} ({})",
            r.jp_scale,
            jp_scale_label(r.jp_scale)
        );
    } else {
        let _ = writeln!(out, "  JP Scale     : -");
    }
    let frontier = match r.frontier.as_str() {
        "Y" => "Yes",
        "N" => "No",
        "" => "-",
        other => other,
    };
    let _ = writeln!(out, "  Frontier     : {}", frontier);

    if !r.reasoning.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Reasoning: {}", r.reasoning);
    }
    if let Some(link) = people_group_link(&r.people_id3) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", link);
    }
    let _ = write!(
        out,
        "\n({} candidates considered)",
        outcome.candidate_count
    );

    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    reported_name: &'a str,
    matched_name: &'a str,
    people_id3: &'a str,
    country: &'a str,
    language: &'a str,
    religion: &'a str,
    jp_scale: u8,
    frontier: &'a str,
    confidence: &'static str,
    reasoning: &'a str,
    candidate_count: usize,
}

impl<'a> From<&'a LookupOutcome> for OutcomeRow<'a> {
    fn from(outcome: &'a LookupOutcome) -> Self {
        let r = &outcome.result;
        Self {
            reported_name: &outcome.reported_name,
            matched_name: &r.matched_name,
            people_id3: &r.people_id3,
            country: &r.country,
            language: &r.language,
            religion: &r.religion,
            jp_scale: r.jp_scale,
            frontier: &r.frontier,
            confidence: r.confidence.as_str(),
            reasoning: &r.reasoning,
            candidate_count: outcome.candidate_count,
        }
    }
}

fn render_delimited<T: Serialize>(rows: &[T], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

/// Candidate listing for the `candidates` command.
pub fn render_candidates(
    candidates: &[PeopleGroupCandidate],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(candidates)?),
        OutputFormat::Csv => render_delimited(candidates, b','),
        OutputFormat::Tsv => render_delimited(candidates, b'\t'),
        OutputFormat::Text => {
            let mut out = String::new();
            for (i, c) in candidates.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>2}. {} ({}) | {} | {} | {} | PeopleID3 {} | JP Scale {} | Frontier {}",
                    i + 1,
                    c.name_in_country,
                    c.name_across_countries,
                    c.country,
                    c.primary_religion,
                    c.primary_language,
                    c.people_id3,
                    c.jp_scale,
                    or_dash(&c.frontier)
                );
            }
            let _ = write!(out, "{} candidates", candidates.len());
            Ok(out)
        }
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::domain::{Document, Filing, canonical_id, is_accepted_form};

pub const SHORT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilingsPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cik: Option<String>,
    #[serde(default)]
    pub filings: FilingsBlock,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilingsBlock {
    #[serde(default)]
    pub recent: RecentFilings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub report_date: Vec<String>,
    #[serde(default)]
    pub acceptance_date_time: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryPayload {
    #[serde(default)]
    pub directory: DirectoryBlock,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryBlock {
    #[serde(default, rename = "item")]
    pub items: Vec<DirectoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryItem {
    pub name: String,
    #[serde(default)]
    pub size: Option<RawSize>,
    #[serde(default, rename = "last-modified", deserialize_with = "lenient_text")]
    pub last_modified: Option<String>,
}

/// The directory endpoint reports sizes as strings, sometimes empty. Any other
/// shape is kept as `Other` and reads as an unknown size.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

impl RawSize {
    pub fn parse(&self) -> Option<u64> {
        match self {
            RawSize::Number(value) => Some(*value),
            RawSize::Text(value) => value.trim().parse().ok(),
            RawSize::Other(_) => None,
        }
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Some(value),
        _ => None,
    })
}

pub fn to_filings(payload: FilingsPayload) -> Vec<Filing> {
    let recent = payload.filings.recent;
    let mut filings = Vec::new();
    for (index, form) in recent.form.iter().enumerate() {
        if !is_accepted_form(form) {
            continue;
        }
        let Some(raw_id) = recent.accession_number.get(index) else {
            tracing::debug!(index, form = %form, "record without accession number");
            continue;
        };
        filings.push(Filing {
            canonical_id: canonical_id(raw_id),
            raw_id: raw_id.clone(),
            form: form.clone(),
            filing_date: field(&recent.filing_date, index).and_then(parse_short_date),
            report_date: field(&recent.report_date, index).and_then(parse_short_date),
            acceptance_date: field(&recent.acceptance_date_time, index)
                .and_then(parse_acceptance_date),
        });
    }
    filings
}

pub fn to_directory(payload: DirectoryPayload) -> Vec<Document> {
    payload
        .directory
        .items
        .into_iter()
        .map(|item| {
            let mut document = Document::new(item.name);
            document.size = item.size.as_ref().and_then(RawSize::parse);
            document.last_modified = item.last_modified.as_deref().and_then(parse_last_modified);
            document
        })
        .collect()
}

fn field(values: &[String], index: usize) -> Option<&str> {
    values.get(index).map(String::as_str)
}

pub fn parse_short_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, SHORT_DATE_FORMAT).ok()
}

pub fn parse_acceptance_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

pub fn parse_last_modified(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LAST_MODIFIED_FORMAT).ok()
}

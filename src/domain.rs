use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractorError;

pub const ID_SEPARATOR: char = '-';

pub const ACCEPTED_FORM_PREFIXES: &[&str] = &["10-K", "10-Q"];

const AMENDMENT_MARKER: &str = "/A";

static ORGANIZATION_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:CIK)?(\d{1,10})$").expect("valid key regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationKey(String);

impl OrganizationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn padded(&self) -> &str {
        &self.0
    }

    pub fn trimmed(&self) -> &str {
        self.0.trim_start_matches('0')
    }
}

impl fmt::Display for OrganizationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrganizationKey {
    type Err = ExtractorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = ORGANIZATION_KEY
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ExtractorError::InvalidOrganizationKey(value.to_string()))?;
        if digits.chars().all(|ch| ch == '0') {
            return Err(ExtractorError::InvalidOrganizationKey(value.to_string()));
        }
        Ok(Self(format!("{digits:0>10}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: i64,
    pub key: OrganizationKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filing {
    pub canonical_id: String,
    pub raw_id: String,
    pub form: String,
    pub filing_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    pub acceptance_date: Option<DateTime<Utc>>,
}

impl Filing {
    pub fn index_page_name(&self) -> String {
        format!("{}-index.html", self.raw_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub name: String,
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<NaiveDateTime>,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = extension(&name).map(str::to_string);
        Self {
            name,
            extension,
            size: None,
            last_modified: None,
            content: Vec::new(),
        }
    }
}

pub fn canonical_id(raw_id: &str) -> String {
    raw_id.chars().filter(|ch| *ch != ID_SEPARATOR).collect()
}

pub fn extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx..])
}

pub fn is_accepted_form(form: &str) -> bool {
    ACCEPTED_FORM_PREFIXES
        .iter()
        .any(|prefix| form.starts_with(prefix))
        && !form.contains(AMENDMENT_MARKER)
}

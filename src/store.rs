use std::collections::HashSet;

use camino::Utf8Path;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::domain::{Document, Filing, Organization, OrganizationKey};
use crate::error::ExtractorError;
use crate::transform::LAST_MODIFIED_FORMAT;

pub trait MetadataStore {
    fn organizations(&self) -> Result<Vec<Organization>, ExtractorError>;
    fn track_organization(&self, key: &OrganizationKey) -> Result<Organization, ExtractorError>;
    fn known_filing_ids(
        &self,
        organization: &Organization,
    ) -> Result<HashSet<String>, ExtractorError>;
    fn insert_filing(
        &self,
        organization: &Organization,
        filing: &Filing,
        document: &Document,
    ) -> Result<(), ExtractorError>;
    fn summaries(&self) -> Result<Vec<OrganizationSummary>, ExtractorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationSummary {
    pub organization: String,
    pub filings: u64,
    pub latest_filing_date: Option<String>,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Utf8Path) -> Result<Self, ExtractorError> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent.as_std_path())
                    .map_err(|err| ExtractorError::Filesystem(err.to_string()))?;
            }
        }
        let conn = Connection::open(path.as_std_path()).map_err(persist)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, ExtractorError> {
        let conn = Connection::open_in_memory().map_err(persist)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, ExtractorError> {
        setup_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn setup_schema(conn: &Connection) -> Result<(), ExtractorError> {
    conn.pragma_update(None, "foreign_keys", "ON").map_err(persist)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS organization (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            registry_key TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .map_err(persist)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS filing (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            organization_id INTEGER NOT NULL REFERENCES organization(id),
            canonical_id TEXT NOT NULL,
            raw_id TEXT NOT NULL,
            form TEXT NOT NULL,
            document_name TEXT NOT NULL,
            filing_date TEXT,
            report_date TEXT,
            acceptance_date TEXT,
            last_modified TEXT,
            ingested_at TEXT NOT NULL,
            UNIQUE (organization_id, canonical_id)
        )",
        [],
    )
    .map_err(persist)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_filing_organization ON filing(organization_id)",
        [],
    )
    .map_err(persist)?;
    Ok(())
}

impl MetadataStore for SqliteStore {
    fn organizations(&self) -> Result<Vec<Organization>, ExtractorError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, registry_key FROM organization ORDER BY id")
            .map_err(persist)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(persist)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(persist)?;
        rows.into_iter()
            .map(|(id, key)| {
                Ok(Organization {
                    id,
                    key: key.parse()?,
                })
            })
            .collect()
    }

    fn track_organization(&self, key: &OrganizationKey) -> Result<Organization, ExtractorError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO organization (registry_key) VALUES (?1)",
                params![key.as_str()],
            )
            .map_err(persist)?;
        let id: i64 = self
            .conn
            .query_row(
                "SELECT id FROM organization WHERE registry_key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .map_err(persist)?;
        Ok(Organization {
            id,
            key: key.clone(),
        })
    }

    fn known_filing_ids(
        &self,
        organization: &Organization,
    ) -> Result<HashSet<String>, ExtractorError> {
        let mut stmt = self
            .conn
            .prepare("SELECT canonical_id FROM filing WHERE organization_id = ?1")
            .map_err(persist)?;
        let ids = stmt
            .query_map(params![organization.id], |row| row.get::<_, String>(0))
            .map_err(persist)?
            .collect::<Result<HashSet<_>, _>>()
            .map_err(persist)?;
        Ok(ids)
    }

    fn insert_filing(
        &self,
        organization: &Organization,
        filing: &Filing,
        document: &Document,
    ) -> Result<(), ExtractorError> {
        self.conn
            .execute(
                "INSERT INTO filing (
                    organization_id,
                    canonical_id,
                    raw_id,
                    form,
                    document_name,
                    filing_date,
                    report_date,
                    acceptance_date,
                    last_modified,
                    ingested_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    organization.id,
                    filing.canonical_id,
                    filing.raw_id,
                    filing.form,
                    document.name,
                    filing.filing_date.map(|date| date.to_string()),
                    filing.report_date.map(|date| date.to_string()),
                    filing.acceptance_date.map(|date| date.to_rfc3339()),
                    document
                        .last_modified
                        .map(|value| value.format(LAST_MODIFIED_FORMAT).to_string()),
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(persist)?;
        Ok(())
    }

    fn summaries(&self) -> Result<Vec<OrganizationSummary>, ExtractorError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT o.registry_key, COUNT(f.id), MAX(f.filing_date)
                 FROM organization o
                 LEFT JOIN filing f ON f.organization_id = o.id
                 GROUP BY o.id
                 ORDER BY o.id",
            )
            .map_err(persist)?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(OrganizationSummary {
                    organization: row.get(0)?,
                    filings: row.get::<_, i64>(1)?.max(0) as u64,
                    latest_filing_date: row.get(2)?,
                })
            })
            .map_err(persist)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(persist)?;
        Ok(summaries)
    }
}

impl SqliteStore {
    pub fn document_name(&self, canonical_id: &str) -> Result<Option<String>, ExtractorError> {
        self.conn
            .query_row(
                "SELECT document_name FROM filing WHERE canonical_id = ?1",
                params![canonical_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(persist)
    }
}

fn persist(err: rusqlite::Error) -> ExtractorError {
    ExtractorError::Persist(err.to_string())
}

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveLayout, ObjectArchive};
use crate::crawler::find_primary_document_name;
use crate::diff::missing;
use crate::domain::{Document, Filing, Organization, OrganizationKey};
use crate::error::{ErrorKind, ExtractorError};
use crate::registry::RegistryClient;
use crate::store::{MetadataStore, OrganizationSummary};
use crate::transform::{to_directory, to_filings};

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub organizations: Vec<OrganizationReport>,
}

impl SyncReport {
    pub fn ingested(&self) -> usize {
        self.count(|outcome| matches!(outcome, FilingOutcome::Ingested { .. }))
    }

    pub fn metadata_only(&self) -> usize {
        self.count(|outcome| matches!(outcome, FilingOutcome::MetadataOnly { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, FilingOutcome::Skipped { .. }))
    }

    pub fn failed_organizations(&self) -> usize {
        self.organizations
            .iter()
            .filter(|org| org.error.is_some())
            .count()
    }

    fn count(&self, predicate: impl Fn(&FilingOutcome) -> bool) -> usize {
        self.organizations
            .iter()
            .flat_map(|org| org.filings.iter())
            .filter(|filing| predicate(&filing.outcome))
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationReport {
    pub organization: String,
    pub discovered: usize,
    pub missing: usize,
    pub error: Option<StageError>,
    pub filings: Vec<FilingReport>,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilingReport {
    pub filing: String,
    pub form: String,
    pub outcome: FilingOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FilingOutcome {
    Ingested {
        document: String,
        archive_key: String,
    },
    /// Metadata persisted, upload failed. Not rolled back.
    MetadataOnly {
        document: String,
        archive_key: String,
        error: StageError,
    },
    Skipped {
        stage: Stage,
        error: StageError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Listing,
    Crawl,
    Locate,
    Download,
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ExtractorError> for StageError {
    fn from(err: &ExtractorError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub organizations: Vec<OrganizationSummary>,
}

pub struct App<R: RegistryClient, M: MetadataStore, A: ObjectArchive> {
    registry: R,
    store: M,
    archive: A,
    layout: ArchiveLayout,
}

impl<R: RegistryClient, M: MetadataStore, A: ObjectArchive> App<R, M, A> {
    pub fn new(registry: R, store: M, archive: A, layout: ArchiveLayout) -> Self {
        Self {
            registry,
            store,
            archive,
            layout,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn store(&self) -> &M {
        &self.store
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn track(&self, key: &OrganizationKey) -> Result<Organization, ExtractorError> {
        let organization = self.store.track_organization(key)?;
        info!(org = %key, id = organization.id, "tracking organization");
        Ok(organization)
    }

    pub fn status(&self) -> Result<StatusReport, ExtractorError> {
        Ok(StatusReport {
            organizations: self.store.summaries()?,
        })
    }

    /// One pass over every tracked organization. Only failing to list the
    /// organizations aborts the pass.
    pub fn sync(&self) -> Result<SyncReport, ExtractorError> {
        let organizations = self.store.organizations()?;
        info!(count = organizations.len(), "starting sync pass");
        let organizations = organizations
            .iter()
            .map(|organization| self.sync_organization(organization))
            .collect();
        let report = SyncReport { organizations };
        info!(
            ingested = report.ingested(),
            metadata_only = report.metadata_only(),
            skipped = report.skipped(),
            failed_organizations = report.failed_organizations(),
            "sync pass finished"
        );
        Ok(report)
    }

    pub fn sync_organization(&self, organization: &Organization) -> OrganizationReport {
        let start = Instant::now();
        let key = organization.key.as_str().to_string();
        let (discovered, pending) = match self.discover(organization) {
            Ok(result) => result,
            Err(err) => {
                warn!(org = %key, error = %err, "discovery failed, skipping organization");
                return OrganizationReport {
                    organization: key,
                    discovered: 0,
                    missing: 0,
                    error: Some(StageError::from(&err)),
                    filings: Vec::new(),
                    elapsed_ms: start.elapsed().as_millis(),
                };
            }
        };
        info!(org = %key, discovered, missing = pending.len(), "discovered filings");

        let missing_count = pending.len();
        let filings = pending
            .iter()
            .map(|filing| FilingReport {
                filing: filing.canonical_id.clone(),
                form: filing.form.clone(),
                outcome: self.ingest_filing(organization, filing),
            })
            .collect();

        OrganizationReport {
            organization: key,
            discovered,
            missing: missing_count,
            error: None,
            filings,
            elapsed_ms: start.elapsed().as_millis(),
        }
    }

    fn discover(
        &self,
        organization: &Organization,
    ) -> Result<(usize, Vec<Filing>), ExtractorError> {
        let payload = self.registry.fetch_filings_metadata(&organization.key)?;
        let remote = to_filings(payload);
        let discovered = remote.len();
        let known = self.store.known_filing_ids(organization)?;
        Ok((discovered, missing(&known, remote)))
    }

    pub fn ingest_filing(&self, organization: &Organization, filing: &Filing) -> FilingOutcome {
        let key = &organization.key;
        let document = match self.resolve_primary_document(key, filing) {
            Ok(document) => document,
            Err((stage, err)) => {
                warn!(
                    org = %key,
                    filing = %filing.canonical_id,
                    ?stage,
                    error = %err,
                    "skipping filing"
                );
                return FilingOutcome::Skipped {
                    stage,
                    error: StageError::from(&err),
                };
            }
        };

        if let Err(err) = self.store.insert_filing(organization, filing, &document) {
            warn!(
                org = %key,
                filing = %filing.canonical_id,
                error = %err,
                "failed to persist filing, it stays pending"
            );
            return FilingOutcome::Skipped {
                stage: Stage::Persist,
                error: StageError::from(&err),
            };
        }

        let archive_key = self.layout.key_for(key, filing, &document);
        match self.archive.put_object(&archive_key, &document.content) {
            Ok(()) => {
                info!(
                    org = %key,
                    filing = %filing.canonical_id,
                    document = %document.name,
                    archive_key = %archive_key,
                    "ingested filing"
                );
                FilingOutcome::Ingested {
                    document: document.name,
                    archive_key,
                }
            }
            Err(err) => {
                warn!(
                    org = %key,
                    filing = %filing.canonical_id,
                    archive_key = %archive_key,
                    error = %err,
                    "metadata persisted but upload failed"
                );
                FilingOutcome::MetadataOnly {
                    document: document.name,
                    archive_key,
                    error: StageError::from(&err),
                }
            }
        }
    }

    fn resolve_primary_document(
        &self,
        key: &OrganizationKey,
        filing: &Filing,
    ) -> Result<Document, (Stage, ExtractorError)> {
        let listing = self
            .registry
            .fetch_directory_listing(key, filing)
            .map_err(|err| (Stage::Listing, err))?;
        let index_page = self
            .registry
            .fetch_document_bytes(key, filing, &filing.index_page_name())
            .map_err(|err| (Stage::Listing, err))?;

        let name = find_primary_document_name(&index_page).map_err(|err| (Stage::Crawl, err))?;
        debug!(filing = %filing.canonical_id, document = %name, "primary document resolved");

        let mut document = to_directory(listing)
            .into_iter()
            .find(|document| document.name == name)
            .ok_or_else(|| {
                (
                    Stage::Locate,
                    ExtractorError::NotFound(format!(
                        "primary document {name} is not in the directory listing of {}",
                        filing.raw_id
                    )),
                )
            })?;

        document.content = self
            .registry
            .fetch_document_bytes(key, filing, &document.name)
            .map_err(|err| (Stage::Download, err))?;
        Ok(document)
    }
}

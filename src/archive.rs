use std::fs;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::{Document, Filing, OrganizationKey};
use crate::error::ExtractorError;

pub trait ObjectArchive {
    fn put_object(&self, key: &str, content: &[u8]) -> Result<(), ExtractorError>;
}

/// How archive keys are derived for a stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveLayout {
    /// `{canonical_id}{extension}`
    #[default]
    Flat,
    /// `{organization}/{canonical_id}/{document name}`
    Nested,
}

impl ArchiveLayout {
    pub fn key_for(&self, key: &OrganizationKey, filing: &Filing, document: &Document) -> String {
        match self {
            ArchiveLayout::Flat => format!(
                "{}{}",
                filing.canonical_id,
                document.extension.as_deref().unwrap_or_default()
            ),
            ArchiveLayout::Nested => format!(
                "{}/{}/{}",
                key.as_str(),
                filing.canonical_id,
                document.name
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FolderArchive {
    root: Utf8PathBuf,
}

impl FolderArchive {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<Utf8PathBuf, ExtractorError> {
        let relative = Utf8Path::new(key);
        let enclosed = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Utf8Component::Normal(_)));
        if !enclosed {
            return Err(ExtractorError::Upload(format!(
                "archive key escapes the archive root: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectArchive for FolderArchive {
    fn put_object(&self, key: &str, content: &[u8]) -> Result<(), ExtractorError> {
        let path = self.path_for(key)?;
        write_bytes_atomic(&path, content)
    }
}

fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), ExtractorError> {
    let parent = path
        .parent()
        .ok_or_else(|| ExtractorError::Upload(format!("invalid archive path: {path}")))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| ExtractorError::Upload(format!("{parent}: {err}")))?;
    let mut temp = tempfile::Builder::new()
        .prefix("filing-extractor")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| ExtractorError::Upload(err.to_string()))?;
    std::io::Write::write_all(&mut temp, content)
        .map_err(|err| ExtractorError::Upload(format!("{path}: {err}")))?;
    temp.persist(path.as_std_path())
        .map_err(|err| ExtractorError::Upload(format!("{path}: {err}")))?;
    Ok(())
}

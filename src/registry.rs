use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::config::RegistrySettings;
use crate::domain::{Filing, OrganizationKey};
use crate::error::ExtractorError;
use crate::transform::{DirectoryPayload, FilingsPayload};

pub trait RegistryClient {
    fn fetch_filings_metadata(
        &self,
        key: &OrganizationKey,
    ) -> Result<FilingsPayload, ExtractorError>;
    fn fetch_directory_listing(
        &self,
        key: &OrganizationKey,
        filing: &Filing,
    ) -> Result<DirectoryPayload, ExtractorError>;
    fn fetch_document_bytes(
        &self,
        key: &OrganizationKey,
        filing: &Filing,
        name: &str,
    ) -> Result<Vec<u8>, ExtractorError>;
}

#[derive(Clone, Debug)]
pub struct RegistryHttpClient {
    client: Client,
    data_url: String,
    archive_url: String,
    pacing: Duration,
}

impl RegistryHttpClient {
    pub fn new(settings: &RegistrySettings, user_agent: &str) -> Result<Self, ExtractorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| ExtractorError::ConfigValue(format!("user_agent: {err}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ExtractorError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            data_url: settings.data_url.trim_end_matches('/').to_string(),
            archive_url: settings.archive_url.trim_end_matches('/').to_string(),
            pacing: settings.pacing,
        })
    }

    pub fn filings_url(&self, key: &OrganizationKey) -> String {
        format!("{}/CIK{}.json", self.data_url, key.padded())
    }

    pub fn directory_url(&self, key: &OrganizationKey, filing: &Filing) -> String {
        self.document_url(key, filing, "index.json")
    }

    pub fn document_url(&self, key: &OrganizationKey, filing: &Filing, name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.archive_url,
            key.trimmed(),
            filing.canonical_id,
            name
        )
    }

    /// One paced GET. The body is read to the end on success and failure.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ExtractorError> {
        thread::sleep(self.pacing);
        tracing::debug!(url, "registry request");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ExtractorError::Fetch {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        let body = response.bytes().map_err(|err| ExtractorError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        if !status.is_success() {
            return Err(ExtractorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(body.to_vec())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ExtractorError> {
        let body = self.get_bytes(url)?;
        decode_json(url, &body)
    }
}

impl RegistryClient for RegistryHttpClient {
    fn fetch_filings_metadata(
        &self,
        key: &OrganizationKey,
    ) -> Result<FilingsPayload, ExtractorError> {
        self.get_json(&self.filings_url(key))
    }

    fn fetch_directory_listing(
        &self,
        key: &OrganizationKey,
        filing: &Filing,
    ) -> Result<DirectoryPayload, ExtractorError> {
        self.get_json(&self.directory_url(key, filing))
    }

    fn fetch_document_bytes(
        &self,
        key: &OrganizationKey,
        filing: &Filing,
        name: &str,
    ) -> Result<Vec<u8>, ExtractorError> {
        self.get_bytes(&self.document_url(key, filing, name))
    }
}

pub fn decode_json<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, ExtractorError> {
    serde_json::from_slice(body).map_err(|err| ExtractorError::Decode {
        url: url.to_string(),
        message: err.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

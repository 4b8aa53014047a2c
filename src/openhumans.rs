//! OpenHumans public-data retrieval.
//!
//! Fetches the cohort of publicly shared 23andMe genotype files from the
//! OpenHumans API: a paginated listing (following `next` links, keeping
//! entries tagged `vcf`) followed by streamed downloads into a local
//! directory. Files already on disk are skipped, so repeated runs only
//! fetch what is missing.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClinMatchError;
use crate::Result;

/// Default listing endpoint for public 23andMe data.
pub const DEFAULT_LISTING_URL: &str =
    "https://www.openhumans.org/api/public-data/?source=twenty_three_and_me";

/// One publicly shared genotype file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenotypeSource {
    /// Direct download URL for the file.
    pub download_url: String,
    /// The sharing member.
    pub user: SourceUser,
    /// Upload timestamp, as reported by the API.
    pub created: String,
    /// Source metadata (tags etc.).
    pub metadata: SourceMetadata,
    /// Local filename assigned at download time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub local_filename: Option<String>,
}

impl GenotypeSource {
    /// Deterministic local filename for this source.
    pub fn filename(&self) -> String {
        format!(
            "{}_{}_{}_23andme_data.vcf.bz2",
            self.user.username, self.user.id, self.created
        )
    }

    /// True if the source is tagged as a VCF file.
    pub fn is_vcf(&self) -> bool {
        self.metadata.tags.iter().any(|t| t == "vcf")
    }
}

/// The OpenHumans member who shared a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUser {
    /// Public username.
    pub username: String,
    /// Numeric member id.
    pub id: u64,
}

/// Metadata attached to a shared file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SourceMetadata {
    /// Free-form tags; `vcf` marks the files we consume.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One page of the paginated listing.
#[derive(Debug, Deserialize)]
struct ListingPage {
    results: Vec<GenotypeSource>,
    next: Option<String>,
}

/// Synchronous OpenHumans API client.
pub struct OpenHumansClient {
    listing_url: String,
    client: reqwest::blocking::Client,
}

impl OpenHumansClient {
    /// Client against the public 23andMe listing.
    pub fn new() -> Self {
        Self::with_listing_url(DEFAULT_LISTING_URL)
    }

    /// Client against a custom listing URL (tests, mirrors).
    pub fn with_listing_url(listing_url: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Walk the paginated listing and collect every VCF-tagged source.
    pub fn list_vcf_sources(&self) -> Result<Vec<GenotypeSource>> {
        let mut sources = Vec::new();
        let mut url = Some(self.listing_url.clone());

        while let Some(page_url) = url {
            let response = self.client.get(&page_url).send()?;
            if !response.status().is_success() {
                return Err(ClinMatchError::Retrieval {
                    msg: format!("listing request returned {}", response.status()),
                });
            }
            let page: ListingPage = response.json()?;
            sources.extend(page.results.into_iter().filter(GenotypeSource::is_vcf));
            url = page.next;
        }

        Ok(sources)
    }

    /// Download one source into `dir`, streaming to disk.
    ///
    /// Returns the local path and records the filename on the source. A
    /// file that already exists is left untouched.
    pub fn download(&self, source: &mut GenotypeSource, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let filename = source.filename();
        let path = dir.join(&filename);

        if path.is_file() {
            tracing::info!(file = %filename, "already downloaded, skipping");
            source.local_filename = Some(filename);
            return Ok(path);
        }

        let mut response = self.client.get(&source.download_url).send()?;
        if !response.status().is_success() {
            return Err(ClinMatchError::Retrieval {
                msg: format!(
                    "download of {} returned {}",
                    source.download_url,
                    response.status()
                ),
            });
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        io::copy(&mut response, &mut writer)?;

        source.local_filename = Some(filename);
        Ok(path)
    }
}

impl Default for OpenHumansClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the accumulated cohort metadata to a JSON file.
pub fn write_cohort_metadata(path: &Path, sources: &[GenotypeSource]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, sources)?;
    Ok(())
}

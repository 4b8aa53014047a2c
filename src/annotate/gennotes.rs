//! GenNotes coordinate-keyed annotation client.

use serde_json::{json, Value};

use crate::error::ClinMatchError;
use crate::Result;

use super::CoordinateLookup;

/// Default GenNotes API endpoint.
pub const DEFAULT_GENNOTES_URL: &str = "https://gennotes.herokuapp.com";

/// Synchronous client for the GenNotes variant API.
///
/// Queries `GET {base}/api/variant/` with a `variant_list` query parameter
/// holding a JSON array of coordinate keys. The reply is passed through
/// unmodified.
pub struct GenNotesClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl GenNotesClient {
    /// Client against the public GenNotes endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_GENNOTES_URL)
    }

    /// Client against a custom endpoint (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// The configured endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for GenNotesClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateLookup for GenNotesClient {
    fn annotate(&self, coordinate_key: &str) -> Result<Value> {
        let url = format!("{}/api/variant/", self.base_url);
        let variant_list = json!([coordinate_key]).to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("variant_list", variant_list.as_str())])
            .send()?;

        if !response.status().is_success() {
            return Err(ClinMatchError::Annotation {
                msg: format!(
                    "GenNotes returned {} for {}",
                    response.status(),
                    coordinate_key
                ),
            });
        }

        Ok(response.json()?)
    }
}

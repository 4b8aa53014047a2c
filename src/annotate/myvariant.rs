//! MyVariant.info HGVS-keyed annotation client.

use reqwest::StatusCode;
use serde_json::Value;

use crate::cache::AnnotationCache;
use crate::error::ClinMatchError;
use crate::Result;

use super::NomenclatureLookup;

/// Default MyVariant.info API endpoint.
pub const DEFAULT_MYVARIANT_URL: &str = "https://myvariant.info";

/// The fixed field subset requested from MyVariant.info.
pub const MYVARIANT_FIELDS: &[&str] = &["clinvar", "dbsnp", "exac"];

/// Synchronous client for the MyVariant.info variant API.
///
/// Queries `GET {base}/v1/variant/{hgvs}?fields=clinvar,dbsnp,exac` and
/// memoizes replies through the supplied cache collaborator, so identical
/// keys hit the network at most once per cache lifetime. A 404 means the
/// service has no record of the variant and yields `Ok(None)`.
pub struct MyVariantClient<C> {
    base_url: String,
    client: reqwest::blocking::Client,
    cache: C,
}

impl<C: AnnotationCache> MyVariantClient<C> {
    /// Client against the public MyVariant.info endpoint.
    pub fn new(cache: C) -> Self {
        Self::with_base_url(DEFAULT_MYVARIANT_URL, cache)
    }

    /// Client against a custom endpoint (tests, mirrors).
    pub fn with_base_url(base_url: impl Into<String>, cache: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
            cache,
        }
    }

    /// The configured endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cache collaborator.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn fetch(&self, nomenclature_key: &str) -> Result<Option<Value>> {
        let url = format!("{}/v1/variant/{}", self.base_url, nomenclature_key);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", MYVARIANT_FIELDS.join(","))])
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClinMatchError::Annotation {
                msg: format!(
                    "MyVariant returned {} for {}",
                    response.status(),
                    nomenclature_key
                ),
            });
        }

        Ok(Some(response.json()?))
    }
}

impl<C: AnnotationCache> NomenclatureLookup for MyVariantClient<C> {
    fn annotate(&self, nomenclature_key: &str) -> Result<Option<Value>> {
        if let Some(cached) = self.cache.get(nomenclature_key) {
            return Ok(Some(cached));
        }

        let payload = self.fetch(nomenclature_key)?;
        if let Some(ref value) = payload {
            self.cache.put(nomenclature_key, value)?;
        }
        Ok(payload)
    }
}

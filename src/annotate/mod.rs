//! External variant annotation lookups.
//!
//! Two annotation services enrich matched variants, both consumed as black
//! boxes returning opaque JSON payloads:
//!
//! - a coordinate-keyed service (GenNotes) queried with the
//!   `b37-chrom-pos-ref-alt` coordinate key;
//! - an HGVS-keyed service (MyVariant.info) queried with the genomic
//!   nomenclature key and a fixed field subset, memoized through an
//!   [`crate::cache::AnnotationCache`] collaborator.
//!
//! The matcher talks to both through traits so tests can substitute
//! in-memory fakes for the network clients.

mod gennotes;
mod myvariant;

pub use gennotes::{GenNotesClient, DEFAULT_GENNOTES_URL};
pub use myvariant::{MyVariantClient, DEFAULT_MYVARIANT_URL, MYVARIANT_FIELDS};

use serde_json::Value;

use crate::Result;

/// Lookup keyed by the coordinate key (`b37-1-1000-A-G`).
pub trait CoordinateLookup {
    /// Fetch the annotation payload for a coordinate key.
    fn annotate(&self, coordinate_key: &str) -> Result<Value>;
}

/// Lookup keyed by the genomic HGVS nomenclature key.
pub trait NomenclatureLookup {
    /// Fetch the annotation payload for a nomenclature key, or `None` if
    /// the service has no record of the variant.
    fn annotate(&self, nomenclature_key: &str) -> Result<Option<Value>>;
}

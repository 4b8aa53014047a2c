// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! clinmatch: match personal genotype VCFs against a ClinVar reference index.
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! The pipeline ingests a compressed ClinVar VCF dump and per-individual
//! 23andMe-derived VCFs, builds a durable position/identifier-indexed
//! store of the reference variants, and emits, for each individual, the
//! subset of their variants that match known clinically annotated
//! positions — enriched with the payloads of two external annotation
//! services.
//!
//! # Example
//!
//! ```
//! use clinmatch::chromosome::ChromosomeMap;
//! use clinmatch::genome::GenomeBuild;
//! use clinmatch::index::ReferenceVariantIndex;
//! use clinmatch::matcher::{IndividualVariant, Matcher};
//! use clinmatch::clinvar::ClinVarVariant;
//! use clinmatch::vcf::VcfLine;
//!
//! let chromosomes = ChromosomeMap::human();
//! let index = ReferenceVariantIndex::in_memory().unwrap();
//!
//! // Index one reference variant.
//! let line = VcfLine::parse("1\t1000\trs1\tA\tG\t.\t.\tCLNSIG=Pathogenic", 1).unwrap();
//! let reference = ClinVarVariant::from_vcf_line(&line);
//! index.insert(&reference.to_reference_record(&chromosomes).unwrap()).unwrap();
//!
//! // Match an individual's variant against it.
//! let matcher = Matcher::new(&index, &chromosomes, GenomeBuild::GRCh37);
//! let line = VcfLine::parse("1\t1000\trs1\tA\tG\t50\tPASS\t.\tGT\t0/1", 1).unwrap();
//! let matches = matcher.match_variant(&IndividualVariant::from_vcf_line(&line)).unwrap();
//!
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].coordinate_key.as_deref(), Some("b37-1-1000-A-G"));
//! ```

pub mod annotate;
pub mod cache;
pub mod chromosome;
pub mod clinvar;
pub mod config;
pub mod error;
pub mod genome;
pub mod index;
pub mod keys;
pub mod matcher;
pub mod openhumans;
pub mod pipeline;
pub mod vcf;

// Re-export commonly used types
pub use chromosome::ChromosomeMap;
pub use error::ClinMatchError;
pub use genome::GenomeBuild;
pub use index::{IndexState, ReferenceVariantIndex};
pub use keys::{coordinate_key, nomenclature_key};
pub use matcher::{IndividualVariant, MatchedVariant, Matcher};

/// Result type alias for clinmatch operations
pub type Result<T> = std::result::Result<T, ClinMatchError>;

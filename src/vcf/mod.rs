//! VCF (Variant Call Format) support.
//!
//! This module provides a line-oriented reader and a fixed-shape record
//! type for the tab-delimited VCF dialects consumed here: the 8-column
//! ClinVar reference dump and the 10-column single-sample 23andMe export.
//! Column index is the sole means of field identification.

mod reader;
mod record;

pub use reader::{open_vcf, VcfReader};
pub use record::{VcfLine, MISSING};

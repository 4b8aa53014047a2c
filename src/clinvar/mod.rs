//! ClinVar reference dump parsing.
//!
//! The ClinVar VCF dump is the source of the reference variant index:
//! every data line becomes a [`ClinVarVariant`] exposing normalized
//! coordinates, alleles and the clinical-significance sub-fields carried
//! in the INFO column.
//!
//! # Example
//!
//! ```
//! use clinmatch::clinvar::ClinVarVariant;
//! use clinmatch::vcf::VcfLine;
//!
//! let line = VcfLine::parse(
//!     "1\t1000\trs1\tA\tG\t.\t.\tCLNSIG=Pathogenic;CLNDN=Cystic_fibrosis",
//!     1,
//! ).unwrap();
//! let variant = ClinVarVariant::from_vcf_line(&line);
//!
//! assert_eq!(variant.chrom, "1");
//! assert_eq!(variant.dbsnp_id.as_deref(), Some("rs1"));
//! assert!(variant.annotation.significance.is_pathogenic());
//! ```

mod parser;
mod types;

pub use parser::ClinVarVariant;
pub use types::{ClinVarAnnotation, ClinicalSignificance, ReviewStatus};

//! Reference-dump line normalization.

use serde::{Deserialize, Serialize};

use crate::chromosome::ChromosomeMap;
use crate::index::ReferenceVariantRecord;
use crate::vcf::VcfLine;
use crate::Result;

use super::types::ClinVarAnnotation;

/// One normalized record from the ClinVar reference dump.
///
/// Coordinates are 1-based against the genome build declared by the dump
/// (GRCh37 for the dumps consumed here); the chromosome name is kept bare
/// (no `chr` prefix). The record is created once during index construction
/// and is immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinVarVariant {
    /// Bare chromosome name (e.g. "1", "X", "MT").
    pub chrom: String,
    /// 1-based start position.
    pub start: u64,
    /// Variant identifier from the ID column, `None` if absent.
    ///
    /// Absent identifiers must stay `None` so they never collide in the
    /// index's unique constraint.
    pub dbsnp_id: Option<String>,
    /// Reference allele.
    pub reference: String,
    /// Alternate alleles.
    pub alternates: Vec<String>,
    /// Clinical-significance sub-fields from the INFO column.
    pub annotation: ClinVarAnnotation,
}

impl ClinVarVariant {
    /// Expand a parsed dump line into a normalized clinical record.
    pub fn from_vcf_line(line: &VcfLine) -> Self {
        let significance_raw = line.info_field("CLNSIG").map(|s| s.to_string());
        let review_status_raw = line.info_field("CLNREVSTAT").map(|s| s.to_string());

        let annotation = ClinVarAnnotation {
            significance: significance_raw
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            review_status: review_status_raw.as_deref().and_then(|s| s.parse().ok()),
            significance_raw,
            review_status_raw,
            diseases: line
                .info_field("CLNDN")
                .map(|v| v.split('|').map(|d| d.to_string()).collect())
                .unwrap_or_default(),
            hgvs: line.info_field("CLNHGVS").map(|s| s.to_string()),
            gene: line
                .info_field("GENEINFO")
                .and_then(|v| v.split(':').next())
                .map(|s| s.to_string()),
            rsid: line.info_field("RS").map(|rs| format!("rs{}", rs)),
            info: line
                .info
                .split(';')
                .filter(|e| !e.is_empty() && *e != ".")
                .map(|e| match e.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (e.to_string(), String::new()),
                })
                .collect(),
        };

        Self {
            chrom: line.bare_chrom().to_string(),
            start: line.pos,
            dbsnp_id: line.id.clone(),
            reference: line.reference.clone(),
            alternates: line.alternates.clone(),
            annotation,
        }
    }

    /// Serialize the full record, coordinates and annotation included, to
    /// the JSON document persisted in the reference index.
    pub fn annotation_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Convert into the storable index record, encoding the chromosome via
    /// the supplied map. Fails on a chromosome name outside the map.
    pub fn to_reference_record(
        &self,
        chromosomes: &ChromosomeMap,
    ) -> Result<ReferenceVariantRecord> {
        Ok(ReferenceVariantRecord {
            chrom: chromosomes.require(&self.chrom)?,
            pos: self.start,
            identifier: self.dbsnp_id.clone(),
            reference: self.reference.clone(),
            alternates: self.alternates.clone(),
            annotation: self.annotation_document()?,
        })
    }
}

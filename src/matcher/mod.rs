//! Matching individual genotype variants against the reference index.
//!
//! For each individual variant the matcher queries the index with the
//! record's own coordinate, allele and identifier, and emits one enriched
//! record per index hit (a fan-out, not a 1:1 join — duplicate matches are
//! preserved). Enrichment attaches the matched reference annotation, both
//! derived lookup keys, and the payloads of the two external annotation
//! services.
//!
//! External lookups are fault-tolerant per call: a failure is logged and
//! leaves that slot null; it never aborts the remaining variants or
//! individuals. There are no retries at this layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotate::{CoordinateLookup, NomenclatureLookup};
use crate::chromosome::ChromosomeMap;
use crate::genome::GenomeBuild;
use crate::index::ReferenceVariantIndex;
use crate::keys::{coordinate_key, nomenclature_key};
use crate::vcf::{VcfLine, MISSING};
use crate::Result;

/// One variant from an individual's genotype file.
///
/// Transient: constructed per input line, enriched by the matcher, written
/// to output, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualVariant {
    /// Chromosome as written in the file.
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Variant identifier, `None` if `.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele column as written (may be the `.` placeholder).
    pub alternate: String,
    /// QUAL column.
    pub qual: String,
    /// FILTER column.
    pub filter: String,
    /// INFO column.
    pub info: String,
    /// FORMAT column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Single-sample genotype column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genotype: Option<String>,
}

impl IndividualVariant {
    /// Build from a parsed VCF line.
    pub fn from_vcf_line(line: &VcfLine) -> Self {
        Self {
            chrom: line.chrom.clone(),
            pos: line.pos,
            id: line.id.clone(),
            reference: line.reference.clone(),
            alternate: line.alt_column(),
            qual: line.qual.clone(),
            filter: line.filter.clone(),
            info: line.info.clone(),
            format: line.format.clone(),
            genotype: line.genotype.clone(),
        }
    }

    /// True if the alternate allele is the `.` placeholder.
    pub fn has_placeholder_alt(&self) -> bool {
        self.alternate == MISSING
    }
}

/// An individual variant that matched a reference record, with enrichment.
///
/// `clinvar` always carries the matched reference annotation. The four
/// enrichment slots stay `None` for placeholder-allele variants and for
/// individual lookups that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedVariant {
    /// The individual's own genotype fields.
    #[serde(flatten)]
    pub variant: IndividualVariant,
    /// Annotation payload of the matched reference record.
    pub clinvar: Value,
    /// Derived coordinate key (`b37-1-1000-A-G`).
    pub coordinate_key: Option<String>,
    /// Payload from the coordinate-keyed service.
    pub coordinate_annotation: Option<Value>,
    /// Derived nomenclature key (genomic HGVS).
    pub nomenclature_key: Option<String>,
    /// Payload from the nomenclature-keyed service.
    pub nomenclature_annotation: Option<Value>,
}

/// The matching engine.
///
/// Holds the reference index, the chromosome map and (optionally) the two
/// external lookup services. Without services the matcher still produces
/// index matches and derived keys; only the service payload slots stay
/// null.
pub struct Matcher<'a> {
    index: &'a ReferenceVariantIndex,
    chromosomes: &'a ChromosomeMap,
    build: GenomeBuild,
    coordinate_service: Option<Box<dyn CoordinateLookup + 'a>>,
    nomenclature_service: Option<Box<dyn NomenclatureLookup + 'a>>,
}

impl<'a> Matcher<'a> {
    /// Create a matcher over an index with no external services attached.
    pub fn new(
        index: &'a ReferenceVariantIndex,
        chromosomes: &'a ChromosomeMap,
        build: GenomeBuild,
    ) -> Self {
        Self {
            index,
            chromosomes,
            build,
            coordinate_service: None,
            nomenclature_service: None,
        }
    }

    /// Attach the coordinate-keyed annotation service.
    pub fn with_coordinate_service(
        mut self,
        service: impl CoordinateLookup + 'a,
    ) -> Self {
        self.coordinate_service = Some(Box::new(service));
        self
    }

    /// Attach the nomenclature-keyed annotation service.
    pub fn with_nomenclature_service(
        mut self,
        service: impl NomenclatureLookup + 'a,
    ) -> Self {
        self.nomenclature_service = Some(Box::new(service));
        self
    }

    /// Match one individual variant against the index.
    ///
    /// Returns one enriched record per index hit (possibly none, possibly
    /// several). Placeholder-allele variants are matched by coordinate
    /// only and skip external enrichment entirely. Unknown chromosomes and
    /// index failures propagate; external lookup failures do not.
    pub fn match_variant(&self, variant: &IndividualVariant) -> Result<Vec<MatchedVariant>> {
        let chrom_code = self.chromosomes.require(&variant.chrom)?;

        let placeholder = variant.has_placeholder_alt();
        let allele = if placeholder {
            None
        } else {
            Some(variant.alternate.as_str())
        };

        let hits = self
            .index
            .lookup(chrom_code, variant.pos, allele, variant.id.as_deref())?;

        let mut matched = Vec::with_capacity(hits.len());
        for hit in hits {
            let mut record = MatchedVariant {
                variant: variant.clone(),
                clinvar: hit.annotation,
                coordinate_key: None,
                coordinate_annotation: None,
                nomenclature_key: None,
                nomenclature_annotation: None,
            };

            if !placeholder {
                self.enrich(&mut record);
            }

            matched.push(record);
        }
        Ok(matched)
    }

    /// Match a sequence of variants in input order, preserving fan-out.
    pub fn match_all<I>(&self, variants: I) -> Result<Vec<MatchedVariant>>
    where
        I: IntoIterator<Item = IndividualVariant>,
    {
        let mut matched = Vec::new();
        for variant in variants {
            matched.extend(self.match_variant(&variant)?);
        }
        Ok(matched)
    }

    /// Fill the four enrichment slots for a non-placeholder match.
    fn enrich(&self, record: &mut MatchedVariant) {
        let (chrom, pos) = (record.variant.chrom.clone(), record.variant.pos);
        let reference = record.variant.reference.clone();
        let alternate = record.variant.alternate.clone();

        let ckey = coordinate_key(self.build, &chrom, pos, &reference, &alternate);
        if let Some(service) = &self.coordinate_service {
            match service.annotate(&ckey) {
                Ok(payload) => record.coordinate_annotation = Some(payload),
                Err(e) => {
                    tracing::warn!(key = %ckey, error = %e, "coordinate annotation lookup failed");
                }
            }
        }
        record.coordinate_key = Some(ckey);

        match nomenclature_key(&chrom, pos, &reference, &alternate) {
            Ok(nkey) => {
                if let Some(service) = &self.nomenclature_service {
                    match service.annotate(&nkey) {
                        Ok(payload) => record.nomenclature_annotation = payload,
                        Err(e) => {
                            tracing::warn!(
                                key = %nkey,
                                error = %e,
                                "nomenclature annotation lookup failed"
                            );
                        }
                    }
                }
                record.nomenclature_key = Some(nkey);
            }
            Err(e) => {
                tracing::warn!(
                    chrom = %chrom,
                    pos = pos,
                    error = %e,
                    "nomenclature key unavailable"
                );
            }
        }
    }
}

//! Fixed-shape VCF line record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClinMatchError;
use crate::Result;

/// The VCF placeholder token for an absent value.
pub const MISSING: &str = ".";

/// One parsed VCF data line.
///
/// The record has a fixed shape validated at parse time: the first 8
/// tab-separated columns (CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO)
/// are required, and columns 9-10 (FORMAT plus a single genotype sample)
/// are captured when present. A `.` in the ID column is translated to
/// `None` here, never stored as the literal token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcfLine {
    /// Chromosome name as written in the file (e.g. "1", "chr1", "MT").
    pub chrom: String,

    /// 1-based position.
    pub pos: u64,

    /// Variant identifier (e.g. an rsID), `None` if `.`.
    pub id: Option<String>,

    /// Reference allele.
    pub reference: String,

    /// Alternate allele(s), split on `,`. A placeholder ALT column yields
    /// a single `"."` entry.
    pub alternates: Vec<String>,

    /// QUAL column, kept opaque.
    pub qual: String,

    /// FILTER column, kept opaque.
    pub filter: String,

    /// INFO column, kept opaque; parse sub-fields with
    /// [`VcfLine::info_field`] as needed.
    pub info: String,

    /// FORMAT column (column 9), when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Single-sample genotype data (column 10), when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genotype: Option<String>,
}

impl VcfLine {
    /// Parse one tab-separated VCF data line.
    ///
    /// `line_no` is the 1-based line number within the source, used only
    /// for error reporting. Lines with fewer than 8 columns or an
    /// unparseable position are rejected.
    pub fn parse(line: &str, line_no: u64) -> Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 8 {
            return Err(ClinMatchError::parse(
                line_no,
                format!("expected at least 8 columns, got {}", fields.len()),
            ));
        }

        let pos: u64 = fields[1].parse().map_err(|_| {
            ClinMatchError::parse(line_no, format!("invalid position '{}'", fields[1]))
        })?;

        let id = match fields[2] {
            MISSING => None,
            other => Some(other.to_string()),
        };

        Ok(Self {
            chrom: fields[0].to_string(),
            pos,
            id,
            reference: fields[3].to_string(),
            alternates: fields[4].split(',').map(|s| s.to_string()).collect(),
            qual: fields[5].to_string(),
            filter: fields[6].to_string(),
            info: fields[7].to_string(),
            format: fields.get(8).map(|s| s.to_string()),
            genotype: fields.get(9).map(|s| s.to_string()),
        })
    }

    /// The ALT column as written in the file (alleles re-joined on `,`).
    pub fn alt_column(&self) -> String {
        self.alternates.join(",")
    }

    /// True if the ALT column is the `.` placeholder.
    pub fn has_placeholder_alt(&self) -> bool {
        self.alternates.len() == 1 && self.alternates[0] == MISSING
    }

    /// True if the line carries FORMAT and genotype columns.
    pub fn has_genotype(&self) -> bool {
        self.format.is_some() && self.genotype.is_some()
    }

    /// Chromosome name without a `chr` prefix.
    pub fn bare_chrom(&self) -> &str {
        self.chrom.strip_prefix("chr").unwrap_or(&self.chrom)
    }

    /// Extract a `KEY=value` sub-field from the INFO column.
    ///
    /// Returns `Some("")` for valueless flag entries.
    pub fn info_field(&self, key: &str) -> Option<&str> {
        self.info.split(';').find_map(|entry| {
            match entry.split_once('=') {
                Some((k, v)) if k == key => Some(v),
                None if entry == key => Some(""),
                _ => None,
            }
        })
    }
}

impl fmt::Display for VcfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id.as_deref().unwrap_or(MISSING),
            self.reference,
            self.alt_column(),
            self.qual,
            self.filter,
            self.info,
        )?;
        if let (Some(format), Some(genotype)) = (&self.format, &self.genotype) {
            write!(f, "\t{}\t{}", format, genotype)?;
        }
        Ok(())
    }
}

//! Variant lookup key derivation.
//!
//! Two deterministic keys are derived from a variant's coordinates:
//!
//! - a **coordinate key** of the form `b37-1-1000-A-G`, used to query the
//!   coordinate-keyed annotation service;
//! - a **nomenclature key**, a genomic HGVS string such as
//!   `chr1:g.1000A>G`, used to query the HGVS-keyed annotation service.
//!
//! Coordinate keys are total: any chromosome/position/allele combination
//! produces one. Nomenclature keys are partial: placeholder and symbolic
//! alleles have no genomic HGVS rendering, and callers must treat that
//! error as "key unavailable for this variant", not as fatal.

use percent_encoding::percent_decode_str;

use crate::error::ClinMatchError;
use crate::genome::GenomeBuild;
use crate::Result;

/// Render the coordinate key `{build}-{chrom}-{pos}-{ref}-{alt}`.
///
/// Pure and deterministic; the chromosome is used as supplied (no prefix
/// normalization) so the key matches what the coordinate-keyed service
/// stores.
pub fn coordinate_key(
    build: GenomeBuild,
    chrom: &str,
    pos: u64,
    reference: &str,
    alternate: &str,
) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        build.key_prefix(),
        chrom,
        pos,
        reference,
        alternate
    )
}

/// Render the nomenclature key: a percent-decoded genomic HGVS string.
///
/// Covers substitutions, insertions, deletions and delins shapes. Fails
/// for allele shapes with no genomic HGVS rendering (placeholders,
/// symbolic alleles like `<DEL>`, empty alleles).
pub fn nomenclature_key(chrom: &str, pos: u64, reference: &str, alternate: &str) -> Result<String> {
    let hgvs = format_genomic_hgvs(chrom, pos, reference, alternate)?;
    let decoded = percent_decode_str(&hgvs)
        .decode_utf8()
        .map_err(|e| ClinMatchError::KeyDerivation {
            msg: format!("percent-decoding produced invalid UTF-8: {}", e),
        })?;
    Ok(decoded.into_owned())
}

/// Format a coordinate+allele combination as genomic HGVS.
fn format_genomic_hgvs(chrom: &str, pos: u64, reference: &str, alternate: &str) -> Result<String> {
    check_allele(reference)?;
    check_allele(alternate)?;

    let chrom = chrom.strip_prefix("chr").unwrap_or(chrom);

    let key = if reference.len() == 1 && alternate.len() == 1 {
        // Substitution
        format!("chr{}:g.{}{}>{}", chrom, pos, reference, alternate)
    } else if alternate.len() == 1 && reference.starts_with(alternate) {
        // Deletion: the first reference base is the retained anchor.
        let start = pos + 1;
        let end = pos + reference.len() as u64 - 1;
        if start == end {
            format!("chr{}:g.{}del", chrom, start)
        } else {
            format!("chr{}:g.{}_{}del", chrom, start, end)
        }
    } else if reference.len() == 1 && alternate.starts_with(reference) {
        // Insertion after the anchor base.
        format!("chr{}:g.{}_{}ins{}", chrom, pos, pos + 1, &alternate[1..])
    } else {
        // Everything else is a delins over the reference span.
        format!(
            "chr{}:g.{}_{}delins{}",
            chrom,
            pos,
            pos + reference.len() as u64 - 1,
            alternate
        )
    };

    Ok(key)
}

fn check_allele(allele: &str) -> Result<()> {
    if allele.is_empty() {
        return Err(ClinMatchError::KeyDerivation {
            msg: "empty allele".to_string(),
        });
    }
    if !allele.bytes().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N')) {
        return Err(ClinMatchError::KeyDerivation {
            msg: format!("unsupported allele shape '{}'", allele),
        });
    }
    Ok(())
}

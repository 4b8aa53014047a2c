//! Pipeline orchestration.
//!
//! Wires the stages together: parse the reference dump into the index
//! (built once per index file, honoring the explicit open-vs-create
//! contract), then for each individual genotype file parse, match and
//! write a JSON array of enriched records. Progress is reported at
//! per-file and per-stage granularity; there is no partial-failure
//! summary — failures surface as null enrichment fields in the output or
//! as a hard stop on index-build errors.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::chromosome::ChromosomeMap;
use crate::clinvar::ClinVarVariant;
use crate::index::{IndexState, ReferenceVariantIndex};
use crate::matcher::{IndividualVariant, MatchedVariant, Matcher};
use crate::vcf::open_vcf;
use crate::Result;

/// Outcome of [`prepare_index`].
#[derive(Debug)]
pub struct IndexReport {
    /// The ready-to-query index.
    pub index: ReferenceVariantIndex,
    /// Whether the index was opened or freshly built.
    pub state: IndexState,
    /// Records stored during this call (0 when opened existing).
    pub stored: usize,
}

/// Open the reference index, building it from the dump when fresh.
///
/// An existing index file is opened as-is and the dump is not re-read;
/// a fresh one is populated from `dump_path` record by record. A build
/// failure (malformed dump line, duplicate identifier) is fatal and
/// leaves a partial index file behind that the caller must delete before
/// retrying.
pub fn prepare_index(
    dump_path: &Path,
    index_path: &Path,
    chromosomes: &ChromosomeMap,
) -> Result<IndexReport> {
    let (index, state) = ReferenceVariantIndex::open_or_create(index_path)?;

    if state == IndexState::OpenedExisting {
        tracing::info!(path = %index_path.display(), "using existing reference index");
        return Ok(IndexReport {
            index,
            state,
            stored: 0,
        });
    }

    tracing::info!(path = %dump_path.display(), "parsing reference dump");
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {pos} reference records indexed")
            .expect("static template"),
    );

    let reader = open_vcf(dump_path)?;
    let records = reader.lines().map(|line| {
        let variant = ClinVarVariant::from_vcf_line(&line?);
        pb.inc(1);
        variant.to_reference_record(chromosomes)
    });

    let stored = index.build(records)?;
    pb.finish_and_clear();
    tracing::info!(records = stored, "reference index built");

    Ok(IndexReport {
        index,
        state,
        stored,
    })
}

/// Parse one individual genotype file into variants, in input order.
pub fn read_individual(path: &Path) -> Result<Vec<IndividualVariant>> {
    let reader = open_vcf(path)?;
    reader
        .lines()
        .map(|line| Ok(IndividualVariant::from_vcf_line(&line?)))
        .collect()
}

/// Match one individual's file and write the enriched records.
///
/// The output lands in `output_dir` as `<stem>.json`, where the stem is
/// the input filename without its `.vcf.gz`/`.vcf.bz2` suffixes. Returns
/// the output path and the number of matched records.
pub fn process_individual(
    path: &Path,
    matcher: &Matcher<'_>,
    output_dir: &Path,
) -> Result<(PathBuf, usize)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!(file = %name, "matching individual genotype file");

    let variants = read_individual(path)?;

    let pb = ProgressBar::new(variants.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} variants")
            .expect("static template"),
    );

    let mut matched = Vec::new();
    for variant in variants {
        matched.extend(matcher.match_variant(&variant)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(format!("{}.json", output_stem(path)));
    write_matches(&output_path, &matched)?;

    tracing::info!(file = %name, matches = matched.len(), output = %output_path.display(), "done");
    Ok((output_path, matched.len()))
}

/// Match every genotype file in a directory, in sorted filename order.
///
/// One individual's file is fully parsed and matched before the next
/// begins. Returns `(input, output, match count)` per file processed.
pub fn process_directory(
    genotype_dir: &Path,
    matcher: &Matcher<'_>,
    output_dir: &Path,
) -> Result<Vec<(PathBuf, PathBuf, usize)>> {
    let mut files: Vec<PathBuf> = fs::read_dir(genotype_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.contains(".vcf"))
        })
        .collect();
    files.sort();

    let mut processed = Vec::with_capacity(files.len());
    for path in files {
        let (output, count) = process_individual(&path, matcher, output_dir)?;
        processed.push((path, output, count));
    }
    Ok(processed)
}

/// Write enriched records as a pretty-printed JSON array.
pub fn write_matches(path: &Path, matches: &[MatchedVariant]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, matches)?;
    Ok(())
}

/// Strip the `.json`-able stem out of a genotype filename.
fn output_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.trim_end_matches(".bz2")
        .trim_end_matches(".gz")
        .trim_end_matches(".vcf")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("beau_42_x.vcf.bz2")), "beau_42_x");
        assert_eq!(output_stem(Path::new("sample.vcf.gz")), "sample");
        assert_eq!(output_stem(Path::new("plain.vcf")), "plain");
        assert_eq!(output_stem(Path::new("dir/nested.vcf.bz2")), "nested");
    }
}

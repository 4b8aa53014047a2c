//! Integration tests for the full match pipeline.
//!
//! These build a reference index from a compressed dump fixture, match
//! compressed individual genotype files against it with fake annotation
//! services, and check the shape of the JSON output.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use clinmatch::annotate::{CoordinateLookup, NomenclatureLookup};
use clinmatch::chromosome::ChromosomeMap;
use clinmatch::error::ClinMatchError;
use clinmatch::genome::GenomeBuild;
use clinmatch::index::IndexState;
use clinmatch::matcher::{MatchedVariant, Matcher};
use clinmatch::pipeline::{prepare_index, process_individual, read_individual};
use clinmatch::Result;

const REFERENCE_DUMP: &str = "\
##fileformat=VCFv4.1
##reference=GRCh37
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t1000\trs1\tA\tG\t.\t.\tRS=1;CLNSIG=Pathogenic;CLNDN=Cystic_fibrosis
1\t2000\trs2\tC\tT\t.\t.\tCLNSIG=Benign
2\t3000\t.\tG\tA\t.\t.\tCLNSIG=Likely_pathogenic
";

/// Write a gzip-compressed reference dump fixture.
fn write_dump(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("clinvar.vcf.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// Write a bzip2-compressed individual genotype fixture.
fn write_individual(dir: &Path, name: &str, data_lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = bzip2::write::BzEncoder::new(
        File::create(&path).unwrap(),
        bzip2::Compression::default(),
    );
    encoder
        .write_all(b"##fileformat=VCFv4.1\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE\n")
        .unwrap();
    for line in data_lines {
        encoder.write_all(line.as_bytes()).unwrap();
        encoder.write_all(b"\n").unwrap();
    }
    encoder.finish().unwrap();
    path
}

struct FakeCoordinateService;

impl CoordinateLookup for FakeCoordinateService {
    fn annotate(&self, coordinate_key: &str) -> Result<Value> {
        Ok(json!({"variant": coordinate_key}))
    }
}

struct FakeNomenclatureService;

impl NomenclatureLookup for FakeNomenclatureService {
    fn annotate(&self, nomenclature_key: &str) -> Result<Option<Value>> {
        Ok(Some(json!({"_id": nomenclature_key})))
    }
}

/// Fails on one specific key, succeeds on all others.
struct FailingOnKey {
    key: String,
}

impl CoordinateLookup for FailingOnKey {
    fn annotate(&self, coordinate_key: &str) -> Result<Value> {
        if coordinate_key == self.key {
            Err(ClinMatchError::Annotation {
                msg: "service unavailable".to_string(),
            })
        } else {
            Ok(json!({"ok": true}))
        }
    }
}

#[test]
fn test_end_to_end_single_match() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), REFERENCE_DUMP);
    let index_path = dir.path().join("clinvar.db");

    let chromosomes = ChromosomeMap::human();
    let report = prepare_index(&dump, &index_path, &chromosomes).unwrap();
    assert_eq!(report.state, IndexState::Created);
    assert_eq!(report.stored, 3);

    let matcher = Matcher::new(&report.index, &chromosomes, GenomeBuild::GRCh37)
        .with_coordinate_service(FakeCoordinateService)
        .with_nomenclature_service(FakeNomenclatureService);

    let individual = write_individual(
        dir.path(),
        "beau_42_23andme_data.vcf.bz2",
        &["1\t1000\trs1\tA\tG\t50\tPASS\t.\tGT\t0/1"],
    );

    let out_dir = dir.path().join("matched");
    let (output, count) = process_individual(&individual, &matcher, &out_dir).unwrap();
    assert_eq!(count, 1);

    let matches: Vec<MatchedVariant> =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert_eq!(matches.len(), 1);

    let m = &matches[0];
    assert_eq!(m.coordinate_key.as_deref(), Some("b37-1-1000-A-G"));
    assert_eq!(m.clinvar["annotation"]["significance"], "Pathogenic");
    assert_eq!(
        m.coordinate_annotation.as_ref().unwrap()["variant"],
        "b37-1-1000-A-G"
    );
    assert_eq!(m.nomenclature_key.as_deref(), Some("chr1:g.1000A>G"));
    assert_eq!(
        m.nomenclature_annotation.as_ref().unwrap()["_id"],
        "chr1:g.1000A>G"
    );
}

#[test]
fn test_end_to_end_placeholder_alt_null_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), REFERENCE_DUMP);
    let index_path = dir.path().join("clinvar.db");

    let chromosomes = ChromosomeMap::human();
    let report = prepare_index(&dump, &index_path, &chromosomes).unwrap();

    let matcher = Matcher::new(&report.index, &chromosomes, GenomeBuild::GRCh37)
        .with_coordinate_service(FakeCoordinateService)
        .with_nomenclature_service(FakeNomenclatureService);

    // No identifier and a placeholder alternate: matched by coordinate only.
    let individual = write_individual(
        dir.path(),
        "noalt_7_23andme_data.vcf.bz2",
        &["1\t2000\t.\tC\t.\t50\tPASS\t.\tGT\t0/0"],
    );

    let out_dir = dir.path().join("matched");
    let (output, count) = process_individual(&individual, &matcher, &out_dir).unwrap();
    assert_eq!(count, 1);

    let matches: Vec<MatchedVariant> =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    let m = &matches[0];
    assert_eq!(m.clinvar["annotation"]["significance"], "Benign");
    assert!(m.coordinate_key.is_none());
    assert!(m.coordinate_annotation.is_none());
    assert!(m.nomenclature_key.is_none());
    assert!(m.nomenclature_annotation.is_none());
}

#[test]
fn test_end_to_end_one_failing_lookup_among_five() {
    let dir = tempfile::tempdir().unwrap();
    let dump = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t100\t.\tA\tG\t.\t.\tCLNSIG=Benign
1\t200\t.\tA\tG\t.\t.\tCLNSIG=Benign
1\t300\t.\tA\tG\t.\t.\tCLNSIG=Benign
1\t400\t.\tA\tG\t.\t.\tCLNSIG=Benign
1\t500\t.\tA\tG\t.\t.\tCLNSIG=Benign
";
    let dump = write_dump(dir.path(), dump);
    let index_path = dir.path().join("clinvar.db");

    let chromosomes = ChromosomeMap::human();
    let report = prepare_index(&dump, &index_path, &chromosomes).unwrap();

    let service = FailingOnKey {
        key: "b37-1-300-A-G".to_string(),
    };
    let matcher = Matcher::new(&report.index, &chromosomes, GenomeBuild::GRCh37)
        .with_coordinate_service(service);

    let individual = write_individual(
        dir.path(),
        "five_1_23andme_data.vcf.bz2",
        &[
            "1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t200\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t300\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t400\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t500\t.\tA\tG\t.\t.\t.\tGT\t0/1",
        ],
    );

    // The failing lookup must not propagate past the matcher.
    let out_dir = dir.path().join("matched");
    let (output, count) = process_individual(&individual, &matcher, &out_dir).unwrap();
    assert_eq!(count, 5);

    let matches: Vec<MatchedVariant> =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    let with_annotation = matches
        .iter()
        .filter(|m| m.coordinate_annotation.is_some())
        .count();
    assert_eq!(with_annotation, 4);

    let failed = matches.iter().find(|m| m.variant.pos == 300).unwrap();
    assert!(failed.coordinate_annotation.is_none());
    assert!(failed.coordinate_key.is_some());
}

#[test]
fn test_existing_index_not_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), REFERENCE_DUMP);
    let index_path = dir.path().join("clinvar.db");
    let chromosomes = ChromosomeMap::human();

    let first = prepare_index(&dump, &index_path, &chromosomes).unwrap();
    assert_eq!(first.state, IndexState::Created);
    assert_eq!(first.stored, 3);
    drop(first);

    let second = prepare_index(&dump, &index_path, &chromosomes).unwrap();
    assert_eq!(second.state, IndexState::OpenedExisting);
    assert_eq!(second.stored, 0);
    assert_eq!(second.index.len().unwrap(), 3);
}

#[test]
fn test_duplicate_identifier_aborts_build() {
    let dir = tempfile::tempdir().unwrap();
    let dump = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t1000\trs1\tA\tG\t.\t.\tCLNSIG=Pathogenic
1\t2000\trs1\tC\tT\t.\t.\tCLNSIG=Benign
";
    let dump = write_dump(dir.path(), dump);
    let index_path = dir.path().join("clinvar.db");
    let chromosomes = ChromosomeMap::human();

    let err = prepare_index(&dump, &index_path, &chromosomes).unwrap_err();
    assert!(matches!(
        err,
        ClinMatchError::DuplicateIdentifier { ref id } if id == "rs1"
    ));
}

#[test]
fn test_malformed_dump_line_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let dump = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t1000\trs1\tA\tG\t.\t.\tCLNSIG=Pathogenic
not a vcf line
";
    let dump = write_dump(dir.path(), dump);
    let index_path = dir.path().join("clinvar.db");
    let chromosomes = ChromosomeMap::human();

    let err = prepare_index(&dump, &index_path, &chromosomes).unwrap_err();
    assert!(matches!(err, ClinMatchError::Parse { .. }));
}

#[test]
fn test_read_individual_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let individual = write_individual(
        dir.path(),
        "ordered_9_23andme_data.vcf.bz2",
        &[
            "1\t300\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/1",
            "1\t200\t.\tA\tG\t.\t.\t.\tGT\t0/1",
        ],
    );

    let variants = read_individual(&individual).unwrap();
    let positions: Vec<u64> = variants.iter().map(|v| v.pos).collect();
    assert_eq!(positions, vec![300, 100, 200]);
    assert!(variants.iter().all(|v| !v.has_placeholder_alt()));
    assert_eq!(variants[0].genotype.as_deref(), Some("0/1"));
}

#[test]
fn test_no_match_produces_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), REFERENCE_DUMP);
    let index_path = dir.path().join("clinvar.db");
    let chromosomes = ChromosomeMap::human();
    let report = prepare_index(&dump, &index_path, &chromosomes).unwrap();

    let matcher = Matcher::new(&report.index, &chromosomes, GenomeBuild::GRCh37);

    let individual = write_individual(
        dir.path(),
        "nomatch_3_23andme_data.vcf.bz2",
        &["3\t77777\t.\tA\tG\t.\t.\t.\tGT\t0/1"],
    );

    let out_dir = dir.path().join("matched");
    let (output, count) = process_individual(&individual, &matcher, &out_dir).unwrap();
    assert_eq!(count, 0);
    assert_eq!(output.file_name().unwrap(), "nomatch_3_23andme_data.json");

    let matches: Vec<MatchedVariant> =
        serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn test_match_fan_out_duplicates_preserved() {
    let dir = tempfile::tempdir().unwrap();
    // Two reference records share a coordinate; both must be emitted.
    let dump = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t1000\trs1\tA\tG\t.\t.\tCLNSIG=Pathogenic
1\t1000\trs9\tA\tG\t.\t.\tCLNSIG=Benign
";
    let dump = write_dump(dir.path(), dump);
    let index_path = dir.path().join("clinvar.db");
    let chromosomes = ChromosomeMap::human();
    let report = prepare_index(&dump, &index_path, &chromosomes).unwrap();

    let matcher = Matcher::new(&report.index, &chromosomes, GenomeBuild::GRCh37);
    let individual = write_individual(
        dir.path(),
        "fanout_5_23andme_data.vcf.bz2",
        &["1\t1000\t.\tA\tG\t.\t.\t.\tGT\t1/1"],
    );

    let out_dir = dir.path().join("matched");
    let (_, count) = process_individual(&individual, &matcher, &out_dir).unwrap();
    assert_eq!(count, 2);
}

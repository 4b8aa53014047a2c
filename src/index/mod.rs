//! Durable reference variant index.
//!
//! The index is a SQLite table keyed two ways: a non-unique secondary
//! index on (chromosome code, position) for coordinate lookups, and a
//! unique index on the variant identifier. SQLite treats NULLs as
//! distinct in unique indexes, so the many records without an identifier
//! never collide.
//!
//! The index is built exactly once per run and is read-only afterwards;
//! rebuilding means deleting the file and starting over.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClinMatchError;
use crate::Result;

/// One stored reference variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceVariantRecord {
    /// Chromosome integer code (see [`crate::chromosome::ChromosomeMap`]).
    pub chrom: u32,
    /// 1-based position.
    pub pos: u64,
    /// Stable identifier, unique across the index when present.
    pub identifier: Option<String>,
    /// Reference allele.
    pub reference: String,
    /// Alternate alleles.
    pub alternates: Vec<String>,
    /// Full clinical annotation document.
    pub annotation: Value,
}

/// Outcome of opening an index file.
///
/// Callers decide explicitly what to do with each state instead of
/// re-deriving it from file presence: a `Created` index needs
/// [`ReferenceVariantIndex::build`]; an `OpenedExisting` one must not be
/// built again (there are no incremental rebuilds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// The file already existed; the stored records are ready to query.
    OpenedExisting,
    /// A fresh index was created with an empty schema.
    Created,
}

/// SQLite-backed store of reference variants.
#[derive(Debug)]
pub struct ReferenceVariantIndex {
    conn: Connection,
}

impl ReferenceVariantIndex {
    /// Open an existing index file or create a fresh one, reporting which
    /// happened.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, IndexState)> {
        let path = path.as_ref();
        if path.exists() {
            Ok((Self::open(path)?, IndexState::OpenedExisting))
        } else {
            Ok((Self::create(path)?, IndexState::Created))
        }
    }

    /// Open an existing index file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create a fresh index file with an empty schema.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let index = Self { conn };
        index.create_schema()?;
        Ok(index)
    }

    /// Create an in-memory index, mainly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let index = Self { conn };
        index.create_schema()?;
        Ok(index)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS clinvar (
                 chrom     INTEGER NOT NULL,
                 pos       INTEGER NOT NULL,
                 id        TEXT,
                 ref       TEXT NOT NULL,
                 alt       TEXT NOT NULL,
                 full_data TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS coordinate_match ON clinvar (chrom, pos);
             CREATE UNIQUE INDEX IF NOT EXISTS identifier_match ON clinvar (id);",
        )?;
        Ok(())
    }

    /// Insert one record.
    ///
    /// A repeated non-null identifier surfaces as
    /// [`ClinMatchError::DuplicateIdentifier`]; previously inserted records
    /// are unaffected.
    pub fn insert(&self, record: &ReferenceVariantRecord) -> Result<()> {
        let alt = serde_json::to_string(&record.alternates)?;
        let full_data = serde_json::to_string(&record.annotation)?;

        let result = self.conn.execute(
            "INSERT INTO clinvar (chrom, pos, id, ref, alt, full_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.chrom,
                record.pos,
                record.identifier,
                record.reference,
                alt,
                full_data
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ClinMatchError::DuplicateIdentifier {
                    id: record.identifier.clone().unwrap_or_default(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Consume a lazy sequence of records, persisting each exactly once.
    ///
    /// There is no enclosing transaction: a failure part-way through (a
    /// duplicate identifier, a malformed source record) leaves every prior
    /// insert in place, and the partially built index must be discarded by
    /// the caller. Returns the number of records stored.
    pub fn build<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<ReferenceVariantRecord>>,
    {
        let mut stored = 0usize;
        for record in records {
            self.insert(&record?)?;
            stored += 1;
        }
        Ok(stored)
    }

    /// Query the index.
    ///
    /// Returns every record where the coordinate predicate
    /// (`chrom` and `pos` equal, and — when `allele` is given — the stored
    /// alternate alleles contain it as a substring) OR the identifier
    /// predicate (`identifier` matches exactly) holds. The OR is
    /// intentional: a match may succeed via either coordinate or a shared
    /// identifier even if the other disagrees. Passing `allele: None`
    /// relaxes the coordinate predicate to position only, which is how
    /// placeholder-allele genotype records are matched.
    pub fn lookup(
        &self,
        chrom: u32,
        pos: u64,
        allele: Option<&str>,
        identifier: Option<&str>,
    ) -> Result<Vec<ReferenceVariantRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT chrom, pos, id, ref, alt, full_data FROM clinvar
             WHERE (chrom = ?1 AND pos = ?2 AND (?3 IS NULL OR alt LIKE ?3 ESCAPE '\\'))
                OR (id = ?4)",
        )?;

        let pattern = allele.map(|a| format!("%{}%", escape_like(a)));
        let rows = stmt.query_map(params![chrom, pos, pattern, identifier], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row??);
        }
        Ok(records)
    }

    /// Fetch the record stored under an exact identifier.
    pub fn get_by_identifier(&self, identifier: &str) -> Result<Option<ReferenceVariantRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT chrom, pos, id, ref, alt, full_data FROM clinvar WHERE id = ?1",
        )?;
        let record = stmt
            .query_row(params![identifier], row_to_record)
            .optional()?;
        record.transpose().map_err(Into::into)
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clinvar", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// True if the index holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

type RecordParse = std::result::Result<ReferenceVariantRecord, serde_json::Error>;

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordParse> {
    let chrom: u32 = row.get(0)?;
    let pos: u64 = row.get(1)?;
    let identifier: Option<String> = row.get(2)?;
    let reference: String = row.get(3)?;
    let alt: String = row.get(4)?;
    let full_data: String = row.get(5)?;

    Ok(serde_json::from_str(&alt).and_then(|alternates| {
        serde_json::from_str(&full_data).map(|annotation| ReferenceVariantRecord {
            chrom,
            pos,
            identifier,
            reference,
            alternates,
            annotation,
        })
    }))
}

/// Escape LIKE wildcards in an allele so only literal substrings match.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

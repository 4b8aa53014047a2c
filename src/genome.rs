//! Genome build identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference genome build/assembly.
///
/// The ClinVar dump and 23andMe exports consumed here are reported against
/// GRCh37, so that is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GenomeBuild {
    /// GRCh37 / hg19
    #[default]
    GRCh37,
    /// GRCh38 / hg38
    GRCh38,
}

impl GenomeBuild {
    /// Short build tag used as the leading segment of coordinate keys
    /// (e.g. `b37` in `b37-1-1000-A-G`).
    pub fn key_prefix(&self) -> &'static str {
        match self {
            GenomeBuild::GRCh37 => "b37",
            GenomeBuild::GRCh38 => "b38",
        }
    }

    /// Parse a build name, accepting common aliases.
    ///
    /// `GRCh37`/`hg19` map to GRCh37, `GRCh38`/`hg38` to GRCh38; anything
    /// else falls back to GRCh37 (the build of the inputs we consume).
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "GRCH38" | "HG38" | "B38" => GenomeBuild::GRCh38,
            _ => GenomeBuild::GRCh37,
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeBuild::GRCh37 => write!(f, "GRCh37"),
            GenomeBuild::GRCh38 => write!(f, "GRCh38"),
        }
    }
}

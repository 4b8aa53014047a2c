//! Configuration file support for clinmatch.
//!
//! A `.clinmatch.toml` file can pin the paths and endpoints of a run so
//! they do not have to be repeated on the command line:
//!
//! ```toml
//! [index]
//! path = "clinvar.db"
//! build = "GRCh37"
//!
//! [sources]
//! clinvar_dump = "clinvar.vcf.gz"
//! genotype_dir = "genotype_data"
//! output_dir = "matched"
//!
//! [annotation]
//! gennotes_url = "https://gennotes.herokuapp.com"
//! myvariant_url = "https://myvariant.info"
//! cache_path = "myvariant_cache.db"
//! ```
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.clinmatch.toml` in the current directory
//! 2. `~/.config/clinmatch/config.toml`
//!
//! CLI flags take precedence over config file settings.

use std::fs;
use std::path::{Path, PathBuf};

use crate::annotate::{DEFAULT_GENNOTES_URL, DEFAULT_MYVARIANT_URL};
use crate::error::ClinMatchError;
use crate::openhumans::DEFAULT_LISTING_URL;
use crate::Result;

/// Parsed configuration for a clinmatch run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinMatchConfig {
    /// Path of the reference index database.
    pub index_path: PathBuf,
    /// Genome build name (resolved via [`crate::genome::GenomeBuild::from_name`]).
    pub build: String,
    /// Path of the compressed reference dump.
    pub clinvar_dump: PathBuf,
    /// Directory holding per-individual genotype files.
    pub genotype_dir: PathBuf,
    /// Directory where enriched match output is written.
    pub output_dir: PathBuf,
    /// OpenHumans listing URL.
    pub listing_url: String,
    /// Coordinate-keyed annotation service endpoint.
    pub gennotes_url: String,
    /// Nomenclature-keyed annotation service endpoint.
    pub myvariant_url: String,
    /// Path of the persistent annotation cache.
    pub cache_path: PathBuf,
}

impl Default for ClinMatchConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("clinvar.db"),
            build: "GRCh37".to_string(),
            clinvar_dump: PathBuf::from("clinvar.vcf.gz"),
            genotype_dir: PathBuf::from("genotype_data"),
            output_dir: PathBuf::from("matched"),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            gennotes_url: DEFAULT_GENNOTES_URL.to_string(),
            myvariant_url: DEFAULT_MYVARIANT_URL.to_string(),
            cache_path: PathBuf::from("myvariant_cache.db"),
        }
    }
}

impl ClinMatchConfig {
    /// Load configuration from the default locations, falling back to
    /// defaults when no file is found.
    pub fn load() -> Self {
        let cwd_config = PathBuf::from(".clinmatch.toml");
        if cwd_config.exists() {
            if let Ok(config) = Self::load_from_path(&cwd_config) {
                return config;
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = Path::new(&home)
                .join(".config")
                .join("clinmatch")
                .join("config.toml");
            if home_config.exists() {
                if let Ok(config) = Self::load_from_path(&home_config) {
                    return config;
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    ///
    /// Only the flat `key = "value"` subset used by the sections above is
    /// supported; unknown keys are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(ClinMatchError::Config {
                        msg: format!("malformed section header: {}", line),
                    });
                }
                section = line[1..line.len() - 1].to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');

            match (section.as_str(), key) {
                ("index", "path") => config.index_path = PathBuf::from(value),
                ("index", "build") => config.build = value.to_string(),
                ("sources", "clinvar_dump") => config.clinvar_dump = PathBuf::from(value),
                ("sources", "genotype_dir") => config.genotype_dir = PathBuf::from(value),
                ("sources", "output_dir") => config.output_dir = PathBuf::from(value),
                ("sources", "listing_url") => config.listing_url = value.to_string(),
                ("annotation", "gennotes_url") => config.gennotes_url = value.to_string(),
                ("annotation", "myvariant_url") => config.myvariant_url = value.to_string(),
                ("annotation", "cache_path") => config.cache_path = PathBuf::from(value),
                _ => {}
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = ClinMatchConfig::parse("").unwrap();
        assert_eq!(config, ClinMatchConfig::default());
    }

    #[test]
    fn test_parse_sections() {
        let content = r#"
[index]
path = "custom.db"
build = "GRCh38"

[sources]
genotype_dir = "downloads"

[annotation]
gennotes_url = "http://localhost:8000"
"#;
        let config = ClinMatchConfig::parse(content).unwrap();
        assert_eq!(config.index_path, PathBuf::from("custom.db"));
        assert_eq!(config.build, "GRCh38");
        assert_eq!(config.genotype_dir, PathBuf::from("downloads"));
        assert_eq!(config.gennotes_url, "http://localhost:8000");
        // Untouched keys keep their defaults.
        assert_eq!(config.myvariant_url, DEFAULT_MYVARIANT_URL);
    }

    #[test]
    fn test_comments_and_unknown_keys_ignored() {
        let content = r#"
# a comment
[index]
path = "a.db"
mystery_key = "ignored"

[unknown_section]
path = "not_the_index"
"#;
        let config = ClinMatchConfig::parse(content).unwrap();
        assert_eq!(config.index_path, PathBuf::from("a.db"));
    }

    #[test]
    fn test_malformed_section_rejected() {
        let result = ClinMatchConfig::parse("[index\npath = \"a.db\"");
        assert!(matches!(result, Err(ClinMatchError::Config { .. })));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".clinmatch.toml");
        fs::write(&path, "[index]\npath = \"from_file.db\"\n").unwrap();

        let config = ClinMatchConfig::load_from_path(&path).unwrap();
        assert_eq!(config.index_path, PathBuf::from("from_file.db"));
    }
}

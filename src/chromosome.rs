//! Chromosome name to integer code mapping.
//!
//! The reference index stores chromosomes as fixed integer codes rather than
//! raw names, so lookups are insensitive to `chr` prefixes and to the
//! `M`/`MT` mitochondrial spelling. The mapping is supplied explicitly to
//! the components that need it rather than living in a module-wide constant.

use std::collections::HashMap;

use crate::error::ClinMatchError;
use crate::Result;

/// Injective mapping from chromosome names to integer codes.
///
/// The standard human map covers 1-22, X (23), Y (24) and MT (25, with `M`
/// accepted as an alias). Unplaced contigs can be registered with
/// [`ChromosomeMap::with_contig`]; both the name and the code must be
/// unused, keeping the mapping injective.
///
/// # Example
///
/// ```
/// use clinmatch::chromosome::ChromosomeMap;
///
/// let map = ChromosomeMap::human();
/// assert_eq!(map.code("1"), Some(1));
/// assert_eq!(map.code("chrX"), Some(23));
/// assert_eq!(map.code("M"), Some(25));
/// assert_eq!(map.code("GL000207.1"), None);
/// ```
#[derive(Debug, Clone)]
pub struct ChromosomeMap {
    codes: HashMap<String, u32>,
}

impl ChromosomeMap {
    /// The standard human chromosome map: 1-22, X, Y, MT.
    pub fn human() -> Self {
        let mut codes = HashMap::new();
        for n in 1..=22u32 {
            codes.insert(n.to_string(), n);
        }
        codes.insert("X".to_string(), 23);
        codes.insert("Y".to_string(), 24);
        codes.insert("MT".to_string(), 25);
        codes.insert("M".to_string(), 25);
        Self { codes }
    }

    /// An empty map, for building a fully custom naming convention.
    pub fn empty() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }

    /// Register an additional contig name under the given code.
    ///
    /// Fails if the name is already mapped, or if the code is already taken
    /// by a different name (aliases like `M`/`MT` share a code on purpose,
    /// but new entries may not collide with existing codes).
    pub fn with_contig(mut self, name: &str, code: u32) -> Result<Self> {
        let key = Self::normalize(name);
        if self.codes.contains_key(&key) {
            return Err(ClinMatchError::Config {
                msg: format!("chromosome '{}' is already mapped", name),
            });
        }
        if self.codes.values().any(|&c| c == code) {
            return Err(ClinMatchError::Config {
                msg: format!("chromosome code {} is already in use", code),
            });
        }
        self.codes.insert(key, code);
        Ok(self)
    }

    /// Look up the code for a chromosome name.
    ///
    /// Accepts a `chr` prefix and is case-insensitive for the sex and
    /// mitochondrial chromosomes.
    pub fn code(&self, name: &str) -> Option<u32> {
        self.codes.get(&Self::normalize(name)).copied()
    }

    /// Look up the code, turning an unknown name into a typed error.
    pub fn require(&self, name: &str) -> Result<u32> {
        self.code(name).ok_or_else(|| ClinMatchError::UnknownChromosome {
            name: name.to_string(),
        })
    }

    /// Number of distinct names in the map.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn normalize(name: &str) -> String {
        let bare = name.strip_prefix("chr").unwrap_or(name);
        bare.to_uppercase()
    }
}

impl Default for ChromosomeMap {
    fn default() -> Self {
        Self::human()
    }
}

//! ClinVar clinical annotation types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Clinical significance classification from ClinVar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClinicalSignificance {
    /// Benign - variant does not cause disease
    Benign,
    /// Likely benign - variant probably does not cause disease
    LikelyBenign,
    /// Uncertain significance - insufficient evidence
    UncertainSignificance,
    /// Likely pathogenic - variant probably causes disease
    LikelyPathogenic,
    /// Pathogenic - variant causes disease
    Pathogenic,
    /// Conflicting interpretations from different submitters
    Conflicting,
    /// Drug response
    DrugResponse,
    /// Association - variant is associated with phenotype
    Association,
    /// Risk factor
    RiskFactor,
    /// Protective factor
    Protective,
    /// Affects gene function
    Affects,
    /// Not provided
    #[default]
    NotProvided,
    /// Other
    Other,
}

impl ClinicalSignificance {
    /// Check if this is a pathogenic classification.
    pub fn is_pathogenic(&self) -> bool {
        matches!(self, Self::Pathogenic | Self::LikelyPathogenic)
    }

    /// Check if this is a benign classification.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Benign | Self::LikelyBenign)
    }

    /// Check if this is uncertain or conflicting.
    pub fn is_uncertain(&self) -> bool {
        matches!(self, Self::UncertainSignificance | Self::Conflicting)
    }
}

impl FromStr for ClinicalSignificance {
    type Err = std::convert::Infallible;

    /// Parse a CLNSIG value. The dump writes spaces as underscores, so both
    /// spellings are accepted; unknown values degrade to `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        Ok(match normalized.as_str() {
            "benign" => Self::Benign,
            "likely benign" => Self::LikelyBenign,
            "uncertain significance" | "vus" => Self::UncertainSignificance,
            "likely pathogenic" => Self::LikelyPathogenic,
            "pathogenic" => Self::Pathogenic,
            "conflicting interpretations of pathogenicity"
            | "conflicting classifications of pathogenicity"
            | "conflicting" => Self::Conflicting,
            "drug response" => Self::DrugResponse,
            "association" => Self::Association,
            "risk factor" => Self::RiskFactor,
            "protective" => Self::Protective,
            "affects" => Self::Affects,
            "not provided" => Self::NotProvided,
            _ => Self::Other,
        })
    }
}

/// ClinVar review status (star rating), parsed from CLNREVSTAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReviewStatus {
    /// No assertion criteria provided (0 stars)
    #[default]
    NoAssertion,
    /// Criteria provided, conflicting interpretations (1 star)
    ConflictingInterpretations,
    /// Criteria provided, single submitter (1 star)
    SingleSubmitter,
    /// Criteria provided, multiple submitters, no conflicts (2 stars)
    MultipleSubmitters,
    /// Reviewed by expert panel (3 stars)
    ExpertPanel,
    /// Practice guideline (4 stars)
    PracticeGuideline,
}

impl ReviewStatus {
    /// Get the star rating (0-4).
    pub fn stars(&self) -> u8 {
        match self {
            Self::NoAssertion => 0,
            Self::ConflictingInterpretations | Self::SingleSubmitter => 1,
            Self::MultipleSubmitters => 2,
            Self::ExpertPanel => 3,
            Self::PracticeGuideline => 4,
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        Ok(if normalized.contains("practice guideline") {
            Self::PracticeGuideline
        } else if normalized.contains("expert panel") {
            Self::ExpertPanel
        } else if normalized.contains("multiple submitters") {
            Self::MultipleSubmitters
        } else if normalized.contains("single submitter") {
            Self::SingleSubmitter
        } else if normalized.contains("conflicting") {
            Self::ConflictingInterpretations
        } else {
            Self::NoAssertion
        })
    }
}

/// The clinical-significance sub-fields carried by one dump line.
///
/// Typed fields cover the sub-fields the matcher and its consumers care
/// about; the raw INFO map is retained alongside so the serialized
/// document loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClinVarAnnotation {
    /// Parsed CLNSIG classification.
    pub significance: ClinicalSignificance,
    /// Raw CLNSIG string as written in the dump.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance_raw: Option<String>,
    /// Parsed CLNREVSTAT.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_status: Option<ReviewStatus>,
    /// Raw CLNREVSTAT string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_status_raw: Option<String>,
    /// Disease names from CLNDN (pipe-separated in the dump).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diseases: Vec<String>,
    /// HGVS expression from CLNHGVS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hgvs: Option<String>,
    /// Gene symbol from GENEINFO (first `symbol:id` pair).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    /// dbSNP rsID from the RS sub-field, normalized to an `rs` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsid: Option<String>,
    /// The full raw INFO map, key -> value ("" for flags).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, String>,
}

impl ClinVarAnnotation {
    /// Star rating of the review status, 0 when absent.
    pub fn stars(&self) -> u8 {
        self.review_status.map(|r| r.stars()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_from_str() {
        assert_eq!(
            "Pathogenic".parse::<ClinicalSignificance>().unwrap(),
            ClinicalSignificance::Pathogenic
        );
        assert_eq!(
            "Likely_benign".parse::<ClinicalSignificance>().unwrap(),
            ClinicalSignificance::LikelyBenign
        );
        assert_eq!(
            "Uncertain_significance"
                .parse::<ClinicalSignificance>()
                .unwrap(),
            ClinicalSignificance::UncertainSignificance
        );
        assert_eq!(
            "Conflicting_interpretations_of_pathogenicity"
                .parse::<ClinicalSignificance>()
                .unwrap(),
            ClinicalSignificance::Conflicting
        );
        assert_eq!(
            "drug_response".parse::<ClinicalSignificance>().unwrap(),
            ClinicalSignificance::DrugResponse
        );
        assert_eq!(
            "something_new".parse::<ClinicalSignificance>().unwrap(),
            ClinicalSignificance::Other
        );
    }

    #[test]
    fn test_significance_predicates() {
        assert!(ClinicalSignificance::Pathogenic.is_pathogenic());
        assert!(ClinicalSignificance::LikelyPathogenic.is_pathogenic());
        assert!(ClinicalSignificance::Benign.is_benign());
        assert!(ClinicalSignificance::LikelyBenign.is_benign());
        assert!(ClinicalSignificance::UncertainSignificance.is_uncertain());
        assert!(ClinicalSignificance::Conflicting.is_uncertain());
        assert!(!ClinicalSignificance::Benign.is_pathogenic());
    }

    #[test]
    fn test_review_status_from_str() {
        assert_eq!(
            "criteria_provided,_single_submitter"
                .parse::<ReviewStatus>()
                .unwrap(),
            ReviewStatus::SingleSubmitter
        );
        assert_eq!(
            "criteria_provided,_multiple_submitters,_no_conflicts"
                .parse::<ReviewStatus>()
                .unwrap(),
            ReviewStatus::MultipleSubmitters
        );
        assert_eq!(
            "reviewed_by_expert_panel".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::ExpertPanel
        );
        assert_eq!(
            "practice_guideline".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::PracticeGuideline
        );
        assert_eq!(
            "no_assertion_criteria_provided"
                .parse::<ReviewStatus>()
                .unwrap(),
            ReviewStatus::NoAssertion
        );
    }

    #[test]
    fn test_review_status_stars() {
        assert_eq!(ReviewStatus::NoAssertion.stars(), 0);
        assert_eq!(ReviewStatus::SingleSubmitter.stars(), 1);
        assert_eq!(ReviewStatus::MultipleSubmitters.stars(), 2);
        assert_eq!(ReviewStatus::ExpertPanel.stars(), 3);
        assert_eq!(ReviewStatus::PracticeGuideline.stars(), 4);
    }

    #[test]
    fn test_annotation_stars() {
        let annotation = ClinVarAnnotation {
            review_status: Some(ReviewStatus::ExpertPanel),
            ..Default::default()
        };
        assert_eq!(annotation.stars(), 3);
        assert_eq!(ClinVarAnnotation::default().stars(), 0);
    }

    #[test]
    fn test_annotation_serializes_compactly() {
        let annotation = ClinVarAnnotation::default();
        let json = serde_json::to_value(&annotation).unwrap();
        // Absent optional fields should not appear in the document.
        assert!(json.get("significance_raw").is_none());
        assert!(json.get("diseases").is_none());
        assert_eq!(json["significance"], "NotProvided");
    }
}

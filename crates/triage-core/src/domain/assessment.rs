//! Score results and the three-way patient classification.

use serde::{Deserialize, Serialize};

/// Total score at or above which a patient is reported as high risk.
pub const HIGH_RISK_THRESHOLD: u32 = 4;

/// Per-record outcome of the rubric.
///
/// Recomputed on demand; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub bp_stage: u32,
    pub temp_stage: u32,
    pub age_stage: u32,
    pub total_score: u32,
    pub is_data_quality_issue: bool,
    pub has_fever: bool,
}

impl ScoreResult {
    pub fn is_high_risk(&self) -> bool {
        self.total_score >= HIGH_RISK_THRESHOLD
    }
}

/// Patient identifiers bucketed by category.
///
/// Membership is independent per list and order follows collection order.
/// Serializes to the submission payload expected by the assessment service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSet {
    #[serde(rename = "high_risk_patients")]
    pub high_risk: Vec<String>,
    #[serde(rename = "fever_patients")]
    pub fever: Vec<String>,
    #[serde(rename = "data_quality_issues")]
    pub data_quality: Vec<String>,
}

impl ClassificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one scored patient to every list it qualifies for.
    pub fn record(&mut self, patient_id: &str, score: &ScoreResult) {
        if score.is_high_risk() {
            self.high_risk.push(patient_id.to_string());
        }
        if score.has_fever {
            self.fever.push(patient_id.to_string());
        }
        if score.is_data_quality_issue {
            self.data_quality.push(patient_id.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_threshold_boundary() {
        let mut score = ScoreResult {
            total_score: 3,
            ..Default::default()
        };
        assert!(!score.is_high_risk());
        score.total_score = 4;
        assert!(score.is_high_risk());
    }

    #[test]
    fn test_membership_is_independent() {
        let mut set = ClassificationSet::new();
        set.record(
            "all",
            &ScoreResult {
                total_score: 6,
                is_data_quality_issue: true,
                has_fever: true,
                ..Default::default()
            },
        );
        set.record("none", &ScoreResult::default());
        set.record(
            "fever-only",
            &ScoreResult {
                total_score: 2,
                has_fever: true,
                ..Default::default()
            },
        );

        assert_eq!(set.high_risk, vec!["all"]);
        assert_eq!(set.fever, vec!["all", "fever-only"]);
        assert_eq!(set.data_quality, vec!["all"]);
    }

    #[test]
    fn test_wire_field_names() {
        let set = ClassificationSet {
            high_risk: vec!["p1".into()],
            fever: vec!["p1".into(), "p3".into()],
            data_quality: vec![],
        };
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(
            value,
            json!({
                "high_risk_patients": ["p1"],
                "fever_patients": ["p1", "p3"],
                "data_quality_issues": []
            })
        );
    }
}

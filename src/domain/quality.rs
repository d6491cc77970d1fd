use serde::{Deserialize, Serialize};
use std::fmt;

/// A quality check an analysis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssue {
    LowSentimentConfidence,
    LowExtractionConfidence,
    LowKeywordDiversity,
    SlowProcessing,
}

impl QualityIssue {
    pub fn recommendation(&self) -> &'static str {
        match self {
            QualityIssue::LowSentimentConfidence => {
                "Sentiment classifier accuracy needs improvement"
            }
            QualityIssue::LowExtractionConfidence => {
                "Security extraction accuracy needs improvement"
            }
            QualityIssue::LowKeywordDiversity => "Keyword extraction needs broader coverage",
            QualityIssue::SlowProcessing => "Processing performance needs optimization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
}

impl QualityGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => QualityGrade::APlus,
            80..=89 => QualityGrade::A,
            70..=79 => QualityGrade::BPlus,
            60..=69 => QualityGrade::B,
            50..=59 => QualityGrade::C,
            _ => QualityGrade::D,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGrade::APlus => "A+",
            QualityGrade::A => "A",
            QualityGrade::BPlus => "B+",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
        };
        f.write_str(s)
    }
}

/// Graded assessment of one analysis, 0 to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: u8,
    pub grade: QualityGrade,
    pub issues: Vec<QualityIssue>,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    pub fn new(score: u8, issues: Vec<QualityIssue>) -> Self {
        let recommendations = issues
            .iter()
            .map(|i| i.recommendation().to_string())
            .collect();
        Self {
            score,
            grade: QualityGrade::from_score(score),
            issues,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(QualityGrade::from_score(100), QualityGrade::APlus);
        assert_eq!(QualityGrade::from_score(90), QualityGrade::APlus);
        assert_eq!(QualityGrade::from_score(89), QualityGrade::A);
        assert_eq!(QualityGrade::from_score(80), QualityGrade::A);
        assert_eq!(QualityGrade::from_score(75), QualityGrade::BPlus);
        assert_eq!(QualityGrade::from_score(60), QualityGrade::B);
        assert_eq!(QualityGrade::from_score(50), QualityGrade::C);
        assert_eq!(QualityGrade::from_score(49), QualityGrade::D);
        assert_eq!(QualityGrade::from_score(0), QualityGrade::D);
    }

    #[test]
    fn test_report_lists_recommendation_per_issue() {
        let report = QualityReport::new(
            50,
            vec![
                QualityIssue::LowKeywordDiversity,
                QualityIssue::SlowProcessing,
            ],
        );
        assert_eq!(report.grade, QualityGrade::C);
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(
            report.recommendations[1],
            "Processing performance needs optimization"
        );
    }

    #[test]
    fn test_grade_serializes_with_plus_sign() {
        let json = serde_json::to_string(&QualityGrade::BPlus).unwrap();
        assert_eq!(json, "\"B+\"");
        assert_eq!(QualityGrade::APlus.to_string(), "A+");
    }
}

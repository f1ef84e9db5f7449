use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted equation-solving submission and its outcome.
///
/// Created in the `processing` state when a user submits an image; moved
/// exactly once to `solved` or `error` by the solve pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    /// Owner reference supplied by the caller, if any.
    pub owner_id: Option<String>,
    /// Where the source image can be fetched from.
    pub image_url: String,
    pub status: ProblemStatus,
    /// Plain-text equation produced by the recognition step.
    pub recognized_eq: Option<String>,
    /// LaTeX rendering of the recognized equation.
    pub latex_form: Option<String>,
    /// Step index ("1", "2", ...) to explanation text.
    #[serde(default)]
    pub steps: BTreeMap<String, String>,
    pub final_answer: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Problem {
    /// Create a fresh problem in the `processing` state.
    pub fn new(owner_id: Option<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            image_url: image_url.into(),
            status: ProblemStatus::Processing,
            recognized_eq: None,
            latex_form: None,
            steps: BTreeMap::new(),
            final_answer: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the record has left the `processing` state.
    pub fn is_terminal(&self) -> bool {
        self.status != ProblemStatus::Processing
    }
}

/// Lifecycle state of a problem record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
    #[default]
    Processing,
    Solved,
    Error,
}

impl ProblemStatus {
    /// Storage/wire representation (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemStatus::Processing => "processing",
            ProblemStatus::Solved => "solved",
            ProblemStatus::Error => "error",
        }
    }

    /// Parse the storage representation back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(ProblemStatus::Processing),
            "solved" => Some(ProblemStatus::Solved),
            "error" => Some(ProblemStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome of the solving step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Solution {
    /// LaTeX form of the equation.
    pub latex: String,
    /// Step index ("1", "2", ...) to explanation text.
    #[serde(default)]
    pub steps: BTreeMap<String, String>,
    /// Final answer text.
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_problem_is_processing() {
        let problem = Problem::new(Some("user-1".into()), "/media/eq.png");
        assert_eq!(problem.status, ProblemStatus::Processing);
        assert!(!problem.id.is_nil());
        assert!(!problem.is_terminal());
        assert!(problem.recognized_eq.is_none());
        assert!(problem.steps.is_empty());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ProblemStatus::Processing,
            ProblemStatus::Solved,
            ProblemStatus::Error,
        ] {
            assert_eq!(ProblemStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProblemStatus::parse("bogus"), None);
    }

    #[test]
    fn test_status_wire_format_is_lowercase() {
        let json = serde_json::to_string(&ProblemStatus::Solved).unwrap();
        assert_eq!(json, "\"solved\"");
        let back: ProblemStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(back, ProblemStatus::Error);
    }

    #[test]
    fn test_problem_serialization() {
        let mut problem = Problem::new(None, "https://example.com/eq.jpg");
        problem.steps.insert("1".into(), "Move 6 to the right".into());
        let json = serde_json::to_string(&problem).unwrap();
        let back: Problem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, problem.id);
        assert_eq!(back.steps.get("1").map(String::as_str), Some("Move 6 to the right"));
    }
}

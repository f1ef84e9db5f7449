//! Best-effort extraction of a structured solution from model output.
//!
//! The solving step asks for a JSON object with keys `latex`, `steps`, and
//! `answer`, but models routinely wrap it in a markdown fence or ignore the
//! format entirely. Extraction therefore tries the fenced object, then the
//! whole response as JSON, and finally wraps the raw text as a single step.
//! It never fails.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use snapsolve_core::Solution;

/// Matches a JSON object inside a markdown code fence, `json` tag optional.
static FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*\})\s*```").unwrap());

#[derive(Deserialize)]
struct RawSolution {
    #[serde(default)]
    latex: Option<String>,
    #[serde(default)]
    steps: BTreeMap<String, String>,
    #[serde(default)]
    answer: Option<String>,
}

/// Turn free-form solving output into a `Solution`.
///
/// Missing or empty `latex` falls back to the recognized equation, missing
/// `answer` to a generic completion note.
pub fn extract_solution(raw: &str, recognized_eq: &str) -> Solution {
    let candidate = FENCE_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_string());

    match serde_json::from_str::<RawSolution>(&candidate) {
        Ok(parsed) => Solution {
            latex: parsed
                .latex
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| recognized_eq.to_string()),
            steps: parsed.steps,
            answer: parsed
                .answer
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| "Solution completed".to_string()),
        },
        Err(e) => {
            warn!(error = %e, "Solution output was not valid JSON, wrapping raw text");
            let mut steps = BTreeMap::new();
            steps.insert("1".to_string(), raw.trim().to_string());
            Solution {
                latex: recognized_eq.to_string(),
                steps,
                answer: "See steps for solution".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EQ: &str = "x^2 + 5x + 6 = 0";

    #[test]
    fn test_parses_bare_json() {
        let raw = r#"{"latex": "x^2 + 5x + 6 = 0", "steps": {"1": "Factor"}, "answer": "x = -2 or x = -3"}"#;
        let solution = extract_solution(raw, EQ);
        assert_eq!(solution.latex, "x^2 + 5x + 6 = 0");
        assert_eq!(solution.steps.get("1").map(String::as_str), Some("Factor"));
        assert_eq!(solution.answer, "x = -2 or x = -3");
    }

    #[test]
    fn test_parses_fenced_json_with_tag() {
        let raw = "Here you go:\n```json\n{\"latex\": \"2x = 4\", \"steps\": {\"1\": \"Divide by 2\"}, \"answer\": \"x = 2\"}\n```\nHope that helps!";
        let solution = extract_solution(raw, "2x = 4");
        assert_eq!(solution.answer, "x = 2");
        assert_eq!(solution.steps.len(), 1);
    }

    #[test]
    fn test_parses_fenced_json_without_tag() {
        let raw = "```\n{\"answer\": \"x = 7\"}\n```";
        let solution = extract_solution(raw, EQ);
        assert_eq!(solution.answer, "x = 7");
    }

    #[test]
    fn test_missing_keys_get_defaults() {
        let solution = extract_solution(r#"{"steps": {"1": "done"}}"#, EQ);
        assert_eq!(solution.latex, EQ);
        assert_eq!(solution.answer, "Solution completed");
    }

    #[test]
    fn test_empty_latex_falls_back_to_recognized() {
        let solution = extract_solution(r#"{"latex": "  ", "answer": "x = 1"}"#, EQ);
        assert_eq!(solution.latex, EQ);
    }

    #[test]
    fn test_prose_falls_back_to_single_step() {
        let raw = "The roots are x = -2 and x = -3.";
        let solution = extract_solution(raw, EQ);
        assert_eq!(solution.latex, EQ);
        assert_eq!(solution.steps.get("1").map(String::as_str), Some(raw));
        assert_eq!(solution.answer, "See steps for solution");
    }

    #[test]
    fn test_empty_output_falls_back() {
        let solution = extract_solution("", EQ);
        assert_eq!(solution.steps.get("1").map(String::as_str), Some(""));
        assert_eq!(solution.answer, "See steps for solution");
    }
}

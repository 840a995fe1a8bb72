//! Reply parsing: split the model's free-text reply on the marker contract.
//!
//! The grading prompt instructs the model to bracket its answer with literal
//! markers (see [`crate::prompts`]). Parsing is an explicit two-stage
//! split-and-trim over those markers — no pattern sublanguage — so every
//! failure mode (marker absent, markers out of order) is enumerable:
//!
//! * `extracted_info` — strictly between the first `===START===` and the
//!   first `Overall Score:` that follows it, trimmed. Empty when the markers
//!   are missing or appear out of order.
//! * `evaluation_response` — strictly between the first `Overall Score:` and
//!   the first `Summary Feedback:` that follows it, trimmed.
//!
//! First-match semantics throughout: if the model repeats a marker, only the
//! first span counts.

use crate::output::EvaluationResult;
use crate::prompts::{OVERALL_SCORE_MARKER, START_MARKER, SUMMARY_FEEDBACK_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

/// Parse the raw model reply into the two result fields.
///
/// Either field is the empty string when its marker pair is not found in
/// order; callers treat that as a parse failure, never as partial success.
pub fn parse_reply(reply: &str) -> EvaluationResult {
    EvaluationResult {
        extracted_info: between(reply, START_MARKER, OVERALL_SCORE_MARKER)
            .unwrap_or_default()
            .to_string(),
        evaluation_response: between(reply, OVERALL_SCORE_MARKER, SUMMARY_FEEDBACK_MARKER)
            .unwrap_or_default()
            .to_string(),
    }
}

/// The text strictly between the first `start` and the first `end` after it,
/// trimmed. None when either marker is missing or they are out of order.
fn between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = haystack.find(start)? + start.len();
    let len = haystack[from..].find(end)?;
    Some(haystack[from..from + len].trim())
}

// ── Score consistency (report-only) ──────────────────────────────────────

/// Comparison of the per-question score sum against the reported total.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCheck {
    /// Sum of every `- Score:` line in the per-question breakdown.
    pub per_question_total: f64,
    /// The total the model reported on its `Overall Score:` line.
    pub reported_overall: f64,
}

impl ScoreCheck {
    /// Whether the model's arithmetic adds up (within rounding slack).
    pub fn consistent(&self) -> bool {
        (self.per_question_total - self.reported_overall).abs() < 0.01
    }
}

static RE_SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*-\s*Score:\s*(\d+(?:\.\d+)?)").unwrap());

static RE_FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Sum the per-question `- Score:` values and compare them to the overall
/// score. Returns None when either side yields no parseable number.
///
/// This check never rejects or mutates a reply; the pipeline only logs a
/// warning on mismatch.
pub fn check_score_consistency(result: &EvaluationResult) -> Option<ScoreCheck> {
    let mut matched = false;
    let mut total = 0.0f64;
    for caps in RE_SCORE_LINE.captures_iter(&result.extracted_info) {
        if let Ok(v) = caps[1].parse::<f64>() {
            total += v;
            matched = true;
        }
    }
    if !matched {
        return None;
    }

    let overall = RE_FIRST_NUMBER
        .find(&result.evaluation_response)?
        .as_str()
        .parse::<f64>()
        .ok()?;

    Some(ScoreCheck {
        per_question_total: total,
        reported_overall: overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_reply() {
        let reply = "===START===\nFOO\nOverall Score: 7\nSummary Feedback: BAR\n===END===";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "FOO");
        assert_eq!(result.evaluation_response, "7");
    }

    #[test]
    fn missing_overall_score_empties_both_fields() {
        let reply = "===START===\nFOO\nSummary Feedback: BAR\n===END===";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "");
        assert_eq!(result.evaluation_response, "");
        assert!(!result.is_complete());
    }

    #[test]
    fn missing_start_marker_empties_extracted_info() {
        let reply = "preamble\nOverall Score: 9\nSummary Feedback: fine\n";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "");
        assert_eq!(result.evaluation_response, "9");
        assert!(!result.is_complete());
    }

    #[test]
    fn markers_out_of_order_yield_empty_field() {
        // Overall Score before ===START===: no span exists in order.
        let reply = "Overall Score: 3\n===START===\nbody\nSummary Feedback: x\n";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "");
    }

    #[test]
    fn repeated_start_marker_uses_first_span() {
        let reply = "===START===\nfirst\nOverall Score: 5\nSummary Feedback: a\n\
                     ===START===\nsecond\nOverall Score: 6\nSummary Feedback: b\n";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "first");
        assert_eq!(result.evaluation_response, "5");
    }

    #[test]
    fn fields_are_trimmed() {
        let reply = "===START===\n\n  Question 1 ...  \n\nOverall Score:   12 / 20  \nSummary Feedback: ok\n";
        let result = parse_reply(reply);
        assert_eq!(result.extracted_info, "Question 1 ...");
        assert_eq!(result.evaluation_response, "12 / 20");
    }

    #[test]
    fn multiline_extracted_info_is_preserved() {
        let reply = "===START===\nQuestion 1 (Marks: 5)::\nWhat is a borrow?\n\n\
                     Evaluation:\n- Score: 4\n- Suggestions: None\n\n\
                     Overall Score: 4 out of 5\nSummary Feedback: solid\n===END===";
        let result = parse_reply(reply);
        assert!(result.extracted_info.contains("Question 1 (Marks: 5)::"));
        assert!(result.extracted_info.contains("- Score: 4"));
        assert_eq!(result.evaluation_response, "4 out of 5");
        assert!(result.is_complete());
    }

    #[test]
    fn score_check_consistent_sum() {
        let result = EvaluationResult {
            extracted_info: "- Score: 3\nx\n- Score: 4.5\n- Score: 2.5".into(),
            evaluation_response: "10 out of 20".into(),
        };
        let check = check_score_consistency(&result).unwrap();
        assert_eq!(check.per_question_total, 10.0);
        assert_eq!(check.reported_overall, 10.0);
        assert!(check.consistent());
    }

    #[test]
    fn score_check_flags_mismatch() {
        let result = EvaluationResult {
            extracted_info: "- Score: 3\n- Score: 4".into(),
            evaluation_response: "9/10".into(),
        };
        let check = check_score_consistency(&result).unwrap();
        assert!(!check.consistent());
    }

    #[test]
    fn score_check_none_without_score_lines() {
        let result = EvaluationResult {
            extracted_info: "no scores here".into(),
            evaluation_response: "7".into(),
        };
        assert!(check_score_consistency(&result).is_none());
    }

    #[test]
    fn score_check_none_without_numeric_overall() {
        let result = EvaluationResult {
            extracted_info: "- Score: 3".into(),
            evaluation_response: "excellent work".into(),
        };
        assert!(check_score_consistency(&result).is_none());
    }
}

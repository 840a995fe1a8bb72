//! Output types returned by the evaluation pipeline.

use serde::{Deserialize, Serialize};

/// The two fields parsed out of the model's reply.
///
/// `extracted_info` is the per-question breakdown (everything between the
/// `===START===` marker and the `Overall Score:` line); `evaluation_response`
/// is the overall score text (between `Overall Score:` and
/// `Summary Feedback:`). Both are trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Question-by-question extraction and scoring from the model reply.
    pub extracted_info: String,
    /// The overall score reported by the model.
    pub evaluation_response: String,
}

impl EvaluationResult {
    /// True when both fields were successfully extracted from the reply.
    ///
    /// An incomplete result is a parse failure; the pipeline never returns
    /// one field without the other.
    pub fn is_complete(&self) -> bool {
        !self.extracted_info.is_empty() && !self.evaluation_response.is_empty()
    }
}

/// Result of a full URL-to-evaluation run, with timing and extraction stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutput {
    /// The parsed evaluation.
    pub result: EvaluationResult,
    /// Run statistics.
    pub stats: EvaluationStats,
}

/// Statistics for one evaluation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Number of pages in the document.
    pub page_count: usize,
    /// Characters of text handed to the model.
    pub extracted_chars: usize,
    /// Whether the OCR fallback was used (no native text layer).
    pub used_ocr: bool,
    /// Wall-clock duration of the document fetch in milliseconds.
    pub fetch_duration_ms: u64,
    /// Wall-clock duration of text acquisition in milliseconds.
    pub extract_duration_ms: u64,
    /// Wall-clock duration of the completion call in milliseconds.
    pub llm_duration_ms: u64,
    /// Total wall-clock duration in milliseconds.
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_round_trips_through_json() {
        let result = EvaluationResult {
            extracted_info: "Question 1 (Marks: 5)::\nWhat is Rust?".into(),
            evaluation_response: "4 out of 5".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn stats_default_is_zeroed() {
        let stats = EvaluationStats::default();
        assert_eq!(stats.page_count, 0);
        assert!(!stats.used_ocr);
    }
}

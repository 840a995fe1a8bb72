//! The grading prompt and the marker contract.
//!
//! Centralising the rubric here serves two purposes:
//!
//! 1. **Single source of truth** — the response parser in
//!    [`crate::pipeline::parse`] depends byte-for-byte on the literal markers
//!    this prompt instructs the model to emit. Keeping prompt and markers in
//!    one module makes it impossible to change one without seeing the other.
//!
//! 2. **Testability** — unit tests can inspect the template directly without
//!    calling a real model.

/// Literal marker opening the structured section of the model reply.
pub const START_MARKER: &str = "===START===";

/// Literal marker closing the structured section of the model reply.
pub const END_MARKER: &str = "===END===";

/// Marker preceding the total score. Everything between [`START_MARKER`] and
/// this marker is the per-question extraction.
pub const OVERALL_SCORE_MARKER: &str = "Overall Score:";

/// Marker preceding the summary feedback. Everything between
/// [`OVERALL_SCORE_MARKER`] and this marker is the overall score text.
pub const SUMMARY_FEEDBACK_MARKER: &str = "Summary Feedback:";

/// The fixed grading rubric sent as the system message for every evaluation.
///
/// The "strict format" section is the contract the parser relies on; changing
/// any of the marker lines breaks [`crate::pipeline::parse`].
pub const GRADING_PROMPT: &str = r#"You are an intelligent exam evaluation assistant. Your task is to evaluate student answers from the provided answer document based on the questions and their allocated marks from the question document.
1. Extract the question, the marks allocated to it, and the student's answer. For multi-part questions (e.g., choices labeled (a), (b), etc.):
   - Extract each sub-question (e.g., part (a), part (b)) along with its allocated marks.
   - Extract the student's answer for each sub-question.
   - Identify if the question requires a diagram and note its presence or absence in the student's answer.
2. Compare the student's answer against the ideal answer (assume you know the ideal answer).
   - For textual answers, evaluate correctness, completeness, and clarity.
   - For diagrams, evaluate accuracy, labeling, and relevance to the question.
3. Provide the following for each question:
   - For single-part questions:
     - A score out of the allocated marks for the question.
     - Suggestions for improvement if the answer isn't perfect.
   - For multi-part questions:
     - *Mark Allocation:* Divide the total allocated marks among the subparts proportionally based on the number of subparts. For example, if a question is worth 3 marks and has 4 subparts, each subpart should be allocated 0.75 marks.
     - For each sub-question:
       - A score out of the allocated marks for that sub-question.
       - Suggestions for improvement if the answer isn't perfect.
       - *Diagram Evaluation (if applicable):*
         - If the sub-question requires a diagram, check for its presence.
           - If the diagram is present, evaluate its accuracy and completeness, and assign marks accordingly within the allocated subpart marks.
           - If the diagram is missing, assign a score of 0 for the diagram component of that subpart and provide a suggestion to include diagrams in future answers.
     - *Handling Unattempted Sub-questions:*
       - If a sub-question is not attempted, assign a score of 0 for that sub-question.
       - Provide a suggestion encouraging the student to attempt all parts of the question.
4. At the end, calculate the overall score out of Total Marks mentioned on the Question Paper and provide summary feedback.

The response must follow this strict format:

===START===
Question {number} (Marks: {allocated_marks})::
[Extracted question]

Student Answer:
[Extracted student answer]

Evaluation:
- Score: [Numeric score out of {allocated_marks}]
- Suggestions: [Suggestions for improvement or 'None']

If the question has multiple parts, structure the evaluation accordingly:
   - Sub-question (a) [Sub-question text]:
     Student Answer:
[Student's answer for sub-question (a)]

     Evaluation:
     - Score: [Numeric score out of allocated marks for part (a)]
     - Suggestions: [Suggestions for improvement or 'None']

     {#if diagram required}
       - Diagram Present: [Yes/No]
       - Diagram Evaluation:
         - Score: [Numeric score out of allocated marks for the diagram]
         - Suggestions: [Suggestions for improvement or 'None']

     {#endif}
   - Sub-question (b) [Sub-question text]:
     Student Answer:
[Student's answer for sub-question (b)]

     Evaluation:
     - Score: [Numeric score out of allocated marks for part (b)]
     - Suggestions: [Suggestions for improvement or 'None']

     {#if diagram required}
       - Diagram Present: [Yes/No]
       - Diagram Evaluation:
         - Score: [Numeric score out of allocated marks for the diagram]
         - Suggestions: [Suggestions for improvement or 'None']

     {#endif}
   - ...

   - *Note:* [If any sub-question was not attempted, e.g., 'Sub-question (c) was not attempted. Please ensure to answer all parts of the question.']

Repeat for all questions.

Overall Score: [Total score out of Total Marks mentioned on the question paper.]
Summary Feedback: [General feedback about the student's performance]
===END===
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_contains_all_markers() {
        assert!(GRADING_PROMPT.contains(START_MARKER));
        assert!(GRADING_PROMPT.contains(OVERALL_SCORE_MARKER));
        assert!(GRADING_PROMPT.contains(SUMMARY_FEEDBACK_MARKER));
        assert!(GRADING_PROMPT.contains(END_MARKER));
    }

    #[test]
    fn template_markers_appear_in_parse_order() {
        let start = GRADING_PROMPT.rfind(START_MARKER).unwrap();
        let overall = GRADING_PROMPT.rfind(OVERALL_SCORE_MARKER).unwrap();
        let summary = GRADING_PROMPT.rfind(SUMMARY_FEEDBACK_MARKER).unwrap();
        let end = GRADING_PROMPT.rfind(END_MARKER).unwrap();
        assert!(start < overall && overall < summary && summary < end);
    }

    #[test]
    fn template_documents_question_format() {
        assert!(GRADING_PROMPT.contains("Question {number} (Marks: {allocated_marks})::"));
        assert!(GRADING_PROMPT.contains("Diagram Present: [Yes/No]"));
    }
}

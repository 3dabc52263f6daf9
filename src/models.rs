//! Data models for the analysis pipeline.
//!
//! This module contains the structures that flow between the prompt
//! builder, the model gateway, the response interpreter and the
//! interaction store, plus their JSON wire shapes.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Marker a client prepends to free-form health questions.
pub const QUESTION_MARKER: &str = "User question:";

/// Kind of input, deciding which prompt template is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    /// A pasted laboratory report; the model explains each test.
    LabReport,
    /// A general health question; no per-test explanations.
    Question,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::LabReport => write!(f, "lab report"),
            PromptKind::Question => write!(f, "question"),
        }
    }
}

/// Where a test result sits relative to its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TestStatus {
    Normal,
    High,
    Low,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Normal => write!(f, "Normal"),
            TestStatus::High => write!(f, "High"),
            TestStatus::Low => write!(f, "Low"),
        }
    }
}

impl TestStatus {
    /// Returns an emoji representation of the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            TestStatus::Normal => "🟢",
            TestStatus::High => "🔺",
            TestStatus::Low => "🔻",
        }
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "normal" | "within range" | "in range" => return Ok(TestStatus::Normal),
            "high" | "elevated" | "above range" => return Ok(TestStatus::High),
            "low" | "decreased" | "below range" => return Ok(TestStatus::Low),
            _ => {}
        }

        // "Slightly high", "critically low" and the like.
        let high = ["high", "elevated", "above"].iter().any(|w| s.contains(w));
        let low = ["low", "decreased", "below"].iter().any(|w| s.contains(w));
        match (high, low) {
            (true, false) => Ok(TestStatus::High),
            (false, true) => Ok(TestStatus::Low),
            _ => Err(format!("unknown test status: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for TestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Plain-language explanation of a single lab test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExplanation {
    /// Name of the test as printed on the report (may be empty).
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_name: String,
    /// Measured value, usually with units.
    #[serde(default, deserialize_with = "string_or_number")]
    pub result: String,
    /// Reference range printed next to the value.
    #[serde(default, deserialize_with = "string_or_number")]
    pub reference_range: String,
    /// Unrecognised or missing values read as `Normal`.
    #[serde(default = "default_status", deserialize_with = "lenient_status")]
    pub status: TestStatus,
    /// What the test measures.
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    /// What this particular result means for the patient.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interpretation: String,
}

/// The fixed-shape educational answer returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_explanations")]
    pub explanations: Vec<TestExplanation>,
    #[serde(default, deserialize_with = "string_list")]
    pub key_findings: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disclaimer: String,
}

/// One completed analysis, as kept by the interaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Leading slice of the submitted text.
    pub report_text_preview: String,
    pub result: StructuredResult,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl Interaction {
    /// Creates an interaction stamped with the current wall-clock time.
    pub fn new(
        text: &str,
        result: StructuredResult,
        processing_time_ms: u64,
        preview_chars: usize,
    ) -> Self {
        Self {
            report_text_preview: preview(text, preview_chars),
            result,
            timestamp: Utc::now(),
            processing_time_ms,
        }
    }
}

/// How often a test name appeared across recorded explanations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCount {
    pub test: String,
    pub count: usize,
}

/// Summary statistics over the recorded interactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_reports: usize,
    pub common_tests: Vec<TestCount>,
    /// Mean processing time in milliseconds, rounded half-up.
    pub avg_processing_time: u64,
}

/// Returns the first `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Reads `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_status() -> TestStatus {
    TestStatus::Normal
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TestStatus, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    let status = match raw {
        Some(Value::String(s)) => s.parse().unwrap_or_else(|e| {
            tracing::debug!("{}, reading as Normal", e);
            TestStatus::Normal
        }),
        _ => TestStatus::Normal,
    };
    Ok(status)
}

/// Keeps the string entries of a list; `null` reads as empty.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Accepts `"13.5 g/dL"` as well as a bare `13.5`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Keeps the explanation entries that parse and drops the rest.
fn lenient_explanations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<TestExplanation>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = raw.len();

    let parsed: Vec<TestExplanation> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();

    if parsed.len() < total {
        tracing::debug!(
            "Dropped {} malformed explanation entries",
            total - parsed.len()
        );
    }

    Ok(parsed)
}

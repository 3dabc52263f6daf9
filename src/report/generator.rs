//! Markdown and JSON dashboard reports.
//!
//! This module renders the analytics snapshot and the interaction log
//! into a document an administrator can download or archive.

use crate::models::{AnalyticsSnapshot, Interaction, StructuredResult};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a dashboard report shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub analytics: &'a AnalyticsSnapshot,
    pub interactions: &'a [Interaction],
}

impl<'a> DashboardReport<'a> {
    pub fn new(analytics: &'a AnalyticsSnapshot, interactions: &'a [Interaction]) -> Self {
        Self {
            generated_at: Utc::now(),
            analytics,
            interactions,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport<'_>) -> String {
    let mut output = String::new();

    output.push_str("# HealthSense Dashboard Report\n\n");
    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_common_tests_section(report.analytics));
    output.push_str(&generate_interactions_section(report.interactions));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn generate_metadata_section(report: &DashboardReport<'_>) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Total Reports:** {}\n",
        report.analytics.total_reports
    ));
    section.push_str(&format!(
        "- **Average Processing Time:** {}ms\n",
        report.analytics.avg_processing_time
    ));
    section.push('\n');

    section
}

fn generate_common_tests_section(analytics: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Most Common Tests\n\n");

    if analytics.common_tests.is_empty() {
        section.push_str("No lab tests have been explained yet.\n\n");
        return section;
    }

    section.push_str("| Rank | Test | Count |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, entry) in analytics.common_tests.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            escape_table_cell(&entry.test),
            entry.count
        ));
    }
    section.push('\n');

    section
}

fn generate_interactions_section(interactions: &[Interaction]) -> String {
    let mut section = String::new();

    section.push_str("## Interactions\n\n");

    if interactions.is_empty() {
        section.push_str("No analyses have been recorded.\n\n");
        return section;
    }

    for (i, interaction) in interactions.iter().enumerate() {
        section.push_str(&generate_interaction_block(i + 1, interaction));
    }

    section
}

/// Generate a single interaction block.
fn generate_interaction_block(number: usize, interaction: &Interaction) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "### #{} - {}\n\n",
        number,
        interaction.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    block.push_str(&format!(
        "*Processing time: {}ms*\n\n",
        interaction.processing_time_ms
    ));

    // Previews may themselves contain triple backticks
    block.push_str("<details>\n<summary>Submitted text</summary>\n\n````\n");
    block.push_str(&interaction.report_text_preview);
    block.push_str("\n````\n</details>\n\n");

    block.push_str(&generate_result_block(&interaction.result));
    block.push_str("---\n\n");

    block
}

fn generate_result_block(result: &StructuredResult) -> String {
    let mut block = String::new();

    block.push_str(&format!("**Summary:** {}\n\n", result.summary));

    if !result.explanations.is_empty() {
        block.push_str("| Test | Result | Reference | Status |\n");
        block.push_str("|:---|:---|:---|:---:|\n");
        for e in &result.explanations {
            block.push_str(&format!(
                "| {} | {} | {} | {} {} |\n",
                escape_table_cell(&e.test_name),
                escape_table_cell(&e.result),
                escape_table_cell(&e.reference_range),
                e.status.emoji(),
                e.status
            ));
        }
        block.push('\n');
    }

    if !result.key_findings.is_empty() {
        block.push_str("**Key findings:**\n\n");
        for finding in &result.key_findings {
            block.push_str(&format!("- {}\n", finding));
        }
        block.push('\n');
    }

    block
}

fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by HealthSense. Content is educational and not medical advice.*\n");

    footer
}

//! Text and JSON rendering of a report.

use super::Report;

const BULLET_INDENT: &str = "   • ";
const EMPTY_PLACEHOLDER: &str = "none";

/// Render the report as human-readable text.
///
/// All five category sections are always emitted, in fixed order; empty
/// sections carry a `none` bullet so the shape never changes.
pub fn render(report: &Report) -> String {
    let title = format!("📊 Contribution Analysis for {}", report.author);
    let mut lines = vec![
        title,
        "=".repeat(report.author.chars().count() + 28),
        format!(
            "Commits analyzed: {} | Batches: {} ({} classified, {} failed, {} cancelled)",
            report.metadata.total_commits,
            report.metadata.batch_count,
            report.metadata.classified_batches,
            report.metadata.failed_batches.len(),
            report.metadata.cancelled_batches.len()
        ),
    ];

    for (category, bullets) in report.categories.iter() {
        lines.push(String::new());
        lines.push(format!("{} {}:", category.emoji(), category.label()));

        if bullets.is_empty() {
            lines.push(format!("{BULLET_INDENT}{EMPTY_PLACEHOLDER}"));
        }
        for bullet in bullets {
            lines.push(format!("{BULLET_INDENT}{bullet}"));
        }
    }

    if !report.metadata.failed_batches.is_empty() {
        lines.push(String::new());
        lines.push("⚠️ Failed batches:".to_string());
        for failure in &report.metadata.failed_batches {
            lines.push(format!(
                "{BULLET_INDENT}batch {} ({} commits): {}",
                failure.batch, failure.commits, failure.reason
            ));
        }
    }

    if !report.metadata.cancelled_batches.is_empty() {
        let ids: Vec<String> = report
            .metadata
            .cancelled_batches
            .iter()
            .map(|b| b.to_string())
            .collect();
        lines.push(String::new());
        lines.push(format!("⏱️ Cancelled batches: {}", ids.join(", ")));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

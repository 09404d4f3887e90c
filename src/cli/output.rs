//! CLI output formatting

use crate::core::config::TaskReport;
use crate::core::{AggregateFailure, Settlement, TaskFailure};
use crate::execution::SchedulingStrategy;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(progress_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress.set_style(progress_style.progress_chars("#>-"));
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Describe a scheduling strategy for display
pub fn format_strategy(strategy: SchedulingStrategy) -> String {
    match strategy {
        SchedulingStrategy::Sequential => style("serial").cyan().to_string(),
        SchedulingStrategy::Parallel | SchedulingStrategy::LimitedParallel(0) => {
            style("unbounded").cyan().to_string()
        }
        SchedulingStrategy::LimitedParallel(n) => style(format!("limit {}", n)).cyan().to_string(),
    }
}

/// Format a single settlement, as printed while a plan runs
pub fn format_settlement(settlement: &Settlement<TaskReport, String>, names: &[String]) -> String {
    let name = names
        .get(settlement.index)
        .map(String::as_str)
        .unwrap_or("?");
    let position = style(format!("[{}/{}]", settlement.finished, settlement.total)).dim();

    match &settlement.outcome {
        Ok(report) => format!(
            "{}{} {} {}",
            CHECK,
            position,
            style(name).bold(),
            style(format!("{}ms", report.latency_ms)).dim()
        ),
        Err(failure) => format!(
            "{}{} {} {}",
            CROSS,
            position,
            style(name).bold(),
            style(format_task_failure(failure)).red()
        ),
    }
}

/// Format a task failure for display
pub fn format_task_failure(failure: &TaskFailure<String>) -> String {
    match failure {
        TaskFailure::Failed(message) => message.clone(),
        TaskFailure::Panicked(message) => format!("panicked: {}", message),
        TaskFailure::Abandoned => "abandoned".to_string(),
    }
}

/// Format an aggregate failure, including discarded failures
pub fn format_aggregate_failure(failure: &AggregateFailure<String>, names: &[String]) -> String {
    let name_of = |index: usize| names.get(index).map(String::as_str).unwrap_or("?");

    let mut lines = vec![format!(
        "{}{} failed first: {}",
        CROSS,
        style(name_of(failure.index)).bold(),
        style(format_task_failure(&failure.failure)).red()
    )];

    for later in &failure.discarded {
        lines.push(format!(
            "   {}also failed: {}",
            style(name_of(later.index)).dim(),
            style(format_task_failure(&later.failure)).dim()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IndexedFailure;
    use chrono::Utc;

    fn names() -> Vec<String> {
        vec!["slow".to_string(), "quick".to_string()]
    }

    #[test]
    fn test_format_settlement() {
        let settlement = Settlement {
            index: 1,
            outcome: Ok(TaskReport {
                name: "quick".to_string(),
                latency_ms: 100,
            }),
            finished: 1,
            total: 2,
            settled_at: Utc::now(),
        };
        let line = format_settlement(&settlement, &names());
        assert!(line.contains("quick"));
        assert!(line.contains("100ms"));
        assert!(line.contains("[1/2]"));
    }

    #[test]
    fn test_format_aggregate_failure_lists_discarded() {
        let failure = AggregateFailure {
            index: 1,
            failure: TaskFailure::Failed("quick: disk full".to_string()),
            discarded: vec![IndexedFailure {
                index: 0,
                failure: TaskFailure::Failed("slow: timeout".to_string()),
            }],
        };
        let text = format_aggregate_failure(&failure, &names());
        assert!(text.contains("disk full"));
        assert!(text.contains("slow: timeout"));
    }

    #[test]
    fn test_format_strategy() {
        assert!(format_strategy(SchedulingStrategy::from_limit(0)).contains("unbounded"));
        assert!(format_strategy(SchedulingStrategy::from_limit(3)).contains("limit 3"));
    }
}

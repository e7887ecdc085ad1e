//! Deterministic text rendering of a sweep result.
//!
//! Rendering is kept separate from event recording so the report format is
//! testable without any sweep machinery. Line order: identity header,
//! per-region event lines in event order, inline region error lines, then
//! either the failure summary with every error restated or the success
//! summary. The restated error listing intentionally duplicates the inline
//! lines so failures are visible both in context and at the bottom.

use crate::types::{SweepEvent, SweepResult};

/// Render the consolidated sweep report, newline-joined and ready to hand
/// to a notifier.
pub fn build_report(result: &SweepResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Instance stop sweep for AWS account {}",
        result.account
    ));

    for outcome in &result.outcomes {
        for event in &outcome.events {
            lines.push(render_event(event));
        }
        if let Some(error) = &outcome.error {
            lines.push(format!(":x: {}", error));
        }
    }

    let errors = result.errors();
    if errors.is_empty() {
        lines.push(format!(
            ":white_check_mark: Sweep finished, {} instance(s) stopped.",
            result.stopped_count()
        ));
    } else {
        lines.push(format!("Sweep finished with {} error(s).", errors.len()));
        for error in errors {
            lines.push(format!(":x: {}", error));
        }
    }

    lines.join("\n")
}

fn render_event(event: &SweepEvent) -> String {
    match event {
        SweepEvent::Stopping {
            region,
            instance_id,
        } => format!("Stopping instance {} (region: {})", instance_id, region),
        SweepEvent::Stopped {
            region,
            instance_id,
        } => format!("Stopped instance {} (region: {})", instance_id, region),
        SweepEvent::SkippedExcluded {
            region,
            instance_id,
        } => format!(
            "Skipped instance {} due to exclusion tag (region: {})",
            instance_id, region
        ),
    }
}

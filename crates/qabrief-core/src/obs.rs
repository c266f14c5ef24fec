//! Structured lifecycle events for briefing runs.
//!
//! Every event carries an `event = "<name>"` field so log pipelines can
//! filter on it. Levels are `info!` except recoveries, which are `warn!`.
//! Verbosity follows `RUST_LOG` (see [`crate::telemetry::init_tracing`]).

use tracing::{info, warn};

/// RAII guard that keeps a validation-run span entered.
///
/// ```ignore
/// let _span = RunSpan::enter("2f1c...", "QA-7");
/// // every event below is tagged with run_id and ticket
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str, ticket: &str) -> Self {
        let span = tracing::info_span!("qabrief.run", run_id = %run_id, ticket = %ticket);
        Self {
            _span: span.entered(),
        }
    }
}

/// A ticket payload was flattened into a briefing.
pub fn emit_issue_simplified(key: &str, criteria: usize, comments: usize) {
    info!(
        event = "issue.simplified",
        key = %key,
        criteria = criteria,
        comments = comments,
    );
}

/// A model reply was parsed into steps using the named shape.
pub fn emit_steps_parsed(shape: &str, steps: usize) {
    info!(event = "steps.parsed", shape = %shape, steps = steps);
}

/// A model reply could not be used and a placeholder step was produced.
pub fn emit_steps_recovered(kind: &str) {
    warn!(event = "steps.recovered", kind = %kind);
}

/// A summary reply was rendered into a comment document.
pub fn emit_summary_rendered(sections: &[&str], cases: usize) {
    info!(
        event = "summary.rendered",
        sections = %sections.join(","),
        cases = cases,
    );
}

/// A validation run finished.
pub fn emit_run_finished(ticket: &str, steps: usize, failed: usize, duration_ms: u64) {
    info!(
        event = "run.finished",
        ticket = %ticket,
        steps = steps,
        failed = failed,
        duration_ms = duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitters_do_not_panic_without_subscriber() {
        let _span = RunSpan::enter("run-1", "QA-1");
        emit_issue_simplified("QA-1", 2, 1);
        emit_steps_parsed("array", 3);
        emit_steps_recovered("invalid_json");
        emit_summary_rendered(&["summary", "details"], 2);
        emit_run_finished("QA-1", 3, 0, 12);
    }
}

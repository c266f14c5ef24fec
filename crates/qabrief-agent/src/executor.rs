//! Step executors.

use async_trait::async_trait;
use qabrief_core::TestStep;
use tracing::info;

use crate::collaborators::{StepExecutor, StepOutcome};
use crate::error::AgentResult;

/// Executor that performs no browser work and reports every step as passed.
///
/// Stands in for a real UI driver so the rest of the pipeline (summary,
/// rendering, comment posting) can run end to end.
#[derive(Debug, Clone, Default)]
pub struct SimulatedExecutor {
    target_url: Option<String>,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the application URL the steps would run against.
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }
}

#[async_trait]
impl StepExecutor for SimulatedExecutor {
    async fn execute(&self, steps: &[TestStep]) -> AgentResult<Vec<StepOutcome>> {
        let target = self.target_url.as_deref().unwrap_or("<none>");
        Ok(steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                info!(target_url = %target, index = index, step = %step.step, "simulating step");
                StepOutcome::passed(step.clone())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_step_passes_in_order() {
        let steps = vec![TestStep::new("a", "1"), TestStep::new("b", "2")];
        let outcomes = SimulatedExecutor::new()
            .with_target_url("https://staging.example.com")
            .execute(&steps)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(StepOutcome::is_passed));
        assert_eq!(outcomes[1].step, steps[1]);
    }

    #[tokio::test]
    async fn test_no_steps_no_outcomes() {
        let outcomes = SimulatedExecutor::new().execute(&[]).await.unwrap();
        assert!(outcomes.is_empty());
    }
}

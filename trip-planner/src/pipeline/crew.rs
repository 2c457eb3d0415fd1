// Sequential crew: runs tasks in order, feeding declared context forward

use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info};

use super::state::RunState;
use crate::agents::{StageExecutionError, TravelAgents};
use crate::metrics;
use crate::models::{StageName, StageResult};
use crate::tasks::TaskSpec;

/// Output of a crew execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// One output per executed task, in task order.
    PerStageOutputs(Vec<(StageName, String)>),
    /// Only the final combined answer is available.
    SingleOutput(String),
}

#[async_trait]
pub trait Crew: Send + Sync {
    /// Executes `tasks` in order. Progress and each finished stage are written to `state`
    /// as they happen so partial results survive a later failure.
    async fn kickoff(
        &self,
        tasks: &[TaskSpec],
        state: &mut RunState,
    ) -> Result<ExecutionResult, StageExecutionError>;
}

pub struct SequentialCrew {
    agents: TravelAgents,
}

impl SequentialCrew {
    pub fn new(agents: TravelAgents) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl Crew for SequentialCrew {
    async fn kickoff(
        &self,
        tasks: &[TaskSpec],
        state: &mut RunState,
    ) -> Result<ExecutionResult, StageExecutionError> {
        let mut outputs: Vec<(StageName, String)> = Vec::with_capacity(tasks.len());

        for task in tasks {
            let agent = self.agents.for_role(task.agent);
            state.enter_stage(task.stage);
            state.note(format!("Running {} stage ({})", task.stage, task.agent));
            info!(stage = %task.stage, agent = %agent.profile().role, "stage started");

            let context: Vec<(StageName, &str)> = outputs
                .iter()
                .filter(|(stage, _)| task.context.contains(stage))
                .map(|(stage, text)| (*stage, text.as_str()))
                .collect();

            let started = Instant::now();
            let outcome = agent.perform(task, &context).await;
            let elapsed = started.elapsed();
            metrics::observe_stage(task.stage.as_str(), elapsed.as_secs_f64());

            let text = outcome.map_err(|source| {
                error!(stage = %task.stage, error = %source, "stage failed");
                StageExecutionError {
                    stage: task.stage,
                    source,
                }
            })?;

            info!(
                stage = %task.stage,
                elapsed_ms = elapsed.as_millis() as u64,
                output_len = text.len(),
                "stage finished"
            );
            state.record(task.stage, StageResult::Output(text.clone()));
            state.note(format!("Finished {} stage", task.stage));
            outputs.push((task.stage, text));
        }

        Ok(ExecutionResult::PerStageOutputs(outputs))
    }
}

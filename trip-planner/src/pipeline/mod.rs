//! Pipeline coordination.
//!
//! A run moves `Idle -> Preparing -> Running(research) -> Running(guide) ->
//! Running(planning)` and ends in `Completed` or `Failed`. Stages are strictly
//! sequential: planning consumes the research and guide outputs as context.
//!
//! The crew reports either one output per stage or a single combined answer.
//! Three outputs fill the three stage results; anything less puts the final
//! answer in the planning slot, marks the other two unavailable, and sets a
//! notice on the run. That degraded outcome still ends in `Completed`.

mod crew;
mod state;

pub use crew::{Crew, ExecutionResult, SequentialCrew};
pub use state::{PipelineState, RunState};

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::metrics;
use crate::models::{StageName, StageResult, TripRequest};
use crate::tasks::build_tasks;

pub const DEGRADED_NOTICE: &str =
    "Individual stage reports were not separately available; the complete plan is shown as the itinerary.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Degraded,
    Failed,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Degraded => "degraded",
            RunOutcome::Failed => "failed",
        }
    }
}

#[derive(Clone)]
pub struct Coordinator {
    crew: Arc<dyn Crew>,
}

impl Coordinator {
    pub fn new(crew: Arc<dyn Crew>) -> Self {
        Self { crew }
    }

    /// Runs the three stages for `request`, writing progress and results into `state`.
    pub async fn run(&self, request: TripRequest, state: &mut RunState) -> RunOutcome {
        let run_id = state.begin(request.clone());
        info!(
            %run_id,
            from = %request.from_city,
            destination = %request.destination_city,
            days = request.trip_duration(),
            "pipeline run started"
        );

        state.note("Setting up travel planning workflow");
        let tasks = build_tasks(&request);

        state.note("Starting travel agents workflow");
        let outcome = match self.crew.kickoff(&tasks, state).await {
            Ok(result) => apply_result(result, state),
            Err(e) => {
                state.fail(e.to_string());
                RunOutcome::Failed
            }
        };

        metrics::record_run(outcome.as_str());
        info!(
            %run_id,
            outcome = outcome.as_str(),
            degraded = state.is_degraded(),
            "pipeline run finished"
        );
        outcome
    }
}

fn apply_result(result: ExecutionResult, state: &mut RunState) -> RunOutcome {
    let final_output = match result {
        ExecutionResult::PerStageOutputs(outputs) if outputs.len() == StageName::ALL.len() => {
            for (stage, text) in outputs {
                state.record(stage, StageResult::Output(text));
            }
            state.note("All agents completed successfully");
            state.complete();
            return RunOutcome::Completed;
        }
        ExecutionResult::PerStageOutputs(outputs) => outputs.into_iter().last().map(|(_, text)| text),
        ExecutionResult::SingleOutput(text) => Some(text),
    };

    match final_output.filter(|text| !text.trim().is_empty()) {
        Some(text) => {
            warn!("crew returned fewer than three stage outputs; using the final answer");
            state.record(StageName::Research, StageResult::Unavailable);
            state.record(StageName::Guide, StageResult::Unavailable);
            state.record(StageName::Planning, StageResult::Output(text));
            state.notice = Some(DEGRADED_NOTICE.to_string());
            state.note("Travel plan generated as a single combined report");
            state.complete();
            RunOutcome::Degraded
        }
        None => {
            state.fail("planning stage failed: malformed response: crew produced no output");
            RunOutcome::Failed
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::agents::StageExecutionError;
    use crate::tasks::TaskSpec;

    /// Returns a fixed result and counts kickoffs.
    pub struct FixedCrew {
        pub result: ExecutionResult,
        pub calls: AtomicUsize,
    }

    impl FixedCrew {
        pub fn new(result: ExecutionResult) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Crew for FixedCrew {
        async fn kickoff(
            &self,
            _tasks: &[TaskSpec],
            _state: &mut RunState,
        ) -> Result<ExecutionResult, StageExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixedCrew;
    use super::*;
    use crate::agents::testing as agent_testing;
    use crate::llm::mock::ScriptedLlm;
    use crate::llm::{ChatReply, LlmError};
    use crate::tools::search::mock::CannedSearch;
    use chrono::NaiveDate;

    fn trip(destination: &str) -> TripRequest {
        TripRequest {
            from_city: "Paris".to_string(),
            destination_city: destination.to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            interests: "art".to_string(),
        }
    }

    fn coordinator(llm: ScriptedLlm) -> Coordinator {
        let agents = agent_testing::agents(Arc::new(llm), Arc::new(CannedSearch::new(3)));
        Coordinator::new(Arc::new(SequentialCrew::new(agents)))
    }

    fn text(state: &RunState, stage: StageName) -> Option<String> {
        state.result(stage).and_then(|r| r.text()).map(str::to_string)
    }

    #[tokio::test]
    async fn three_successful_stages_complete_the_run() {
        let coordinator = coordinator(ScriptedLlm::answering(&["research", "guide", "itinerary"]));
        let mut state = RunState::default();

        let outcome = coordinator.run(trip("Tokyo"), &mut state).await;
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(state.state, PipelineState::Completed);
        for stage in StageName::ALL {
            assert!(!text(&state, stage).unwrap().is_empty());
        }
        assert_eq!(text(&state, StageName::Planning).as_deref(), Some("itinerary"));
        assert!(state.notice.is_none());
        assert!(state.is_reportable());
    }

    #[tokio::test]
    async fn a_failing_stage_fails_the_run_and_keeps_partials() {
        let coordinator = coordinator(ScriptedLlm::new(vec![
            Ok(ChatReply::text("research")),
            Ok(ChatReply::text("guide")),
            Err(LlmError::Response("HTTP 500: upstream".to_string())),
        ]));
        let mut state = RunState::default();

        let outcome = coordinator.run(trip("Tokyo"), &mut state).await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(state.state, PipelineState::Failed);
        let error = state.error.clone().unwrap();
        assert!(error.starts_with("planning stage failed"));
        assert!(error.contains("HTTP 500: upstream"));
        assert_eq!(text(&state, StageName::Research).as_deref(), Some("research"));
        assert_eq!(text(&state, StageName::Guide).as_deref(), Some("guide"));
        assert!(state.result(StageName::Planning).is_none());
        assert!(!state.is_reportable());
    }

    #[tokio::test]
    async fn single_output_degrades_instead_of_failing() {
        let crew = Arc::new(FixedCrew::new(ExecutionResult::SingleOutput(
            "combined plan".to_string(),
        )));
        let coordinator = Coordinator::new(crew.clone());
        let mut state = RunState::default();

        let outcome = coordinator.run(trip("Tokyo"), &mut state).await;
        assert_eq!(outcome, RunOutcome::Degraded);
        assert_eq!(state.state, PipelineState::Completed);
        assert!(state.is_degraded());
        assert_eq!(text(&state, StageName::Planning).as_deref(), Some("combined plan"));
        assert_eq!(state.result(StageName::Research), Some(&StageResult::Unavailable));
        assert_eq!(state.result(StageName::Guide), Some(&StageResult::Unavailable));
        assert_eq!(crew.calls(), 1);
    }

    #[tokio::test]
    async fn short_output_list_uses_the_last_answer() {
        let crew = Arc::new(FixedCrew::new(ExecutionResult::PerStageOutputs(vec![
            (StageName::Research, "partial".to_string()),
            (StageName::Planning, "final".to_string()),
        ])));
        let mut state = RunState::default();

        let outcome = Coordinator::new(crew).run(trip("Tokyo"), &mut state).await;
        assert_eq!(outcome, RunOutcome::Degraded);
        assert_eq!(text(&state, StageName::Planning).as_deref(), Some("final"));
        assert_eq!(state.result(StageName::Research), Some(&StageResult::Unavailable));
    }

    #[tokio::test]
    async fn empty_output_fails() {
        let crew = Arc::new(FixedCrew::new(ExecutionResult::PerStageOutputs(Vec::new())));
        let mut state = RunState::default();
        let outcome = Coordinator::new(crew).run(trip("Tokyo"), &mut state).await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn rerun_overwrites_every_stage() {
        let coordinator = coordinator(ScriptedLlm::answering(&[
            "tokyo research",
            "tokyo guide",
            "tokyo plan",
            "osaka research",
            "osaka guide",
            "osaka plan",
        ]));
        let mut state = RunState::default();

        coordinator.run(trip("Tokyo"), &mut state).await;
        coordinator.run(trip("Osaka"), &mut state).await;

        for stage in StageName::ALL {
            let output = text(&state, stage).unwrap();
            assert!(output.starts_with("osaka"), "{stage}: {output}");
        }
        assert_eq!(state.request.unwrap().destination_city, "Osaka");
    }
}

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::models::{StageName, StageResult, TripRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Preparing,
    Running(StageName),
    Completed,
    Failed,
}

/// Per-session output of the most recent run. Cleared when a new run begins.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub run_id: Option<Uuid>,
    pub state: PipelineState,
    pub request: Option<TripRequest>,
    #[serde(rename = "stages", serialize_with = "serialize_results")]
    results: [Option<StageResult>; 3],
    /// Set when fewer than three stage outputs could be recovered.
    pub notice: Option<String>,
    pub error: Option<String>,
    pub log: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            run_id: None,
            state: PipelineState::Idle,
            request: None,
            results: [None, None, None],
            notice: None,
            error: None,
            log: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }
}

impl RunState {
    /// Drops everything from the previous run and enters `Preparing`.
    pub fn begin(&mut self, request: TripRequest) -> Uuid {
        let run_id = Uuid::new_v4();
        *self = RunState {
            run_id: Some(run_id),
            state: PipelineState::Preparing,
            request: Some(request),
            started_at: Some(Utc::now()),
            ..RunState::default()
        };
        run_id
    }

    pub fn enter_stage(&mut self, stage: StageName) {
        self.state = PipelineState::Running(stage);
    }

    pub fn record(&mut self, stage: StageName, result: StageResult) {
        self.results[stage.index()] = Some(result);
    }

    pub fn result(&self, stage: StageName) -> Option<&StageResult> {
        self.results[stage.index()].as_ref()
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn complete(&mut self) {
        self.state = PipelineState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.note(format!("ERROR: {}", message));
        self.error = Some(message);
        self.state = PipelineState::Failed;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }

    /// A run can be shown and exported once it has a planning result.
    pub fn is_reportable(&self) -> bool {
        self.state == PipelineState::Completed
            && matches!(self.result(StageName::Planning), Some(StageResult::Output(_)))
    }
}

fn serialize_results<S: Serializer>(
    results: &[Option<StageResult>; 3],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(results.len()))?;
    for stage in StageName::ALL {
        map.serialize_entry(stage.as_str(), &results[stage.index()])?;
    }
    map.end()
}

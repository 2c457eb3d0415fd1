use minijinja::Environment;
use serde::Serialize;

use crate::agents::AgentRole;
use crate::models::{StageName, TripForm};
use crate::pipeline::{PipelineState, RunState};

const INDEX: &str = "index.html";

/// HTML pages. Templates ending in `.html` are auto-escaped.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn index(&self, view: &PageView) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX)?.render(view)
    }
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub form: TripForm,
    pub error: Option<String>,
    pub busy: bool,
    pub run: Option<RunView>,
}

#[derive(Debug, Serialize)]
pub struct RunView {
    pub status: &'static str,
    pub failed: bool,
    pub reportable: bool,
    pub partial: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub log: Vec<String>,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub key: &'static str,
    pub title: &'static str,
    pub agent: &'static str,
    pub text: Option<String>,
}

impl RunView {
    /// `None` for a session that has never started a run.
    pub fn from_state(state: &RunState) -> Option<Self> {
        let status = match state.state {
            PipelineState::Idle => return None,
            PipelineState::Preparing => "preparing",
            PipelineState::Running(_) => "running",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };

        let sections: Vec<SectionView> = StageName::ALL
            .iter()
            .map(|&stage| SectionView {
                key: stage.as_str(),
                title: stage.section_title(),
                agent: agent_for(stage).label(),
                text: state
                    .result(stage)
                    .and_then(|r| r.text())
                    .map(str::to_string),
            })
            .collect();
        let failed = state.state == PipelineState::Failed;

        Some(RunView {
            status,
            failed,
            reportable: state.is_reportable(),
            partial: failed && sections.iter().any(|s| s.text.is_some()),
            notice: state.notice.clone(),
            error: state.error.clone(),
            log: state.log.clone(),
            sections,
        })
    }
}

fn agent_for(stage: StageName) -> AgentRole {
    match stage {
        StageName::Research => AgentRole::LocationExpert,
        StageName::Guide => AgentRole::GuideExpert,
        StageName::Planning => AgentRole::PlannerExpert,
    }
}

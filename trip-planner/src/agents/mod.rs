pub mod guide;
pub mod location;
pub mod planner;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{ChatMessage, ChatRequest, LlmClient, LlmError};
use crate::models::StageName;
use crate::tasks::TaskSpec;
use crate::tools::search::{SearchError, SearchWebTool, SEARCH_TOOL_NAME};

const MAX_PROMPT_LOG_CHARS: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    LocationExpert,
    GuideExpert,
    PlannerExpert,
}

impl AgentRole {
    pub fn label(self) -> &'static str {
        match self {
            AgentRole::LocationExpert => "Location Expert",
            AgentRole::GuideExpert => "Local Guide Expert",
            AgentRole::PlannerExpert => "Travel Planner Expert",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Static description of an agent: who it is and what it is after.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub role: AgentRole,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub allow_delegation: bool,
}

impl AgentProfile {
    fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role.label(),
            self.backstory,
            self.goal
        )
    }
}

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    /// Rounds of search calls allowed before a final answer is demanded.
    pub max_tool_rounds: usize,
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("language model error: {0}")]
    Llm(#[from] LlmError),
    #[error("search error: {0}")]
    Search(#[from] SearchError),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A stage failure, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageExecutionError {
    pub stage: StageName,
    #[source]
    pub source: StageError,
}

/// Capability bundle: a profile bound to the shared model backend and the search tool.
/// Holds no state between tasks.
#[derive(Clone)]
pub struct Agent {
    profile: AgentProfile,
    llm: Arc<dyn LlmClient>,
    search: SearchWebTool,
    settings: AgentSettings,
}

impl Agent {
    pub fn new(
        profile: AgentProfile,
        llm: Arc<dyn LlmClient>,
        search: SearchWebTool,
        settings: AgentSettings,
    ) -> Self {
        Self {
            profile,
            llm,
            search,
            settings,
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Works one task to a final answer, searching as often as the model asks
    /// within `max_tool_rounds`.
    pub async fn perform(
        &self,
        task: &TaskSpec,
        context: &[(StageName, &str)],
    ) -> Result<String, StageError> {
        let user_prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
You MUST return the actual complete content as the final answer, not a summary.",
            task.render(context),
            task.expected_output
        );
        info!(
            agent = %self.profile.role,
            stage = %task.stage,
            context_count = context.len(),
            "agent starting task"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(prompt = %truncate_for_log(&user_prompt, MAX_PROMPT_LOG_CHARS), "agent prompt");
        }

        let mut messages = vec![
            ChatMessage::system(self.profile.system_prompt()),
            ChatMessage::user(user_prompt),
        ];

        for round in 0..=self.settings.max_tool_rounds {
            let offer_tools = round < self.settings.max_tool_rounds;
            let request = ChatRequest {
                model: self.settings.model.clone(),
                temperature: self.settings.temperature,
                messages: messages.clone(),
                tools: if offer_tools {
                    vec![SearchWebTool::definition()]
                } else {
                    Vec::new()
                },
            };
            let reply = self.llm.chat(request).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                if answer.trim().is_empty() {
                    return Err(StageError::MalformedResponse(format!(
                        "{} returned an empty answer",
                        self.profile.role
                    )));
                }
                info!(
                    agent = %self.profile.role,
                    rounds = round,
                    answer_len = answer.len(),
                    "agent finished task"
                );
                return Ok(answer);
            }

            if !offer_tools {
                return Err(StageError::MalformedResponse(format!(
                    "{} kept calling tools after {} rounds",
                    self.profile.role, self.settings.max_tool_rounds
                )));
            }

            messages.push(ChatMessage::assistant_tool_calls(
                reply.content.clone(),
                reply.tool_calls.clone(),
            ));
            for call in &reply.tool_calls {
                if call.name != SEARCH_TOOL_NAME {
                    return Err(StageError::MalformedResponse(format!(
                        "unknown tool requested: {}",
                        call.name
                    )));
                }
                let result = self.search.invoke(&call.arguments).await?;
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        Err(StageError::MalformedResponse(format!(
            "{} produced no final answer",
            self.profile.role
        )))
    }
}

/// The three agents of the travel crew.
#[derive(Clone)]
pub struct TravelAgents {
    pub location: Agent,
    pub guide: Agent,
    pub planner: Agent,
}

impl TravelAgents {
    pub fn new(llm: Arc<dyn LlmClient>, search: SearchWebTool, settings: AgentSettings) -> Self {
        Self {
            location: Agent::new(location::profile(), llm.clone(), search.clone(), settings.clone()),
            guide: Agent::new(guide::profile(), llm.clone(), search.clone(), settings.clone()),
            planner: Agent::new(planner::profile(), llm, search, settings),
        }
    }

    pub fn for_role(&self, role: AgentRole) -> &Agent {
        match role {
            AgentRole::LocationExpert => &self.location,
            AgentRole::GuideExpert => &self.guide,
            AgentRole::PlannerExpert => &self.planner,
        }
    }
}

fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}

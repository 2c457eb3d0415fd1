use serde::Serialize;
use tracing::info;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use super::AppState;
use crate::error::reject;
use crate::models::TripForm;
use crate::pipeline::{RunOutcome, RunState};

#[derive(Debug, Serialize)]
pub struct PlanResponse<'a> {
    pub outcome: RunOutcome,
    pub run: &'a RunState,
}

/// JSON pipeline run. Each call gets its own RunState; nothing is kept after the response.
pub async fn handle_plan(form: TripForm, app: AppState) -> Result<impl Reply, Rejection> {
    let request = form.validate().map_err(reject)?;
    info!(destination = %request.destination_city, "api plan request");

    let mut state = RunState::default();
    let outcome = app.coordinator.run(request, &mut state).await;

    let status = match outcome {
        RunOutcome::Failed => StatusCode::BAD_GATEWAY,
        RunOutcome::Completed | RunOutcome::Degraded => StatusCode::OK,
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&PlanResponse {
            outcome,
            run: &state,
        }),
        status,
    ))
}

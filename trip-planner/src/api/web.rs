use chrono::Local;
use tracing::{info, warn};
use uuid::Uuid;
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use warp::http::{Response, StatusCode};
use warp::{Rejection, Reply};

use super::pages::{PageView, RunView};
use super::AppState;
use crate::error::{reject, ApiError};
use crate::models::TripForm;
use crate::report::{CombinedReport, ExportFormat};
use crate::session::session_cookie;

fn page(html: String, status: StatusCode, session_id: Uuid) -> impl Reply {
    warp::reply::with_header(
        warp::reply::with_status(warp::reply::html(html), status),
        SET_COOKIE,
        session_cookie(session_id),
    )
}

pub async fn handle_index(cookie: Option<String>, app: AppState) -> Result<impl Reply, Rejection> {
    let (session_id, state) = app.sessions.get_or_create(cookie.as_deref()).await;

    // A run in flight holds the session lock; don't wait on it just to draw the form.
    let view = match state.try_lock() {
        Ok(state) => PageView {
            form: state
                .request
                .as_ref()
                .map(TripForm::from)
                .unwrap_or_else(|| TripForm::with_defaults(Local::now().date_naive())),
            error: None,
            busy: false,
            run: RunView::from_state(&state),
        },
        Err(_) => PageView {
            form: TripForm::with_defaults(Local::now().date_naive()),
            error: None,
            busy: true,
            run: None,
        },
    };

    let html = app.pages.index(&view).map_err(reject)?;
    Ok(page(html, StatusCode::OK, session_id))
}

pub async fn handle_submit(
    cookie: Option<String>,
    form: TripForm,
    app: AppState,
) -> Result<impl Reply, Rejection> {
    let (session_id, state) = app.sessions.get_or_create(cookie.as_deref()).await;

    let request = match form.validate() {
        Ok(request) => request,
        Err(e) => {
            warn!(%session_id, error = %e, "trip form rejected");
            let view = PageView {
                form,
                error: Some(e.to_string()),
                busy: false,
                run: None,
            };
            let html = app.pages.index(&view).map_err(reject)?;
            return Ok(page(html, StatusCode::BAD_REQUEST, session_id));
        }
    };

    info!(%session_id, destination = %request.destination_city, "trip form accepted");
    let mut state = state.lock().await;
    app.coordinator.run(request, &mut state).await;

    let view = PageView {
        form,
        error: None,
        busy: false,
        run: RunView::from_state(&state),
    };
    let html = app.pages.index(&view).map_err(reject)?;
    Ok(page(html, StatusCode::OK, session_id))
}

pub async fn handle_download(
    format: String,
    cookie: Option<String>,
    app: AppState,
) -> Result<impl Reply, Rejection> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e| reject(ApiError::NotFound(e)))?;
    let state = app
        .sessions
        .get(cookie.as_deref())
        .await
        .ok_or_else(|| reject(ApiError::NotFound("no travel plan in this session".to_string())))?;
    let state = state.lock().await;

    let report = CombinedReport::from_state(&state, Local::now().naive_local())
        .ok_or_else(|| reject(ApiError::NotFound("no completed travel plan to export".to_string())))?;
    let file_name = report.file_name(format);
    info!(file = %file_name, "exporting travel plan");

    let response = Response::builder()
        .header(CONTENT_TYPE, format.mime())
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(report.render(format))
        .map_err(|e| reject(ApiError::InternalError(e.to_string())))?;
    Ok(response)
}

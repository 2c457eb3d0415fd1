use thiserror::Error;
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page rendering error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Reject for ApiError {}

pub fn reject(err: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(err.into())
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            ApiError::Render(_) | ApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        let (code, message) = api_err.status();
        if code.is_server_error() {
            tracing::error!("request failed: {}", api_err);
        }

        let json = warp::reply::json(&serde_json::json!({
            "error": message,
            "details": api_err.to_string(),
        }));

        Ok(warp::reply::with_status(json, code))
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_errors_map_to_bad_request() {
        let rejection = warp::reject::custom(ApiError::from(ValidationError::ReturnBeforeDeparture));
        let reply = handle_rejection(rejection).await.ok().unwrap().into_response();
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unrelated_rejections_pass_through() {
        assert!(handle_rejection(warp::reject::not_found()).await.is_err());
    }
}

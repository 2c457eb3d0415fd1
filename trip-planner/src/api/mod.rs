use std::sync::Arc;

use warp::{Filter, Rejection, Reply};

use crate::middleware;
use crate::pipeline::Coordinator;
use crate::session::{SessionStore, SESSION_COOKIE};

mod pages;
mod plan;
mod web;

pub use pages::Pages;

const FORM_LIMIT: u64 = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    pub sessions: SessionStore,
    pub pages: Arc<Pages>,
}

pub fn routes(app: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let session = warp::cookie::optional::<String>(SESSION_COOKIE);

    let index_route = warp::path::end()
        .and(warp::get())
        .and(session.clone())
        .and(with_app(app.clone()))
        .and_then(web::handle_index);

    let submit_route = warp::path("plan")
        .and(warp::path::end())
        .and(warp::post())
        .and(session.clone())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form())
        .and(with_app(app.clone()))
        .and_then(web::handle_submit);

    let download_route = warp::path!("download" / String)
        .and(warp::get())
        .and(session)
        .and(with_app(app.clone()))
        .and_then(web::handle_download);

    let api_route = warp::path!("api" / "v1" / "plan")
        .and(warp::post())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::json())
        .and(with_app(app))
        .and_then(plan::handle_plan)
        .with(middleware::cors());

    index_route
        .or(submit_route)
        .or(download_route)
        .or(api_route)
}

fn with_app(app: AppState) -> impl Filter<Extract = (AppState,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || app.clone())
}

use warp::http::Method;

const PREFLIGHT_MAX_AGE_SECS: u32 = 600;

/// CORS for the JSON planning API. The HTML pages are same-origin and skip it.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(["Content-Type", "Accept", "Origin", "Content-Length"])
        .allow_methods([Method::POST, Method::OPTIONS])
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}

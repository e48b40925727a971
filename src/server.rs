use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{BadgeError, FetchError};
use crate::euler::EulerClient;
use crate::svg::{BadgeRenderer, Theme};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";
const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600, stale-while-revalidate=1800";

#[derive(Clone)]
pub struct AppState {
    pub client: EulerClient,
    pub renderer: BadgeRenderer,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BadgeQuery {
    username: Option<String>,
    theme: Option<String>,
}

impl BadgeQuery {
    /// First occurrence of each known key wins; repeats and unknown keys are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = BadgeQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "username" => &mut query.username,
                "theme" => &mut query.theme,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Every path serves the badge.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(badge))
        .route("/{*path}", get(badge))
        .with_state(state)
}

async fn badge(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = BadgeQuery::from_pairs(pairs);
    let theme = query.theme.as_deref().and_then(Theme::from_name);

    let Some(username) = query.username.filter(|u| !u.is_empty()) else {
        let err = BadgeError::MissingUsername;
        info!(status = %err.status_code(), "badge requested without username");
        let svg = state.renderer.render_error(&err.public_message(), theme);
        return svg_response(err.status_code(), svg, false);
    };

    let (status, svg) = match state.client.fetch_stats(&username).await {
        Ok(stats) => {
            let svg = state
                .renderer
                .render_stats(&stats, theme, Utc::now().date_naive());
            (StatusCode::OK, svg)
        }
        Err(err) => {
            log_fetch_error(&username, &err);
            let err = BadgeError::from(err);
            let svg = state.renderer.render_error(&err.public_message(), theme);
            (err.status_code(), svg)
        }
    };

    info!(username = %username, %status, "served badge");
    svg_response(status, svg, true)
}

fn log_fetch_error(username: &str, err: &FetchError) {
    match err {
        FetchError::NotFound(_) => info!(username, "user not found upstream"),
        FetchError::Internal(_) => error!(username, error = %err, "unexpected failure"),
        _ => warn!(username, error = %err, "stats lookup failed"),
    }
}

fn svg_response(status: StatusCode, svg: String, cacheable: bool) -> Response {
    let mut response = (status, svg).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(SVG_CONTENT_TYPE));
    if cacheable {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    }
    response
}

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::pipeline::{CategoryEntries, Refresher};

pub struct AppState {
    pub refresher: Arc<Refresher>,
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub categories: Vec<CategoryEntries>,
    pub refreshing: bool,
    /// Exported pages have no server behind them, so the refresh
    /// control is omitted
    pub standalone: bool,
}

#[derive(Template)]
#[template(path = "refresh_button.html")]
pub struct RefreshButtonTemplate {
    pub refreshing: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Render the full page to a string, for the one-shot export mode.
pub fn render_index(categories: &[CategoryEntries], standalone: bool) -> askama::Result<String> {
    IndexTemplate {
        categories: categories.to_vec(),
        refreshing: false,
        standalone,
    }
    .render()
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.refresher.latest().await;
    let refreshing = state.refresher.is_refreshing().await;

    HtmlTemplate(IndexTemplate {
        categories: snapshot.as_ref().clone(),
        refreshing,
        standalone: false,
    })
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Spawn the refresh task
    let refresher = state.refresher.clone();
    tokio::spawn(async move {
        refresher.refresh().await;
    });

    // Return refreshing state immediately
    HtmlTemplate(RefreshButtonTemplate { refreshing: true })
}

pub async fn refresh_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let refreshing = state.refresher.is_refreshing().await;
    HtmlTemplate(RefreshButtonTemplate { refreshing })
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}

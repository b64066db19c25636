//! Request handlers for the front door.
//!
//! A single route dispatches on query parameters: `?dest=` renders the
//! assembled article as a reader page, `?listen=` synthesizes (or reuses)
//! the article's audio and renders a player page, and anything else is
//! redirected to the configured source site. The reverse-proxy rewriting
//! path of the original deployment is deliberately not part of this server.

use std::sync::Arc;

use audito_core::{Article, AudioCache, AuditoError, FetchConfig, SynthConfig, assemble_article, synthesize_to_file};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::info;

use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    pub config: ServerConfig,
    pub fetch: FetchConfig,
    pub synth: SynthConfig,
    pub cache: AudioCache,
}

/// Query surface of the front door route.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub dest: Option<String>,
    pub listen: Option<String>,
}

/// Dispatches `/?dest=` and `/?listen=` requests; everything else is sent
/// back to the source site.
pub async fn front_door(State(state): State<Arc<AppState>>, Query(query): Query<PageQuery>) -> Response {
    if let Some(dest) = query.dest.filter(|d| !d.is_empty()) {
        info!(dest, "reader page requested");
        return reader_page(&state, &dest).await.unwrap_or_else(error_response);
    }
    if let Some(listen) = query.listen.filter(|l| !l.is_empty()) {
        info!(listen, "listen page requested");
        return listen_page(&state, &listen).await.unwrap_or_else(error_response);
    }
    Redirect::temporary(&state.config.source_site).into_response()
}

/// Fetches and stitches the article, then renders it as a reader page.
async fn reader_page(state: &AppState, dest: &str) -> Result<Response, AuditoError> {
    let article = assemble_article(dest, &state.fetch).await?;
    Ok(Html(render_reader(&article, state.config.font_size)).into_response())
}

/// Synthesizes the article's audio (or reuses a cached artifact) and renders
/// a player page pointing at it.
async fn listen_page(state: &AppState, listen: &str) -> Result<Response, AuditoError> {
    // Reader-page links wrap the source URL; strip the wrapper before the
    // identifier becomes a cache key.
    let source = listen
        .strip_prefix(&state.config.dest_prefix())
        .unwrap_or(listen)
        .to_string();

    let fetch = state.fetch.clone();
    let synth = state.synth.clone();
    let webroot = state.config.webroot.clone();
    let url = source.clone();

    let name = state
        .cache
        .get_or_synthesize(&source, move || async move {
            let article = assemble_article(&url, &fetch).await?;
            synthesize_to_file(&article.text_content, &webroot, &synth).await
        })
        .await?;

    Ok(Html(render_player(&name)).into_response())
}

/// All fatal pipeline conditions surface as a server error carrying the
/// error's message text.
fn error_response(err: AuditoError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

fn render_reader(article: &Article, font_size: u32) -> String {
    format!(
        r#"<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1.0" /><title>{title}</title></head><body><h3>{title}</h3><style>body {{background-color: black; font-size: {font_size}px; color: #fff;}} a {{color: #fff;}}</style>
{content}</body></html>"#,
        title = article.title,
        content = article.content,
    )
}

fn render_player(file_name: &str) -> String {
    format!(
        r#"<!doctype html><html><body><audio controls autoplay><source src="/audio/{file_name}"></audio></body></html>"#
    )
}

//! HTTP server: pages, JSON API and contact forwarding

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::contact::{ContactClient, ContactError, ContactRequest};
use crate::content::ContentError;
use crate::templates::TemplateRenderer;
use crate::Site;

/// Server state
struct ServerState {
    site: Site,
    templates: TemplateRenderer,
    contact: ContactClient,
}

/// Build the application router for a site
pub fn router(site: Site) -> Result<Router> {
    let templates = TemplateRenderer::new(&site.config)?;
    let contact = ContactClient::new(&site.config.contact)?;
    let state = Arc::new(ServerState {
        site,
        templates,
        contact,
    });

    Ok(Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_handler))
        .route("/blog/", get(blog_handler))
        .route("/blog/:id", get(post_handler))
        .route("/api/posts", get(api_posts_handler))
        .route("/api/posts/:id", get(api_post_handler))
        .route("/api/contact", post(contact_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(site.clone())?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if site.config.contact.endpoint.is_none() {
        tracing::warn!("No contact endpoint configured; the contact form will answer 503");
    }

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run a blocking content read on the blocking pool
async fn load<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T, ContentError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    let site = state.site.clone();
    match load(move || site.list_posts()).await {
        Ok(mut posts) => {
            posts.truncate(state.site.config.recent_posts);
            html_page(StatusCode::OK, state.templates.home(&posts))
        }
        Err(e) => failure_page(&state, e),
    }
}

async fn blog_handler(State(state): State<Arc<ServerState>>) -> Response {
    let site = state.site.clone();
    match load(move || site.list_posts()).await {
        Ok(posts) => html_page(StatusCode::OK, state.templates.blog(&posts)),
        Err(e) => failure_page(&state, e),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let site = state.site.clone();
    match load(move || site.get_post(&id)).await {
        Ok(Some(post)) => html_page(StatusCode::OK, state.templates.post(&post)),
        Ok(None) => not_found_page(&state, "Post"),
        Err(e) => failure_page(&state, e),
    }
}

async fn api_posts_handler(State(state): State<Arc<ServerState>>) -> Response {
    let site = state.site.clone();
    match load(move || site.list_posts()).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            tracing::error!("Failed to load posts: {:#}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load posts")
        }
    }
}

async fn api_post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let site = state.site.clone();
    match load(move || site.get_post(&id)).await {
        Ok(Some(post)) => Json(post).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => {
            tracing::error!("Failed to load post: {:#}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load post")
        }
    }
}

async fn contact_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ContactRequest>,
) -> Response {
    match state.contact.submit(&request).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) if e.is_validation() => json_error(StatusCode::BAD_REQUEST, &e.to_string()),
        Err(ContactError::NotConfigured) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "Contact form is not available")
        }
        Err(ContactError::Rejected(reason)) => json_error(StatusCode::BAD_GATEWAY, &reason),
        Err(e) => {
            tracing::error!("Contact forwarding failed: {}", e);
            json_error(StatusCode::BAD_GATEWAY, "Error al enviar el mensaje.")
        }
    }
}

/// Static pages by slug, then files from the static directory, then 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().trim_matches('/').to_string();
    let is_read = *request.method() == Method::GET || *request.method() == Method::HEAD;

    if let Some(slug) = page_slug(&path).filter(|_| is_read) {
        let site = state.site.clone();
        match load(move || site.get_page(&slug)).await {
            Ok(Some(page)) => return html_page(StatusCode::OK, state.templates.page(&page)),
            Ok(None) => {}
            Err(e) => return failure_page(&state, e),
        }
    }

    let mut service = ServeDir::new(&state.site.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found_page(&state, "Página"),
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", path, e);
            failure_page(&state, e.into())
        }
    }
}

/// Decode a single path segment into a page slug
fn page_slug(path: &str) -> Option<String> {
    let slug = percent_decode_str(path).decode_utf8().ok()?;
    if slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some(slug.into_owned())
}

fn html_page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn not_found_page(state: &ServerState, what: &str) -> Response {
    html_page(StatusCode::NOT_FOUND, state.templates.not_found(what))
}

fn failure_page(state: &ServerState, error: anyhow::Error) -> Response {
    tracing::error!("Request failed: {:#}", error);
    html_page(StatusCode::INTERNAL_SERVER_ERROR, state.templates.error())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

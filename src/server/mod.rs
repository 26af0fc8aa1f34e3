//! HTTP server for the site

mod error;
mod views;

pub use error::ServerError;
pub use views::pagination_data;

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Site;

/// Server settings taken from the command line
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Show error details in responses
    pub debug: bool,
    /// Watch pages, templates and config and reload on change
    pub reload: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
            reload: false,
        }
    }
}

/// Server state
pub struct ServerState {
    pub site: Arc<Site>,
    pub debug: bool,
}

impl ServerState {
    pub fn new(site: Arc<Site>, debug: bool) -> Self {
        Self { site, debug }
    }

    /// Turn a view result into a response, rendering error pages
    fn respond(&self, path: &str, result: Result<Response, ServerError>) -> Response {
        match result {
            Ok(response) => response,
            Err(e) => self.error_response(path, e),
        }
    }

    fn error_response(&self, path: &str, error: ServerError) -> Response {
        if error.is_not_found() {
            tracing::debug!("{}", error);
            let mut context = self.site.base_context();
            context.insert("path", path.trim_matches('/'));
            return match self.site.templates.render("404.html", &context) {
                Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                Err(e) => {
                    tracing::error!("Failed to render 404 page: {:#}", e);
                    (StatusCode::NOT_FOUND, "Not found").into_response()
                }
            };
        }

        tracing::error!("Error serving /{}: {:#}", path, error);
        let body = if self.debug {
            format!("Internal server error\n\n{:#}", error)
        } else {
            "Internal server error".to_string()
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Routes of the site
pub fn router(state: Arc<ServerState>) -> Router {
    let static_files = ServeDir::new(&state.site.static_dir);

    Router::new()
        .route("/", get(views::home))
        .route("/blog", get(views::blog_redirect))
        .route("/blog/", get(views::blog_index))
        .route("/blog/page/:page", get(views::blog_page_redirect))
        .route("/blog/page/:page/", get(views::blog_page))
        .route("/archive", get(views::archive_redirect))
        .route("/archive/", get(views::archive))
        .nest_service("/static", static_files)
        .fallback(views::flat_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and block until Ctrl+C
pub async fn start(site: Site, options: &ServerOptions) -> Result<()> {
    let site = Arc::new(site);
    let state = Arc::new(ServerState::new(Arc::clone(&site), options.debug));
    let app = router(state);

    // "localhost" binds the IPv4 loopback
    let bind_host = if options.host == "localhost" {
        "127.0.0.1"
    } else {
        options.host.as_str()
    };

    if options.reload {
        let watched = Arc::clone(&site);
        std::thread::Builder::new()
            .name("site-watcher".to_string())
            .spawn(move || {
                if let Err(e) = watch_and_reload(watched) {
                    tracing::error!("File watcher error: {}", e);
                }
            })?;
    }

    let listener = tokio::net::TcpListener::bind((bind_host, options.port)).await?;
    println!(
        "Serving {} at http://{}:{}",
        site.config.title, options.host, options.port
    );
    if options.reload {
        println!("Reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// What a changed file means for the running site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Pages,
    Templates,
    Config,
}

struct WatchedPaths {
    pages: PathBuf,
    templates: PathBuf,
    config: PathBuf,
}

impl WatchedPaths {
    fn new(site: &Site) -> Self {
        Self {
            pages: canonical(&site.pages_dir),
            templates: canonical(&site.template_dir),
            config: canonical(&site.config_path()),
        }
    }

    fn classify(&self, path: &Path) -> Option<Change> {
        let path_str = path.to_string_lossy();
        if path_str.ends_with('~') || path_str.contains("/.") {
            return None;
        }
        if path.starts_with(&self.pages) {
            Some(Change::Pages)
        } else if path.starts_with(&self.templates) {
            Some(Change::Templates)
        } else if path == self.config {
            Some(Change::Config)
        } else {
            None
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Watch for file changes and reload the affected part of the site
fn watch_and_reload(site: Arc<Site>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    let paths = WatchedPaths::new(&site);

    for dir in [&paths.pages, &paths.templates] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }
    if paths.config.exists() {
        debouncer
            .watcher()
            .watch(&paths.config, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", paths.config);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let mut changes: Vec<Change> = events
                    .iter()
                    .filter_map(|e| paths.classify(&e.path))
                    .collect();
                changes.sort_by_key(|c| *c as u8);
                changes.dedup();

                for change in changes {
                    match change {
                        Change::Pages => match site.pages.reload() {
                            Ok(()) => println!("Reloaded pages"),
                            Err(e) => println!("Reloading pages failed: {}", e),
                        },
                        Change::Templates => match site.templates.reload() {
                            Ok(()) => println!("Reloaded templates"),
                            Err(e) => println!("Reloading templates failed: {}", e),
                        },
                        Change::Config => {
                            tracing::warn!("_config.yml changed; restart the server to apply it")
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

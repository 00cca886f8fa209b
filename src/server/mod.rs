//! Web server for the rating page and its JSON API

pub mod http;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::render::PlotStyle;
use crate::session::Session;

/// Shared server state
///
/// The session sits behind one async mutex. Handlers hold the lock across
/// update and save, so no request ever observes an unsaved rating.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub style: Arc<PlotStyle>,
    pub session: Arc<Mutex<Session>>,
}

impl ServerState {
    pub fn new(config: Config, session: Session) -> Self {
        Self {
            style: Arc::new(PlotStyle::from_config(&config)),
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/api/status", get(http::status_handler))
        .route("/api/points", get(http::list_points_handler).post(http::set_point_handler))
        .route("/api/points/{group}/{solution}", get(http::get_point_handler))
        .route("/api/average", get(http::average_handler))
        .route("/api/summary", get(http::summary_handler))
        .route("/api/snapshot.csv", get(http::snapshot_handler));

    let pages = Router::new()
        .route("/", get(http::index_handler))
        .route("/groups/{group}", post(http::group_form_handler))
        .route("/plot.svg", get(http::plot_handler));

    Router::new()
        .merge(pages)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start(host: &str, port: u16, config: Config) -> Result<()> {
    let session = Session::open(&config)?;
    let data_file = session.snapshot().path().display().to_string();
    let groups = session.roster().groups().len();
    let solutions = session.roster().num_solutions();

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;
    let app = router(ServerState::new(config, session));

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("     Quadrant Rater");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("✓ Ratings file: {}", data_file);
    println!("✓ {} groups x {} solutions", groups, solutions);
    println!();
    println!("🚀 Listening on http://{}", addr);
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

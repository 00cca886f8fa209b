//! Quadrant Rater - group ratings on a complexity/value plane
//!
//! Several groups rate the same numbered solutions by complexity and value.
//! The crate provides:
//! - A total in-memory store of ratings backed by a flat CSV snapshot
//! - Per-solution averages and a sortable summary with a value/complexity score
//! - SVG quadrant plots and an HTML page with sliders, served over axum
//! - A clap CLI for serving, inspecting and editing ratings
//!
//! # Example
//!
//! ```ignore
//! use quadrant_rater::{Config, GroupId, Point, Session, SolutionId};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let mut session = Session::open(&config)?;
//!     session.update(&GroupId::from("Group 2"), SolutionId::new(7), Point::new(3.4, 8.1))?;
//!     for row in session.summary() {
//!         println!("{} -> {:.3}", row.solution, row.ratio);
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod types;
pub mod store;
pub mod aggregate;
pub mod config;
pub mod session;

// Presentation
pub mod render;
pub mod server;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{GroupId, LookupError, Point, PointError, Roster, SolutionId};

pub use store::{PointStore, SnapshotError, SnapshotFile};

pub use aggregate::{SortColumn, SummaryRow};

pub use config::Config;

pub use session::Session;

pub use server::{
    router,
    ServerState,
    start as start_server,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Group quadrant rating tool", NAME, VERSION)
}

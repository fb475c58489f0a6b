pub mod analysis;
pub mod config;
pub mod db;
pub mod ingest;
pub mod report;
pub mod session;

/// Application name for XDG paths
pub const APP_NAME: &str = "breakdown";

// --- File: crates/services/sellerhub_backend/src/lib.rs ---
pub mod app;

pub use app::{build_app, AppState};

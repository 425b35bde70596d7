//! Receiver for media-generation callbacks.
//!
//! Callbacks are stored newest-first in a single JSON file, exposed through
//! token-protected read endpoints and summarised on an HTML dashboard.

pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod models;
pub mod probe;
pub mod state;
pub mod store;

pub use app::build_router;
pub use config::Config;
pub use state::AppState;
pub use store::CallbackStore;

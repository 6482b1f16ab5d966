pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod hypothesis;
pub mod models;
pub mod stats;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;

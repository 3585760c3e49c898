pub mod app;
pub mod cache;
pub mod config;
pub mod diagnosis;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod source;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use config::Settings;
pub use state::AppState;

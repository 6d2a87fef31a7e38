// Tagtrail Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod planner;
pub mod state;

pub use error::{AppError, TagFailure};
pub use metrics::Metrics;
pub use state::AppState;

// Domain entities
pub mod anomaly;
pub mod commit;
pub mod config;
pub mod event;
pub mod processing;
pub mod reference;
pub mod route;
pub mod time_metric;

pub use anomaly::*;
pub use commit::*;
pub use config::*;
pub use event::*;
pub use processing::*;
pub use reference::*;
pub use route::*;
pub use time_metric::*;

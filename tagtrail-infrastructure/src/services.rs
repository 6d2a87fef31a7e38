pub mod batch_scheduler;
pub mod health_service;
pub mod system_clock;

pub use batch_scheduler::*;
pub use health_service::*;
pub use system_clock::*;

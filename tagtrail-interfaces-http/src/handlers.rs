pub mod ops_handlers;
pub mod pipeline_handlers;

pub use ops_handlers::*;
pub use pipeline_handlers::*;

pub mod postgres_store;
pub mod reference_files;

pub use postgres_store::*;
pub use reference_files::*;

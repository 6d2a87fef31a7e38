// Domain value objects
pub mod anomaly_kind;
pub mod identifiers;
pub mod reader_class;
pub mod severity;

pub use anomaly_kind::*;
pub use identifiers::*;
pub use reader_class::*;
pub use severity::*;

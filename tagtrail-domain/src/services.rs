// Domain services
// Pure stages of the route reconstruction pipeline plus the reference
// collaborators they run against

pub mod anomaly_detector;
pub mod business_calendar;
pub mod consolidation;
pub mod delivery_standards;
pub mod grouping;
pub mod metrics_calculator;
pub mod route_builder;
pub mod segmentation;
pub mod topology;

pub use anomaly_detector::*;
pub use business_calendar::*;
pub use consolidation::*;
pub use delivery_standards::*;
pub use grouping::*;
pub use metrics_calculator::*;
pub use route_builder::*;
pub use segmentation::*;
pub use topology::*;

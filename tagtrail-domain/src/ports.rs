// Repository and Service Port Traits (Interfaces)
// Define what the domain needs from infrastructure

pub mod reference;
pub mod repositories;
pub mod services;

pub use reference::*;
pub use repositories::*;
pub use services::*;

// Application layer - use cases and orchestration

pub mod error;
pub mod rules;
pub mod service;

pub use error::*;
pub use service::*;

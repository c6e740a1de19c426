pub mod entities;
pub mod error;
pub mod profiles;
pub mod roles;
pub mod upload;

pub use error::{ModelError, Result};

// Re-export tracing for use in this crate
pub use tracing;

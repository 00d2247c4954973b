// Core modules
pub mod api;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod persistence;
pub mod risk;
pub mod scheduler;
pub mod settings;
pub mod strategy;

// Re-export commonly used types
pub use error::Error;
pub use models::*;
pub use settings::Settings;
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;

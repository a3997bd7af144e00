pub mod builder;
pub mod config;
pub mod error;
pub mod progress;

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod parser;
pub mod query;
pub mod runner;
pub mod utils;
pub mod variable;

// Re-export commonly used types
pub use error::{ReqchainError, Result};

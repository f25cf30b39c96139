pub mod dto;
pub mod reader;
pub mod service;

// Re-export commonly used types
pub use dto::ImportSummary;
pub use service::{ImportError, ImportService};

pub mod models;
pub mod posted_time;

// Re-export commonly used types
pub use models::{Job, Row, RowError};

//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod theme;
pub mod time_window;

// Re-export for convenience
pub use theme::ThemeFilter;
pub use time_window::TimeWindowFilter;

//! urletl Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the urletl workspace.
//!
//! - **Error Handling**: [`EtlError`] and the crate-wide [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use urletl_common::{EtlError, Result};
//!
//! fn require(value: Option<&str>) -> Result<&str> {
//!     value.ok_or_else(|| EtlError::config("API_URL is not set"))
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{EtlError, Result};

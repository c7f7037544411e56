//! Plugin protocol runtime.
//!
//! A plugin is any executable that reads a JSON request on stdin and
//! answers with a JSON response on stdout. Its stderr is forwarded to a
//! [`DiagnosticSink`] while it runs.
//!
//! # Components
//!
//! - [`protocol`] - Request and response documents
//! - [`runner`] - Process supervision with a wall-clock deadline
//! - [`sink`] - Where plugin stderr lines go

pub mod protocol;
pub mod runner;
pub mod sink;

// Re-export main types for convenience
pub use protocol::{PluginFile, PluginRequest, PluginResponse};
pub use runner::{PluginCommand, PluginRunner, DEFAULT_TIMEOUT};
pub use sink::{CollectingSink, DiagnosticSink, StderrSink};

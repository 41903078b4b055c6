//! morph-apply: merge sparse ("lazy") code edits into full file
//! content through the Morph fast-apply completion service.
//!
//! ```no_run
//! # async fn run() -> Result<(), morph_apply::Error> {
//! use morph_apply::{EditApplier, EditRequest, ServiceConfig};
//!
//! let applier = EditApplier::new(ServiceConfig::new("sk-..."))?;
//! let merged = applier.apply_edit(&EditRequest::new(
//!   "add logging"
//! , "fn main() {}\n"
//! , "// ... existing code ...\nlog::info!(\"start\");"
//! )).await?;
//! println!("{}", merged);
//! # Ok(()) }
//! ```

pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod client;

pub use client::EditApplier;
pub use config::{EnvSettings, ServiceConfig, SettingsSource};
pub use error::{Error, TransportError};
pub use request::EditRequest;

/// Fully merged file content returned by `EditApplier::apply_edit`
pub type MergedContent = String;

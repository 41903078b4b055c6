//! Completion service implementations

pub mod morph;

// Re-export for convenience
pub use morph::MorphClient;

/// Configuration subsystem - Editor settings and preferences
///
/// This module handles loading configuration from .speedyrc files. The
/// resulting `RcConfig` is passed explicitly into documents and sessions.

pub mod rc;

// Re-export public interface
pub use rc::{RcConfig, RcLoader};

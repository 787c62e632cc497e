//! Platform abstraction layer
//!
//! This module provides platform-specific implementations for:
//! - Graceful and forced process termination
//! - Detached, association-aware program launch

#[cfg(unix)]
pub mod unix;

#[cfg(target_os = "windows")]
pub mod windows;

// Re-export the current platform's modules
#[cfg(unix)]
pub use unix as current;

#[cfg(target_os = "windows")]
pub use windows as current;

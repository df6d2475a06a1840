//! Error Module
//!
//! Policy errors raised by the tiling tree and workspace manager, plus
//! helpers for best-effort protocol calls that must never stop the loop.

use thiserror::Error;
use tracing::warn;
use x11rb::protocol::xproto::Window;

/// Errors raised when an operation violates a layout or output policy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WmError {
    #[error("no such workspace: {0}")]
    NoSuchWorkspace(u8),

    #[error("workspace {0} belongs to another output; multiple outputs are not supported")]
    MultipleOutputs(u8),

    #[error("could not determine the dock position (top strut {top}, bottom strut {bottom})")]
    AmbiguousDock { top: u32, bottom: u32 },

    #[error("resize would shrink an element to {size}px, below the {minimum}px minimum")]
    BelowMinimum { size: i64, minimum: u32 },

    #[error("no frame tracks window 0x{0:x}")]
    FrameNotFound(Window),
}

/// Log a failed best-effort operation and carry on
pub fn log_warn<T, E: std::fmt::Display>(result: Result<T, E>, operation: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Failed to {}: {}", operation, e);
            None
        }
    }
}

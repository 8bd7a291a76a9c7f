//! Error types for the XR graphics plugin
//!
//! Every failure in the plugin is unrecoverable for the current session:
//! setup errors abort initialization and render-time precondition failures
//! abort the frame. Nothing here is retried.

use std::fmt;

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, Error>;

/// XR graphics plugin errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (D3D11, renderer, etc.)
    BackendError(String),

    /// A native call failed with a status code (HRESULT, XrResult, ...)
    NativeError {
        /// Name of the failing call
        call: String,
        /// Raw status code returned by the call
        code: i32,
    },

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (device, shaders, scene resources)
    InitializationFailed(String),

    /// None of the runtime's formats is usable
    UnsupportedFormat(String),

    /// Configuration the plugin refuses to handle (texture arrays, ...)
    Unsupported(String),

    /// The caller broke an operation precondition
    PreconditionViolated(String),
}

impl Error {
    /// Build a `NativeError` from a call name and status code
    pub fn native(call: impl Into<String>, code: i32) -> Self {
        Error::NativeError { call: call.into(), code }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::NativeError { call, code } => {
                write!(f, "Native call {} failed with status 0x{:08X}", call, *code as u32)
            }
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported configuration: {}", msg),
            Error::PreconditionViolated(msg) => write!(f, "Precondition violated: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// ColorBuffer trait - an XR-runtime-owned image the plugin draws into
///
/// Generic code only sees what a color buffer looks like (`desc`) and which
/// buffer it is (`id`). The native handle stays behind `as_any`, reachable only
/// by the backend that produced it.

use std::any::Any;
use crate::format::TextureFormat;

/// Opaque identity of a runtime-owned color buffer
///
/// Stable for as long as the runtime keeps the underlying image alive. Carries
/// no meaning beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorBufferId(u64);

impl ColorBufferId {
    /// Build an id from a backend-chosen token (typically the native address)
    pub fn new(token: u64) -> Self {
        Self(token)
    }
}

/// What a color buffer looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format (typeless native formats resolve to their UNORM variant)
    pub format: TextureFormat,
    /// Number of array slices
    pub array_size: u32,
}

/// Runtime-owned color buffer, borrowed for one render call
///
/// The plugin never destroys it and never keeps it past the call it was
/// handed in.
pub trait ColorBuffer {
    /// Dimensions and format
    fn desc(&self) -> ColorBufferDesc;

    /// Identity of the underlying image
    fn id(&self) -> ColorBufferId;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

//! Texture formats and color swapchain format selection

use crate::error::{Error, Result};

/// Texture format understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_SRGB,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
}

/// Color swapchain formats the plugin can render into, in priority order
pub const COLOR_SWAPCHAIN_FORMATS: [TextureFormat; 4] = [
    TextureFormat::R8G8B8A8_UNORM,
    TextureFormat::B8G8R8A8_UNORM,
    TextureFormat::R8G8B8A8_SRGB,
    TextureFormat::B8G8R8A8_SRGB,
];

/// Pick the color swapchain format to request from the runtime
///
/// Walks `COLOR_SWAPCHAIN_FORMATS` in priority order and returns the native code
/// of the first one the runtime offers. The runtime's own ordering is ignored.
///
/// # Arguments
///
/// * `runtime_formats` - Native format codes enumerated by the XR runtime
/// * `to_native` - Backend mapping from `TextureFormat` to its native code
///
/// # Errors
///
/// `Error::UnsupportedFormat` if none of the preferred formats is offered.
pub fn select_color_swapchain_format<F>(runtime_formats: &[i64], to_native: F) -> Result<i64>
where
    F: Fn(TextureFormat) -> i64,
{
    COLOR_SWAPCHAIN_FORMATS
        .iter()
        .map(|&format| to_native(format))
        .find(|native| runtime_formats.contains(native))
        .ok_or_else(|| {
            crate::xr_error!(
                "xrgfx::format",
                "No runtime swapchain format supported for color swapchain (runtime offered {:?})",
                runtime_formats
            );
            Error::UnsupportedFormat(
                "No runtime swapchain format supported for color swapchain".to_string(),
            )
        })
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;

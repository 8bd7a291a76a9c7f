/// DXGI format codes and their mapping to `TextureFormat`
///
/// Plain integers so the mapping is usable (and tested) off Windows; the D3D11
/// code wraps them in `DXGI_FORMAT` at the call site.

use xr_graphics::xrgfx::render::TextureFormat;

pub const DXGI_FORMAT_R8G8B8A8_TYPELESS: u32 = 27;
pub const DXGI_FORMAT_R8G8B8A8_UNORM: u32 = 28;
pub const DXGI_FORMAT_R8G8B8A8_UNORM_SRGB: u32 = 29;
pub const DXGI_FORMAT_D32_FLOAT: u32 = 40;
pub const DXGI_FORMAT_D24_UNORM_S8_UINT: u32 = 45;
pub const DXGI_FORMAT_B8G8R8A8_UNORM: u32 = 87;
pub const DXGI_FORMAT_B8G8R8A8_TYPELESS: u32 = 90;
pub const DXGI_FORMAT_B8G8R8A8_UNORM_SRGB: u32 = 91;

/// DXGI code of a texture format
pub fn dxgi_code(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::R8G8B8A8_UNORM => DXGI_FORMAT_R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_UNORM => DXGI_FORMAT_B8G8R8A8_UNORM,
        TextureFormat::R8G8B8A8_SRGB => DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
        TextureFormat::B8G8R8A8_SRGB => DXGI_FORMAT_B8G8R8A8_UNORM_SRGB,
        TextureFormat::D24_UNORM_S8_UINT => DXGI_FORMAT_D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT => DXGI_FORMAT_D32_FLOAT,
    }
}

/// Texture format of a DXGI code; typeless color formats read as UNORM
pub fn texture_format(code: u32) -> Option<TextureFormat> {
    match code {
        DXGI_FORMAT_R8G8B8A8_UNORM | DXGI_FORMAT_R8G8B8A8_TYPELESS => {
            Some(TextureFormat::R8G8B8A8_UNORM)
        }
        DXGI_FORMAT_B8G8R8A8_UNORM | DXGI_FORMAT_B8G8R8A8_TYPELESS => {
            Some(TextureFormat::B8G8R8A8_UNORM)
        }
        DXGI_FORMAT_R8G8B8A8_UNORM_SRGB => Some(TextureFormat::R8G8B8A8_SRGB),
        DXGI_FORMAT_B8G8R8A8_UNORM_SRGB => Some(TextureFormat::B8G8R8A8_SRGB),
        DXGI_FORMAT_D24_UNORM_S8_UINT => Some(TextureFormat::D24_UNORM_S8_UINT),
        DXGI_FORMAT_D32_FLOAT => Some(TextureFormat::D32_FLOAT),
        _ => None,
    }
}

/// Texture format of a runtime swapchain format (an `i64` in OpenXR)
pub fn swapchain_texture_format(code: i64) -> Option<TextureFormat> {
    u32::try_from(code).ok().and_then(texture_format)
}

#[cfg(test)]
#[path = "dxgi_format_tests.rs"]
mod tests;

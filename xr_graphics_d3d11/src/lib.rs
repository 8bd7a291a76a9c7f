/*!
# XR Graphics - Direct3D 11 Backend

Direct3D 11 implementation of the `xr_graphics` traits.

The backend creates the device on the adapter the XR runtime asks for, renders
straight into the runtime's `ID3D11Texture2D` swapchain images, and provides
the `XrGraphicsBindingD3D11KHR` used to create the session. `XrRuntime` /
`XrSession` bootstrap the OpenXR side for a harness.

Format and feature level tables are platform independent; everything touching
D3D11 or the OpenXR loader is Windows only.
*/

mod dxgi_format;
mod feature_level;

#[cfg(windows)]
mod d3d11_device;
#[cfg(windows)]
mod d3d11_texture;
#[cfg(windows)]
mod d3d11_buffer;
#[cfg(windows)]
mod d3d11_shader;
#[cfg(windows)]
mod d3d11_swapchain_image;
#[cfg(windows)]
mod d3d11_renderer;
#[cfg(windows)]
mod d3d11_backend;
#[cfg(windows)]
mod xr_session;

pub use dxgi_format::{dxgi_code, swapchain_texture_format, texture_format};
pub use feature_level::{candidate_feature_levels, feature_level_name, FEATURE_LEVELS};

#[cfg(windows)]
pub use d3d11_backend::{D3D11Backend, D3D11GraphicsBinding, D3D11_ENABLE_EXTENSION};
#[cfg(windows)]
pub use d3d11_device::{create_device, create_warp_device, AdapterInfo, D3D11Device};
#[cfg(windows)]
pub use d3d11_renderer::D3D11Renderer;
#[cfg(windows)]
pub use d3d11_swapchain_image::{ColorBufferD3D11, D3D11SwapchainImage};
#[cfg(windows)]
pub use d3d11_texture::Texture as D3D11Texture;
#[cfg(windows)]
pub use xr_session::{XrRuntime, XrSession};

/// Plugin rendering with Direct3D 11
///
/// # Example
///
/// ```no_run
/// use xr_graphics::xrgfx::{GraphicsPlugin, PluginConfig};
/// use xr_graphics_d3d11::{create_graphics_plugin_d3d11, XrRuntime};
///
/// let runtime = XrRuntime::new("hello_xr")?;
/// let mut plugin = create_graphics_plugin_d3d11(PluginConfig::default());
/// plugin.initialize_device(&runtime.graphics_requirements()?)?;
/// let session = runtime.create_session(plugin.graphics_binding()?)?;
/// # Ok::<(), xr_graphics::xrgfx::Error>(())
/// ```
#[cfg(windows)]
pub fn create_graphics_plugin_d3d11(
    config: xr_graphics::xrgfx::PluginConfig,
) -> xr_graphics::xrgfx::XrGraphicsPlugin<D3D11Backend> {
    xr_graphics::xrgfx::XrGraphicsPlugin::new(D3D11Backend::new(), config)
}

/// D3D11Backend - the Direct3D 11 half of the graphics plugin

use std::ptr;
use std::sync::Arc;

use openxr as xr;
use windows::core::Interface;

use xr_graphics::xrgfx::render::{ColorBuffer, TextureFormat};
use xr_graphics::xrgfx::{Backend, DeviceBootstrap, GraphicsRequirements, PluginConfig, Result};
use xr_graphics::xr_debug;

use crate::d3d11_device::{self, D3D11Device};
use crate::d3d11_renderer::D3D11Renderer;
use crate::d3d11_swapchain_image::{ColorBufferD3D11, D3D11SwapchainImage};
use crate::dxgi_format;

/// Instance extension the runtime must expose
pub const D3D11_ENABLE_EXTENSION: &str = "XR_KHR_D3D11_enable";

/// `XrGraphicsBindingD3D11KHR` handed to session creation
pub type D3D11GraphicsBinding = xr::sys::GraphicsBindingD3D11KHR;

#[derive(Default)]
pub struct D3D11Backend {
    /// Keeps the device behind the binding pointer alive
    device: Option<Arc<D3D11Device>>,
}

impl D3D11Backend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device created by `create_device`, if any
    pub fn device(&self) -> Option<&D3D11Device> {
        self.device.as_deref()
    }
}

impl Backend for D3D11Backend {
    type SwapchainImage = D3D11SwapchainImage;
    type Binding = D3D11GraphicsBinding;

    fn name(&self) -> &'static str {
        "Direct3D 11"
    }

    fn instance_extensions(&self) -> Vec<String> {
        vec![D3D11_ENABLE_EXTENSION.to_string()]
    }

    fn native_format(&self, format: TextureFormat) -> i64 {
        i64::from(dxgi_format::dxgi_code(format))
    }

    fn create_device(
        &mut self,
        requirements: &GraphicsRequirements,
        config: &PluginConfig,
    ) -> Result<DeviceBootstrap<D3D11GraphicsBinding>> {
        let device = d3d11_device::create_device(requirements, config.enable_debug)?;
        let renderer = D3D11Renderer::new(&device)?;
        if device.warp {
            xr_debug!("xrgfx::d3d11", "Rendering on WARP; expect low frame rates");
        }

        let binding = D3D11GraphicsBinding {
            ty: D3D11GraphicsBinding::TYPE,
            next: ptr::null(),
            device: device.device.as_raw() as *mut _,
        };
        self.device = Some(Arc::new(device));
        Ok(DeviceBootstrap { renderer: Box::new(renderer), binding })
    }

    fn color_buffer<'a>(
        &self,
        image: &'a D3D11SwapchainImage,
        swapchain_format: i64,
    ) -> Result<Box<dyn ColorBuffer + 'a>> {
        Ok(Box::new(ColorBufferD3D11::from_swapchain_image(image, swapchain_format)?))
    }
}

#[cfg(test)]
#[path = "d3d11_backend_tests.rs"]
mod tests;

/// Swapchain images - runtime image structs and their color buffer view

use std::any::Any;
use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr;

use openxr as xr;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D11::*;
use xr_graphics::xrgfx::render::{ColorBuffer, ColorBufferDesc, ColorBufferId};
use xr_graphics::xrgfx::xr::SwapchainImageStruct;
use xr_graphics::xrgfx::{Error, Result};
use xr_graphics::xr_error;

use crate::dxgi_format;

/// `XrSwapchainImageD3D11KHR` as enumerated by the runtime
pub type D3D11SwapchainImage = xr::sys::SwapchainImageD3D11KHR;

impl SwapchainImageStruct for xr::sys::SwapchainImageD3D11KHR {
    fn new_typed() -> Self {
        Self {
            ty: Self::TYPE,
            next: ptr::null_mut(),
            texture: ptr::null_mut(),
        }
    }
}

/// A swapchain texture, referenced for one `render_view` call
pub struct ColorBufferD3D11 {
    pub(crate) texture: ID3D11Texture2D,
    desc: ColorBufferDesc,
}

impl ColorBufferD3D11 {
    /// Describe the texture behind a runtime image struct
    ///
    /// `swapchain_format` wins over the texture's own format, which runtimes
    /// usually create typeless.
    pub fn from_swapchain_image(image: &D3D11SwapchainImage, swapchain_format: i64) -> Result<Self> {
        if image.texture.is_null() {
            xr_error!("xrgfx::d3d11", "Swapchain image struct has no texture");
            return Err(Error::InvalidResource("swapchain image has a null texture".to_string()));
        }

        // The runtime owns the reference; clone() takes our own for the call
        let borrowed =
            ManuallyDrop::new(unsafe { ID3D11Texture2D::from_raw(image.texture as *mut c_void) });
        let texture: ID3D11Texture2D = (*borrowed).clone();

        let mut native = D3D11_TEXTURE2D_DESC::default();
        unsafe { texture.GetDesc(&mut native) };

        let format = dxgi_format::swapchain_texture_format(swapchain_format)
            .or_else(|| dxgi_format::texture_format(native.Format.0 as u32))
            .ok_or_else(|| {
                xr_error!(
                    "xrgfx::d3d11",
                    "Unsupported swapchain format {} (texture format {})",
                    swapchain_format,
                    native.Format.0
                );
                Error::UnsupportedFormat(format!("DXGI format {}", swapchain_format))
            })?;

        Ok(Self {
            texture,
            desc: ColorBufferDesc {
                width: native.Width,
                height: native.Height,
                format,
                array_size: native.ArraySize,
            },
        })
    }
}

impl ColorBuffer for ColorBufferD3D11 {
    fn desc(&self) -> ColorBufferDesc {
        self.desc
    }

    fn id(&self) -> ColorBufferId {
        ColorBufferId::new(self.texture.as_raw() as u64)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

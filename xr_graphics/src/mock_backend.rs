/// Mock Backend for plugin tests
///
/// Swapchain images carry their own size and format, standing in for what a
/// real backend would query from the native texture.

use std::sync::{Arc, Mutex};

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::format::TextureFormat;
use crate::plugin::{Backend, DeviceBootstrap, GraphicsRequirements};
use crate::renderer::mock_renderer::{MockColorBuffer, MockRenderer, MockRendererLog};
use crate::renderer::ColorBuffer;
use crate::swapchain_images::SwapchainImageStruct;

pub const MOCK_IMAGE_TYPE: u32 = 0x4d4f434b;

/// Runtime-filled image struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MockSwapchainImage {
    pub ty: u32,
    pub image: u64,
    pub width: u32,
    pub height: u32,
}

impl MockSwapchainImage {
    pub fn new(image: u64, width: u32, height: u32) -> Self {
        Self { ty: MOCK_IMAGE_TYPE, image, width, height }
    }
}

impl SwapchainImageStruct for MockSwapchainImage {
    fn new_typed() -> Self {
        Self { ty: MOCK_IMAGE_TYPE, image: 0, width: 0, height: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBinding {
    pub device: u64,
}

#[derive(Default)]
pub struct MockBackend {
    pub devices_created: u32,
    /// Log of the renderer handed out by the last `create_device`
    pub renderer_log: Option<Arc<Mutex<MockRendererLog>>>,
    /// Make `create_device` fail
    pub fail_device: bool,
    /// Renderer call that should fail
    pub renderer_fail_on: Option<&'static str>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<MockRendererLog>> {
        self.renderer_log.clone().unwrap()
    }

    pub fn format_from_native(code: i64) -> Option<TextureFormat> {
        match code {
            28 => Some(TextureFormat::R8G8B8A8_UNORM),
            87 => Some(TextureFormat::B8G8R8A8_UNORM),
            29 => Some(TextureFormat::R8G8B8A8_SRGB),
            91 => Some(TextureFormat::B8G8R8A8_SRGB),
            _ => None,
        }
    }
}

impl Backend for MockBackend {
    type SwapchainImage = MockSwapchainImage;
    type Binding = MockBinding;

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn instance_extensions(&self) -> Vec<String> {
        vec!["XR_MOCK_enable".to_string()]
    }

    fn native_format(&self, format: TextureFormat) -> i64 {
        match format {
            TextureFormat::R8G8B8A8_UNORM => 28,
            TextureFormat::B8G8R8A8_UNORM => 87,
            TextureFormat::R8G8B8A8_SRGB => 29,
            TextureFormat::B8G8R8A8_SRGB => 91,
            TextureFormat::D24_UNORM_S8_UINT => 45,
            TextureFormat::D32_FLOAT => 40,
        }
    }

    fn create_device(
        &mut self,
        requirements: &GraphicsRequirements,
        _config: &PluginConfig,
    ) -> Result<DeviceBootstrap<MockBinding>> {
        if self.fail_device {
            return Err(Error::native("CreateDevice", 0x887a0004u32 as i32));
        }
        let mut renderer = MockRenderer::new();
        renderer.fail_on = self.renderer_fail_on;
        self.renderer_log = Some(renderer.log());
        self.devices_created += 1;
        Ok(DeviceBootstrap {
            renderer: Box::new(renderer),
            binding: MockBinding {
                device: 0xd3d0_0000 | u64::from(requirements.min_feature_level),
            },
        })
    }

    fn color_buffer<'a>(
        &self,
        image: &'a MockSwapchainImage,
        swapchain_format: i64,
    ) -> Result<Box<dyn ColorBuffer + 'a>> {
        let format = Self::format_from_native(swapchain_format).ok_or_else(|| {
            Error::UnsupportedFormat(format!("native format {}", swapchain_format))
        })?;
        let mut buffer = MockColorBuffer::new(image.image, image.width, image.height);
        buffer.desc.format = format;
        Ok(Box::new(buffer))
    }
}

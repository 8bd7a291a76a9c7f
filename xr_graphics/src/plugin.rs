/// Graphics plugin: the interface an XR harness drives, and its generic implementation
///
/// `XrGraphicsPlugin<B>` owns the renderer, the cube scene and the render-target
/// binder; everything API-specific goes through its `Backend`.

use std::fmt;

use crate::binder::{BinderStats, FrameContent, RenderTargetBinder, ViewSettings};
use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::format::{self, TextureFormat};
use crate::renderer::{ColorBuffer, Renderer, RendererStats};
use crate::scene::SceneResources;
use crate::shader_library::{FileShaderSource, ShaderLibrary, ShaderSource};
use crate::swapchain_images::{SwapchainImageArena, SwapchainImageStruct, SwapchainImages};
use crate::xr::{self, CompositionLayerProjectionView, Cube, SwapchainCreateInfo};
use crate::{xr_debug, xr_error, xr_info, xr_warn};

// ============================================================================
// Device requirements
// ============================================================================

/// Locally unique adapter id, as reported by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AdapterLuid {
    pub low: u32,
    pub high: i32,
}

impl fmt::Display for AdapterLuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.high as u32, self.low)
    }
}

/// What the runtime needs from the graphics device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicsRequirements {
    /// Adapter the HMD is attached to; `None` lets the backend pick
    pub adapter_luid: Option<AdapterLuid>,
    /// Lowest acceptable feature level (API-specific encoding)
    pub min_feature_level: u32,
}

/// Result of device creation
pub struct DeviceBootstrap<Binding> {
    pub renderer: Box<dyn Renderer>,
    pub binding: Binding,
}

// ============================================================================
// Backend
// ============================================================================

/// Graphics-API specific half of the plugin
pub trait Backend {
    /// Runtime struct a swapchain image is enumerated into
    type SwapchainImage: SwapchainImageStruct;
    /// Runtime struct handed to session creation
    type Binding;

    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// XR instance extensions this backend needs
    fn instance_extensions(&self) -> Vec<String>;

    /// Native code of a format
    fn native_format(&self, format: TextureFormat) -> i64;

    /// Create the device and a renderer bound to it
    fn create_device(
        &mut self,
        requirements: &GraphicsRequirements,
        config: &PluginConfig,
    ) -> Result<DeviceBootstrap<Self::Binding>>;

    /// Describe a runtime-owned swapchain image as a color buffer
    fn color_buffer<'a>(
        &self,
        image: &'a Self::SwapchainImage,
        swapchain_format: i64,
    ) -> Result<Box<dyn ColorBuffer + 'a>>;
}

// ============================================================================
// GraphicsPlugin
// ============================================================================

/// Operations an XR harness calls, in roughly this order:
/// extensions, device, format, binding, image structs, then `render_view`
/// once per view per frame.
pub trait GraphicsPlugin {
    type SwapchainImage;
    type Binding;

    fn instance_extensions(&self) -> Vec<String>;

    /// Create the device and the scene; fails if called twice
    fn initialize_device(&mut self, requirements: &GraphicsRequirements) -> Result<()>;

    /// First preferred color format the runtime supports
    fn select_color_swapchain_format(&self, runtime_formats: &[i64]) -> Result<i64>;

    /// Binding for session creation; only valid after `initialize_device`
    fn graphics_binding(&self) -> Result<&Self::Binding>;

    /// Typed image structs for one swapchain, valid for the plugin's lifetime
    fn allocate_swapchain_image_structs(
        &mut self,
        capacity: usize,
        create_info: &SwapchainCreateInfo,
    ) -> SwapchainImages<Self::SwapchainImage>;

    fn swapchain_image(
        &self,
        images: &SwapchainImages<Self::SwapchainImage>,
        index: usize,
    ) -> Option<&Self::SwapchainImage>;

    /// Render the cubes into one projection view
    fn render_view(
        &mut self,
        layer_view: &CompositionLayerProjectionView,
        swapchain_image: &Self::SwapchainImage,
        swapchain_format: i64,
        cubes: &[Cube],
    ) -> Result<()>;
}

// ============================================================================
// XrGraphicsPlugin
// ============================================================================

pub struct XrGraphicsPlugin<B: Backend> {
    backend: B,
    config: PluginConfig,
    shader_source: Box<dyn ShaderSource>,
    binder: RenderTargetBinder,
    scene: Option<SceneResources>,
    renderer: Option<Box<dyn Renderer>>,
    binding: Option<B::Binding>,
    images: SwapchainImageArena<B::SwapchainImage>,
}

fn not_initialized(operation: &str) -> Error {
    let message = format!("{} called before initialize_device", operation);
    xr_error!("xrgfx::plugin", "{}", message);
    Error::PreconditionViolated(message)
}

impl<B: Backend> XrGraphicsPlugin<B> {
    /// Plugin reading shaders from disk
    pub fn new(backend: B, config: PluginConfig) -> Self {
        Self::with_shader_source(backend, config, Box::new(FileShaderSource))
    }

    pub fn with_shader_source(
        backend: B,
        config: PluginConfig,
        shader_source: Box<dyn ShaderSource>,
    ) -> Self {
        let binder = RenderTargetBinder::new(ViewSettings::from(&config));
        Self {
            backend,
            config,
            shader_source,
            binder,
            scene: None,
            renderer: None,
            binding: None,
            images: SwapchainImageArena::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn binder_stats(&self) -> BinderStats {
        self.binder.stats()
    }

    pub fn renderer_stats(&self) -> Option<RendererStats> {
        self.renderer.as_ref().map(|renderer| renderer.stats())
    }

    /// Release wrappers, scene resources and the device, in that order
    pub fn shutdown(&mut self) {
        self.binder.release();
        self.scene = None;
        if self.renderer.take().is_some() {
            xr_info!("xrgfx::plugin", "{} device released", self.backend.name());
        }
        self.binding = None;
    }
}

impl<B: Backend> GraphicsPlugin for XrGraphicsPlugin<B> {
    type SwapchainImage = B::SwapchainImage;
    type Binding = B::Binding;

    fn instance_extensions(&self) -> Vec<String> {
        self.backend.instance_extensions()
    }

    fn initialize_device(&mut self, requirements: &GraphicsRequirements) -> Result<()> {
        if self.renderer.is_some() {
            let message = "initialize_device called twice".to_string();
            xr_error!("xrgfx::plugin", "{}", message);
            return Err(Error::PreconditionViolated(message));
        }
        self.config.validate().inspect_err(|e| {
            xr_error!("xrgfx::plugin", "Invalid configuration: {}", e);
        })?;

        let DeviceBootstrap { mut renderer, binding } =
            self.backend.create_device(requirements, &self.config)?;
        let caps = renderer.caps();
        xr_info!(
            "xrgfx::plugin",
            "{} device on '{}' (vendor 0x{:04x}, device 0x{:04x}, feature level 0x{:x})",
            self.backend.name(),
            caps.adapter_name,
            caps.vendor_id,
            caps.device_id,
            caps.feature_level
        );

        let library = ShaderLibrary::new(&self.config, renderer.renderer_type())?;
        let scene = SceneResources::create(renderer.as_mut(), &library, self.shader_source.as_ref())?;

        self.scene = Some(scene);
        self.renderer = Some(renderer);
        self.binding = Some(binding);
        Ok(())
    }

    fn select_color_swapchain_format(&self, runtime_formats: &[i64]) -> Result<i64> {
        let selected = format::select_color_swapchain_format(runtime_formats, |format| {
            self.backend.native_format(format)
        })?;
        xr_debug!("xrgfx::plugin", "Color swapchain format: {}", selected);
        Ok(selected)
    }

    fn graphics_binding(&self) -> Result<&B::Binding> {
        self.binding.as_ref().ok_or_else(|| not_initialized("graphics_binding"))
    }

    fn allocate_swapchain_image_structs(
        &mut self,
        capacity: usize,
        create_info: &SwapchainCreateInfo,
    ) -> SwapchainImages<B::SwapchainImage> {
        if create_info.array_size > 1 {
            xr_warn!(
                "xrgfx::plugin",
                "Swapchain has {} array layers; only layer 0 can be rendered",
                create_info.array_size
            );
        }
        let images = self.images.allocate(capacity);
        xr_debug!(
            "xrgfx::plugin",
            "Allocated {} image structs for {}x{} swapchain (buffer {})",
            capacity,
            create_info.width,
            create_info.height,
            images.buffer_index
        );
        images
    }

    fn swapchain_image(
        &self,
        images: &SwapchainImages<B::SwapchainImage>,
        index: usize,
    ) -> Option<&B::SwapchainImage> {
        self.images.get(images, index)
    }

    fn render_view(
        &mut self,
        layer_view: &CompositionLayerProjectionView,
        swapchain_image: &B::SwapchainImage,
        swapchain_format: i64,
        cubes: &[Cube],
    ) -> Result<()> {
        let array_index = layer_view.sub_image.image_array_index;
        if array_index != 0 {
            let message = format!("swapchain image array index {}", array_index);
            xr_error!("xrgfx::plugin", "Unsupported: {}", message);
            return Err(Error::Unsupported(message));
        }
        let renderer = self.renderer.as_mut().ok_or_else(|| not_initialized("render_view"))?;

        let color_buffer = self.backend.color_buffer(swapchain_image, swapchain_format)?;
        let content = match &self.scene {
            Some(scene) if self.config.draw_scene => Some(FrameContent {
                scene,
                view: xr::view_matrix(&layer_view.pose),
                projection: xr::projection_fov(&layer_view.fov, self.config.near_z, self.config.far_z),
                cubes,
                topology: self.config.topology,
                state: self.config.write_mask,
            }),
            _ => None,
        };

        self.binder.bind_and_render(
            renderer.as_mut(),
            color_buffer.as_ref(),
            layer_view.sub_image.image_rect,
            content,
        )?;
        Ok(())
    }
}

impl<B: Backend> Drop for XrGraphicsPlugin<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;

//! Integration tests for the plugin's render loop
//!
//! Drives `XrGraphicsPlugin` through the public API the way a harness does, with a
//! recording renderer and a software backend standing in for the GPU.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serial_test::serial;
use xr_graphics::glam::Vec3;
use xr_graphics::xrgfx::log::{reset_logger, set_logger, LogEntry, LogSeverity, Logger};
use xr_graphics::xrgfx::render::*;
use xr_graphics::xrgfx::scene::InMemoryShaderSource;
use xr_graphics::xrgfx::xr::*;
use xr_graphics::xrgfx::{
    Backend, DeviceBootstrap, Error, GraphicsPlugin, GraphicsRequirements, PluginConfig, Result,
    XrGraphicsPlugin,
};

// ============================================================================
// Recording renderer
// ============================================================================

#[derive(Default)]
struct Counters {
    textures: Cell<u32>,
    framebuffers: Cell<u32>,
    draws: Cell<u32>,
    frames: Cell<u64>,
    bound: Cell<bool>,
}

struct Target {
    info: TextureInfo,
}

impl Texture for Target {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Fbo(u32, u32);

impl Framebuffer for Fbo {
    fn width(&self) -> u32 {
        self.0
    }
    fn height(&self) -> u32 {
        self.1
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Vb(VertexLayout);

impl VertexBuffer for Vb {
    fn vertex_count(&self) -> u32 {
        8
    }
    fn layout(&self) -> &VertexLayout {
        &self.0
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Ib(u32);

impl IndexBuffer for Ib {
    fn index_count(&self) -> u32 {
        self.0
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Sh(ShaderStage);

impl Shader for Sh {
    fn stage(&self) -> ShaderStage {
        self.0
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Prog;

impl Program for Prog {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct RecordingRenderer {
    counters: Rc<Counters>,
    pending_draws: u32,
}

impl Renderer for RecordingRenderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::Direct3D11
    }

    fn caps(&self) -> RendererCaps {
        RendererCaps { adapter_name: "Recording".to_string(), ..Default::default() }
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        self.counters.textures.set(self.counters.textures.get() + 1);
        Ok(Arc::new(Target { info: TextureInfo::from(desc) }))
    }

    fn override_texture_backing(
        &mut self,
        texture: &Arc<dyn Texture>,
        backing: &dyn ColorBuffer,
    ) -> Result<()> {
        let desc = backing.desc();
        let info = texture.info();
        if (info.width, info.height, info.format) != (desc.width, desc.height, desc.format) {
            return Err(Error::InvalidResource("mismatched backing".to_string()));
        }
        self.counters.bound.set(true);
        Ok(())
    }

    fn release_texture_backing(&mut self, _texture: &Arc<dyn Texture>) -> Result<()> {
        self.counters.bound.set(false);
        Ok(())
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        assert!(self.counters.bound.get(), "frame buffer built on an unbound wrapper");
        self.counters.framebuffers.set(self.counters.framebuffers.get() + 1);
        Ok(Arc::new(Fbo(desc.width, desc.height)))
    }

    fn create_vertex_buffer(&mut self, _data: &[u8], layout: &VertexLayout) -> Result<Arc<dyn VertexBuffer>> {
        Ok(Arc::new(Vb(layout.clone())))
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Arc<dyn IndexBuffer>> {
        Ok(Arc::new(Ib(indices.len() as u32)))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        Ok(Arc::new(Sh(desc.stage)))
    }

    fn create_program(&mut self, _vs: &Arc<dyn Shader>, _fs: &Arc<dyn Shader>) -> Result<Arc<dyn Program>> {
        Ok(Arc::new(Prog))
    }

    fn set_view_name(&mut self, _view: ViewId, _name: &str) {}
    fn set_view_rect(&mut self, _view: ViewId, _rect: ViewRect) {}
    fn set_view_clear(&mut self, _view: ViewId, _clear: ClearState) {}
    fn set_view_transform(&mut self, _view: ViewId, _view_matrix: xr_graphics::glam::Mat4, _projection: xr_graphics::glam::Mat4) {}
    fn set_view_framebuffer(&mut self, _view: ViewId, _framebuffer: &Arc<dyn Framebuffer>) {}
    fn touch(&mut self, _view: ViewId) {}

    fn submit(&mut self, _view: ViewId, _draw: &DrawCall) -> Result<()> {
        self.pending_draws += 1;
        Ok(())
    }

    fn frame(&mut self) -> Result<u64> {
        self.counters.draws.set(self.counters.draws.get() + self.pending_draws);
        self.pending_draws = 0;
        let frame = self.counters.frames.get();
        self.counters.frames.set(frame + 1);
        Ok(frame)
    }

    fn stats(&self) -> RendererStats {
        RendererStats { frames: self.counters.frames.get(), ..Default::default() }
    }
}

// ============================================================================
// Software backend
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
struct SoftImage {
    ty: u32,
    id: u64,
    width: u32,
    height: u32,
}

impl SwapchainImageStruct for SoftImage {
    fn new_typed() -> Self {
        Self { ty: 7, ..Default::default() }
    }
}

struct SoftBuffer(SoftImage, TextureFormat);

impl ColorBuffer for SoftBuffer {
    fn desc(&self) -> ColorBufferDesc {
        ColorBufferDesc { width: self.0.width, height: self.0.height, format: self.1, array_size: 1 }
    }
    fn id(&self) -> ColorBufferId {
        ColorBufferId::new(self.0.id)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct SoftBackend {
    counters: Rc<Counters>,
}

impl Backend for SoftBackend {
    type SwapchainImage = SoftImage;
    type Binding = ();

    fn name(&self) -> &'static str {
        "Soft"
    }

    fn instance_extensions(&self) -> Vec<String> {
        Vec::new()
    }

    fn native_format(&self, format: TextureFormat) -> i64 {
        format as i64 + 1
    }

    fn create_device(
        &mut self,
        _requirements: &GraphicsRequirements,
        _config: &PluginConfig,
    ) -> Result<DeviceBootstrap<()>> {
        Ok(DeviceBootstrap {
            renderer: Box::new(RecordingRenderer { counters: self.counters.clone(), pending_draws: 0 }),
            binding: (),
        })
    }

    fn color_buffer<'a>(&self, image: &'a SoftImage, swapchain_format: i64) -> Result<Box<dyn ColorBuffer + 'a>> {
        let format = COLOR_SWAPCHAIN_FORMATS
            .into_iter()
            .find(|f| self.native_format(*f) == swapchain_format)
            .ok_or_else(|| Error::UnsupportedFormat(swapchain_format.to_string()))?;
        Ok(Box::new(SoftBuffer(*image, format)))
    }
}

fn soft_plugin() -> (XrGraphicsPlugin<SoftBackend>, Rc<Counters>) {
    let backend = SoftBackend::default();
    let counters = backend.counters.clone();
    let shaders = InMemoryShaderSource::new()
        .with("shaders/dx11/vs_cubes.bin", vec![1])
        .with("shaders/dx11/fs_cubes.bin", vec![1]);
    let mut plugin = XrGraphicsPlugin::with_shader_source(backend, PluginConfig::default(), Box::new(shaders));
    plugin.initialize_device(&GraphicsRequirements::default()).unwrap();
    (plugin, counters)
}

fn eye(width: i32, height: i32) -> CompositionLayerProjectionView {
    CompositionLayerProjectionView {
        pose: Posef { position: Vec3::new(0.03, 1.6, 0.0), ..Posef::IDENTITY },
        fov: Fovf { angle_left: -0.9, angle_right: 0.8, angle_up: 0.8, angle_down: -0.9 },
        sub_image: SwapchainSubImage { image_rect: Rect2Di::from_size(width, height), image_array_index: 0 },
    }
}

// ============================================================================
// RENDER LOOP TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_stereo_render_loop() {
    let (mut plugin, counters) = soft_plugin();
    let format = plugin
        .select_color_swapchain_format(&[plugin.backend().native_format(TextureFormat::B8G8R8A8_SRGB)])
        .unwrap();

    let info = SwapchainCreateInfo { format, width: 1832, height: 1920, sample_count: 1, array_size: 1, mip_count: 1 };
    let images = plugin.allocate_swapchain_image_structs(3, &info);
    for (i, ptr) in images.images.iter().enumerate() {
        unsafe {
            let image = ptr.as_ptr();
            (*image).id = i as u64 + 1;
            (*image).width = 1832;
            (*image).height = 1920;
        }
    }

    let cubes = [
        Cube { pose: Posef::IDENTITY, scale: Vec3::splat(0.1) },
        Cube { pose: Posef { position: Vec3::new(0.0, 0.0, -1.0), ..Posef::IDENTITY }, scale: Vec3::ONE },
        Cube { pose: Posef { position: Vec3::new(1.0, 0.0, -1.0), ..Posef::IDENTITY }, scale: Vec3::ONE },
    ];

    for frame in 0..5usize {
        for _view in 0..2 {
            let image = *plugin.swapchain_image(&images, frame % 3).unwrap();
            plugin.render_view(&eye(1832, 1920), &image, format, &cubes).unwrap();
        }
    }

    assert_eq!(counters.textures.get(), 1);
    assert_eq!(counters.framebuffers.get(), 10);
    assert_eq!(counters.frames.get(), 10);
    assert_eq!(counters.draws.get(), 30);
    assert!(!counters.bound.get(), "swapchain image still bound after render_view");
}

#[test]
#[serial]
fn test_integration_resized_swapchain_gets_new_wrapper() {
    let (mut plugin, counters) = soft_plugin();
    let format = plugin.backend().native_format(TextureFormat::R8G8B8A8_UNORM);

    let small = SoftImage { ty: 7, id: 1, width: 640, height: 480 };
    let large = SoftImage { ty: 7, id: 2, width: 1280, height: 960 };
    plugin.render_view(&eye(640, 480), &small, format, &[]).unwrap();
    plugin.render_view(&eye(1280, 960), &large, format, &[]).unwrap();
    plugin.render_view(&eye(640, 480), &small, format, &[]).unwrap();

    assert_eq!(counters.textures.get(), 2);
    assert_eq!(plugin.binder_stats().wrappers_created, 2);
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

struct CaptureLogger(Arc<Mutex<Vec<(LogSeverity, String, String)>>>);

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source.starts_with("xrgfx::") {
            self.0
                .lock()
                .unwrap()
                .push((entry.severity, entry.source.clone(), entry.message.clone()));
        }
    }
}

#[test]
#[serial]
fn test_integration_errors_reach_custom_logger() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    set_logger(CaptureLogger(entries.clone()));

    let (mut plugin, _counters) = soft_plugin();
    let format = plugin.backend().native_format(TextureFormat::R8G8B8A8_UNORM);
    let image = SoftImage { ty: 7, id: 1, width: 64, height: 64 };
    let result = plugin.render_view(&eye(128, 64), &image, format, &[]);
    assert!(matches!(result, Err(Error::PreconditionViolated(_))));

    plugin.render_view(&eye(64, 64), &image, format, &[]).unwrap();
    reset_logger();

    let entries = entries.lock().unwrap();
    assert!(entries
        .iter()
        .any(|(severity, source, _)| *severity == LogSeverity::Error && source == "xrgfx::binder"));
    assert!(entries
        .iter()
        .any(|(severity, _, message)| *severity == LogSeverity::Info && message.contains("render-target wrapper")));
}

/// Mock Renderer for unit tests (no GPU required)
///
/// Records every call into a shared `MockRendererLog` so tests can keep a handle
/// on it after the renderer has been boxed into the plugin.

use std::any::Any;
use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::geometry::{PrimitiveTopology, VertexLayout};
use crate::renderer::{
    ClearState, ColorBuffer, ColorBufferDesc, ColorBufferId, DrawCall, Framebuffer,
    FramebufferDesc, IndexBuffer, Program, Renderer, RendererCaps, RendererStats, RendererType,
    Shader, ShaderDesc, ShaderStage, Texture, TextureDesc, TextureInfo, TextureUsage,
    VertexBuffer, ViewId, ViewRect,
};
use crate::xr_bail;

// ============================================================================
// Mock ColorBuffer
// ============================================================================

/// Stand-in for a runtime-owned swapchain image
#[derive(Debug, Clone, Copy)]
pub struct MockColorBuffer {
    pub id: u64,
    pub desc: ColorBufferDesc,
}

impl MockColorBuffer {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            desc: ColorBufferDesc {
                width,
                height,
                format: crate::format::TextureFormat::R8G8B8A8_UNORM,
                array_size: 1,
            },
        }
    }
}

impl ColorBuffer for MockColorBuffer {
    fn desc(&self) -> ColorBufferDesc {
        self.desc
    }

    fn id(&self) -> ColorBufferId {
        ColorBufferId::new(self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
    /// External buffer currently aliased, if any
    pub backing: RefCell<Option<ColorBufferId>>,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
    pub attachments: Vec<Arc<dyn Texture>>,
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockVertexBuffer {
    pub vertex_count: u32,
    pub layout: VertexLayout,
}

impl VertexBuffer for MockVertexBuffer {
    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockIndexBuffer {
    pub indices: Vec<u16>,
}

impl IndexBuffer for MockIndexBuffer {
    fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockShader {
    pub stage: ShaderStage,
    pub name: String,
}

impl Shader for MockShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct MockProgram;

impl Program for MockProgram {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Call log
// ============================================================================

/// Per-view state as last set through the renderer
#[derive(Debug, Clone, Default)]
pub struct MockViewState {
    pub name: String,
    pub rect: ViewRect,
    pub clear: Option<ClearState>,
    pub transform: Option<(Mat4, Mat4)>,
    /// (width, height) of the attached frame buffer
    pub framebuffer: Option<(u32, u32)>,
    pub touched: bool,
}

/// A queued draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockDraw {
    pub view: ViewId,
    pub topology: PrimitiveTopology,
    pub index_count: u32,
    pub transform: Mat4,
}

/// Everything the mock renderer has been asked to do
#[derive(Debug, Default)]
pub struct MockRendererLog {
    /// Ordered call names
    pub commands: Vec<String>,
    pub textures_created: Vec<TextureDesc>,
    /// (texture name, buffer) per override
    pub overrides: Vec<(String, ColorBufferId)>,
    pub releases: u32,
    pub framebuffers_created: u32,
    pub vertex_buffers_created: u32,
    pub index_buffers_created: u32,
    pub shaders_created: Vec<String>,
    pub programs_created: u32,
    pub views: FxHashMap<ViewId, MockViewState>,
    /// Draws of the frame being built
    pub pending_draws: Vec<MockDraw>,
    /// Draws of every submitted frame
    pub submitted_draws: Vec<MockDraw>,
    pub frames: u64,
}

impl MockRendererLog {
    /// Number of times a call name was recorded
    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| c.as_str() == command).count()
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// Mock Renderer that records calls without a GPU
pub struct MockRenderer {
    pub log: Arc<Mutex<MockRendererLog>>,
    /// Call name that should fail, for error-path tests
    pub fail_on: Option<&'static str>,
    last_frame: RendererStats,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(MockRendererLog::default())),
            fail_on: None,
            last_frame: RendererStats::default(),
        }
    }

    /// Mock whose `call` always fails with a backend error
    pub fn failing(call: &'static str) -> Self {
        Self { fail_on: Some(call), ..Self::new() }
    }

    /// Shared handle on the call log
    pub fn log(&self) -> Arc<Mutex<MockRendererLog>> {
        self.log.clone()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.log.lock().unwrap().commands.push(call.to_string());
        if self.fail_on == Some(call) {
            xr_bail!("xrgfx::mock", "{} failed (injected)", call);
        }
        Ok(())
    }

    fn with_view<F: FnOnce(&mut MockViewState)>(&self, view: ViewId, f: F) {
        let mut log = self.log.lock().unwrap();
        f(log.views.entry(view).or_default());
    }
}

impl Renderer for MockRenderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::Noop
    }

    fn caps(&self) -> RendererCaps {
        RendererCaps {
            vendor_id: 0x10de,
            device_id: 0x1234,
            adapter_name: "Mock Adapter".to_string(),
            feature_level: 0xb000,
        }
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        self.record("create_texture")?;
        self.log.lock().unwrap().textures_created.push(desc.clone());
        Ok(Arc::new(MockTexture {
            info: TextureInfo::from(desc),
            name: desc.name.clone(),
            backing: RefCell::new(None),
        }))
    }

    fn override_texture_backing(
        &mut self,
        texture: &Arc<dyn Texture>,
        backing: &dyn ColorBuffer,
    ) -> Result<()> {
        self.record("override_texture_backing")?;
        let Some(mock) = texture.as_any().downcast_ref::<MockTexture>() else {
            return Err(Error::InvalidResource("not a mock texture".to_string()));
        };
        let desc = backing.desc();
        if mock.info.usage != TextureUsage::RenderTarget {
            xr_bail!("xrgfx::mock", "override on non render-target texture {}", mock.name);
        }
        if (mock.info.width, mock.info.height, mock.info.format)
            != (desc.width, desc.height, desc.format)
        {
            xr_bail!(
                "xrgfx::mock",
                "override size mismatch: texture {}x{} {:?}, buffer {}x{} {:?}",
                mock.info.width, mock.info.height, mock.info.format,
                desc.width, desc.height, desc.format
            );
        }
        *mock.backing.borrow_mut() = Some(backing.id());
        self.log
            .lock()
            .unwrap()
            .overrides
            .push((mock.name.clone(), backing.id()));
        Ok(())
    }

    fn release_texture_backing(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        self.record("release_texture_backing")?;
        if let Some(mock) = texture.as_any().downcast_ref::<MockTexture>() {
            *mock.backing.borrow_mut() = None;
        }
        self.log.lock().unwrap().releases += 1;
        Ok(())
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        self.record("create_framebuffer")?;
        if desc.color_attachments.is_empty() {
            xr_bail!("xrgfx::mock", "frame buffer without attachments");
        }
        self.log.lock().unwrap().framebuffers_created += 1;
        Ok(Arc::new(MockFramebuffer {
            width: desc.width,
            height: desc.height,
            attachments: desc.color_attachments.clone(),
        }))
    }

    fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        layout: &VertexLayout,
    ) -> Result<Arc<dyn VertexBuffer>> {
        self.record("create_vertex_buffer")?;
        self.log.lock().unwrap().vertex_buffers_created += 1;
        Ok(Arc::new(MockVertexBuffer {
            vertex_count: data.len() as u32 / layout.stride,
            layout: layout.clone(),
        }))
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Arc<dyn IndexBuffer>> {
        self.record("create_index_buffer")?;
        self.log.lock().unwrap().index_buffers_created += 1;
        Ok(Arc::new(MockIndexBuffer { indices: indices.to_vec() }))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        self.record("create_shader")?;
        if desc.code.is_empty() {
            return Err(Error::InvalidResource(format!("shader {} is empty", desc.name)));
        }
        self.log.lock().unwrap().shaders_created.push(desc.name.clone());
        Ok(Arc::new(MockShader { stage: desc.stage, name: desc.name.clone() }))
    }

    fn create_program(
        &mut self,
        vertex: &Arc<dyn Shader>,
        fragment: &Arc<dyn Shader>,
    ) -> Result<Arc<dyn Program>> {
        self.record("create_program")?;
        if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
            return Err(Error::InvalidResource("program stages swapped".to_string()));
        }
        self.log.lock().unwrap().programs_created += 1;
        Ok(Arc::new(MockProgram))
    }

    fn set_view_name(&mut self, view: ViewId, name: &str) {
        let _ = self.record("set_view_name");
        self.with_view(view, |state| state.name = name.to_string());
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        let _ = self.record("set_view_rect");
        self.with_view(view, |state| state.rect = rect);
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ClearState) {
        let _ = self.record("set_view_clear");
        self.with_view(view, |state| state.clear = Some(clear));
    }

    fn set_view_transform(&mut self, view: ViewId, view_matrix: Mat4, projection: Mat4) {
        let _ = self.record("set_view_transform");
        self.with_view(view, |state| state.transform = Some((view_matrix, projection)));
    }

    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: &Arc<dyn Framebuffer>) {
        let _ = self.record("set_view_framebuffer");
        let size = (framebuffer.width(), framebuffer.height());
        self.with_view(view, |state| state.framebuffer = Some(size));
    }

    fn touch(&mut self, view: ViewId) {
        let _ = self.record("touch");
        self.with_view(view, |state| state.touched = true);
    }

    fn submit(&mut self, view: ViewId, draw: &DrawCall) -> Result<()> {
        self.record("submit")?;
        self.log.lock().unwrap().pending_draws.push(MockDraw {
            view,
            topology: draw.topology,
            index_count: draw.index_buffer.index_count(),
            transform: draw.transform,
        });
        Ok(())
    }

    fn frame(&mut self) -> Result<u64> {
        self.record("frame")?;
        let mut log = self.log.lock().unwrap();
        let views = log.views.values().filter(|v| v.touched).count() as u32;
        let draws = std::mem::take(&mut log.pending_draws);
        self.last_frame.draw_calls = draws.len() as u32;
        self.last_frame.views = views;
        log.submitted_draws.extend(draws);
        for state in log.views.values_mut() {
            state.touched = false;
            state.framebuffer = None;
        }
        let frame = log.frames;
        log.frames += 1;
        self.last_frame.frames = log.frames;
        Ok(frame)
    }

    fn stats(&self) -> RendererStats {
        self.last_frame
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;

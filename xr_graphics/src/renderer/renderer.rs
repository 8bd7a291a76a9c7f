/// Renderer trait - the rendering library as seen by the plugin

use std::sync::Arc;
use glam::Mat4;

use crate::error::Result;
use crate::geometry::VertexLayout;
use crate::renderer::{
    ClearState, ColorBuffer, DrawCall, Framebuffer, FramebufferDesc, IndexBuffer, Program,
    Shader, ShaderDesc, Texture, TextureDesc, VertexBuffer, ViewId, ViewRect,
};

/// Graphics API a renderer is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererType {
    Noop,
    Direct3D9,
    Direct3D11,
    Direct3D12,
    Gnm,
    Metal,
    Nvn,
    OpenGL,
    OpenGLES,
    Vulkan,
}

/// Device capabilities reported after creation
#[derive(Debug, Clone, Default)]
pub struct RendererCaps {
    /// PCI vendor id of the adapter
    pub vendor_id: u32,
    /// PCI device id of the adapter
    pub device_id: u32,
    /// Adapter description
    pub adapter_name: String,
    /// Negotiated feature level (API-specific encoding)
    pub feature_level: u32,
}

/// Renderer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Frames submitted so far
    pub frames: u64,
    /// Draw calls in the last submitted frame
    pub draw_calls: u32,
    /// Views processed in the last submitted frame
    pub views: u32,
}

/// Rendering library interface
///
/// Views are the unit of work: state (rect, clear, transform, frame buffer) is set
/// per view, draws are queued per view, and `frame()` processes every view that was
/// touched or drawn into since the previous frame, in view-id order.
///
/// Not `Send`: a renderer lives on the harness's render thread.
pub trait Renderer {
    /// Graphics API behind this renderer
    fn renderer_type(&self) -> RendererType;

    /// Capabilities of the underlying device
    fn caps(&self) -> RendererCaps;

    /// Create a texture
    ///
    /// Render-target textures own backing memory until rebound with
    /// `override_texture_backing`.
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Point a render-target texture at an externally owned color buffer
    ///
    /// Zero-copy: subsequent draws to frame buffers built from `texture` land in
    /// `backing`. The texture's size and format must match the buffer's.
    fn override_texture_backing(
        &mut self,
        texture: &Arc<dyn Texture>,
        backing: &dyn ColorBuffer,
    ) -> Result<()>;

    /// Drop any external backing previously set on `texture`
    fn release_texture_backing(&mut self, texture: &Arc<dyn Texture>) -> Result<()>;

    /// Combine render-target textures into a drawable frame buffer
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Upload a static vertex buffer
    fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        layout: &VertexLayout,
    ) -> Result<Arc<dyn VertexBuffer>>;

    /// Upload a static 16-bit index buffer
    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Arc<dyn IndexBuffer>>;

    /// Create a shader from backend bytecode
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Link a vertex and fragment shader
    fn create_program(
        &mut self,
        vertex: &Arc<dyn Shader>,
        fragment: &Arc<dyn Shader>,
    ) -> Result<Arc<dyn Program>>;

    /// Set a view's debug name
    fn set_view_name(&mut self, view: ViewId, name: &str);

    /// Set a view's pixel rectangle
    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect);

    /// Set a view's clear flags and values
    fn set_view_clear(&mut self, view: ViewId, clear: ClearState);

    /// Set a view's camera and projection matrices
    fn set_view_transform(&mut self, view: ViewId, view_matrix: Mat4, projection: Mat4);

    /// Render a view into `framebuffer`
    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: &Arc<dyn Framebuffer>);

    /// Mark a view as used this frame, so it is cleared even with no draws
    fn touch(&mut self, view: ViewId);

    /// Queue a draw into a view
    fn submit(&mut self, view: ViewId, draw: &DrawCall) -> Result<()>;

    /// Process every pending view and start the next frame
    ///
    /// Returns the number of the frame just submitted.
    fn frame(&mut self) -> Result<u64>;

    /// Statistics about submitted work
    fn stats(&self) -> RendererStats;
}

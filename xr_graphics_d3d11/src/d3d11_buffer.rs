/// Buffer - D3D11 vertex and index buffers

use std::any::Any;

use windows::Win32::Graphics::Direct3D11::*;
use xr_graphics::xrgfx::render::{
    IndexBuffer as RendererIndexBuffer, VertexBuffer as RendererVertexBuffer, VertexLayout,
};

/// D3D11 vertex buffer implementation
pub struct VertexBuffer {
    pub(crate) buffer: ID3D11Buffer,
    pub(crate) layout: VertexLayout,
    pub(crate) vertex_count: u32,
}

impl RendererVertexBuffer for VertexBuffer {
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

/// D3D11 16-bit index buffer implementation
pub struct IndexBuffer {
    pub(crate) buffer: ID3D11Buffer,
    pub(crate) index_count: u32,
}

impl RendererIndexBuffer for IndexBuffer {
    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

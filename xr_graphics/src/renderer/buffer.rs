/// Static vertex and index buffer traits

use std::any::Any;
use crate::geometry::VertexLayout;

/// GPU vertex buffer
pub trait VertexBuffer {
    /// Number of vertices stored
    fn vertex_count(&self) -> u32;

    /// Layout the data was uploaded with
    fn layout(&self) -> &VertexLayout;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

/// GPU index buffer (16-bit indices)
pub trait IndexBuffer {
    /// Number of indices stored
    fn index_count(&self) -> u32;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

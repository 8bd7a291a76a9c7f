/// Draw submission types

use std::sync::Arc;
use bitflags::bitflags;
use glam::Mat4;

use crate::geometry::PrimitiveTopology;
use crate::renderer::{IndexBuffer, Program, VertexBuffer};

bitflags! {
    /// Fixed-function state of a draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawState: u32 {
        const WRITE_R = 1 << 0;
        const WRITE_G = 1 << 1;
        const WRITE_B = 1 << 2;
        const WRITE_A = 1 << 3;
        const WRITE_Z = 1 << 4;
        const DEPTH_TEST_LESS = 1 << 5;
        const CULL_CW = 1 << 6;
        const MSAA = 1 << 7;

        const WRITE_RGB = Self::WRITE_R.bits() | Self::WRITE_G.bits() | Self::WRITE_B.bits();
        const DEFAULT = Self::WRITE_RGB.bits()
            | Self::WRITE_A.bits()
            | Self::WRITE_Z.bits()
            | Self::DEPTH_TEST_LESS.bits()
            | Self::CULL_CW.bits()
            | Self::MSAA.bits();
    }
}

/// One indexed draw
pub struct DrawCall<'a> {
    pub vertex_buffer: &'a Arc<dyn VertexBuffer>,
    pub index_buffer: &'a Arc<dyn IndexBuffer>,
    pub program: &'a Arc<dyn Program>,
    /// Model matrix
    pub transform: Mat4,
    pub topology: PrimitiveTopology,
    pub state: DrawState,
}

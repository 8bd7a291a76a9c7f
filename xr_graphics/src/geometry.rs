//! Cube mesh data: 8 colored vertices and one index list per primitive topology

use bytemuck::{Pod, Zeroable};

/// Vertex with position and packed ABGR color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PosColorVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub abgr: u32,
}

impl PosColorVertex {
    const fn new(x: f32, y: f32, z: f32, abgr: u32) -> Self {
        Self { x, y, z, abgr }
    }

    /// Vertex layout matching this struct
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: std::mem::size_of::<PosColorVertex>() as u32,
            attributes: vec![
                VertexAttribute {
                    semantic: VertexSemantic::Position,
                    format: AttributeFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    semantic: VertexSemantic::Color0,
                    format: AttributeFormat::Unorm8x4,
                    offset: 12,
                },
            ],
        }
    }
}

/// Meaning of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Color0,
}

/// Storage format of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    /// Three 32-bit floats
    Float32x3,
    /// Four normalized 8-bit unsigned integers
    Unorm8x4,
}

impl AttributeFormat {
    /// Size in bytes
    pub fn size(self) -> u32 {
        match self {
            AttributeFormat::Float32x3 => 12,
            AttributeFormat::Unorm8x4 => 4,
        }
    }
}

/// Single attribute inside a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: AttributeFormat,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

/// Vertex stream declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

pub const CUBE_VERTICES: [PosColorVertex; 8] = [
    PosColorVertex::new(-1.0, 1.0, 1.0, 0xff000000),
    PosColorVertex::new(1.0, 1.0, 1.0, 0xff0000ff),
    PosColorVertex::new(-1.0, -1.0, 1.0, 0xff00ff00),
    PosColorVertex::new(1.0, -1.0, 1.0, 0xff00ffff),
    PosColorVertex::new(-1.0, 1.0, -1.0, 0xffff0000),
    PosColorVertex::new(1.0, 1.0, -1.0, 0xffff00ff),
    PosColorVertex::new(-1.0, -1.0, -1.0, 0xffffff00),
    PosColorVertex::new(1.0, -1.0, -1.0, 0xffffffff),
];

pub const CUBE_TRI_LIST: [u16; 36] = [
    0, 1, 2,
    1, 3, 2,
    4, 6, 5,
    5, 6, 7,
    0, 2, 4,
    4, 2, 6,
    1, 5, 3,
    5, 7, 3,
    0, 4, 1,
    4, 5, 1,
    2, 3, 6,
    6, 3, 7,
];

pub const CUBE_TRI_STRIP: [u16; 14] = [0, 1, 2, 3, 7, 1, 5, 0, 4, 2, 6, 7, 4, 5];

pub const CUBE_LINE_LIST: [u16; 24] = [
    0, 1, 0, 2, 0, 4, 1, 3, 1, 5, 2, 3, 2, 6, 3, 7, 4, 5, 4, 6, 5, 7, 6, 7,
];

pub const CUBE_LINE_STRIP: [u16; 17] = [0, 2, 3, 1, 5, 7, 6, 4, 0, 2, 6, 4, 5, 7, 3, 1, 0];

pub const CUBE_POINTS: [u16; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// How the cube's indices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    Lines,
    LineStrip,
    Points,
}

impl PrimitiveTopology {
    pub const ALL: [PrimitiveTopology; 5] = [
        PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip,
        PrimitiveTopology::Lines,
        PrimitiveTopology::LineStrip,
        PrimitiveTopology::Points,
    ];

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveTopology::TriangleList => "Triangle List",
            PrimitiveTopology::TriangleStrip => "Triangle Strip",
            PrimitiveTopology::Lines => "Lines",
            PrimitiveTopology::LineStrip => "Line Strip",
            PrimitiveTopology::Points => "Points",
        }
    }

    /// Cube indices for this topology
    pub fn cube_indices(self) -> &'static [u16] {
        match self {
            PrimitiveTopology::TriangleList => &CUBE_TRI_LIST,
            PrimitiveTopology::TriangleStrip => &CUBE_TRI_STRIP,
            PrimitiveTopology::Lines => &CUBE_LINE_LIST,
            PrimitiveTopology::LineStrip => &CUBE_LINE_STRIP,
            PrimitiveTopology::Points => &CUBE_POINTS,
        }
    }

    /// Position in `ALL`
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;

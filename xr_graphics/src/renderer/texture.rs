/// Texture trait, texture descriptor, and texture info

use std::any::Any;
use crate::format::TextureFormat;

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as a color render target
    RenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
    /// Debug name
    pub name: String,
}

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
        }
    }
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types. Destroyed when the last
/// reference is dropped.
pub trait Texture {
    /// Read-only properties of this texture
    fn info(&self) -> &TextureInfo;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

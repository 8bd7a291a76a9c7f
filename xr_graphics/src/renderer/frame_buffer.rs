/// Framebuffer trait - groups render-target textures into one drawable target
///
/// The plugin builds one per rendered view and drops it once the frame has
/// been submitted.

use std::any::Any;
use std::sync::Arc;
use crate::renderer::Texture;

/// Framebuffer: color attachments a view renders into
pub trait Framebuffer {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc {
    /// Color attachments (render-target textures)
    pub color_attachments: Vec<Arc<dyn Texture>>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Texture - D3D11 implementation of the Texture trait
///
/// Render-target textures own a texture + RTV and can temporarily render into an
/// external texture instead (a runtime swapchain image).

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use windows::Win32::Graphics::Direct3D11::*;
use xr_graphics::xrgfx::render::{
    ColorBufferId, Framebuffer as RendererFramebuffer, Texture as RendererTexture, TextureInfo,
};

/// External texture the wrapper currently renders into
pub(crate) struct Backing {
    pub(crate) id: ColorBufferId,
    /// Keeps the external texture alive while bound
    pub(crate) _texture: ID3D11Texture2D,
    pub(crate) rtv: ID3D11RenderTargetView,
}

/// D3D11 texture implementation
pub struct Texture {
    pub(crate) texture: ID3D11Texture2D,
    /// Present for render-target usage
    pub(crate) rtv: Option<ID3D11RenderTargetView>,
    pub(crate) backing: RefCell<Option<Backing>>,
    pub(crate) info: TextureInfo,
}

impl Texture {
    /// RTV draws should go to: the bound external texture's, else our own
    pub(crate) fn current_rtv(&self) -> Option<ID3D11RenderTargetView> {
        match &*self.backing.borrow() {
            Some(backing) => Some(backing.rtv.clone()),
            None => self.rtv.clone(),
        }
    }

    /// Whether the texture has a render target view of its own
    pub fn has_render_target_view(&self) -> bool {
        self.rtv.is_some()
    }

    /// Color buffer currently backing the texture
    pub fn backing_id(&self) -> Option<ColorBufferId> {
        self.backing.borrow().as_ref().map(|backing| backing.id)
    }
}

impl RendererTexture for Texture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// D3D11 frame buffer: the color attachments of one view
pub struct Framebuffer {
    pub(crate) color_attachments: Vec<Arc<dyn RendererTexture>>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Framebuffer {
    /// RTVs of every attachment, resolved at bind time
    pub(crate) fn render_target_views(&self) -> Vec<Option<ID3D11RenderTargetView>> {
        self.color_attachments
            .iter()
            .filter_map(|attachment| attachment.as_any().downcast_ref::<Texture>())
            .map(|texture| texture.current_rtv())
            .collect()
    }
}

impl RendererFramebuffer for Framebuffer {
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

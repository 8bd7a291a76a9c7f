/// Swapchain render-target binder
///
/// Makes runtime-owned color buffers drawable. Wrappers (render-target textures
/// whose backing can be swapped) are cached per `(width, height, format)`; every
/// call rebinds the matching wrapper to the caller's buffer, renders one view
/// into it through a transient frame buffer, submits the frame and unbinds the
/// buffer again.

use std::sync::Arc;
use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::format::TextureFormat;
use crate::geometry::PrimitiveTopology;
use crate::renderer::{
    ClearState, ColorBuffer, ColorBufferDesc, DrawState, FramebufferDesc, Renderer, Texture,
    TextureDesc, TextureUsage, ViewId, ViewRect,
};
use crate::scene::SceneResources;
use crate::xr::{Cube, Rect2Di};
use crate::{xr_error, xr_info, xr_trace};

/// Configuration a wrapper is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetKey {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl From<&ColorBufferDesc> for RenderTargetKey {
    fn from(desc: &ColorBufferDesc) -> Self {
        Self { width: desc.width, height: desc.height, format: desc.format }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    /// No call has completed yet
    Uninitialized,
    /// A call has rendered through a wrapper
    Bound,
}

/// Counters since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinderStats {
    pub wrappers_created: u32,
    pub framebuffers_created: u64,
    pub views_rendered: u64,
    pub draws_submitted: u64,
}

/// Scene content drawn into a view
pub struct FrameContent<'a> {
    pub scene: &'a SceneResources,
    pub view: Mat4,
    pub projection: Mat4,
    pub cubes: &'a [Cube],
    pub topology: PrimitiveTopology,
    pub state: DrawState,
}

/// Logical view every call renders through
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub id: ViewId,
    pub name: String,
    pub clear: ClearState,
}

impl From<&PluginConfig> for ViewSettings {
    fn from(config: &PluginConfig) -> Self {
        Self {
            id: config.view_id,
            name: config.view_name.clone(),
            clear: config.clear,
        }
    }
}

pub struct RenderTargetBinder {
    view: ViewSettings,
    wrappers: FxHashMap<RenderTargetKey, Arc<dyn Texture>>,
    /// Set by the first successful call, cleared by `release`
    bound: bool,
    stats: BinderStats,
}

fn precondition(message: String) -> Error {
    xr_error!("xrgfx::binder", "{}", message);
    Error::PreconditionViolated(message)
}

impl RenderTargetBinder {
    pub fn new(view: ViewSettings) -> Self {
        Self {
            view,
            wrappers: FxHashMap::default(),
            bound: false,
            stats: BinderStats::default(),
        }
    }

    pub fn state(&self) -> BinderState {
        if self.bound {
            BinderState::Bound
        } else {
            BinderState::Uninitialized
        }
    }

    pub fn stats(&self) -> BinderStats {
        self.stats
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    /// Number of cached wrappers
    pub fn wrapper_count(&self) -> usize {
        self.wrappers.len()
    }

    pub fn wrapper(&self, key: &RenderTargetKey) -> Option<&Arc<dyn Texture>> {
        self.wrappers.get(key)
    }

    /// Render one view into `color_buffer` and submit the frame
    ///
    /// Returns the renderer's frame number. The buffer is only referenced for
    /// the duration of the call, including on error.
    pub fn bind_and_render(
        &mut self,
        renderer: &mut dyn Renderer,
        color_buffer: &dyn ColorBuffer,
        view_rect: Rect2Di,
        content: Option<FrameContent<'_>>,
    ) -> Result<u64> {
        let desc = color_buffer.desc();
        if desc.width == 0 || desc.height == 0 {
            return Err(precondition(format!(
                "color buffer {:?} is empty ({}x{})",
                color_buffer.id(),
                desc.width,
                desc.height
            )));
        }
        if desc.array_size > 1 {
            let message = format!("texture array color buffers ({} layers)", desc.array_size);
            xr_error!("xrgfx::binder", "Unsupported: {}", message);
            return Err(Error::Unsupported(message));
        }
        if !view_rect.fits_within(desc.width, desc.height) {
            return Err(precondition(format!(
                "view rect {:?} does not fit in {}x{} color buffer",
                view_rect, desc.width, desc.height
            )));
        }
        let rect = ViewRect::try_from(view_rect).map_err(|e| match e {
            Error::PreconditionViolated(message) => precondition(message),
            other => other,
        })?;

        let wrapper = self.wrapper_for(renderer, &desc)?;
        renderer.override_texture_backing(&wrapper, color_buffer)?;

        let rendered = self.render_into(renderer, &wrapper, &desc, rect, content);
        let released = renderer.release_texture_backing(&wrapper);
        let frame = rendered?;
        released?;

        self.bound = true;
        self.stats.views_rendered += 1;
        xr_trace!(
            "xrgfx::binder",
            "Frame {} rendered into {:?} ({}x{})",
            frame,
            color_buffer.id(),
            desc.width,
            desc.height
        );
        Ok(frame)
    }

    /// Drop every wrapper
    pub fn release(&mut self) {
        if !self.wrappers.is_empty() {
            xr_info!("xrgfx::binder", "Releasing {} render-target wrapper(s)", self.wrappers.len());
        }
        self.wrappers.clear();
        self.bound = false;
    }

    fn wrapper_for(
        &mut self,
        renderer: &mut dyn Renderer,
        desc: &ColorBufferDesc,
    ) -> Result<Arc<dyn Texture>> {
        let key = RenderTargetKey::from(desc);
        if let Some(wrapper) = self.wrappers.get(&key) {
            return Ok(wrapper.clone());
        }

        let wrapper = renderer.create_texture(&TextureDesc {
            width: key.width,
            height: key.height,
            format: key.format,
            usage: TextureUsage::RenderTarget,
            name: format!("swapchain wrapper {}x{} {:?}", key.width, key.height, key.format),
        })?;
        self.stats.wrappers_created += 1;
        xr_info!(
            "xrgfx::binder",
            "Created render-target wrapper {}x{} {:?} ({} cached)",
            key.width,
            key.height,
            key.format,
            self.wrappers.len() + 1
        );
        self.wrappers.insert(key, wrapper.clone());
        Ok(wrapper)
    }

    fn render_into(
        &mut self,
        renderer: &mut dyn Renderer,
        wrapper: &Arc<dyn Texture>,
        desc: &ColorBufferDesc,
        rect: ViewRect,
        content: Option<FrameContent<'_>>,
    ) -> Result<u64> {
        let framebuffer = renderer.create_framebuffer(&FramebufferDesc {
            color_attachments: vec![wrapper.clone()],
            width: desc.width,
            height: desc.height,
        })?;
        self.stats.framebuffers_created += 1;

        let view = self.view.id;
        renderer.set_view_name(view, &self.view.name);
        renderer.set_view_rect(view, rect);
        renderer.set_view_clear(view, self.view.clear);
        renderer.set_view_framebuffer(view, &framebuffer);

        if let Some(content) = content {
            renderer.set_view_transform(view, content.view, content.projection);
            let draws = content.scene.draw_cubes(
                renderer,
                view,
                content.cubes,
                content.topology,
                content.state,
            )?;
            self.stats.draws_submitted += u64::from(draws);
        }

        renderer.touch(view);
        renderer.frame()
    }
}

#[cfg(test)]
#[path = "binder_tests.rs"]
mod tests;

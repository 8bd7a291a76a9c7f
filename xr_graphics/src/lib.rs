/*!
# XR Graphics

Core traits and types for rendering an XR harness's projection views.

The crate is API-neutral: a `Backend` (D3D11 in `xr_graphics_d3d11`) creates the
device and a `Renderer`, and describes runtime-owned swapchain images as
`ColorBuffer`s. `XrGraphicsPlugin` ties them together behind the
`GraphicsPlugin` interface the harness drives.

## Architecture

- **GraphicsPlugin**: harness-facing operations (extensions, device, formats,
  swapchain image structs, `render_view`)
- **Backend**: graphics-API specific device bootstrap and image wrapping
- **Renderer**: rendering library interface (textures, frame buffers, views, draws)
- **RenderTargetBinder**: zero-copy binding of swapchain images as render targets
- **SceneResources**: cube mesh and shader program
*/

pub mod error;
pub mod log;
pub mod renderer;
pub mod format;
pub mod geometry;
pub mod xr;
pub mod config;
pub mod shader_library;
pub mod scene;
pub mod binder;
pub mod swapchain_images;
pub mod plugin;

#[cfg(test)]
pub mod mock_backend;

// Main xrgfx namespace module
pub mod xrgfx {
    pub use crate::error::{Error, Result};

    pub use crate::plugin::{
        AdapterLuid, Backend, DeviceBootstrap, GraphicsPlugin, GraphicsRequirements,
        XrGraphicsPlugin,
    };
    pub use crate::config::PluginConfig;

    // Logging sub-module (types and logger slot, macros stay at the crate root)
    pub mod log {
        pub use crate::log::{
            reset_logger, set_logger, DefaultLogger, LogEntry, LogSeverity, Logger,
        };
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
        pub use crate::format::{TextureFormat, COLOR_SWAPCHAIN_FORMATS};
        pub use crate::geometry::*;
    }

    pub mod xr {
        pub use crate::xr::*;
        pub use crate::swapchain_images::{
            SwapchainImageArena, SwapchainImageStruct, SwapchainImages,
        };
    }

    pub mod scene {
        pub use crate::binder::{
            BinderState, BinderStats, FrameContent, RenderTargetBinder, RenderTargetKey,
            ViewSettings,
        };
        pub use crate::scene::SceneResources;
        pub use crate::shader_library::{
            FileShaderSource, InMemoryShaderSource, ShaderLibrary, ShaderPathTable, ShaderSource,
        };
    }
}

// Re-export math library at crate root
pub use glam;

/// Renderer module - the rendering capability set the plugin draws through

// Module declarations
pub mod renderer;
pub mod texture;
pub mod color_buffer;
pub mod frame_buffer;
pub mod buffer;
pub mod shader;
pub mod view;
pub mod draw;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use texture::*;
pub use color_buffer::*;
pub use frame_buffer::*;
pub use buffer::*;
pub use shader::*;
pub use view::*;
pub use draw::*;

// Mock renderer for tests (no GPU required)
#[cfg(test)]
pub mod mock_renderer;

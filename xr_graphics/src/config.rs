/// Plugin configuration

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::geometry::PrimitiveTopology;
use crate::renderer::{ClearState, DrawState, ViewId};
use crate::shader_library::ShaderPathTable;

/// Settings the plugin is created with
///
/// `Default` gives the stock cube scene: one logical view cleared to
/// `0xff3030ff`, triangle-list cubes, shaders loaded from `shaders/<api>/`.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Directory holding one sub-directory of compiled shaders per API
    pub shader_root: PathBuf,
    pub shader_paths: ShaderPathTable,
    /// Vertex shader name, without extension
    pub vertex_shader: String,
    /// Fragment shader name, without extension
    pub fragment_shader: String,

    /// Logical view every projection view is rendered through
    pub view_id: ViewId,
    pub view_name: String,
    pub clear: ClearState,

    /// Index buffer used for cube draws
    pub topology: PrimitiveTopology,
    pub write_mask: DrawState,

    pub near_z: f32,
    /// `f32::INFINITY` for an infinite far plane
    pub far_z: f32,

    /// Submit cube draws; when false only the cleared view is submitted
    pub draw_scene: bool,

    /// Create the device with the debug layer
    pub enable_debug: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            shader_root: PathBuf::from("shaders"),
            shader_paths: ShaderPathTable::default(),
            vertex_shader: "vs_cubes".to_string(),
            fragment_shader: "fs_cubes".to_string(),
            view_id: 0,
            view_name: "standard view".to_string(),
            clear: ClearState::default(),
            topology: PrimitiveTopology::TriangleList,
            write_mask: DrawState::DEFAULT,
            near_z: 0.05,
            far_z: 100.0,
            draw_scene: true,
            enable_debug: cfg!(debug_assertions),
        }
    }
}

impl PluginConfig {
    /// Check the settings before any device work happens
    pub fn validate(&self) -> Result<()> {
        if self.near_z.is_nan() || self.near_z <= 0.0 {
            return Err(Error::InitializationFailed(format!(
                "near plane must be positive, got {}",
                self.near_z
            )));
        }
        if self.far_z.is_nan() || self.near_z >= self.far_z {
            return Err(Error::InitializationFailed(format!(
                "near plane {} must be closer than far plane {}",
                self.near_z, self.far_z
            )));
        }
        if self.vertex_shader.is_empty() || self.fragment_shader.is_empty() {
            return Err(Error::InitializationFailed("shader names must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

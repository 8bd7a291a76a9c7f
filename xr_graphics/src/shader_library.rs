/// Shader lookup and program loading
///
/// Compiled shaders live under `<shader_root>/<api dir>/<name>.bin`, one
/// directory per renderer API. The directory table is closed: a renderer type
/// without an entry is an initialization error, not a silent fallback.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::renderer::{Program, Renderer, RendererType, Shader, ShaderDesc, ShaderStage};
use crate::{xr_debug, xr_error};

/// Extension of compiled shader binaries
pub const SHADER_EXTENSION: &str = "bin";

// ============================================================================
// ShaderPathTable
// ============================================================================

/// Renderer API to shader sub-directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPathTable {
    dirs: FxHashMap<RendererType, &'static str>,
}

impl Default for ShaderPathTable {
    fn default() -> Self {
        let dirs = [
            (RendererType::Noop, "dx9"),
            (RendererType::Direct3D9, "dx9"),
            (RendererType::Direct3D11, "dx11"),
            (RendererType::Direct3D12, "dx11"),
            (RendererType::Gnm, "pssl"),
            (RendererType::Metal, "metal"),
            (RendererType::Nvn, "nvn"),
            (RendererType::OpenGL, "glsl"),
            (RendererType::OpenGLES, "essl"),
            (RendererType::Vulkan, "spirv"),
        ]
        .into_iter()
        .collect();
        Self { dirs }
    }
}

impl ShaderPathTable {
    /// Table with no entries
    pub fn empty() -> Self {
        Self { dirs: FxHashMap::default() }
    }

    /// Map `renderer_type` to `dir`, replacing any previous entry
    pub fn with(mut self, renderer_type: RendererType, dir: &'static str) -> Self {
        self.dirs.insert(renderer_type, dir);
        self
    }

    /// Drop the entry for `renderer_type`
    pub fn without(mut self, renderer_type: RendererType) -> Self {
        self.dirs.remove(&renderer_type);
        self
    }

    /// Sub-directory for `renderer_type`
    pub fn resolve(&self, renderer_type: RendererType) -> Result<&'static str> {
        self.dirs.get(&renderer_type).copied().ok_or_else(|| {
            let message = format!("no shader directory for renderer {:?}", renderer_type);
            xr_error!("xrgfx::shader", "{}", message);
            Error::InitializationFailed(message)
        })
    }
}

// ============================================================================
// ShaderSource
// ============================================================================

/// Where shader bytes come from
pub trait ShaderSource {
    /// Read the whole file at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Reads shaders from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileShaderSource;

impl ShaderSource for FileShaderSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            Error::InitializationFailed(format!("cannot read shader {}: {}", path.display(), e))
        })
    }
}

/// In-memory shader files keyed by path
#[derive(Default, Clone)]
pub struct InMemoryShaderSource {
    files: FxHashMap<PathBuf, Vec<u8>>,
}

impl InMemoryShaderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl fmt::Debug for InMemoryShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryShaderSource")
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ShaderSource for InMemoryShaderSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            Error::InitializationFailed(format!("cannot read shader {}: not found", path.display()))
        })
    }
}

// ============================================================================
// ShaderLibrary
// ============================================================================

/// Resolved shader pair for one renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLibrary {
    vertex: PathBuf,
    fragment: PathBuf,
}

impl ShaderLibrary {
    /// Resolve the configured shader pair for `renderer_type`
    pub fn new(config: &PluginConfig, renderer_type: RendererType) -> Result<Self> {
        let dir = config.shader_root.join(config.shader_paths.resolve(renderer_type)?);
        let path = |name: &str| dir.join(name).with_extension(SHADER_EXTENSION);
        Ok(Self {
            vertex: path(&config.vertex_shader),
            fragment: path(&config.fragment_shader),
        })
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment
    }

    /// Read both binaries and link them into a program
    pub fn load_program(
        &self,
        renderer: &mut dyn Renderer,
        source: &dyn ShaderSource,
    ) -> Result<Arc<dyn Program>> {
        let vertex = self.load_shader(renderer, source, ShaderStage::Vertex, &self.vertex)?;
        let fragment = self.load_shader(renderer, source, ShaderStage::Fragment, &self.fragment)?;
        renderer.create_program(&vertex, &fragment)
    }

    fn load_shader(
        &self,
        renderer: &mut dyn Renderer,
        source: &dyn ShaderSource,
        stage: ShaderStage,
        path: &Path,
    ) -> Result<Arc<dyn Shader>> {
        let code = source.read(path).inspect_err(|e| {
            xr_error!("xrgfx::shader", "{}", e);
        })?;
        xr_debug!("xrgfx::shader", "Loaded {} ({} bytes)", path.display(), code.len());
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        renderer.create_shader(&ShaderDesc { stage, code, name })
    }
}

#[cfg(test)]
#[path = "shader_library_tests.rs"]
mod tests;

/// Shader and program traits

use std::any::Any;

/// Pipeline stage a shader runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Descriptor for creating a shader
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    /// Stage
    pub stage: ShaderStage,
    /// Compiled bytecode for the renderer's API
    pub code: Vec<u8>,
    /// Debug name (e.g. "vs_cubes")
    pub name: String,
}

/// Shader module
pub trait Shader {
    /// Stage this shader was created for
    fn stage(&self) -> ShaderStage;

    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

/// Linked vertex + fragment shader pair
pub trait Program {
    /// Downcast hook for the owning backend
    fn as_any(&self) -> &dyn Any;
}

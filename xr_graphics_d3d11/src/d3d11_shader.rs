/// Shader - D3D11 shader modules and linked programs

use std::any::Any;
use std::cell::RefCell;
use rustc_hash::FxHashMap;

use windows::Win32::Graphics::Direct3D11::*;
use xr_graphics::xrgfx::render::{
    Program as RendererProgram, Shader as RendererShader, ShaderStage, VertexLayout,
};

pub(crate) enum ShaderModule {
    Vertex(ID3D11VertexShader),
    Pixel(ID3D11PixelShader),
}

/// D3D11 shader implementation
pub struct Shader {
    pub(crate) module: ShaderModule,
    /// Bytecode, kept for input layout creation
    pub(crate) code: Vec<u8>,
    pub(crate) name: String,
}

impl RendererShader for Shader {
    fn stage(&self) -> ShaderStage {
        match self.module {
            ShaderModule::Vertex(_) => ShaderStage::Vertex,
            ShaderModule::Pixel(_) => ShaderStage::Fragment,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// D3D11 program: vertex + pixel shader
pub struct Program {
    pub(crate) vertex: ID3D11VertexShader,
    pub(crate) pixel: ID3D11PixelShader,
    pub(crate) vertex_code: Vec<u8>,
    /// Input layouts per vertex layout, created on first draw
    pub(crate) input_layouts: RefCell<FxHashMap<VertexLayout, ID3D11InputLayout>>,
}

impl RendererProgram for Program {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

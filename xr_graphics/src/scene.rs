/// Cube scene resources: one vertex buffer, one index buffer per topology, one program

use std::sync::Arc;

use crate::error::Result;
use crate::geometry::{PosColorVertex, PrimitiveTopology, CUBE_VERTICES};
use crate::renderer::{DrawCall, DrawState, IndexBuffer, Program, Renderer, VertexBuffer, ViewId};
use crate::shader_library::{ShaderLibrary, ShaderSource};
use crate::xr::Cube;
use crate::xr_debug;

pub struct SceneResources {
    vertex_buffer: Arc<dyn VertexBuffer>,
    /// Indexed by `PrimitiveTopology::index()`
    index_buffers: Vec<Arc<dyn IndexBuffer>>,
    program: Arc<dyn Program>,
}

impl SceneResources {
    /// Upload the cube mesh and load the shader program
    pub fn create(
        renderer: &mut dyn Renderer,
        library: &ShaderLibrary,
        source: &dyn ShaderSource,
    ) -> Result<Self> {
        let vertex_buffer = renderer.create_vertex_buffer(
            bytemuck::cast_slice(&CUBE_VERTICES),
            &PosColorVertex::layout(),
        )?;
        let index_buffers = PrimitiveTopology::ALL
            .iter()
            .map(|topology| renderer.create_index_buffer(topology.cube_indices()))
            .collect::<Result<Vec<_>>>()?;
        let program = library.load_program(renderer, source)?;

        xr_debug!(
            "xrgfx::scene",
            "Scene ready: {} vertices, {} index buffers",
            vertex_buffer.vertex_count(),
            index_buffers.len()
        );
        Ok(Self { vertex_buffer, index_buffers, program })
    }

    pub fn index_buffer(&self, topology: PrimitiveTopology) -> &Arc<dyn IndexBuffer> {
        &self.index_buffers[topology.index()]
    }

    /// Queue one draw per cube on `view`, returning the number of draws
    pub fn draw_cubes(
        &self,
        renderer: &mut dyn Renderer,
        view: ViewId,
        cubes: &[Cube],
        topology: PrimitiveTopology,
        state: DrawState,
    ) -> Result<u32> {
        let index_buffer = self.index_buffer(topology);
        for cube in cubes {
            renderer.submit(
                view,
                &DrawCall {
                    vertex_buffer: &self.vertex_buffer,
                    index_buffer,
                    program: &self.program,
                    transform: cube.model_matrix(),
                    topology,
                    state,
                },
            )?;
        }
        Ok(cubes.len() as u32)
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;

/// D3D11Renderer - D3D11 implementation of the Renderer trait
///
/// View state and draws are recorded per view and replayed in view-id order on
/// `frame()`, which is the only point where the immediate context is touched.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;

use windows::core::{Interface, PCSTR};
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use xr_graphics::glam::Mat4;
use xr_graphics::xrgfx::render::{
    AttributeFormat, ClearFlags, ClearState, ColorBuffer, DrawCall, DrawState,
    Framebuffer as RendererFramebuffer, FramebufferDesc, IndexBuffer as RendererIndexBuffer,
    PrimitiveTopology, Program as RendererProgram, Renderer, RendererCaps, RendererStats,
    RendererType, Shader as RendererShader, ShaderDesc, ShaderStage, Texture as RendererTexture,
    TextureDesc, TextureFormat, TextureInfo, TextureUsage, VertexBuffer as RendererVertexBuffer,
    VertexLayout, VertexSemantic, ViewId, ViewRect,
};
use xr_graphics::xrgfx::{Error, Result};
use xr_graphics::{xr_bail, xr_debug, xr_error, xr_trace, xr_warn};

use crate::d3d11_buffer::{IndexBuffer, VertexBuffer};
use crate::d3d11_device::{hresult, D3D11Device};
use crate::d3d11_shader::{Program, Shader, ShaderModule};
use crate::d3d11_swapchain_image::ColorBufferD3D11;
use crate::d3d11_texture::{Backing, Framebuffer, Texture};
use crate::dxgi_format;

/// Per-draw constant buffer, matrices column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DrawTransforms {
    view_projection: [f32; 16],
    model: [f32; 16],
}

struct QueuedDraw {
    vertex_buffer: Arc<dyn RendererVertexBuffer>,
    index_buffer: Arc<dyn RendererIndexBuffer>,
    program: Arc<dyn RendererProgram>,
    transform: Mat4,
    topology: PrimitiveTopology,
    state: DrawState,
}

#[derive(Default)]
struct ViewState {
    name: String,
    rect: ViewRect,
    clear: ClearState,
    view: Mat4,
    projection: Mat4,
    framebuffer: Option<Arc<dyn RendererFramebuffer>>,
    draws: Vec<QueuedDraw>,
    touched: bool,
}

struct DepthTarget {
    _texture: ID3D11Texture2D,
    view: ID3D11DepthStencilView,
}

#[derive(Clone)]
struct PipelineStates {
    blend: ID3D11BlendState,
    rasterizer: ID3D11RasterizerState,
    depth_stencil: ID3D11DepthStencilState,
}

/// D3D11 renderer
pub struct D3D11Renderer {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    /// Available from feature level 11_1 runtimes; enables partial clears
    context1: Option<ID3D11DeviceContext1>,
    caps: RendererCaps,
    views: BTreeMap<ViewId, ViewState>,
    depth_targets: FxHashMap<(u32, u32), DepthTarget>,
    states: FxHashMap<DrawState, PipelineStates>,
    constant_buffer: ID3D11Buffer,
    frames: u64,
    last_frame: RendererStats,
}

impl D3D11Renderer {
    pub fn new(device: &D3D11Device) -> Result<Self> {
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: std::mem::size_of::<DrawTransforms>() as u32,
            Usage: D3D11_USAGE_DYNAMIC,
            BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
            CPUAccessFlags: D3D11_CPU_ACCESS_WRITE.0 as u32,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let mut constant_buffer: Option<ID3D11Buffer> = None;
        unsafe { device.device.CreateBuffer(&desc, None, Some(&mut constant_buffer)) }
            .map_err(hresult("CreateBuffer(constants)"))?;
        let constant_buffer = constant_buffer
            .ok_or_else(|| Error::InitializationFailed("constant buffer not created".to_string()))?;

        let context1 = device.context.cast::<ID3D11DeviceContext1>().ok();
        if context1.is_none() {
            xr_warn!(
                "xrgfx::d3d11",
                "ID3D11DeviceContext1 unavailable, sub-rect views clear their whole target"
            );
        }

        Ok(Self {
            device: device.device.clone(),
            context: device.context.clone(),
            context1,
            caps: RendererCaps {
                vendor_id: device.adapter.vendor_id,
                device_id: device.adapter.device_id,
                adapter_name: device.adapter.name.clone(),
                feature_level: device.feature_level,
            },
            views: BTreeMap::new(),
            depth_targets: FxHashMap::default(),
            states: FxHashMap::default(),
            constant_buffer,
            frames: 0,
            last_frame: RendererStats::default(),
        })
    }

    /// Whether sub-rect views clear only their own rect
    pub fn supports_partial_clear(&self) -> bool {
        self.context1.is_some()
    }

    fn view_mut(&mut self, view: ViewId) -> &mut ViewState {
        self.views.entry(view).or_default()
    }

    fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        format: TextureFormat,
        bind_flags: D3D11_BIND_FLAG,
    ) -> Result<ID3D11Texture2D> {
        let desc = D3D11_TEXTURE2D_DESC {
            Width: width,
            Height: height,
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT(dxgi_format::dxgi_code(format) as i32),
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: bind_flags.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let mut texture: Option<ID3D11Texture2D> = None;
        unsafe { self.device.CreateTexture2D(&desc, None, Some(&mut texture)) }
            .map_err(hresult("CreateTexture2D"))?;
        texture.ok_or(Error::OutOfMemory)
    }

    /// RTV on `texture` interpreting it as `format`
    fn create_rtv(&self, texture: &ID3D11Texture2D, format: TextureFormat) -> Result<ID3D11RenderTargetView> {
        let desc = D3D11_RENDER_TARGET_VIEW_DESC {
            Format: DXGI_FORMAT(dxgi_format::dxgi_code(format) as i32),
            ViewDimension: D3D11_RTV_DIMENSION_TEXTURE2D,
            Anonymous: D3D11_RENDER_TARGET_VIEW_DESC_0 {
                Texture2D: D3D11_TEX2D_RTV { MipSlice: 0 },
            },
        };
        let mut rtv: Option<ID3D11RenderTargetView> = None;
        unsafe { self.device.CreateRenderTargetView(texture, Some(&desc), Some(&mut rtv)) }
            .map_err(hresult("CreateRenderTargetView"))?;
        rtv.ok_or_else(|| Error::InvalidResource("render target view not created".to_string()))
    }

    fn create_buffer(&self, data: &[u8], bind_flags: D3D11_BIND_FLAG, call: &'static str) -> Result<ID3D11Buffer> {
        if data.is_empty() {
            return Err(Error::InvalidResource(format!("{}: empty buffer", call)));
        }
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: data.len() as u32,
            Usage: D3D11_USAGE_IMMUTABLE,
            BindFlags: bind_flags.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let initial = D3D11_SUBRESOURCE_DATA {
            pSysMem: data.as_ptr() as *const _,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        };
        let mut buffer: Option<ID3D11Buffer> = None;
        unsafe { self.device.CreateBuffer(&desc, Some(&initial), Some(&mut buffer)) }
            .map_err(hresult(call))?;
        buffer.ok_or(Error::OutOfMemory)
    }

    /// Depth/stencil target shared by every view of that size
    fn depth_target(&mut self, width: u32, height: u32) -> Result<ID3D11DepthStencilView> {
        if let Some(target) = self.depth_targets.get(&(width, height)) {
            return Ok(target.view.clone());
        }
        let texture = self.create_texture_2d(
            width,
            height,
            TextureFormat::D24_UNORM_S8_UINT,
            D3D11_BIND_DEPTH_STENCIL,
        )?;
        let mut view: Option<ID3D11DepthStencilView> = None;
        unsafe { self.device.CreateDepthStencilView(&texture, None, Some(&mut view)) }
            .map_err(hresult("CreateDepthStencilView"))?;
        let view = view.ok_or(Error::OutOfMemory)?;
        xr_debug!("xrgfx::d3d11", "Created {}x{} depth target", width, height);
        self.depth_targets.insert((width, height), DepthTarget { _texture: texture, view: view.clone() });
        Ok(view)
    }

    fn pipeline_states(&mut self, state: DrawState) -> Result<PipelineStates> {
        if let Some(states) = self.states.get(&state) {
            return Ok(states.clone());
        }

        let mut write_mask = 0u8;
        for (flag, channel) in [
            (DrawState::WRITE_R, D3D11_COLOR_WRITE_ENABLE_RED),
            (DrawState::WRITE_G, D3D11_COLOR_WRITE_ENABLE_GREEN),
            (DrawState::WRITE_B, D3D11_COLOR_WRITE_ENABLE_BLUE),
            (DrawState::WRITE_A, D3D11_COLOR_WRITE_ENABLE_ALPHA),
        ] {
            if state.contains(flag) {
                write_mask |= channel.0 as u8;
            }
        }
        let mut blend_desc = D3D11_BLEND_DESC::default();
        blend_desc.RenderTarget[0] = D3D11_RENDER_TARGET_BLEND_DESC {
            BlendEnable: false.into(),
            SrcBlend: D3D11_BLEND_ONE,
            DestBlend: D3D11_BLEND_ZERO,
            BlendOp: D3D11_BLEND_OP_ADD,
            SrcBlendAlpha: D3D11_BLEND_ONE,
            DestBlendAlpha: D3D11_BLEND_ZERO,
            BlendOpAlpha: D3D11_BLEND_OP_ADD,
            RenderTargetWriteMask: write_mask,
        };
        let mut blend: Option<ID3D11BlendState> = None;
        unsafe { self.device.CreateBlendState(&blend_desc, Some(&mut blend)) }
            .map_err(hresult("CreateBlendState"))?;

        // Counter-clockwise is front, so culling the back face drops clockwise triangles
        let rasterizer_desc = D3D11_RASTERIZER_DESC {
            FillMode: D3D11_FILL_SOLID,
            CullMode: if state.contains(DrawState::CULL_CW) { D3D11_CULL_BACK } else { D3D11_CULL_NONE },
            FrontCounterClockwise: true.into(),
            DepthBias: 0,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: 0.0,
            DepthClipEnable: true.into(),
            ScissorEnable: false.into(),
            MultisampleEnable: state.contains(DrawState::MSAA).into(),
            AntialiasedLineEnable: false.into(),
        };
        let mut rasterizer: Option<ID3D11RasterizerState> = None;
        unsafe { self.device.CreateRasterizerState(&rasterizer_desc, Some(&mut rasterizer)) }
            .map_err(hresult("CreateRasterizerState"))?;

        let depth_test = state.contains(DrawState::DEPTH_TEST_LESS);
        let depth_write = state.contains(DrawState::WRITE_Z);
        let depth_desc = D3D11_DEPTH_STENCIL_DESC {
            DepthEnable: (depth_test || depth_write).into(),
            DepthWriteMask: if depth_write { D3D11_DEPTH_WRITE_MASK_ALL } else { D3D11_DEPTH_WRITE_MASK_ZERO },
            DepthFunc: if depth_test { D3D11_COMPARISON_LESS } else { D3D11_COMPARISON_ALWAYS },
            StencilEnable: false.into(),
            StencilReadMask: 0,
            StencilWriteMask: 0,
            FrontFace: Default::default(),
            BackFace: Default::default(),
        };
        let mut depth_stencil: Option<ID3D11DepthStencilState> = None;
        unsafe { self.device.CreateDepthStencilState(&depth_desc, Some(&mut depth_stencil)) }
            .map_err(hresult("CreateDepthStencilState"))?;

        let states = match (blend, rasterizer, depth_stencil) {
            (Some(blend), Some(rasterizer), Some(depth_stencil)) => {
                PipelineStates { blend, rasterizer, depth_stencil }
            }
            _ => xr_bail!("xrgfx::d3d11", "Pipeline state creation returned no object for {:?}", state),
        };
        self.states.insert(state, states.clone());
        Ok(states)
    }

    fn input_layout(&self, program: &Program, layout: &VertexLayout) -> Result<ID3D11InputLayout> {
        if let Some(input_layout) = program.input_layouts.borrow().get(layout) {
            return Ok(input_layout.clone());
        }

        let elements: Vec<D3D11_INPUT_ELEMENT_DESC> = layout
            .attributes
            .iter()
            .map(|attribute| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: match attribute.semantic {
                    VertexSemantic::Position => PCSTR(c"POSITION".as_ptr() as _),
                    VertexSemantic::Color0 => PCSTR(c"COLOR".as_ptr() as _),
                },
                SemanticIndex: 0,
                Format: match attribute.format {
                    AttributeFormat::Float32x3 => DXGI_FORMAT_R32G32B32_FLOAT,
                    AttributeFormat::Unorm8x4 => DXGI_FORMAT_R8G8B8A8_UNORM,
                },
                InputSlot: 0,
                AlignedByteOffset: attribute.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            })
            .collect();

        let mut input_layout: Option<ID3D11InputLayout> = None;
        unsafe {
            self.device
                .CreateInputLayout(&elements, &program.vertex_code, Some(&mut input_layout))
        }
        .map_err(hresult("CreateInputLayout"))?;
        let input_layout = input_layout
            .ok_or_else(|| Error::InvalidResource("input layout not created".to_string()))?;
        program
            .input_layouts
            .borrow_mut()
            .insert(layout.clone(), input_layout.clone());
        Ok(input_layout)
    }

    fn clear_color(&self, rtv: &ID3D11RenderTargetView, rect: ViewRect, target: (u32, u32), color: &[f32; 4]) -> Result<()> {
        let whole = rect.x == 0
            && rect.y == 0
            && u32::from(rect.width) == target.0
            && u32::from(rect.height) == target.1;
        match &self.context1 {
            Some(context1) if !whole => {
                let view: ID3D11View = rtv.cast().map_err(hresult("ID3D11RenderTargetView::cast"))?;
                let area = RECT {
                    left: i32::from(rect.x),
                    top: i32::from(rect.y),
                    right: i32::from(rect.x) + i32::from(rect.width),
                    bottom: i32::from(rect.y) + i32::from(rect.height),
                };
                unsafe { context1.ClearView(&view, color, Some(&[area])) };
            }
            _ => unsafe { self.context.ClearRenderTargetView(rtv, color) },
        }
        Ok(())
    }

    /// Bind, clear and draw one view
    fn render_view(
        &mut self,
        id: ViewId,
        view: &ViewState,
        framebuffer: &Arc<dyn RendererFramebuffer>,
        draws: &[QueuedDraw],
    ) -> Result<()> {
        let Some(framebuffer) = framebuffer.as_any().downcast_ref::<Framebuffer>() else {
            xr_bail!("xrgfx::d3d11", "View {} has a frame buffer from another renderer", id);
        };
        let rtvs = framebuffer.render_target_views();
        let dsv = self.depth_target(framebuffer.width, framebuffer.height)?;

        unsafe {
            self.context.OMSetRenderTargets(Some(rtvs.as_slice()), &dsv);
            self.context.RSSetViewports(Some(&[D3D11_VIEWPORT {
                TopLeftX: f32::from(view.rect.x),
                TopLeftY: f32::from(view.rect.y),
                Width: f32::from(view.rect.width),
                Height: f32::from(view.rect.height),
                MinDepth: 0.0,
                MaxDepth: 1.0,
            }]));
        }

        if view.clear.flags.contains(ClearFlags::COLOR) {
            let color = view.clear.color_f32();
            for rtv in rtvs.iter().flatten() {
                self.clear_color(rtv, view.rect, (framebuffer.width, framebuffer.height), &color)?;
            }
        }
        let mut depth_flags = 0u32;
        if view.clear.flags.contains(ClearFlags::DEPTH) {
            depth_flags |= D3D11_CLEAR_DEPTH.0 as u32;
        }
        if view.clear.flags.contains(ClearFlags::STENCIL) {
            depth_flags |= D3D11_CLEAR_STENCIL.0 as u32;
        }
        if depth_flags != 0 {
            unsafe {
                self.context
                    .ClearDepthStencilView(&dsv, depth_flags, view.clear.depth, view.clear.stencil)
            };
        }

        let view_projection = view.projection * view.view;
        for draw in draws {
            self.replay(draw, view_projection)?;
        }
        xr_trace!("xrgfx::d3d11", "View {} '{}': {} draw(s)", id, view.name, draws.len());
        Ok(())
    }

    fn replay(&mut self, draw: &QueuedDraw, view_projection: Mat4) -> Result<()> {
        let (Some(vertex_buffer), Some(index_buffer), Some(program)) = (
            draw.vertex_buffer.as_any().downcast_ref::<VertexBuffer>(),
            draw.index_buffer.as_any().downcast_ref::<IndexBuffer>(),
            draw.program.as_any().downcast_ref::<Program>(),
        ) else {
            xr_bail!("xrgfx::d3d11", "Draw references resources from another renderer");
        };

        let input_layout = self.input_layout(program, &vertex_buffer.layout)?;
        let states = self.pipeline_states(draw.state)?;
        let transforms = DrawTransforms {
            view_projection: view_projection.to_cols_array(),
            model: draw.transform.to_cols_array(),
        };

        unsafe {
            let mut mapped = D3D11_MAPPED_SUBRESOURCE::default();
            self.context
                .Map(&self.constant_buffer, 0, D3D11_MAP_WRITE_DISCARD, 0, Some(&mut mapped))
                .map_err(hresult("Map(constants)"))?;
            let bytes = bytemuck::bytes_of(&transforms);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), mapped.pData as *mut u8, bytes.len());
            self.context.Unmap(&self.constant_buffer, 0);

            let stride = vertex_buffer.layout.stride;
            let offset = 0u32;
            self.context.IASetInputLayout(&input_layout);
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(vertex_buffer.buffer.clone())),
                Some(&stride),
                Some(&offset),
            );
            self.context.IASetIndexBuffer(&index_buffer.buffer, DXGI_FORMAT_R16_UINT, 0);
            self.context.IASetPrimitiveTopology(match draw.topology {
                PrimitiveTopology::TriangleList => D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
                PrimitiveTopology::TriangleStrip => D3D11_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
                PrimitiveTopology::Lines => D3D11_PRIMITIVE_TOPOLOGY_LINELIST,
                PrimitiveTopology::LineStrip => D3D11_PRIMITIVE_TOPOLOGY_LINESTRIP,
                PrimitiveTopology::Points => D3D11_PRIMITIVE_TOPOLOGY_POINTLIST,
            });
            self.context.VSSetShader(&program.vertex, None);
            self.context.VSSetConstantBuffers(0, Some(&[Some(self.constant_buffer.clone())]));
            self.context.PSSetShader(&program.pixel, None);
            self.context.OMSetBlendState(&states.blend, None, 0xffffffff);
            self.context.RSSetState(&states.rasterizer);
            self.context.OMSetDepthStencilState(&states.depth_stencil, 0);
            self.context.DrawIndexed(index_buffer.index_count, 0, 0);
        }
        Ok(())
    }
}

impl Renderer for D3D11Renderer {
    fn renderer_type(&self) -> RendererType {
        RendererType::Direct3D11
    }

    fn caps(&self) -> RendererCaps {
        self.caps.clone()
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn RendererTexture>> {
        let bind_flags = match desc.usage {
            TextureUsage::Sampled => D3D11_BIND_SHADER_RESOURCE,
            TextureUsage::RenderTarget => D3D11_BIND_RENDER_TARGET | D3D11_BIND_SHADER_RESOURCE,
            TextureUsage::DepthStencil => D3D11_BIND_DEPTH_STENCIL,
        };
        let texture = self.create_texture_2d(desc.width, desc.height, desc.format, bind_flags)?;
        let rtv = match desc.usage {
            TextureUsage::RenderTarget => Some(self.create_rtv(&texture, desc.format)?),
            _ => None,
        };
        xr_debug!("xrgfx::d3d11", "Created texture '{}' {}x{} {:?}", desc.name, desc.width, desc.height, desc.format);
        Ok(Arc::new(Texture {
            texture,
            rtv,
            backing: RefCell::new(None),
            info: TextureInfo::from(desc),
        }))
    }

    fn override_texture_backing(
        &mut self,
        texture: &Arc<dyn RendererTexture>,
        backing: &dyn ColorBuffer,
    ) -> Result<()> {
        let Some(wrapper) = texture.as_any().downcast_ref::<Texture>() else {
            return Err(Error::InvalidResource("texture from another renderer".to_string()));
        };
        let Some(external) = backing.as_any().downcast_ref::<ColorBufferD3D11>() else {
            return Err(Error::InvalidResource("color buffer is not a D3D11 texture".to_string()));
        };
        let desc = backing.desc();
        let info = &wrapper.info;
        if info.usage != TextureUsage::RenderTarget {
            xr_bail!("xrgfx::d3d11", "Only render targets can alias a color buffer");
        }
        if (info.width, info.height, info.format) != (desc.width, desc.height, desc.format) {
            xr_bail!(
                "xrgfx::d3d11",
                "Color buffer {}x{} {:?} does not match wrapper {}x{} {:?}",
                desc.width, desc.height, desc.format,
                info.width, info.height, info.format
            );
        }

        let rtv = self.create_rtv(&external.texture, info.format)?;
        *wrapper.backing.borrow_mut() = Some(Backing {
            id: backing.id(),
            _texture: external.texture.clone(),
            rtv,
        });
        Ok(())
    }

    fn release_texture_backing(&mut self, texture: &Arc<dyn RendererTexture>) -> Result<()> {
        if let Some(wrapper) = texture.as_any().downcast_ref::<Texture>() {
            if let Some(id) = wrapper.backing_id() {
                xr_trace!("xrgfx::d3d11", "Released color buffer {:?}", id);
            }
            *wrapper.backing.borrow_mut() = None;
        }
        Ok(())
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn RendererFramebuffer>> {
        if desc.color_attachments.is_empty() {
            xr_bail!("xrgfx::d3d11", "Frame buffer needs at least one color attachment");
        }
        Ok(Arc::new(Framebuffer {
            color_attachments: desc.color_attachments.clone(),
            width: desc.width,
            height: desc.height,
        }))
    }

    fn create_vertex_buffer(&mut self, data: &[u8], layout: &VertexLayout) -> Result<Arc<dyn RendererVertexBuffer>> {
        let buffer = self.create_buffer(data, D3D11_BIND_VERTEX_BUFFER, "CreateBuffer(vertices)")?;
        Ok(Arc::new(VertexBuffer {
            buffer,
            layout: layout.clone(),
            vertex_count: data.len() as u32 / layout.stride,
        }))
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> Result<Arc<dyn RendererIndexBuffer>> {
        let buffer = self.create_buffer(
            bytemuck::cast_slice(indices),
            D3D11_BIND_INDEX_BUFFER,
            "CreateBuffer(indices)",
        )?;
        Ok(Arc::new(IndexBuffer { buffer, index_count: indices.len() as u32 }))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn RendererShader>> {
        let module = match desc.stage {
            ShaderStage::Vertex => {
                let mut shader: Option<ID3D11VertexShader> = None;
                unsafe { self.device.CreateVertexShader(&desc.code, None, Some(&mut shader)) }
                    .map_err(hresult("CreateVertexShader"))?;
                shader.map(ShaderModule::Vertex)
            }
            ShaderStage::Fragment => {
                let mut shader: Option<ID3D11PixelShader> = None;
                unsafe { self.device.CreatePixelShader(&desc.code, None, Some(&mut shader)) }
                    .map_err(hresult("CreatePixelShader"))?;
                shader.map(ShaderModule::Pixel)
            }
        };
        let module = module.ok_or_else(|| Error::InvalidResource(format!("shader {} not created", desc.name)))?;
        xr_debug!("xrgfx::d3d11", "Created {:?} shader '{}'", desc.stage, desc.name);
        Ok(Arc::new(Shader { module, code: desc.code.clone(), name: desc.name.clone() }))
    }

    fn create_program(
        &mut self,
        vertex: &Arc<dyn RendererShader>,
        fragment: &Arc<dyn RendererShader>,
    ) -> Result<Arc<dyn RendererProgram>> {
        let (Some(vertex), Some(fragment)) = (
            vertex.as_any().downcast_ref::<Shader>(),
            fragment.as_any().downcast_ref::<Shader>(),
        ) else {
            return Err(Error::InvalidResource("shader from another renderer".to_string()));
        };
        match (&vertex.module, &fragment.module) {
            (ShaderModule::Vertex(vs), ShaderModule::Pixel(ps)) => Ok(Arc::new(Program {
                vertex: vs.clone(),
                pixel: ps.clone(),
                vertex_code: vertex.code.clone(),
                input_layouts: RefCell::new(FxHashMap::default()),
            })),
            _ => {
                xr_error!("xrgfx::d3d11", "Program '{}' + '{}' has mismatched stages", vertex.name, fragment.name);
                Err(Error::InvalidResource("program needs a vertex and a pixel shader".to_string()))
            }
        }
    }

    fn set_view_name(&mut self, view: ViewId, name: &str) {
        let state = self.view_mut(view);
        if state.name != name {
            state.name = name.to_string();
        }
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        self.view_mut(view).rect = rect;
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ClearState) {
        self.view_mut(view).clear = clear;
    }

    fn set_view_transform(&mut self, view: ViewId, view_matrix: Mat4, projection: Mat4) {
        let state = self.view_mut(view);
        state.view = view_matrix;
        state.projection = projection;
    }

    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: &Arc<dyn RendererFramebuffer>) {
        self.view_mut(view).framebuffer = Some(framebuffer.clone());
    }

    fn touch(&mut self, view: ViewId) {
        self.view_mut(view).touched = true;
    }

    fn submit(&mut self, view: ViewId, draw: &DrawCall) -> Result<()> {
        self.view_mut(view).draws.push(QueuedDraw {
            vertex_buffer: draw.vertex_buffer.clone(),
            index_buffer: draw.index_buffer.clone(),
            program: draw.program.clone(),
            transform: draw.transform,
            topology: draw.topology,
            state: draw.state,
        });
        Ok(())
    }

    fn frame(&mut self) -> Result<u64> {
        let pending: Vec<ViewId> = self
            .views
            .iter()
            .filter(|(_, view)| view.touched || !view.draws.is_empty())
            .map(|(id, _)| *id)
            .collect();

        let mut stats = RendererStats { frames: self.frames + 1, ..Default::default() };
        let mut failure = None;
        for id in pending {
            let Some(view) = self.views.get_mut(&id) else { continue };
            view.touched = false;
            let framebuffer = view.framebuffer.take();
            let draws = std::mem::take(&mut view.draws);
            let snapshot = ViewState {
                name: view.name.clone(),
                rect: view.rect,
                clear: view.clear,
                view: view.view,
                projection: view.projection,
                ..Default::default()
            };

            // After a failure the remaining views are only drained
            if failure.is_some() {
                continue;
            }
            let Some(framebuffer) = framebuffer else {
                xr_trace!("xrgfx::d3d11", "View {} has no frame buffer, skipped", id);
                continue;
            };
            match self.render_view(id, &snapshot, &framebuffer, &draws) {
                Ok(()) => {
                    stats.views += 1;
                    stats.draw_calls += draws.len() as u32;
                }
                Err(e) => failure = Some(e),
            }
        }

        // Drops the swapchain RTVs from the context before the runtime gets the images back
        unsafe {
            self.context.ClearState();
            self.context.Flush();
        }
        let frame = self.frames;
        self.frames += 1;
        self.last_frame = stats;
        match failure {
            Some(e) => Err(e),
            None => Ok(frame),
        }
    }

    fn stats(&self) -> RendererStats {
        self.last_frame
    }
}

impl Drop for D3D11Renderer {
    fn drop(&mut self) {
        unsafe {
            self.context.ClearState();
            self.context.Flush();
        }
    }
}

use std::collections::HashMap;
use std::ops::Range;

use glam::Mat4;
use log::{debug, trace};

use super::{BlendMode, DrawTarget, PolygonMode, RenderState};
use crate::material::{GpuMaterial, Texture};
use crate::model::ModelVertex;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

impl SceneUniform {
    fn new(view_proj: Mat4, model: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }
}

/// One render pipeline per reachable [`RenderState`], sharing the fixed mesh
/// vertex layout and bind group layouts.
pub struct MeshPipelines {
    pipelines: HashMap<RenderState, wgpu::RenderPipeline>,
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    fallback_texture: Texture,
}

impl MeshPipelines {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/mesh.wgsl").into()),
        });

        let scene_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let material_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout, &material_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut states = vec![RenderState::OPAQUE, RenderState::TRANSPARENT];
        if device.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
            for fill in [RenderState::OPAQUE, RenderState::TRANSPARENT] {
                states.push(RenderState {
                    polygon_mode: PolygonMode::Line,
                    ..fill
                });
            }
        } else {
            debug!("Device lacks POLYGON_MODE_LINE; wireframe draws will use fill");
        }

        let pipelines = states
            .into_iter()
            .map(|state| {
                let pipeline = Self::create_pipeline(device, &pipeline_layout, &shader, color_format, state);
                (state, pipeline)
            })
            .collect();

        Self {
            pipelines,
            scene_bind_group_layout,
            material_bind_group_layout,
            fallback_texture: Texture::white(device, queue),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        color_format: wgpu::TextureFormat,
        state: RenderState,
    ) -> wgpu::RenderPipeline {
        let blend = match state.blend {
            BlendMode::Opaque => wgpu::BlendState::REPLACE,
            BlendMode::AlphaOver => wgpu::BlendState::ALPHA_BLENDING,
        };
        let polygon_mode = match state.polygon_mode {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Mesh Pipeline {:?}", state)),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[ModelVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Self::DEPTH_FORMAT,
                depth_write_enabled: state.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    pub fn supports(&self, state: RenderState) -> bool {
        self.pipelines.contains_key(&state)
    }

    /// Pipeline for `state`, or the filled pipeline with the same blend mode
    /// when the device cannot draw `state` as requested.
    pub fn pipeline(&self, state: RenderState) -> &wgpu::RenderPipeline {
        if let Some(pipeline) = self.pipelines.get(&state) {
            return pipeline;
        }
        let fallback = if state.blend_enabled() {
            RenderState::TRANSPARENT
        } else {
            RenderState::OPAQUE
        };
        &self.pipelines[&fallback]
    }

    pub fn fallback_texture(&self) -> &Texture {
        &self.fallback_texture
    }
}

/// View-projection and model matrices, bound at group 0.
///
/// Holds a single model matrix. `update` writes through the queue, so every
/// draw recorded in a pass sees the last value written before submit. Give
/// each model its own `SceneUniforms` and switch between them with
/// [`WgpuPass::set_scene`].
pub struct SceneUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SceneUniforms {
    pub fn new(device: &wgpu::Device, pipelines: &MeshPipelines) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &pipelines.scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn update(&self, queue: &wgpu::Queue, view_proj: Mat4, model: Mat4) {
        let uniform = SceneUniform::new(view_proj, model);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

/// [`DrawTarget`] recording into a wgpu render pass.
pub struct WgpuPass<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    pipelines: &'a MeshPipelines,
    current: Option<RenderState>,
}

impl<'a, 'p> WgpuPass<'a, 'p> {
    pub fn new(pass: &'a mut wgpu::RenderPass<'p>, pipelines: &'a MeshPipelines, scene: &SceneUniforms) -> Self {
        pass.set_bind_group(0, &scene.bind_group, &[]);
        Self {
            pass,
            pipelines,
            current: None,
        }
    }

    /// Binds another model's uniforms for the draws that follow.
    pub fn set_scene(&mut self, scene: &SceneUniforms) {
        self.pass.set_bind_group(0, &scene.bind_group, &[]);
    }
}

impl DrawTarget for WgpuPass<'_, '_> {
    type Buffer = wgpu::Buffer;
    type Material = GpuMaterial;

    fn bind_mesh(&mut self, vertices: &wgpu::Buffer, indices: &wgpu::Buffer) {
        self.pass.set_vertex_buffer(0, vertices.slice(..));
        self.pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn unbind_mesh(&mut self) {
        // Buffers stay bound until the next bind; forget the pipeline so the
        // next mesh sets its own.
        self.current = None;
    }

    fn apply_render_state(&mut self, state: RenderState) {
        if self.current != Some(state) {
            trace!("Switching mesh pipeline to {:?}", state);
            self.pass.set_pipeline(self.pipelines.pipeline(state));
            self.current = Some(state);
        }
    }

    fn use_material(&mut self, material: &GpuMaterial) {
        self.pass.set_bind_group(1, material.bind_group(), &[]);
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.pass.draw_indexed(indices, 0, 0..1);
    }
}

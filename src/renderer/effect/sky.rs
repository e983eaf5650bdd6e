//! 天空效果
//!
//! 只用顶点位置，关闭背面剔除（摄像机位于球体内部），
//! 深度比较为 `LessEqual` 且不写深度：顶点着色器输出 `xyww`，
//! 天空总在远平面上，被之前绘制的物体遮挡。

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::{info, warn};

use crate::core::error::Result;
use crate::core::math::{utils, Matrix4};
use crate::geometry::VertexPos;
use crate::gfx::WgpuContext;
use crate::renderer::texture::TextureCube;

use super::{arc_key, depth_state, multisample_state, sampler_entry, texture_entry, uniform_entry, with_validation};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct SkyConstants {
    world_view_proj: [[f32; 4]; 4],
}

/// 天空效果
pub struct SkyEffect {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    constants: wgpu::Buffer,
    world_view_proj: Cell<Matrix4>,
    cubes: HashMap<usize, (Arc<TextureCube>, wgpu::BindGroup)>,
    current: Cell<Option<usize>>,
}

impl SkyEffect {
    pub fn new(ctx: &WgpuContext) -> Result<Self> {
        info!("Creating sky effect");
        let device = &ctx.device;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Layout"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX,
                    false,
                    wgpu::BufferSize::new(std::mem::size_of::<SkyConstants>() as u64),
                ),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sky.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = with_validation(device, "Sky Pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Sky Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[VertexPos::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(depth_state(wgpu::CompareFunction::LessEqual, false)),
                multisample: multisample_state(ctx.sample_count()),
                multiview: None,
            })
        })?;

        let constants = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Constants"),
            size: std::mem::size_of::<SkyConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            layout,
            constants,
            world_view_proj: Cell::new(Matrix4::identity()),
            cubes: HashMap::new(),
            current: Cell::new(None),
        })
    }

    /// 为立方体贴图创建绑定组，之后才能在渲染通道内选择它
    pub fn register_texture_cube(&mut self, device: &wgpu::Device, cube: &Arc<TextureCube>) {
        let layout = &self.layout;
        let constants = &self.constants;
        self.cubes.entry(arc_key(cube)).or_insert_with(|| {
            let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Sky Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: constants.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&cube.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&cube.sampler),
                    },
                ],
            });
            (Arc::clone(cube), group)
        });
    }

    pub fn set_world_view_proj_matrix(&self, world_view_proj: &Matrix4) {
        self.world_view_proj.set(*world_view_proj);
    }

    pub fn world_view_proj_matrix(&self) -> Matrix4 {
        self.world_view_proj.get()
    }

    pub fn set_texture_cube(&self, cube: &Arc<TextureCube>) {
        let key = arc_key(cube);
        if self.cubes.contains_key(&key) {
            self.current.set(Some(key));
        } else {
            warn!("Cube texture was not registered with the sky effect");
            self.current.set(None);
        }
    }

    /// 绑定管线和资源，没有可用的立方体贴图时返回 `false`
    pub fn apply<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) -> bool {
        let group = match self.current.get().and_then(|key| self.cubes.get(&key)) {
            Some((_, group)) => group,
            None => return false,
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, group, &[]);
        true
    }

    /// 上传本帧的变换矩阵
    pub fn end_frame(&self, queue: &wgpu::Queue) {
        let constants = SkyConstants {
            world_view_proj: utils::to_cols_array(&self.world_view_proj.get()),
        };
        queue.write_buffer(&self.constants, 0, bytemuck::bytes_of(&constants));
    }
}

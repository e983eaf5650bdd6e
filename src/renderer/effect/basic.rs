//! 基础光照效果
//!
//! 绑定组：
//! - 0：帧常量 + 环境立方体贴图 + 采样器
//! - 1：物体常量（动态偏移）
//! - 2：漫反射纹理 + 采样器

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info, warn};

use crate::component::light::{DirectionalLight, DirectionalLightGpu};
use crate::core::error::Result;
use crate::core::math::{matrix, utils, Matrix4, Vector3};
use crate::geometry::Vertex;
use crate::gfx::WgpuContext;
use crate::renderer::cube_map::CubeMapImage;
use crate::renderer::model::{Material, Model};
use crate::renderer::resource::UploadBuffer;
use crate::renderer::texture::{Texture2D, TextureCube};

use super::{arc_key, depth_state, multisample_state, sampler_entry, texture_entry, uniform_entry, with_validation};

/// 同时生效的方向光上限
pub const MAX_DIR_LIGHTS: usize = 4;

/// 物体常量缓冲区的初始槽数
const INITIAL_OBJECT_CAPACITY: usize = 16;

/// 每帧常量
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub eye_pos: [f32; 4],
    pub lights: [DirectionalLightGpu; MAX_DIR_LIGHTS],
    pub light_count: u32,
    pub reflection: u32,
    pub _pad: [u32; 2],
}

impl Default for FrameConstants {
    fn default() -> Self {
        let identity = utils::to_cols_array(&Matrix4::identity());
        Self {
            view: identity,
            proj: identity,
            eye_pos: [0.0, 0.0, 0.0, 1.0],
            lights: [DirectionalLightGpu::default(); MAX_DIR_LIGHTS],
            light_count: 0,
            reflection: 0,
            _pad: [0; 2],
        }
    }
}

impl FrameConstants {
    /// 设置第 `index` 盏方向光，超出上限时忽略并返回 `false`
    pub fn set_dir_light(&mut self, index: usize, light: &DirectionalLight) -> bool {
        if index >= MAX_DIR_LIGHTS {
            return false;
        }
        self.lights[index] = light.to_gpu();
        self.light_count = self.light_count.max(index as u32 + 1);
        true
    }
}

/// 每个物体的常量
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
    pub world_inv_transpose: [[f32; 4]; 4],
    pub material: Material,
}

impl ObjectConstants {
    pub fn new(world: &Matrix4, material: Material) -> Self {
        Self {
            world: utils::to_cols_array(world),
            world_inv_transpose: utils::to_cols_array(&matrix::inverse_transpose(world)),
            material,
        }
    }
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::new(&Matrix4::identity(), Material::default())
    }
}

/// 基础光照效果
pub struct BasicEffect {
    pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,

    frame: FrameConstants,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    objects: UploadBuffer<ObjectConstants>,
    object_bind_group: wgpu::BindGroup,
    pending: Cell<ObjectConstants>,

    textures: HashMap<usize, (Arc<Texture2D>, wgpu::BindGroup)>,
    current_texture: Cell<Option<usize>>,
    default_texture: (Texture2D, wgpu::BindGroup),
    _default_environment: TextureCube,
}

impl BasicEffect {
    pub fn new(ctx: &WgpuContext) -> Result<Self> {
        info!("Creating basic effect");
        let device = &ctx.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Basic Frame Layout"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    false,
                    wgpu::BufferSize::new(std::mem::size_of::<FrameConstants>() as u64),
                ),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Basic Object Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                true,
                UploadBuffer::<ObjectConstants>::binding_size(),
            )],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Basic Texture Layout"),
            entries: &[texture_entry(0, wgpu::TextureViewDimension::D2), sampler_entry(1)],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Basic Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/basic.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Basic Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        debug!("Creating basic render pipeline");
        let pipeline = with_validation(device, "Basic Pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Basic Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
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
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(depth_state(wgpu::CompareFunction::Less, true)),
                multisample: multisample_state(ctx.sample_count()),
                multiview: None,
            })
        })?;

        let frame = FrameConstants::default();
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Basic Frame Constants"),
            size: std::mem::size_of::<FrameConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // 没有设置环境贴图前使用 1x1 的黑色立方体贴图
        let default_environment = TextureCube::from_image(ctx, &CubeMapImage::gradient(1, [0, 0, 0, 255], [0, 0, 0, 255], [0, 0, 0, 255]))?;
        let frame_bind_group = create_frame_bind_group(device, &frame_layout, &frame_buffer, &default_environment);

        let objects = UploadBuffer::new(device, INITIAL_OBJECT_CAPACITY, "Basic Object Constants");
        let object_bind_group = create_object_bind_group(device, &object_layout, &objects);

        let white = Texture2D::white(ctx)?;
        let white_group = create_texture_bind_group(device, &texture_layout, &white);

        Ok(Self {
            pipeline,
            frame_layout,
            object_layout,
            texture_layout,
            frame,
            frame_buffer,
            frame_bind_group,
            objects,
            object_bind_group,
            pending: Cell::new(ObjectConstants::default()),
            textures: HashMap::new(),
            current_texture: Cell::new(None),
            default_texture: (white, white_group),
            _default_environment: default_environment,
        })
    }

    // ---- 帧级参数（渲染通道之前设置） ----

    pub fn set_view_matrix(&mut self, view: &Matrix4) {
        self.frame.view = utils::to_cols_array(view);
    }

    pub fn set_proj_matrix(&mut self, proj: &Matrix4) {
        self.frame.proj = utils::to_cols_array(proj);
    }

    pub fn set_eye_pos(&mut self, eye: &Vector3) {
        self.frame.eye_pos = [eye.x, eye.y, eye.z, 1.0];
    }

    /// 设置第 `index` 盏方向光（最多 [`MAX_DIR_LIGHTS`] 盏）
    pub fn set_dir_light(&mut self, index: usize, light: &DirectionalLight) {
        if !self.frame.set_dir_light(index, light) {
            warn!(index, max = MAX_DIR_LIGHTS, "Directional light index out of range, ignored");
        }
    }

    pub fn set_reflection_enabled(&mut self, enabled: bool) {
        self.frame.reflection = enabled as u32;
    }

    /// 设置用于环境反射的立方体贴图
    pub fn set_texture_cube(&mut self, device: &wgpu::Device, cube: &TextureCube) {
        self.frame_bind_group = create_frame_bind_group(device, &self.frame_layout, &self.frame_buffer, cube);
    }

    /// 为纹理创建绑定组，之后才能在渲染通道内用 [`set_texture`](Self::set_texture) 选择它
    pub fn register_texture(&mut self, device: &wgpu::Device, texture: &Arc<Texture2D>) {
        let layout = &self.texture_layout;
        self.textures
            .entry(arc_key(texture))
            .or_insert_with(|| (Arc::clone(texture), create_texture_bind_group(device, layout, texture)));
    }

    /// 注册模型所有部分使用的纹理
    pub fn register_model(&mut self, device: &wgpu::Device, model: &Model) {
        for part in &model.parts {
            self.register_texture(device, &part.texture);
        }
    }

    /// 开始新的一帧：保证物体槽位足够并上传帧常量
    pub fn begin_frame(&mut self, ctx: &WgpuContext, object_count: usize) {
        if self.objects.reserve(&ctx.device, object_count) {
            self.object_bind_group = create_object_bind_group(&ctx.device, &self.object_layout, &self.objects);
        }
        self.objects.reset();
        ctx.queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.frame));
    }

    /// 把本帧写入的物体常量提交到 GPU
    pub fn end_frame(&self, queue: &wgpu::Queue) {
        self.objects.upload(queue);
    }

    pub fn frame_constants(&self) -> &FrameConstants {
        &self.frame
    }

    // ---- 物体级参数（渲染通道内设置） ----

    pub fn set_world_matrix(&self, world: &Matrix4) {
        let mut constants = self.pending.get();
        constants.world = utils::to_cols_array(world);
        constants.world_inv_transpose = utils::to_cols_array(&matrix::inverse_transpose(world));
        self.pending.set(constants);
    }

    pub fn set_material(&self, material: &Material) {
        let mut constants = self.pending.get();
        constants.material = *material;
        self.pending.set(constants);
    }

    /// 选择漫反射纹理；未注册的纹理退回白色纹理
    pub fn set_texture(&self, texture: &Arc<Texture2D>) {
        let key = arc_key(texture);
        if self.textures.contains_key(&key) {
            self.current_texture.set(Some(key));
        } else {
            warn!("Texture was not registered with the basic effect, using white");
            self.current_texture.set(None);
        }
    }

    /// 把当前参数绑定到渲染通道
    ///
    /// 物体槽位用尽时返回 `false`，调用方应跳过这次绘制。
    pub fn apply<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) -> bool {
        let offset = match self.objects.push(&self.pending.get()) {
            Some(offset) => offset,
            None => {
                warn!(capacity = self.objects.capacity(), "Object constant buffer is full, draw skipped");
                return false;
            }
        };

        let texture_group = self
            .current_texture
            .get()
            .and_then(|key| self.textures.get(&key))
            .map(|(_, group)| group)
            .unwrap_or(&self.default_texture.1);

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.object_bind_group, &[offset]);
        pass.set_bind_group(2, texture_group, &[]);
        true
    }
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    environment: &TextureCube,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Basic Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&environment.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&environment.sampler),
            },
        ],
    })
}

fn create_object_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    objects: &UploadBuffer<ObjectConstants>,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Basic Object Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: objects.buffer(),
                offset: 0,
                size: UploadBuffer::<ObjectConstants>::binding_size(),
            }),
        }],
    })
}

fn create_texture_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, texture: &Texture2D) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Basic Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

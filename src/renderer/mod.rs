//! 渲染器模块
//!
//! - `cube_map`：立方体贴图的 CPU 侧数据（十字布局、六面、DDS）
//! - `texture`：GPU 纹理
//! - `model`：模型与材质
//! - `resource`：分槽的常量缓冲区
//! - `effect`：渲染效果（基础光照、天空）
//! - `sky_render`：天空盒
//!
//! [`Renderer`] 把它们组装成一个完整的场景：先绘制物体，再绘制天空。

pub mod cube_map;
pub mod effect;
pub mod model;
pub mod resource;
pub mod sky_render;
pub mod texture;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use winit::window::Window;

use crate::component::{Camera, GameObject};
use crate::core::error::{GraphicsError, Result};
use crate::core::input::InputSystem;
use crate::core::scene::{MeshSource, ObjectConfig, SkyConfig, SkySource};
use crate::core::{Config, SceneConfig};
use crate::geometry::shapes::{create_box, create_plane, create_sphere};
use crate::geometry::MeshData;
use crate::gfx::WgpuContext;

pub use cube_map::{CubeFace, CubeMapImage, DdsCubeMap};
pub use effect::{BasicEffect, SkyEffect};
pub use model::{Material, Model};
pub use sky_render::SkyRender;
pub use texture::{Texture2D, TextureCube};

/// 天空贴图加载失败时生成的渐变天空的面尺寸
const FALLBACK_SKY_SIZE: u32 = 64;

/// 场景渲染器
pub struct Renderer {
    ctx: WgpuContext,
    basic_effect: BasicEffect,
    sky_effect: SkyEffect,
    sky: SkyRender,
    objects: Vec<GameObject>,
    camera: Camera,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// 创建渲染器并加载场景
    pub fn new(window: Arc<Window>, config: &Config, scene: &SceneConfig) -> Result<Self> {
        crate::engine_info!("Creating renderer");

        let ctx = WgpuContext::new(window, config)?;
        let mut basic_effect = BasicEffect::new(&ctx)?;
        let mut sky_effect = SkyEffect::new(&ctx)?;

        // 天空
        let sky = load_sky(&ctx, &scene.sky)?;
        sky_effect.register_texture_cube(&ctx.device, sky.texture_cube());
        basic_effect.set_texture_cube(&ctx.device, sky.texture_cube());
        basic_effect.set_reflection_enabled(scene.reflection);

        // 光源
        for (index, light) in scene.lights.iter().enumerate() {
            basic_effect.set_dir_light(index, &light.to_light());
        }
        info!(count = scene.lights.len(), "Directional lights configured");

        // 物体
        let white = Arc::new(Texture2D::white(&ctx)?);
        let mut textures: HashMap<String, Arc<Texture2D>> = HashMap::new();
        let mut objects = Vec::with_capacity(scene.objects.len());
        for object_config in &scene.objects {
            match load_object(&ctx, object_config, &mut textures, &white) {
                Ok(object) => {
                    basic_effect.register_model(&ctx.device, object.model());
                    objects.push(object);
                }
                Err(e) => crate::asset_warn!(name = %object_config.name, error = %e, "Failed to load object, skipped"),
            }
        }
        info!(count = objects.len(), "Scene objects loaded");

        let camera = Camera::from_config(&scene.camera, ctx.aspect_ratio());
        info!(position = ?camera.position(), "Camera initialized");

        Ok(Self {
            ctx,
            basic_effect,
            sky_effect,
            sky,
            objects,
            camera,
            clear_color: scene.clear_color.to_wgpu(),
        })
    }

    pub fn window(&self) -> &Window {
        self.ctx.window()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// 根据输入更新摄像机
    pub fn update(&mut self, input: &mut InputSystem, delta_time: f32) {
        input.update_camera(&mut self.camera, delta_time);
    }

    /// 处理窗口大小调整（最小化时忽略）
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        self.camera.set_aspect(self.ctx.aspect_ratio());
    }

    /// 绘制一帧
    pub fn draw(&mut self) -> Result<()> {
        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                crate::engine_warn!("Surface lost or outdated, reconfiguring");
                self.ctx.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                crate::engine_warn!("Surface timeout, frame skipped");
                return Ok(());
            }
            Err(e) => {
                crate::engine_error!(error = %e, "Failed to acquire surface texture");
                return Err(GraphicsError::SwapchainError(e.to_string()).into());
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.basic_effect.set_view_matrix(&self.camera.view_matrix());
        self.basic_effect.set_proj_matrix(&self.camera.proj_matrix());
        self.basic_effect.set_eye_pos(&self.camera.position());
        let part_count = self.objects.iter().map(GameObject::part_count).sum();
        self.basic_effect.begin_frame(&self.ctx, part_count);

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let (target, resolve_target) = match self.ctx.msaa_view() {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.ctx.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for object in &self.objects {
                object.draw(&mut pass, &self.basic_effect);
            }

            // 天空最后绘制，只填充深度仍为 1 的像素
            self.sky.draw(&mut pass, &self.sky_effect, &self.camera);
        }

        self.basic_effect.end_frame(&self.ctx.queue);
        self.sky_effect.end_frame(&self.ctx.queue);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// 按配置加载天空，失败时退回程序生成的渐变天空
fn load_sky(ctx: &WgpuContext, config: &SkyConfig) -> Result<SkyRender> {
    let loaded = match &config.source {
        SkySource::Single { path } => SkyRender::from_file(ctx, path, config.radius, config.generate_mips),
        SkySource::Faces { paths } => SkyRender::from_files(ctx, paths, config.radius, config.generate_mips),
    };

    match loaded {
        Ok(sky) => Ok(sky),
        Err(e) => {
            crate::asset_warn!(error = %e, source = ?config.source, "Failed to load sky, using generated gradient");
            let gradient = CubeMapImage::gradient(
                FALLBACK_SKY_SIZE,
                [200, 215, 235, 255],
                [40, 90, 180, 255],
                [60, 55, 50, 255],
            );
            SkyRender::from_image(ctx, &gradient, config.radius)
        }
    }
}

/// 程序生成的网格；文件来源返回 `None`，由 [`Model::from_obj`] 加载
pub fn procedural_mesh(source: &MeshSource) -> Option<MeshData> {
    match source {
        MeshSource::Obj { .. } => None,
        MeshSource::Sphere { radius } => Some(create_sphere(*radius)),
        MeshSource::Box { width, height, depth } => Some(create_box(*width, *height, *depth)),
        MeshSource::Plane {
            width,
            depth,
            tex_u,
            tex_v,
        } => Some(create_plane(*width, *depth, *tex_u, *tex_v)),
    }
}

fn load_object(
    ctx: &WgpuContext,
    config: &ObjectConfig,
    textures: &mut HashMap<String, Arc<Texture2D>>,
    white: &Arc<Texture2D>,
) -> Result<GameObject> {
    let texture = match &config.texture {
        Some(path) => match textures.get(path) {
            Some(texture) => Arc::clone(texture),
            None => match Texture2D::from_file(ctx, path) {
                Ok(texture) => {
                    let texture = Arc::new(texture);
                    textures.insert(path.clone(), Arc::clone(&texture));
                    texture
                }
                Err(e) => {
                    crate::asset_warn!(path = %path, error = %e, "Failed to load texture, using white");
                    Arc::clone(white)
                }
            },
        },
        None => Arc::clone(white),
    };

    let material = config.material.to_material();
    let model = match &config.mesh {
        MeshSource::Obj { path } => Model::from_obj(ctx, path, material, texture)?,
        source => {
            let mesh = procedural_mesh(source)
                .ok_or_else(|| GraphicsError::ResourceCreation(format!("no mesh for source {:?}", source)))?;
            Model::from_mesh(ctx, &mesh, material, texture)?
        }
    };

    let mut object = GameObject::new(config.name.clone());
    object.set_model(model);
    object.set_transform(&config.transform.to_transform());

    debug!(
        name = %config.name,
        position = ?object.position(),
        parts = object.part_count(),
        "Object created"
    );
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::core::error::{MeshLoadError, SkyRenderError};
    use crate::geometry::loaders::load_mesh;

    #[test]
    fn test_procedural_meshes() {
        let sphere = procedural_mesh(&MeshSource::Sphere { radius: 2.0 }).unwrap();
        assert_eq!(sphere.vertex_count(), 2 + 19 * 21);

        let cube = procedural_mesh(&MeshSource::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        })
        .unwrap();
        assert_eq!(cube.index_count(), 36);

        let plane = procedural_mesh(&MeshSource::Plane {
            width: 4.0,
            depth: 4.0,
            tex_u: 2.0,
            tex_v: 2.0,
        })
        .unwrap();
        assert_eq!(plane.vertex_count(), 4);
    }

    #[test]
    fn test_obj_source_goes_through_model_loader() {
        let source = MeshSource::Obj {
            path: "does/not/exist.obj".to_string(),
        };
        assert!(procedural_mesh(&source).is_none());

        // Model::from_obj 使用的加载入口
        let result = load_mesh(Path::new("does/not/exist.obj"));
        assert!(matches!(
            result,
            Err(SkyRenderError::MeshLoading(MeshLoadError::FileNotFound(_)))
        ));
    }
}

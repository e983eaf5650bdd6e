//! 天空盒
//!
//! 用一个以摄像机为中心的大球体绘制立方体贴图：
//! 球体网格只保留顶点位置，索引为 16 位。

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use wgpu::util::DeviceExt;

use crate::component::Camera;
use crate::core::error::Result;
use crate::core::math::{matrix, Matrix4};
use crate::geometry::{MeshData, VertexPos};
use crate::geometry::shapes::create_sphere;
use crate::gfx::WgpuContext;
use crate::renderer::cube_map::CubeMapImage;
use crate::renderer::effect::SkyEffect;
use crate::renderer::texture::TextureCube;

/// 天空盒
pub struct SkyRender {
    texture_cube: Arc<TextureCube>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SkyRender {
    /// 从单个文件创建
    ///
    /// `.dds`（不区分大小写）按 DDS 立方体贴图读取，其余按水平十字布局图片读取。
    pub fn from_file(ctx: &WgpuContext, path: impl AsRef<Path>, sky_radius: f32, generate_mips: bool) -> Result<Self> {
        let texture_cube = TextureCube::from_file(ctx, path, generate_mips)?;
        Self::with_texture(ctx, Arc::new(texture_cube), sky_radius)
    }

    /// 从六张面图片创建（顺序 +X, -X, +Y, -Y, +Z, -Z）
    pub fn from_files<P: AsRef<Path>>(ctx: &WgpuContext, paths: &[P], sky_radius: f32, generate_mips: bool) -> Result<Self> {
        let texture_cube = TextureCube::from_files(ctx, paths, generate_mips)?;
        Self::with_texture(ctx, Arc::new(texture_cube), sky_radius)
    }

    /// 从内存中的立方体贴图创建（程序生成的天空）
    pub fn from_image(ctx: &WgpuContext, image: &CubeMapImage, sky_radius: f32) -> Result<Self> {
        let texture_cube = TextureCube::from_image(ctx, image)?;
        Self::with_texture(ctx, Arc::new(texture_cube), sky_radius)
    }

    fn with_texture(ctx: &WgpuContext, texture_cube: Arc<TextureCube>, sky_radius: f32) -> Result<Self> {
        let (positions, indices) = sky_geometry(&create_sphere(sky_radius))?;

        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Vertex Buffer"),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        info!(
            radius = sky_radius,
            vertices = positions.len(),
            indices = indices.len(),
            face_size = texture_cube.face_size,
            "Sky created"
        );

        Ok(Self {
            texture_cube,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    /// 立方体贴图（也用作物体的环境反射）
    pub fn texture_cube(&self) -> &Arc<TextureCube> {
        &self.texture_cube
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// 绘制天空，应在所有不透明物体之后调用
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, effect: &'a SkyEffect, camera: &Camera) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        effect.set_world_view_proj_matrix(&sky_world_view_proj(camera));
        effect.set_texture_cube(&self.texture_cube);
        if effect.apply(pass) {
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }
}

/// 天空球的顶点位置与 16 位索引
pub fn sky_geometry(mesh: &MeshData) -> Result<(Vec<VertexPos>, Vec<u16>)> {
    Ok((mesh.positions(), mesh.indices_u16()?))
}

/// 把天空球平移到摄像机位置后的 WVP 矩阵
pub fn sky_world_view_proj(camera: &Camera) -> Matrix4 {
    let eye = camera.position();
    camera.view_proj_matrix() * matrix::translation(eye.x, eye.y, eye.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::{Vector3, Vector4};

    #[test]
    fn test_sky_geometry_is_position_only() {
        let (positions, indices) = sky_geometry(&create_sphere(5000.0)).unwrap();
        assert_eq!(std::mem::size_of_val(&positions[0]), 12);
        assert_eq!(positions.len(), 2 + 19 * 21);
        assert_eq!(indices.len(), 6 * 19 * 20);
        assert_eq!(positions[0].position, [0.0, 5000.0, 0.0]);
    }

    #[test]
    fn test_sky_follows_camera() {
        let mut camera = Camera::new();
        camera.set_position(Vector3::new(10.0, 20.0, 30.0));
        let wvp = sky_world_view_proj(&camera);

        // 天空球中心变换到观察空间原点
        let center = camera.proj_matrix().try_inverse().unwrap() * (wvp * Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert!(center.xyz().norm() < 1e-3);

        // 移动摄像机不改变天空的投影结果
        let point = Vector4::new(0.0, 0.0, 100.0, 1.0);
        let before = wvp * point;
        camera.set_position(Vector3::new(-50.0, 0.0, 7.0));
        let after = sky_world_view_proj(&camera) * point;
        assert!((before - after).norm() < 1e-3);
    }
}

//! 模型：GPU 上的网格 + 材质 + 纹理
//!
//! 一个 [`Model`] 由若干 [`ModelPart`] 组成，每个部分对应网格的一个子集，
//! 共享同一个顶点缓冲，拥有各自的索引缓冲、材质和纹理。

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::core::error::Result;
use crate::geometry::loaders::load_mesh;
use crate::geometry::{BoundingBox, MeshData};
use crate::gfx::WgpuContext;
use crate::renderer::texture::Texture2D;

/// 材质（与着色器中的 `Material` 布局一致）
///
/// `specular.w` 为高光指数，`reflect` 为环境反射强度。
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub reflect: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.2, 0.2, 0.2, 16.0],
            reflect: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// CPU 侧的索引数据，所有索引都能放进 16 位时使用 u16
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn from_indices(indices: &[u32]) -> Self {
        if indices.iter().all(|&i| i <= u16::MAX as u32) {
            IndexData::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexData::U32(indices.to_vec())
        }
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// 每个子集在索引数组中的范围；没有子集时整个网格为一个部分
pub fn part_ranges(mesh: &MeshData) -> Vec<Range<usize>> {
    if mesh.subsets.is_empty() {
        return vec![0..mesh.indices.len()];
    }
    mesh.subsets
        .iter()
        .map(|s| {
            let start = (s.index_start() as usize).min(mesh.indices.len());
            let end = (start + s.index_count() as usize).min(mesh.indices.len());
            start..end
        })
        .filter(|range| !range.is_empty())
        .collect()
}

/// 模型的一个可绘制部分
pub struct ModelPart {
    pub material: Material,
    pub texture: Arc<Texture2D>,
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

/// 模型
#[derive(Default)]
pub struct Model {
    pub parts: Vec<ModelPart>,
    pub bounding_box: BoundingBox,
}

impl Model {
    /// 从网格数据创建，所有部分使用同一材质和纹理
    pub fn from_mesh(ctx: &WgpuContext, mesh: &MeshData, material: Material, texture: Arc<Texture2D>) -> Result<Self> {
        let bounding_box = mesh.bounding_box();
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Ok(Self {
                parts: Vec::new(),
                bounding_box,
            });
        }

        let label = mesh.name.as_deref().unwrap_or("mesh");
        let vertex_buffer = Arc::new(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        let parts = part_ranges(mesh)
            .into_iter()
            .map(|range| {
                let indices = IndexData::from_indices(&mesh.indices[range]);
                let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", label)),
                    contents: indices.as_bytes(),
                    usage: wgpu::BufferUsages::INDEX,
                });
                ModelPart {
                    material,
                    texture: Arc::clone(&texture),
                    vertex_buffer: Arc::clone(&vertex_buffer),
                    index_buffer,
                    index_count: indices.len() as u32,
                    index_format: indices.format(),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            name = label,
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            parts = parts.len(),
            "Created model"
        );

        Ok(Self { parts, bounding_box })
    }

    /// 从模型文件加载，每个子集生成一个部分
    pub fn from_obj(ctx: &WgpuContext, path: impl AsRef<Path>, material: Material, texture: Arc<Texture2D>) -> Result<Self> {
        let path = path.as_ref();
        let mesh = load_mesh(path)?;
        crate::asset_info!(path = %path.display(), subsets = mesh.subsets.len(), "Loaded model file");
        Self::from_mesh(ctx, &mesh, material, texture)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

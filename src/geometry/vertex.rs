/// 几何体顶点定义模块
///
/// 定义场景物体使用的完整顶点结构（位置、法线、UV、切线），
/// 以及天空球只需要的位置顶点。

use bytemuck::{Pod, Zeroable};

/// 完整的3D顶点结构
///
/// 包含所有常用的顶点属性，用于支持光照、纹理映射和法线贴图。
/// 内存布局与GPU兼容，使用 `#[repr(C)]` 保证顺序和对齐。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - normal: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - tangent: 12 bytes (3 * f32)
/// - **总计**: 44 bytes
///
/// # 示例
///
/// ```rust
/// use sky_render::geometry::vertex::Vertex;
///
/// let vertex = Vertex {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
///     texcoord: [0.5, 0.5],
///     tangent: [1.0, 0.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)
    ///
    /// 用于光照计算的表面法线，应该是归一化的单位向量。
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)
    pub texcoord: [f32; 2],

    /// 切线向量 (tx, ty, tz)
    ///
    /// 用于法线贴图的切线空间计算，应该与法线正交且归一化。
    pub tangent: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    /// 创建一个新的顶点
    #[inline]
    pub fn new(
        position: [f32; 3],
        normal: [f32; 3],
        texcoord: [f32; 2],
        tangent: [f32; 3],
    ) -> Self {
        Self {
            position,
            normal,
            texcoord,
            tangent,
        }
    }

    /// 顶点缓冲区布局（location 0..3）
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// 仅含位置的顶点
///
/// 天空球只需要位置：它同时作为立方体贴图的采样方向。
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPos {
    pub position: [f32; 3],
}

impl VertexPos {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPos>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&Vertex> for VertexPos {
    fn from(vertex: &Vertex) -> Self {
        Self { position: vertex.position }
    }
}

/// 网格数据结构模块
///
/// 定义CPU侧的网格数据容器：程序生成的几何体与从文件加载的模型
/// 都先落到 `MeshData`，再由渲染器上传为顶点/索引缓冲区。

use super::bounds::BoundingBox;
use super::vertex::{Vertex, VertexPos};
use crate::core::error::MeshLoadError;
use crate::core::math::Vector3;

/// 子网格描述符
///
/// 描述网格的一个子集，通常对应一个材质或一个独立的渲染批次。
///
/// # 示例
///
/// ```rust
/// use sky_render::geometry::mesh::Subset;
///
/// // 描述一个包含100个顶点、50个三角形的子网格
/// let subset = Subset::new(0, 0, 100, 0, 50);
/// assert_eq!(subset.index_count(), 150);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset {
    /// 子网格ID（通常对应材质ID）
    pub id: u32,

    /// 起始顶点索引
    pub vertex_start: u32,

    /// 顶点数量
    pub vertex_count: u32,

    /// 起始面索引（以三角形为单位）
    pub face_start: u32,

    /// 面数量（三角形数量）
    pub face_count: u32,
}

impl Subset {
    #[inline]
    pub fn new(
        id: u32,
        vertex_start: u32,
        vertex_count: u32,
        face_start: u32,
        face_count: u32,
    ) -> Self {
        Self {
            id,
            vertex_start,
            vertex_count,
            face_start,
            face_count,
        }
    }

    /// 获取索引起始位置（以索引数量计，非三角形数）
    #[inline]
    pub fn index_start(&self) -> u32 {
        self.face_start * 3
    }

    /// 获取索引数量（非三角形数）
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.face_count * 3
    }
}

/// CPU侧网格数据
///
/// 存储顶点、索引和子网格信息，不包含GPU资源。
/// 索引统一使用32位；需要16位索引缓冲区时调用 [`MeshData::indices_u16`]。
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// 顶点数组
    pub vertices: Vec<Vertex>,

    /// 三角形顶点索引，每3个索引定义一个三角形
    pub indices: Vec<u32>,

    /// 子网格列表，为空表示整个网格是一个批次
    pub subsets: Vec<Subset>,

    /// 网格名称（可选），用于调试和识别
    pub name: Option<String>,
}

impl MeshData {
    /// 创建一个空的网格数据
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建一个指定名称的空网格数据
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// 创建一个带容量预分配的网格数据
    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            subsets: Vec::new(),
            name: None,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 只保留位置的顶点数组
    pub fn positions(&self) -> Vec<VertexPos> {
        self.vertices.iter().map(VertexPos::from).collect()
    }

    /// 转换为16位索引
    ///
    /// 任何索引超出 `u16` 范围时返回错误，而不是截断。
    pub fn indices_u16(&self) -> Result<Vec<u16>, MeshLoadError> {
        self.indices
            .iter()
            .map(|&index| {
                u16::try_from(index).map_err(|_| {
                    MeshLoadError::InvalidGeometry(format!(
                        "index {} does not fit in a 16-bit index buffer ({} vertices)",
                        index,
                        self.vertices.len()
                    ))
                })
            })
            .collect()
    }

    /// 局部空间下的轴对齐包围盒
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| Vector3::from(v.position)))
    }

    /// 验证网格数据的有效性
    ///
    /// 检查：
    /// - 索引数量是3的倍数（每个三角形3个顶点）
    /// - 所有索引都在有效范围内
    /// - 子网格描述符的范围有效
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "索引数量必须是3的倍数，当前为: {}",
                self.indices.len()
            ));
        }

        let vertex_count = self.vertices.len() as u32;
        if let Some((i, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, index)| **index >= vertex_count)
        {
            return Err(format!(
                "索引 {} 处的值 {} 超出顶点范围 (共 {} 个顶点)",
                i, index, vertex_count
            ));
        }

        let triangle_count = self.triangle_count() as u32;
        for (i, subset) in self.subsets.iter().enumerate() {
            if subset.vertex_start + subset.vertex_count > vertex_count {
                return Err(format!(
                    "子网格 {} 的顶点范围超出边界: start={}, count={}, total={}",
                    i, subset.vertex_start, subset.vertex_count, vertex_count
                ));
            }

            if subset.face_start + subset.face_count > triangle_count {
                return Err(format!(
                    "子网格 {} 的面范围超出边界: start={}, count={}, total={}",
                    i, subset.face_start, subset.face_count, triangle_count
                ));
            }
        }

        Ok(())
    }

    /// 清空所有数据
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.subsets.clear();
        self.name = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::new();
        mesh.vertices.push(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0], [1.0, 0.0, 0.0]));
        mesh.vertices.push(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0], [1.0, 0.0, 0.0]));
        mesh.vertices.push(Vertex::new([0.0, 2.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0], [1.0, 0.0, 0.0]));
        mesh.indices.extend_from_slice(&[0, 1, 2]);
        mesh
    }

    #[test]
    fn test_subset_index_helpers() {
        let subset = Subset::new(0, 0, 100, 10, 20);

        assert_eq!(subset.index_start(), 30); // 10 * 3
        assert_eq!(subset.index_count(), 60); // 20 * 3
    }

    #[test]
    fn test_mesh_data_counts() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_index_count() {
        let mut mesh = triangle();
        mesh.indices.push(0); // 不是3的倍数
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_index_range() {
        let mut mesh = triangle();
        mesh.indices[2] = 5;

        let result = mesh.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("超出顶点范围"));
    }

    #[test]
    fn test_validation_subset_out_of_range() {
        let mut mesh = triangle();
        mesh.subsets.push(Subset::new(0, 0, 3, 0, 2));
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_positions_only() {
        let mesh = triangle();
        let positions = mesh.positions();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2].position, [0.0, 2.0, 1.0]);
    }

    #[test]
    fn test_indices_u16() {
        let mut mesh = triangle();
        assert_eq!(mesh.indices_u16().unwrap(), vec![0u16, 1, 2]);

        mesh.indices.push(70_000);
        assert!(mesh.indices_u16().is_err());
    }

    #[test]
    fn test_bounding_box() {
        let bounds = triangle().bounding_box();
        assert_eq!(bounds.min, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_mesh_data_clear() {
        let mut mesh = MeshData::with_name("Test");
        mesh.vertices.push(Vertex::default());
        mesh.indices.push(0);

        mesh.clear();

        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.name.is_none());
    }
}

/// 几何体生成、加载和处理模块
///
/// # 模块结构
///
/// - `vertex`: 顶点数据结构定义
/// - `mesh`: 网格数据和子网格结构
/// - `shapes`: 程序生成的球体、长方体、平面
/// - `bounds`: 轴对齐包围盒
/// - `math_utils`: 几何数学工具（法线计算、切线空间等）
/// - `loaders`: 模型文件加载器
///
/// # 数据流
///
/// ```text
/// shapes::create_* / loaders::load_mesh
///     ↓
/// MeshData (CPU侧数据)
///     ↓
/// Model / SkyRender (上传到GPU)
/// ```

pub mod vertex;
pub mod mesh;
pub mod shapes;
pub mod bounds;
pub mod math_utils;
pub mod loaders;

// 重新导出常用类型
pub use vertex::{Vertex, VertexPos};
pub use mesh::{MeshData, Subset};
pub use bounds::BoundingBox;

/// 模型加载器模块
///
/// 提供统一的模型加载接口和各种格式的具体实现。
///
/// # 支持的格式
///
/// - **OBJ**: Wavefront OBJ 格式（使用 tobj crate）
///
/// # 使用示例
///
/// ```rust,no_run
/// use sky_render::geometry::loaders::load_mesh;
/// use std::path::Path;
///
/// let mesh = load_mesh(Path::new("assets/models/house.obj"))?;
/// # Ok::<(), sky_render::core::SkyRenderError>(())
/// ```
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::MeshData;
use std::path::Path;

pub mod obj_loader;

pub use obj_loader::ObjLoader;

/// 网格加载器 trait
///
/// 所有格式的加载器都实现此 trait。
///
/// # 实现要求
///
/// - 加载器应该是无状态的（使用关联函数）
/// - 返回 CPU 侧的 `MeshData`，不涉及 GPU 资源
/// - 网格需转换到左手坐标系、顺时针为正面
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件不存在或无法读取
    /// - 文件格式错误或损坏
    /// - 数据验证失败
    fn load_from_file(path: &Path) -> Result<MeshData>;

    /// 从内存数据加载网格
    fn load_from_memory(data: &[u8]) -> Result<MeshData>;

    /// 支持的扩展名（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器
pub fn load_mesh(path: &Path) -> Result<MeshData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| MeshLoadError::UnsupportedFormat("无法确定文件扩展名".to_string()))?;

    if ObjLoader::supported_extensions().contains(&extension.as_str()) {
        return ObjLoader::load_from_file(path);
    }

    Err(MeshLoadError::UnsupportedFormat(format!("不支持的文件格式: .{}", extension)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SkyRenderError;

    #[test]
    fn test_unsupported_extension() {
        let result = load_mesh(Path::new("model.fbx"));
        assert!(matches!(
            result,
            Err(SkyRenderError::MeshLoading(MeshLoadError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_missing_extension() {
        assert!(load_mesh(Path::new("model")).is_err());
    }

    #[test]
    fn test_uppercase_extension_dispatches_to_obj() {
        let result = load_mesh(Path::new("does/not/exist.OBJ"));
        assert!(matches!(
            result,
            Err(SkyRenderError::MeshLoading(MeshLoadError::FileNotFound(_)))
        ));
    }
}

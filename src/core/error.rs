//! 错误处理模块
//!
//! 定义了渲染示例中使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 手写 `Display` 与 `Error` 实现，不依赖派生宏
//! - 为每种错误类型提供清晰的上下文信息
//! - 通过 `From` 转换让 `?` 在各层之间直接传播

use std::fmt;
use std::path::PathBuf;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, SkyRenderError>;

/// SkyRender 的错误类型
#[derive(Debug)]
pub enum SkyRenderError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 网格加载错误
    MeshLoading(MeshLoadError),

    /// 纹理 / 立方体贴图加载错误
    Texture(TextureError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 设备创建失败
    DeviceCreation(String),

    /// 交换链（surface）错误
    SwapchainError(String),

    /// 资源创建失败
    ResourceCreation(String),
}

/// 网格加载相关的错误
#[derive(Debug)]
pub enum MeshLoadError {
    /// 文件不存在
    FileNotFound(PathBuf),

    /// 不支持的文件格式
    UnsupportedFormat(String),

    /// 解析失败
    ParseError(String),

    /// 数据验证失败
    ValidationError(String),

    /// 几何数据无效
    InvalidGeometry(String),
}

/// 纹理加载相关的错误
#[derive(Debug)]
pub enum TextureError {
    /// 图片文件不存在
    FileNotFound(PathBuf),

    /// 图片解码失败
    Decode(String),

    /// 不支持的像素格式
    UnsupportedFormat(String),

    /// 立方体贴图的布局不符合要求
    InvalidLayout(String),

    /// 六面输入的数量不是 6
    FaceCount(usize),

    /// 六个面的尺寸不一致
    FaceMismatch(String),

    /// 设备缺少必要的特性（例如 BC 压缩纹理）
    MissingFeature(String),
}

impl fmt::Display for SkyRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkyRenderError::Config(e) => write!(f, "Configuration error: {}", e),
            SkyRenderError::Graphics(e) => write!(f, "Graphics error: {}", e),
            SkyRenderError::MeshLoading(e) => write!(f, "Mesh loading error: {}", e),
            SkyRenderError::Texture(e) => write!(f, "Texture error: {}", e),
            SkyRenderError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SwapchainError(msg) => write!(f, "Swapchain error: {}", msg),
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
        }
    }
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLoadError::FileNotFound(path) => write!(f, "Mesh file not found: {}", path.display()),
            MeshLoadError::UnsupportedFormat(msg) => write!(f, "Unsupported mesh format: {}", msg),
            MeshLoadError::ParseError(msg) => write!(f, "Failed to parse mesh: {}", msg),
            MeshLoadError::ValidationError(msg) => write!(f, "Mesh validation failed: {}", msg),
            MeshLoadError::InvalidGeometry(msg) => write!(f, "Invalid geometry data: {}", msg),
        }
    }
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::FileNotFound(path) => write!(f, "Texture file not found: {}", path.display()),
            TextureError::Decode(msg) => write!(f, "Failed to decode image: {}", msg),
            TextureError::UnsupportedFormat(msg) => write!(f, "Unsupported texture format: {}", msg),
            TextureError::InvalidLayout(msg) => write!(f, "Invalid cube map layout: {}", msg),
            TextureError::FaceCount(count) => {
                write!(f, "Cube map needs exactly 6 face images, got {}", count)
            }
            TextureError::FaceMismatch(msg) => write!(f, "Cube map faces do not match: {}", msg),
            TextureError::MissingFeature(msg) => write!(f, "Missing device feature: {}", msg),
        }
    }
}

impl std::error::Error for SkyRenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SkyRenderError::Io(e) => Some(e),
            SkyRenderError::Config(e) => Some(e),
            SkyRenderError::Graphics(e) => Some(e),
            SkyRenderError::MeshLoading(e) => Some(e),
            SkyRenderError::Texture(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}
impl std::error::Error for MeshLoadError {}
impl std::error::Error for TextureError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for SkyRenderError {
    fn from(err: std::io::Error) -> Self {
        SkyRenderError::Io(err)
    }
}

impl From<ConfigError> for SkyRenderError {
    fn from(err: ConfigError) -> Self {
        SkyRenderError::Config(err)
    }
}

impl From<GraphicsError> for SkyRenderError {
    fn from(err: GraphicsError) -> Self {
        SkyRenderError::Graphics(err)
    }
}

impl From<MeshLoadError> for SkyRenderError {
    fn from(err: MeshLoadError) -> Self {
        SkyRenderError::MeshLoading(err)
    }
}

impl From<TextureError> for SkyRenderError {
    fn from(err: TextureError) -> Self {
        SkyRenderError::Texture(err)
    }
}

impl From<image::ImageError> for TextureError {
    fn from(err: image::ImageError) -> Self {
        TextureError::Decode(err.to_string())
    }
}

impl From<image::ImageError> for SkyRenderError {
    fn from(err: image::ImageError) -> Self {
        SkyRenderError::Texture(err.into())
    }
}

impl From<ddsfile::Error> for SkyRenderError {
    fn from(err: ddsfile::Error) -> Self {
        SkyRenderError::Texture(TextureError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_context() {
        let err: SkyRenderError = TextureError::FaceCount(5).into();
        let text = err.to_string();
        assert!(text.starts_with("Texture error"));
        assert!(text.contains("got 5"));
    }

    #[test]
    fn test_source_chain() {
        let err: SkyRenderError = ConfigError::ParseError("bad".to_string()).into();
        assert!(err.source().is_some());

        let err: SkyRenderError = TextureError::InvalidLayout("4x2".to_string()).into();
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SkyRenderError = io.into();
        assert!(matches!(err, SkyRenderError::Io(_)));
    }
}

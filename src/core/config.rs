//! 配置管理模块
//!
//! 提供引擎配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//! title = "SkyRender"
//! resizable = true
//!
//! [graphics]
//! backend = "auto"    # auto, vulkan, dx12, metal, gl
//! vsync = true
//! msaa_samples = 1
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 引擎配置
///
/// 包含了示例运行所需的所有配置项。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 图形后端选择
    #[serde(default = "default_backend")]
    pub backend: GraphicsBackend,

    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// MSAA 采样数
    #[serde(default = "default_msaa")]
    pub msaa_samples: u32,
}

/// 图形后端类型
///
/// 所有后端都经由 wgpu 驱动，这里只决定 wgpu 实例允许使用哪些原生 API。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsBackend {
    /// 由 wgpu 自动选择
    Auto,
    /// Vulkan
    Vulkan,
    /// DirectX 12
    Dx12,
    /// Metal
    Metal,
    /// OpenGL / GLES
    Gl,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_title() -> String { "SkyRender".to_string() }
fn default_resizable() -> bool { true }
fn default_backend() -> GraphicsBackend { GraphicsBackend::Auto }
fn default_vsync() -> bool { true }
fn default_msaa() -> u32 { 1 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "skyrender.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            vsync: default_vsync(),
            msaa_samples: default_msaa(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use sky_render::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), sky_render::core::SkyRenderError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    ///
    /// 日志系统此时尚未初始化，解析失败只能写到 stderr。
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--vulkan` / `--dx12` / `--metal` / `--gl`: 限定图形后端
    /// - `--width <value>`: 设置窗口宽度
    /// - `--height <value>`: 设置窗口高度
    /// - `--no-vsync`: 关闭垂直同步
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        for arg in &args {
            match arg.as_str() {
                "--vulkan" => self.graphics.backend = GraphicsBackend::Vulkan,
                "--dx12" => self.graphics.backend = GraphicsBackend::Dx12,
                "--metal" => self.graphics.backend = GraphicsBackend::Metal,
                "--gl" => self.graphics.backend = GraphicsBackend::Gl,
                "--no-vsync" => self.graphics.vsync = false,
                _ => {}
            }
        }

        // 检查窗口尺寸
        if let Some(idx) = args.iter().position(|a| a == "--width") {
            if let Some(width) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.width = width;
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--height") {
            if let Some(height) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.window.height = height;
            }
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        // 验证窗口尺寸
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        // wgpu 对 Rgba8/Bgra8 + Depth32Float 保证支持 1 和 4
        if !matches!(self.graphics.msaa_samples, 1 | 4) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.msaa_samples".to_string(),
                reason: "MSAA samples must be 1 or 4".to_string(),
            }.into());
        }

        Ok(())
    }
}

impl GraphicsBackend {
    /// 转换为 wgpu 的后端位集合
    pub fn to_wgpu(self) -> wgpu::Backends {
        match self {
            GraphicsBackend::Auto => wgpu::Backends::all(),
            GraphicsBackend::Vulkan => wgpu::Backends::VULKAN,
            GraphicsBackend::Dx12 => wgpu::Backends::DX12,
            GraphicsBackend::Metal => wgpu::Backends::METAL,
            GraphicsBackend::Gl => wgpu::Backends::GL,
        }
    }

    /// 获取后端名称
    pub fn name(&self) -> &'static str {
        match self {
            GraphicsBackend::Auto => "auto",
            GraphicsBackend::Vulkan => "Vulkan",
            GraphicsBackend::Dx12 => "DirectX 12",
            GraphicsBackend::Metal => "Metal",
            GraphicsBackend::Gl => "OpenGL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.graphics.backend, GraphicsBackend::Auto);
        assert!(config.graphics.vsync);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        config.window.width = 800;
        config.graphics.msaa_samples = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            width = 640

            [graphics]
            backend = "vulkan"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.graphics.backend, GraphicsBackend::Vulkan);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[window\nwidth = ");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["sky_render", "--dx12", "--width", "1024", "--height", "bad", "--no-vsync"]);

        assert_eq!(config.graphics.backend, GraphicsBackend::Dx12);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 720);
        assert!(!config.graphics.vsync);
    }

    #[test]
    fn test_backend_mapping() {
        assert_eq!(GraphicsBackend::Vulkan.to_wgpu(), wgpu::Backends::VULKAN);
        assert_eq!(GraphicsBackend::Auto.to_wgpu(), wgpu::Backends::all());
    }
}

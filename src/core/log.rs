//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//!
//! # 使用示例
//!
//! ```no_run
//! use sky_render::core::{log, config::LogLevel};
//!
//! log::init_logger(LogLevel::Info, false, None)?;
//!
//! tracing::info!(width = 800, height = 600, "Window created");
//! sky_render::app_info!("Scene ready");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    util::TryInitError,
    EnvFilter,
};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::path::Path;

use super::config::LogLevel;

/// 初始化日志系统
///
/// 必须在程序开始时调用一次。`RUST_LOG` 环境变量存在时优先于配置中的级别。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "skyrender.log"）
///
/// 全局订阅者已经安装过时返回错误。
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    if file_output {
        // 解析日志文件路径
        let log_path = log_file_path.unwrap_or("skyrender.log");
        let path = Path::new(log_path);
        let directory = path.parent().unwrap_or(Path::new("."));
        let filename = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("skyrender.log");

        // 创建滚动文件 appender（每天滚动）
        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            directory,
            filename
        );

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false)  // 文件不需要 ANSI 颜色
            .with_writer(file_appender);

        // 组合控制台和文件输出
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    }
}

/// 仅控制台输出、Info 级别的日志，在配置可用之前使用
pub fn init_simple() -> Result<(), TryInitError> {
    init_logger(LogLevel::Info, false, None)
}

impl LogLevel {
    /// `EnvFilter` 使用的指令字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 配置级别加上 wgpu 内部模块的降噪指令
pub fn filter_directives(level: LogLevel) -> String {
    let mut directives = level.as_filter().to_string();
    for module in WGPU_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    directives
}

const WGPU_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// 渲染核心日志 - Info 级别
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "sky_render::engine", $($arg)*)
    };
}

/// 渲染核心日志 - Warn 级别
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "sky_render::engine", $($arg)*)
    };
}

/// 渲染核心日志 - Error 级别
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "sky_render::engine", $($arg)*)
    };
}

/// 应用层日志 - Info 级别
#[macro_export]
macro_rules! app_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "sky_render::app", $($arg)*)
    };
}

/// 应用层日志 - Warn 级别
#[macro_export]
macro_rules! app_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "sky_render::app", $($arg)*)
    };
}

/// 应用层日志 - Error 级别
#[macro_export]
macro_rules! app_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "sky_render::app", $($arg)*)
    };
}

/// 资源加载日志（纹理、天空、模型） - Info 级别
#[macro_export]
macro_rules! asset_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "sky_render::asset", $($arg)*)
    };
}

/// 资源加载日志（纹理、天空、模型） - Warn 级别，用于回退到默认资源的情况
#[macro_export]
macro_rules! asset_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "sky_render::asset", $($arg)*)
    };
}

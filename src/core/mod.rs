//! 核心功能模块
//!
//! 与图形 API 无关的基础设施：数学库、日志、配置、场景描述、
//! 输入处理和错误类型。
//!
//! # 模块组织
//!
//! - `math`：向量、矩阵、颜色以及左手坐标系的矩阵辅助函数
//! - `log`：基于 tracing 的日志系统
//! - `config`：引擎配置（窗口、图形、日志）
//! - `scene`：场景配置（摄像机、天空、光源、物体）
//! - `input`：键盘鼠标输入到摄像机运动的映射
//! - `error`：统一的错误类型

pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod math;
pub mod scene;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use error::{Result, SkyRenderError};
pub use math::{Color, Matrix4, Quaternion, Vector2, Vector3, Vector4};
pub use scene::SceneConfig;

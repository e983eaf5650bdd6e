//! 图形设备层
//!
//! 所有原生图形 API（Vulkan、DX12、Metal、GL）都经由 wgpu 访问，
//! 具体使用哪些由 `graphics.backend` 配置决定。

pub mod context;

pub use context::{WgpuContext, DEPTH_FORMAT};

//! 渲染效果
//!
//! 每个效果拥有自己的渲染管线、绑定组布局和常量缓冲区，
//! 对外提供 "设置参数 → apply → 绘制" 的接口。
//!
//! - [`BasicEffect`]：带光照、纹理和环境反射的物体渲染
//! - [`SkyEffect`]：立方体贴图天空
//!
//! # 帧流程
//!
//! ```text
//! effect.set_view_matrix(..) / set_dir_light(..)   // 渲染通道之前
//! effect.begin_frame(ctx, object_count)
//! {
//!     // 渲染通道内：set_world_matrix / set_material / set_texture / apply / draw
//! }
//! effect.end_frame(&ctx.queue)                      // 提交命令之前
//! ```
//!
//! 渲染通道借用了效果的全部 GPU 资源，所以通道内的设置只写入
//! CPU 暂存区，`end_frame` 再统一写入 GPU。

pub mod basic;
pub mod sky;

pub use basic::{BasicEffect, FrameConstants, ObjectConstants, MAX_DIR_LIGHTS};
pub use sky::SkyEffect;

use crate::core::error::{GraphicsError, Result};
use crate::gfx::DEPTH_FORMAT;

/// 在错误作用域内创建 GPU 对象，把验证错误转换为 `GraphicsError`
pub(crate) fn with_validation<T>(device: &wgpu::Device, label: &str, create: impl FnOnce() -> T) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(GraphicsError::ResourceCreation(format!("{}: {}", label, error)).into()),
        None => Ok(value),
    }
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, dynamic: bool, min_size: Option<wgpu::BufferSize>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: min_size,
        },
        count: None,
    }
}

pub(crate) fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(crate) fn depth_state(compare: wgpu::CompareFunction, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(crate) fn multisample_state(count: u32) -> wgpu::MultisampleState {
    wgpu::MultisampleState {
        count,
        mask: !0,
        alpha_to_coverage_enabled: false,
    }
}

/// 以 `Arc` 的地址作为绑定组缓存的键
pub(crate) fn arc_key<T>(value: &std::sync::Arc<T>) -> usize {
    std::sync::Arc::as_ptr(value) as usize
}

//! wgpu 设备管理
//!
//! 负责 wgpu 图形设备的初始化和管理，包括：
//! - 按配置的后端集合创建 wgpu 实例
//! - 创建窗口表面
//! - 选择图形适配器，创建逻辑设备和命令队列
//! - 配置交换链，维护深度缓冲与 MSAA 颜色缓冲

use std::sync::Arc;
use tracing::{debug, info, warn};
use winit::window::Window;

use crate::core::error::{GraphicsError, Result};
use crate::core::Config;

/// 深度缓冲格式
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// wgpu 图形上下文
///
/// 封装了 wgpu 的核心设备、表面以及与表面尺寸绑定的附件。
pub struct WgpuContext {
    /// 窗口表面
    pub surface: wgpu::Surface<'static>,
    /// 图形适配器（GPU）
    pub adapter: wgpu::Adapter,
    /// 逻辑设备
    pub device: wgpu::Device,
    /// 命令队列
    pub queue: wgpu::Queue,
    /// 表面配置
    pub surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
    window: Arc<Window>,
}

impl WgpuContext {
    /// 创建 wgpu 上下文
    ///
    /// # 参数
    ///
    /// * `window` - 已创建的窗口
    /// * `config` - 引擎配置（后端、垂直同步、MSAA）
    pub fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        info!(backend = config.graphics.backend.name(), "Initializing wgpu context");

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: config.graphics.backend.to_wgpu(),
            dx12_shader_compiler: Default::default(),
            flags: wgpu::InstanceFlags::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        debug!("Creating surface");
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create surface: {}", e)))?;

        debug!("Requesting adapter");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| GraphicsError::DeviceCreation("Failed to find suitable adapter".to_string()))?;

        let adapter_info = adapter.get_info();
        info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "Selected adapter"
        );

        // 可选特性只在适配器支持时开启，DDS 加载时再检查
        let optional_features = wgpu::Features::TEXTURE_COMPRESSION_BC | wgpu::Features::FLOAT32_FILTERABLE;
        let required_features = adapter.features() & optional_features;
        if !required_features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
            warn!("Adapter does not support BC texture compression; compressed DDS cube maps are unavailable");
        }

        debug!("Requesting device and queue");
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features,
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| GraphicsError::SwapchainError("Surface reports no supported formats".to_string()))?;

        let present_mode = if config.graphics.vsync {
            wgpu::PresentMode::Fifo
        } else if surface_caps.present_modes.contains(&wgpu::PresentMode::Immediate) {
            wgpu::PresentMode::Immediate
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        debug!(format = ?surface_format, present_mode = ?present_mode, "Configuring surface");

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sample_count = config.graphics.msaa_samples;
        let depth_view = create_depth_view(&device, &surface_config, sample_count);
        let msaa_view = create_msaa_view(&device, &surface_config, sample_count);

        info!(
            width = surface_config.width,
            height = surface_config.height,
            msaa = sample_count,
            "wgpu context initialized"
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            depth_view,
            msaa_view,
            sample_count,
            window,
        })
    }

    /// 获取窗口引用
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// 交换链颜色格式
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// MSAA 颜色缓冲（采样数为 1 时为 `None`）
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_view.as_ref()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    /// 设备是否支持某项特性
    pub fn supports(&self, features: wgpu::Features) -> bool {
        self.device.features().contains(features)
    }

    /// 重新配置表面与尺寸相关的附件
    ///
    /// 宽或高为 0（窗口最小化）时忽略。
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
        debug!(width, height, "Surface resized");
    }

    /// 用当前配置重新配置表面（Lost / Outdated 后调用）
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config, self.sample_count);
        self.msaa_view = create_msaa_view(&self.device, &self.surface_config, self.sample_count);
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_msaa_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("MSAA Color Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

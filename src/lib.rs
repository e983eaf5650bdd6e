//! SkyRender - 网格物体与静态立方体贴图天空的渲染示例
//!
//! 场景由若干 [`GameObject`](component::GameObject)（模型 + 世界矩阵）
//! 和一个 [`SkyRender`](renderer::SkyRender)（以摄像机为中心的立方体贴图球体）组成，
//! 通过 wgpu 在 Vulkan、DX12、Metal 或 GL 上绘制。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（数学、日志、配置、场景、输入、错误处理）
//! - `geometry`: 几何体模块（顶点、网格、基本形状、包围盒、OBJ 加载器）
//! - `component`: 物体、摄像机、光源、变换
//! - `gfx`: wgpu 设备与表面管理
//! - `renderer`: 纹理、立方体贴图、模型、渲染效果、天空盒与场景渲染器
//!
//! # 使用示例
//!
//! ```no_run
//! use sky_render::geometry::shapes::create_sphere;
//! use sky_render::renderer::CubeMapImage;
//!
//! // 天空球只需要顶点位置和 16 位索引
//! let sphere = create_sphere(5000.0);
//! let positions = sphere.positions();
//! let indices = sphere.indices_u16().expect("sphere fits 16-bit indices");
//! assert_eq!(positions.len(), 401);
//! assert_eq!(indices.len(), 2280);
//!
//! // 从水平十字布局图片切出六个面
//! let cube = CubeMapImage::load_cross("assets/textures/daylight.jpg".as_ref(), true)?;
//! println!("face size {}, {} mips", cube.face_size, cube.mip_levels);
//! # Ok::<(), sky_render::core::SkyRenderError>(())
//! ```

pub mod component;
pub mod core;
pub mod geometry;
pub mod gfx;
pub mod renderer;

//! SkyRender - 网格物体与立方体贴图天空
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件
//! cargo run
//!
//! # 指定图形后端（命令行覆盖）
//! cargo run -- --vulkan
//! cargo run -- --dx12 --width 1920 --height 1080 --no-vsync
//! ```
//!
//! # 操作
//!
//! - `W/A/S/D`：移动摄像机
//! - 按住鼠标右键拖动：转动视角
//! - `Esc`：退出

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use sky_render::core::input::{InputConfig, InputSystem};
use sky_render::{app_error, app_info};
use sky_render::core::{log, Config, SceneConfig};
use sky_render::renderer::Renderer;

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载引擎配置文件（config.toml）
/// 2. 应用命令行参数覆盖并验证
/// 3. 初始化日志系统
/// 4. 加载场景配置文件（scene.toml）
/// 5. 创建窗口和渲染器
/// 6. 启动主循环
fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    config.apply_args(std::env::args());
    if let Err(e) = config.validate() {
        // 配置无效时仍然需要一个日志输出
        log::init_simple().context("failed to install logger")?;
        app_error!(error = %e, "Invalid configuration");
        return Err(e).context("invalid configuration");
    }

    // 3. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file)
        .context("failed to install logger")?;
    app_info!(version = env!("CARGO_PKG_VERSION"), "SkyRender starting...");

    // 4. 加载场景配置
    let scene = SceneConfig::from_file_or_default("scene.toml");
    info!(
        backend = config.graphics.backend.name(),
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        "Graphics configuration"
    );
    info!(
        camera_pos = ?scene.camera.position,
        sky = ?scene.sky.source,
        objects = scene.objects.len(),
        "Scene configuration"
    );

    // 5. 创建窗口和渲染器
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
            .with_resizable(config.window.resizable)
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut renderer = Renderer::new(window, &config, &scene).context("failed to initialize renderer")?;
    let mut input = InputSystem::with_config(InputConfig::from(&scene.camera));
    let mut last_frame = Instant::now();

    app_info!("Entering main loop...");

    // 6. 事件循环
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    app_info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    debug!(width = size.width, height = size.height, "Window resized");
                    renderer.resize(size.width, size.height);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            ..
                        },
                    ..
                } => {
                    if code == KeyCode::Escape && state == ElementState::Pressed {
                        elwt.exit();
                    } else {
                        input.on_keyboard_input(code, state);
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input.on_mouse_button(renderer.window(), button, state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.on_mouse_move((position.x, position.y));
                }
                WindowEvent::Focused(false) => {
                    input.unlock_cursor(renderer.window());
                    input.reset_mouse();
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let delta_time = now.duration_since(last_frame).as_secs_f32();
                    last_frame = now;

                    renderer.update(&mut input, delta_time);
                    if let Err(e) = renderer.draw() {
                        app_error!("Draw failed: {}", e);
                        elwt.exit();
                    }
                }
                _ => (),
            },
            Event::AboutToWait => {
                renderer.window().request_redraw();
            }
            _ => (),
        })
        .context("event loop terminated with an error")?;

    Ok(())
}

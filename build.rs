/// Build script for SkyRender
///
/// # Shader Strategy:
/// - WGSL shaders are embedded with `include_str!` and compiled by wgpu at runtime
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=src/renderer/shaders/basic.wgsl");
    println!("cargo:rerun-if-changed=src/renderer/shaders/sky.wgsl");
}

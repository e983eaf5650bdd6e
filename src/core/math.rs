//! 统一的数学库模块
//!
//! 提供图形编程常用的数学类型和函数，基于 `nalgebra`。
//!
//! # 坐标系约定
//!
//! 与 DirectXMath 保持一致：
//! - 左手坐标系，相机默认朝向 +Z
//! - 裁剪空间深度范围 [0, 1]（wgpu 与 D3D 相同）
//! - 列向量约定：`clip = P * V * W * p`，即 DirectXMath 中 `W * V * P` 的转置写法

// 工具库，不是所有函数都会立即使用
#![allow(dead_code)]

pub use nalgebra::{
    Matrix3 as Mat3, Matrix4 as Mat4, Point3, UnitQuaternion,
    Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4,
};

use serde::{Deserialize, Serialize};

// 类型别名，使用更简洁的名称
pub type Vector2 = Vec2<f32>;
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix3 = Mat3<f32>;
pub type Matrix4 = Mat4<f32>;
pub type Quaternion = UnitQuaternion<f32>;

/// 颜色类型（RGBA，范围 0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 创建 RGB 颜色（alpha = 1.0）
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// 从整数值创建颜色（0-255）
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// 转换为 wgpu 的清屏颜色
    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }

    // 预定义颜色
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const SKY_BLUE: Color = Color::rgb(0.53, 0.81, 0.92);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 数学常量
pub mod constants {
    /// π
    pub const PI: f32 = std::f32::consts::PI;

    /// 2π
    pub const TAU: f32 = std::f32::consts::TAU;

    /// π/2
    pub const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;

    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// 弧度转角度的系数
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// 浮点数比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 数学工具函数
pub mod utils {
    use super::*;

    /// 角度转弧度
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// 弧度转角度
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// 检查两个浮点数是否近似相等
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }

    /// 逐分量比较两个向量
    pub fn approx_eq_vec3(a: &Vector3, b: &Vector3, epsilon: f32) -> bool {
        (a - b).abs().max() < epsilon
    }

    /// 将矩阵转换为 GPU 使用的列主序数组
    pub fn to_cols_array(m: &Matrix4) -> [[f32; 4]; 4] {
        // nalgebra 内部即为列主序
        *m.as_ref()
    }
}

/// 矩阵辅助函数（左手坐标系，深度 [0, 1]）
pub mod matrix {
    use super::*;

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建缩放矩阵
    pub fn scaling(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z))
    }

    /// 创建绕 X 轴旋转的矩阵
    pub fn rotation_x(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::x_axis(), angle)
    }

    /// 创建绕 Y 轴旋转的矩阵
    pub fn rotation_y(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// 创建绕 Z 轴旋转的矩阵
    pub fn rotation_z(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::z_axis(), angle)
    }

    /// 左手透视投影矩阵
    ///
    /// 等价于 `XMMatrixPerspectiveFovLH`：视空间 z=near 映射到 0，z=far 映射到 1。
    pub fn perspective_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        let h = 1.0 / (0.5 * fov_y).tan();
        let w = h / aspect;
        let range = far / (far - near);

        #[rustfmt::skip]
        let m = Matrix4::new(
            w,   0.0, 0.0,   0.0,
            0.0, h,   0.0,   0.0,
            0.0, 0.0, range, -range * near,
            0.0, 0.0, 1.0,   0.0,
        );
        m
    }

    /// 左手观察矩阵（给定朝向）
    ///
    /// 等价于 `XMMatrixLookToLH`。
    pub fn look_to_lh(eye: &Vector3, direction: &Vector3, up: &Vector3) -> Matrix4 {
        let look = direction.normalize();
        let right = up.cross(&look).normalize();
        let up = look.cross(&right);

        #[rustfmt::skip]
        let m = Matrix4::new(
            right.x, right.y, right.z, -eye.dot(&right),
            up.x,    up.y,    up.z,    -eye.dot(&up),
            look.x,  look.y,  look.z,  -eye.dot(&look),
            0.0,     0.0,     0.0,     1.0,
        );
        m
    }

    /// 左手观察矩阵（给定目标点）
    pub fn look_at_lh(eye: &Vector3, target: &Vector3, up: &Vector3) -> Matrix4 {
        look_to_lh(eye, &(target - eye), up)
    }

    /// 取矩阵的平移分量
    pub fn translation_of(m: &Matrix4) -> Vector3 {
        Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
    }

    /// 法线矩阵：世界矩阵的逆转置（不可逆时退化为单位矩阵）
    pub fn inverse_transpose(m: &Matrix4) -> Matrix4 {
        // 法线不受平移影响
        let mut linear = *m;
        linear[(0, 3)] = 0.0;
        linear[(1, 3)] = 0.0;
        linear[(2, 3)] = 0.0;
        linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix4::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(m: &Matrix4, p: Vector3) -> Vector3 {
        let clip = m * Vector4::new(p.x, p.y, p.z, 1.0);
        Vector3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
    }

    #[test]
    fn test_matrix_translation() {
        let mat = matrix::translation(1.0, 2.0, 3.0);
        let point = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let result = mat * point;

        assert!((result.x - 1.0).abs() < 1e-6);
        assert!((result.y - 2.0).abs() < 1e-6);
        assert!((result.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = matrix::perspective_lh(constants::HALF_PI, 1.0, 1.0, 100.0);

        let near = project(&proj, Vector3::new(0.0, 0.0, 1.0));
        let far = project(&proj, Vector3::new(0.0, 0.0, 100.0));

        assert!(near.z.abs() < 1e-5, "near plane maps to 0: {}", near.z);
        assert!((far.z - 1.0).abs() < 1e-5, "far plane maps to 1: {}", far.z);
    }

    #[test]
    fn test_look_to_is_left_handed() {
        let eye = Vector3::new(0.0, 0.0, -5.0);
        let view = matrix::look_to_lh(&eye, &Vector3::z(), &Vector3::y());

        // 相机前方的点在视空间中 z 为正
        let p = view.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert!((p.z - 5.0).abs() < 1e-5);

        // +X 在右侧
        let p = view.transform_point(&Point3::new(1.0, 0.0, -5.0));
        assert!(p.x > 0.0);
    }

    #[test]
    fn test_translation_of() {
        let m = matrix::translation(4.0, -2.0, 7.0) * matrix::rotation_y(0.3);
        let t = matrix::translation_of(&m);
        assert!(utils::approx_eq_vec3(&t, &Vector3::new(4.0, -2.0, 7.0), 1e-6));
    }

    #[test]
    fn test_inverse_transpose_of_uniform_scale() {
        let m = matrix::scaling(2.0, 2.0, 2.0);
        let n = matrix::inverse_transpose(&m);
        assert!((n[(0, 0)] - 0.5).abs() < 1e-6);
        assert!((n[(3, 3)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_creation() {
        let color = Color::rgb(1.0, 0.5, 0.0);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.a, 1.0);
        assert_eq!(Color::from_rgba_u8(255, 0, 0, 255), Color::rgb(1.0, 0.0, 0.0));
    }
}

//! Camera 组件
//!
//! 第一人称相机，管理视图矩阵与透视投影。
//! 左手坐标系：默认 Look = +Z，Right = +X，Up = +Y。

use crate::core::math::{constants, matrix, Matrix4, Vector3};
use crate::core::scene::CameraConfig;
use nalgebra::Unit;

/// 俯仰角上限，避免 Look 与世界 Up 平行
const MAX_PITCH: f32 = 85.0 * constants::DEG_TO_RAD;

/// Camera 组件
///
/// 管理相机的视图和投影，支持移动、旋转等操作
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3,

    /// 相机坐标系：右向量
    right: Vector3,

    /// 相机坐标系：上向量
    up: Vector3,

    /// 相机坐标系：前向量（Look）
    look: Vector3,

    near_z: f32,
    far_z: f32,
    aspect: f32,

    /// 垂直视场角（弧度）
    fov_y: f32,

    view_matrix: Matrix4,
    proj_matrix: Matrix4,
}

impl Camera {
    /// 创建新的 Camera
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vector3::zeros(),
            right: Vector3::x(),
            up: Vector3::y(),
            look: Vector3::z(),
            near_z: 0.0,
            far_z: 0.0,
            aspect: 0.0,
            fov_y: 0.0,
            view_matrix: Matrix4::identity(),
            proj_matrix: Matrix4::identity(),
        };

        // 默认透视投影：FOV=90度，aspect=1.0，near=0.5，far=1000.0
        camera.set_lens(constants::HALF_PI, 1.0, 0.5, 1000.0);
        camera.update_view_matrix();
        camera
    }

    /// 按场景配置创建相机
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new();
        camera.set_lens(
            config.fov * constants::DEG_TO_RAD,
            aspect,
            config.near_clip,
            config.far_clip,
        );
        camera.set_position(Vector3::from(config.position));
        camera.rotate_y(config.yaw * constants::DEG_TO_RAD);
        camera.pitch(config.pitch * constants::DEG_TO_RAD);
        camera
    }

    // ========== 位置与坐标轴 ==========

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.update_view_matrix();
    }

    pub fn right(&self) -> Vector3 {
        self.right
    }

    pub fn up(&self) -> Vector3 {
        self.up
    }

    pub fn look(&self) -> Vector3 {
        self.look
    }

    // ========== 视锥体属性 ==========

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// 获取垂直 FOV（弧度）
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// 设置透视投影参数
    ///
    /// # 参数
    /// - `fov_y`: 垂直视场角（弧度）
    /// - `aspect`: 宽高比
    /// - `near_z`: 近裁剪面距离
    /// - `far_z`: 远裁剪面距离
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = near_z;
        self.far_z = far_z;
        self.proj_matrix = matrix::perspective_lh(fov_y, aspect, near_z, far_z);
    }

    /// 设置宽高比（窗口尺寸变化时调用）
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 && (self.aspect - aspect).abs() > f32::EPSILON {
            self.set_lens(self.fov_y, aspect, self.near_z, self.far_z);
        }
    }

    /// 设置相机朝向目标点
    pub fn look_at(&mut self, position: Vector3, target: Vector3, world_up: Vector3) {
        let look = (target - position).normalize();
        let right = world_up.cross(&look).normalize();
        let up = look.cross(&right);

        self.position = position;
        self.look = look;
        self.right = right;
        self.up = up;
        self.update_view_matrix();
    }

    // ========== 获取矩阵 ==========

    pub fn view_matrix(&self) -> Matrix4 {
        self.view_matrix
    }

    pub fn proj_matrix(&self) -> Matrix4 {
        self.proj_matrix
    }

    /// `proj * view`，即 DirectXMath 中的 `View * Proj`
    pub fn view_proj_matrix(&self) -> Matrix4 {
        self.proj_matrix * self.view_matrix
    }

    // ========== 相机移动 ==========

    /// 左右平移（正值向右）
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right * distance;
        self.update_view_matrix();
    }

    /// 前后移动（正值向前）
    pub fn walk(&mut self, distance: f32) {
        self.position += self.look * distance;
        self.update_view_matrix();
    }

    // ========== 相机旋转 ==========

    /// 俯仰旋转（正值向下看），结果被限制在 ±85 度内
    pub fn pitch(&mut self, angle: f32) {
        let current = (-self.look.y).clamp(-1.0, 1.0).asin();
        let target = (current + angle).clamp(-MAX_PITCH, MAX_PITCH);
        let angle = target - current;
        if angle.abs() < f32::EPSILON {
            return;
        }

        // 绕 Right 轴旋转 Up 和 Look 向量
        let axis = Unit::new_normalize(self.right);
        let rotation = Matrix4::from_axis_angle(&axis, angle);

        self.up = rotation.transform_vector(&self.up).normalize();
        self.look = rotation.transform_vector(&self.look).normalize();
        self.update_view_matrix();
    }

    /// 绕世界 Y 轴旋转（正值向右转）
    pub fn rotate_y(&mut self, angle: f32) {
        let rotation = Matrix4::from_axis_angle(&Vector3::y_axis(), angle);

        self.right = rotation.transform_vector(&self.right).normalize();
        self.up = rotation.transform_vector(&self.up).normalize();
        self.look = rotation.transform_vector(&self.look).normalize();
        self.update_view_matrix();
    }

    /// 重新正交化坐标轴并重建视图矩阵
    fn update_view_matrix(&mut self) {
        let look = self.look.normalize();
        let up = look.cross(&self.right).normalize();
        let right = up.cross(&look);

        self.right = right;
        self.up = up;
        self.look = look;

        self.view_matrix = matrix::look_to_lh(&self.position, &look, &up);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::{utils, Point3};

    #[test]
    fn test_default_basis() {
        let camera = Camera::new();
        assert!(utils::approx_eq_vec3(&camera.look(), &Vector3::z(), 1e-6));
        assert!(utils::approx_eq_vec3(&camera.right(), &Vector3::x(), 1e-6));
        assert!(utils::approx_eq_vec3(&camera.up(), &Vector3::y(), 1e-6));
    }

    #[test]
    fn test_view_moves_world_into_camera_space() {
        let mut camera = Camera::new();
        camera.set_position(Vector3::new(0.0, 0.0, -10.0));

        let p = camera.view_matrix().transform_point(&Point3::origin());
        assert!((p.z - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_y_turns_right() {
        let mut camera = Camera::new();
        camera.rotate_y(constants::HALF_PI);
        assert!(utils::approx_eq_vec3(&camera.look(), &Vector3::x(), 1e-5));
        assert!(utils::approx_eq_vec3(&camera.right(), &-Vector3::z(), 1e-5));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new();
        camera.pitch(constants::PI);
        let pitch = (-camera.look().y).asin();
        assert!((pitch - MAX_PITCH).abs() < 1e-4);
        assert!(camera.look().y < 0.0, "positive pitch looks down");

        camera.pitch(-constants::PI);
        let pitch = (-camera.look().y).asin();
        assert!((pitch + MAX_PITCH).abs() < 1e-4);
    }

    #[test]
    fn test_set_aspect_updates_projection() {
        let mut camera = Camera::new();
        let before = camera.proj_matrix();
        camera.set_aspect(2.0);
        assert!((camera.proj_matrix()[(0, 0)] - before[(0, 0)] / 2.0).abs() < 1e-6);

        // 非法宽高比（窗口最小化）被忽略
        camera.set_aspect(0.0);
        assert_eq!(camera.aspect(), 2.0);
    }

    #[test]
    fn test_from_config() {
        let config = CameraConfig {
            position: [1.0, 2.0, 3.0],
            yaw: 90.0,
            ..CameraConfig::default()
        };
        let camera = Camera::from_config(&config, 1.5);
        assert!(utils::approx_eq_vec3(&camera.position(), &Vector3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(utils::approx_eq_vec3(&camera.look(), &Vector3::x(), 1e-5));
        assert_eq!(camera.aspect(), 1.5);
    }
}

//! Transform 组件
//!
//! 管理场景物体的位置、旋转和缩放，并缓存对应的世界矩阵。

use crate::core::math::{matrix, utils, Matrix4, Quaternion, Vector3};

/// Transform 组件
///
/// 世界矩阵按 `T * R * S` 组合，旋转为欧拉角（度数），
/// 顺序为先绕 X（pitch），再绕 Y（yaw），最后绕 Z（roll）。
#[derive(Debug, Clone)]
pub struct Transform {
    /// 位置
    position: Vector3,

    /// 欧拉角（度数）
    euler_angle: Vector3,

    /// 缩放
    scale: Vector3,

    /// 世界矩阵缓存
    world_matrix: Matrix4,

    /// 世界矩阵是否需要更新
    world_dirty: bool,
}

impl Transform {
    /// 创建单位变换
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            euler_angle: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            world_matrix: Matrix4::identity(),
            world_dirty: false,
        }
    }

    /// 创建带位置的 Transform
    pub fn with_position(position: Vector3) -> Self {
        let mut transform = Self::new();
        transform.set_position(position);
        transform
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn euler_angle(&self) -> Vector3 {
        self.euler_angle
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    /// 设置位置
    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.world_dirty = true;
    }

    /// 设置欧拉角（度数）
    pub fn set_euler_angle(&mut self, euler: Vector3) {
        self.euler_angle = euler;
        self.world_dirty = true;
    }

    /// 设置缩放
    pub fn set_scale(&mut self, scale: Vector3) {
        self.scale = scale;
        self.world_dirty = true;
    }

    /// 添加位置偏移
    pub fn add_position(&mut self, offset: Vector3) {
        self.position += offset;
        self.world_dirty = true;
    }

    /// 添加旋转偏移（度数）
    pub fn add_euler_angle(&mut self, offset: Vector3) {
        self.euler_angle += offset;
        self.world_dirty = true;
    }

    /// 获取旋转对应的四元数
    pub fn quaternion(&self) -> Quaternion {
        let pitch = utils::deg_to_rad(self.euler_angle.x);
        let yaw = utils::deg_to_rad(self.euler_angle.y);
        let roll = utils::deg_to_rad(self.euler_angle.z);
        Quaternion::from_axis_angle(&Vector3::z_axis(), roll)
            * Quaternion::from_axis_angle(&Vector3::y_axis(), yaw)
            * Quaternion::from_axis_angle(&Vector3::x_axis(), pitch)
    }

    /// 获取世界矩阵
    pub fn world_matrix(&mut self) -> Matrix4 {
        if self.world_dirty {
            self.update_world_matrix();
        }
        self.world_matrix
    }

    /// 不修改缓存地计算世界矩阵
    pub fn compute_world_matrix(&self) -> Matrix4 {
        if !self.world_dirty {
            return self.world_matrix;
        }
        let rotation = self.quaternion().to_homogeneous();
        let scale = matrix::scaling(self.scale.x, self.scale.y, self.scale.z);
        Matrix4::new_translation(&self.position) * rotation * scale
    }

    fn update_world_matrix(&mut self) {
        self.world_matrix = self.compute_world_matrix();
        self.world_dirty = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Point3;

    #[test]
    fn test_identity_by_default() {
        let mut transform = Transform::new();
        assert_eq!(transform.world_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let mut transform = Transform::with_position(Vector3::new(0.0, 0.0, 5.0));
        transform.set_scale(Vector3::new(2.0, 2.0, 2.0));
        transform.set_euler_angle(Vector3::new(0.0, 90.0, 0.0));

        let p = transform.world_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        // (1,0,0) 缩放为 (2,0,0)，绕 Y 旋转 90 度到 (0,0,-2)，再平移
        assert!((p.x - 0.0).abs() < 1e-5);
        assert!((p.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_cached_matches_computed() {
        let mut transform = Transform::new();
        transform.add_position(Vector3::new(1.0, 2.0, 3.0));
        transform.add_euler_angle(Vector3::new(10.0, 20.0, 30.0));
        let computed = transform.compute_world_matrix();
        assert_eq!(transform.world_matrix(), computed);
    }
}

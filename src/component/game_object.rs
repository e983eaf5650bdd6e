//! GameObject 场景物体
//!
//! 一个物体拥有一个模型和一个世界矩阵，绘制时把模型的每个部分
//! 交给 [`BasicEffect`] 渲染。

use std::sync::Arc;

use crate::component::Transform;
use crate::core::math::{matrix, Matrix4, Vector3};
use crate::geometry::BoundingBox;
use crate::renderer::effect::BasicEffect;
use crate::renderer::model::Model;

/// 场景物体
pub struct GameObject {
    /// 物体名称（仅用于日志）
    name: String,

    /// 是否参与绘制
    pub enabled: bool,

    model: Arc<Model>,
    world_matrix: Matrix4,
}

impl GameObject {
    /// 创建空物体：没有模型，世界矩阵为单位矩阵
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            model: Arc::new(Model::default()),
            world_matrix: Matrix4::identity(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 世界空间位置（世界矩阵的平移分量）
    pub fn position(&self) -> Vector3 {
        matrix::translation_of(&self.world_matrix)
    }

    /// 模型空间包围盒
    pub fn local_bounding_box(&self) -> BoundingBox {
        self.model.bounding_box
    }

    /// 世界空间包围盒
    pub fn bounding_box(&self) -> BoundingBox {
        self.model.bounding_box.transform(&self.world_matrix)
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// 设置模型（取得所有权）
    pub fn set_model(&mut self, model: Model) {
        self.model = Arc::new(model);
    }

    /// 设置共享模型，多个物体可以复用同一份 GPU 资源
    pub fn set_model_shared(&mut self, model: Arc<Model>) {
        self.model = model;
    }

    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, world: &Matrix4) {
        self.world_matrix = *world;
    }

    /// 用变换组件计算世界矩阵
    pub fn set_transform(&mut self, transform: &Transform) {
        self.world_matrix = transform.compute_world_matrix();
    }

    /// 需要的物体常量槽数（每个模型部分一个）
    pub fn part_count(&self) -> usize {
        if self.enabled {
            self.model.parts.len()
        } else {
            0
        }
    }

    /// 绘制模型的所有部分
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, effect: &'a BasicEffect) {
        if !self.enabled {
            return;
        }

        for part in &self.model.parts {
            pass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
            pass.set_index_buffer(part.index_buffer.slice(..), part.index_format);

            effect.set_material(&part.material);
            effect.set_texture(&part.texture);
            effect.set_world_matrix(&self.world_matrix);

            if effect.apply(pass) {
                pass.draw_indexed(0..part.index_count, 0, 0..1);
            }
        }
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new("GameObject")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_object() {
        let object = GameObject::new("sphere");
        assert_eq!(object.name(), "sphere");
        assert!(object.enabled);
        assert_eq!(object.world_matrix(), &Matrix4::identity());
        assert_eq!(object.position(), Vector3::zeros());
        assert!(object.model().parts.is_empty());
    }

    #[test]
    fn test_position_from_world_matrix() {
        let mut object = GameObject::default();
        object.set_world_matrix(&(matrix::translation(1.0, 2.0, 3.0) * matrix::rotation_y(0.5)));
        assert_eq!(object.position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_bounding_box_follows_world_matrix() {
        let mut model = Model::default();
        model.bounding_box = BoundingBox::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let mut object = GameObject::default();
        object.set_model(model);
        object.set_world_matrix(&(matrix::translation(10.0, 0.0, 0.0) * matrix::scaling(2.0, 1.0, 1.0)));

        assert_eq!(object.local_bounding_box().max, Vector3::new(1.0, 1.0, 1.0));
        let world = object.bounding_box();
        assert!((world.min - Vector3::new(8.0, -1.0, -1.0)).norm() < 1e-5);
        assert!((world.max - Vector3::new(12.0, 1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_shared_model() {
        let model = Arc::new(Model::default());
        let mut a = GameObject::default();
        let mut b = GameObject::default();
        a.set_model_shared(Arc::clone(&model));
        b.set_model_shared(Arc::clone(&model));
        assert!(Arc::ptr_eq(a.model(), b.model()));
        assert_eq!(Arc::strong_count(&model), 3);
    }

    #[test]
    fn test_set_transform() {
        let mut transform = Transform::new();
        transform.set_position(Vector3::new(0.0, -2.0, 0.0));
        let mut object = GameObject::default();
        object.set_transform(&transform);
        assert_eq!(object.position(), Vector3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_disabled_object_needs_no_slots() {
        let mut object = GameObject::default();
        object.enabled = false;
        assert_eq!(object.part_count(), 0);
    }
}

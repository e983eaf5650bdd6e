//! 光照组件模块
//!
//! 方向光（平行光）以及它在 uniform 缓冲区中的 GPU 布局。

use bytemuck::{Pod, Zeroable};
use crate::core::math::{Vector3, Vector4};

/// 方向光
///
/// 模拟太阳光等远距离光源，所有光线平行。`direction` 为光线行进方向。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub ambient: Vector4,
    pub diffuse: Vector4,
    pub specular: Vector4,
    pub direction: Vector3,
}

/// 方向光的 GPU 布局（16 字节对齐）
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightGpu {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub direction: [f32; 3],
    pub _pad: f32,
}

impl DirectionalLight {
    /// 打包为 GPU 布局，方向会被归一化
    pub fn to_gpu(&self) -> DirectionalLightGpu {
        let direction = self
            .direction
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::y());
        DirectionalLightGpu {
            ambient: self.ambient.into(),
            diffuse: self.diffuse.into(),
            specular: self.specular.into(),
            direction: direction.into(),
            _pad: 0.0,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: Vector4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vector4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vector4::new(0.5, 0.5, 0.5, 1.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
        }
    }
}

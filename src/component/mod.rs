//! 组件模块
//!
//! 场景中的物体、摄像机、光源以及描述物体位姿的变换。

pub mod camera;
pub mod game_object;
pub mod light;
pub mod transform;

pub use camera::Camera;
pub use game_object::GameObject;
pub use light::{DirectionalLight, DirectionalLightGpu};
pub use transform::Transform;

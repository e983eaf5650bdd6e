//! 场景配置模块
//!
//! 定义场景配置，包括相机、天空盒、光源和场景物体。
//!
//! # 配置文件格式 (scene.toml)
//!
//! ```toml
//! reflection = true
//!
//! [camera]
//! position = [0.0, 0.0, -10.0]
//! fov = 90.0
//!
//! [sky]
//! source = { type = "single", path = "assets/textures/daylight.jpg" }
//! radius = 5000.0
//!
//! [[lights]]
//! direction = [0.0, -1.0, 1.0]
//!
//! [[objects]]
//! name = "ball"
//! mesh = { type = "sphere", radius = 1.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::fs;
use crate::component::light::DirectionalLight;
use crate::component::transform::Transform;
use crate::core::error::{Result, SkyRenderError, ConfigError};
use crate::core::math::{Color, Vector3, Vector4};
use crate::renderer::model::Material;

/// 3D 变换数据
///
/// 包含位置、旋转和缩放信息。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// 位置 (x, y, z)
    #[serde(default = "default_position")]
    pub position: [f32; 3],

    /// 旋转（欧拉角，度数）(pitch, yaw, roll)
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 3],

    /// 缩放 (x, y, z)
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

fn default_position() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn default_rotation() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: default_rotation(),
            scale: default_scale(),
        }
    }
}

impl TransformConfig {
    /// 转换为运行时的 Transform
    pub fn to_transform(&self) -> Transform {
        let mut transform = Transform::default();
        transform.set_position(Vector3::from(self.position));
        transform.set_euler_angle(Vector3::from(self.rotation));
        transform.set_scale(Vector3::from(self.scale));
        transform
    }
}

/// 相机配置
///
/// 左手坐标系，yaw = 0、pitch = 0 时朝向 +Z。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 相机位置
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],

    /// 绕 Y 轴的偏航角（度数）
    #[serde(default)]
    pub yaw: f32,

    /// 俯仰角（度数，正值向下看）
    #[serde(default)]
    pub pitch: f32,

    /// 视野角度（Field of View，度数）
    #[serde(default = "default_fov")]
    pub fov: f32,

    /// 近裁剪面距离
    #[serde(default = "default_near_clip")]
    pub near_clip: f32,

    /// 远裁剪面距离
    #[serde(default = "default_far_clip")]
    pub far_clip: f32,

    /// 移动速度（单位/秒）
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,

    /// 鼠标灵敏度（度/像素）
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f32,
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 0.0, -10.0]
}

fn default_fov() -> f32 {
    90.0
}

fn default_near_clip() -> f32 {
    0.5
}

fn default_far_clip() -> f32 {
    1000.0
}

fn default_move_speed() -> f32 {
    6.0
}

fn default_mouse_sensitivity() -> f32 {
    0.2
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            yaw: 0.0,
            pitch: 0.0,
            fov: default_fov(),
            near_clip: default_near_clip(),
            far_clip: default_far_clip(),
            move_speed: default_move_speed(),
            mouse_sensitivity: default_mouse_sensitivity(),
        }
    }
}

/// 天空盒贴图来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SkySource {
    /// 单个文件：`.dds` 立方体贴图或水平十字布局的普通图片
    Single { path: String },

    /// 六张图片，顺序为 +X, -X, +Y, -Y, +Z, -Z
    Faces { paths: Vec<String> },
}

impl Default for SkySource {
    fn default() -> Self {
        SkySource::Single {
            path: "assets/textures/daylight.jpg".to_string(),
        }
    }
}

/// 天空盒配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyConfig {
    #[serde(default)]
    pub source: SkySource,

    /// 天空球半径
    #[serde(default = "default_sky_radius")]
    pub radius: f32,

    /// 是否在 CPU 上生成 mipmap（DDS 使用文件自带的 mip 链）
    #[serde(default = "default_generate_mips")]
    pub generate_mips: bool,
}

fn default_sky_radius() -> f32 {
    5000.0
}

fn default_generate_mips() -> bool {
    true
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            source: SkySource::default(),
            radius: default_sky_radius(),
            generate_mips: default_generate_mips(),
        }
    }
}

/// 方向光配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_ambient")]
    pub ambient: [f32; 4],

    #[serde(default = "default_light_diffuse")]
    pub diffuse: [f32; 4],

    #[serde(default = "default_light_specular")]
    pub specular: [f32; 4],

    /// 光线方向（从光源指向场景）
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
}

fn default_light_ambient() -> [f32; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

fn default_light_diffuse() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

fn default_light_specular() -> [f32; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

fn default_light_direction() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient: default_light_ambient(),
            diffuse: default_light_diffuse(),
            specular: default_light_specular(),
            direction: default_light_direction(),
        }
    }
}

impl LightConfig {
    pub fn to_light(&self) -> DirectionalLight {
        DirectionalLight {
            ambient: Vector4::from(self.ambient),
            diffuse: Vector4::from(self.diffuse),
            specular: Vector4::from(self.specular),
            direction: Vector3::from(self.direction),
        }
    }
}

/// 网格来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeshSource {
    /// OBJ 模型文件
    Obj { path: String },

    /// 程序生成的球体
    Sphere {
        #[serde(default = "default_unit")]
        radius: f32,
    },

    /// 程序生成的立方体
    Box {
        #[serde(default = "default_unit")]
        width: f32,
        #[serde(default = "default_unit")]
        height: f32,
        #[serde(default = "default_unit")]
        depth: f32,
    },

    /// 朝向 +Y 的平面
    Plane {
        #[serde(default = "default_plane_size")]
        width: f32,
        #[serde(default = "default_plane_size")]
        depth: f32,
        #[serde(default = "default_unit")]
        tex_u: f32,
        #[serde(default = "default_unit")]
        tex_v: f32,
    },
}

fn default_unit() -> f32 {
    1.0
}

fn default_plane_size() -> f32 {
    10.0
}

/// 材质配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialConfig {
    #[serde(default = "default_material_ambient")]
    pub ambient: [f32; 4],

    #[serde(default = "default_material_diffuse")]
    pub diffuse: [f32; 4],

    /// 镜面反射颜色，w 分量为高光指数
    #[serde(default = "default_material_specular")]
    pub specular: [f32; 4],

    /// 环境反射强度
    #[serde(default = "default_material_reflect")]
    pub reflect: [f32; 4],
}

fn default_material_ambient() -> [f32; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

fn default_material_diffuse() -> [f32; 4] {
    [0.6, 0.6, 0.6, 1.0]
}

fn default_material_specular() -> [f32; 4] {
    [0.2, 0.2, 0.2, 16.0]
}

fn default_material_reflect() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            ambient: default_material_ambient(),
            diffuse: default_material_diffuse(),
            specular: default_material_specular(),
            reflect: default_material_reflect(),
        }
    }
}

impl MaterialConfig {
    pub fn to_material(&self) -> Material {
        Material {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            reflect: self.reflect,
        }
    }
}

/// 场景物体配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// 物体名称（仅用于日志）
    #[serde(default = "default_object_name")]
    pub name: String,

    /// 网格来源
    pub mesh: MeshSource,

    /// 漫反射贴图，缺省时使用 1x1 白色纹理
    #[serde(default)]
    pub texture: Option<String>,

    #[serde(default)]
    pub material: MaterialConfig,

    #[serde(default)]
    pub transform: TransformConfig,
}

fn default_object_name() -> String {
    "object".to_string()
}

/// 场景配置
///
/// 包含场景中的所有元素配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 相机配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 天空盒配置
    #[serde(default)]
    pub sky: SkyConfig,

    /// 方向光列表
    #[serde(default = "default_lights")]
    pub lights: Vec<LightConfig>,

    /// 物体是否反射天空盒
    #[serde(default = "default_reflection")]
    pub reflection: bool,

    /// 清屏颜色
    #[serde(default = "default_clear_color")]
    pub clear_color: Color,

    /// 场景物体
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectConfig>,
}

fn default_lights() -> Vec<LightConfig> {
    vec![LightConfig::default()]
}

fn default_reflection() -> bool {
    true
}

fn default_clear_color() -> Color {
    Color::BLACK
}

fn default_objects() -> Vec<ObjectConfig> {
    vec![
        ObjectConfig {
            name: "sphere".to_string(),
            mesh: MeshSource::Sphere { radius: 1.0 },
            texture: None,
            material: MaterialConfig::default(),
            transform: TransformConfig::default(),
        },
        ObjectConfig {
            name: "ground".to_string(),
            mesh: MeshSource::Plane {
                width: 20.0,
                depth: 20.0,
                tex_u: 5.0,
                tex_v: 5.0,
            },
            texture: None,
            material: MaterialConfig {
                reflect: [0.0, 0.0, 0.0, 0.0],
                ..MaterialConfig::default()
            },
            transform: TransformConfig {
                position: [0.0, -2.0, 0.0],
                ..TransformConfig::default()
            },
        },
    ]
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            sky: SkyConfig::default(),
            lights: default_lights(),
            reflection: default_reflection(),
            clear_color: default_clear_color(),
            objects: default_objects(),
        }
    }
}

impl SceneConfig {
    /// 从文件加载场景配置
    ///
    /// # 参数
    ///
    /// - `path`: 配置文件路径
    ///
    /// # 返回
    ///
    /// - `Ok(SceneConfig)`: 加载成功
    /// - `Err(SkyRenderError)`: 加载失败
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| SkyRenderError::Config(ConfigError::FileNotFound(format!(
                "Failed to read scene config file '{}': {}",
                path.display(),
                e
            ))))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 文本解析并检查
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scene: SceneConfig = toml::from_str(contents)
            .map_err(|e| SkyRenderError::Config(ConfigError::ParseError(format!(
                "Failed to parse scene config: {}",
                e
            ))))?;
        scene.validate()?;
        Ok(scene)
    }

    /// 从文件加载，如果文件不存在或无效则返回默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("Loaded scene config from: {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load scene config: {}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::info!("Scene config not found, using defaults");
            Self::default()
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SkyRenderError::Config(ConfigError::ParseError(format!(
                "Failed to serialize scene config: {}",
                e
            ))))?;

        fs::write(path, contents)?;

        tracing::info!("Saved scene config to: {}", path.display());
        Ok(())
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: &str| -> SkyRenderError {
            ConfigError::InvalidValue {
                field: field.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if self.sky.radius <= 0.0 {
            return Err(invalid("sky.radius", "Sky radius must be positive"));
        }
        if let SkySource::Faces { paths } = &self.sky.source {
            if paths.len() != 6 {
                return Err(invalid("sky.source.paths", "Exactly 6 face images are required"));
            }
        }
        let camera = &self.camera;
        if camera.near_clip <= 0.0 || camera.far_clip <= camera.near_clip {
            return Err(invalid("camera.near_clip/far_clip", "Expected 0 < near_clip < far_clip"));
        }
        if camera.fov <= 0.0 || camera.fov >= 180.0 {
            return Err(invalid("camera.fov", "Field of view must be in (0, 180) degrees"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transform() {
        let transform = TransformConfig::default();
        assert_eq!(transform.position, [0.0, 0.0, 0.0]);
        assert_eq!(transform.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(transform.scale, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_transform_to_matrix() {
        let transform = TransformConfig {
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        };
        let matrix = transform.to_transform().world_matrix();

        // 检查平移部分
        assert!((matrix[(0, 3)] - 1.0).abs() < 0.001);
        assert!((matrix[(1, 3)] - 2.0).abs() < 0.001);
        assert!((matrix[(2, 3)] - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_default_scene() {
        let scene = SceneConfig::default();
        assert_eq!(scene.camera.fov, 90.0);
        assert_eq!(scene.lights.len(), 1);
        assert!(scene.reflection);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_parse_sky_sources() {
        let scene = SceneConfig::from_toml_str(
            r#"
            [sky]
            source = { type = "faces", paths = ["a", "b", "c", "d", "e", "f"] }
            generate_mips = false
            "#,
        )
        .unwrap();

        assert!(matches!(scene.sky.source, SkySource::Faces { ref paths } if paths.len() == 6));
        assert!(!scene.sky.generate_mips);
        assert_eq!(scene.sky.radius, 5000.0);
    }

    #[test]
    fn test_wrong_face_count_rejected() {
        let result = SceneConfig::from_toml_str(
            r#"
            [sky]
            source = { type = "faces", paths = ["a", "b"] }
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_objects() {
        let scene = SceneConfig::from_toml_str(
            r#"
            [[objects]]
            name = "house"
            mesh = { type = "obj", path = "assets/models/house.obj" }
            texture = "assets/textures/house.png"

            [[objects]]
            mesh = { type = "box", width = 2.0 }
            transform = { position = [1.0, 0.0, 0.0] }
            "#,
        )
        .unwrap();

        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[0].name, "house");
        assert_eq!(
            scene.objects[1].mesh,
            MeshSource::Box { width: 2.0, height: 1.0, depth: 1.0 }
        );
        assert_eq!(scene.objects[1].transform.position, [1.0, 0.0, 0.0]);
        assert_eq!(scene.objects[1].name, "object");
    }

    #[test]
    fn test_invalid_clip_planes() {
        let mut scene = SceneConfig::default();
        scene.camera.far_clip = 0.1;
        assert!(scene.validate().is_err());
    }
}

/// OBJ 文件加载器
///
/// 使用 tobj crate 加载 Wavefront OBJ 格式的3D模型。
/// OBJ 约定为右手坐标系、逆时针正面，加载时翻转 Z 并交换绕序，
/// 得到左手坐标系下顺时针为正面的网格。
use super::MeshLoader;
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::{MeshData, Subset};
use crate::geometry::vertex::Vertex;
use crate::geometry::math_utils::{reconstruct_normals, compute_tangent_space, smooth_normals_by_position};
use std::io::BufReader;
use std::path::Path;

/// OBJ 格式加载器
///
/// # 特性
///
/// - 自动三角化、单一索引
/// - UV 坐标翻转（V轴：1.0 - v）
/// - 右手到左手坐标系转换
/// - 自动重建缺失的法线，并做 seam 平滑
/// - 自动计算切线空间
///
/// # 使用示例
///
/// ```rust,no_run
/// use sky_render::geometry::loaders::{MeshLoader, ObjLoader};
/// use std::path::Path;
///
/// let mesh = ObjLoader::load_from_file(Path::new("model.obj"))?;
/// println!("加载了 {} 个顶点", mesh.vertex_count());
/// # Ok::<(), sky_render::core::SkyRenderError>(())
/// ```
pub struct ObjLoader;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

impl ObjLoader {
    /// 把 tobj 的模型列表转换为 `MeshData`
    fn build_mesh(name: &str, models: &[tobj::Model]) -> Result<MeshData> {
        if models.is_empty() {
            return Err(MeshLoadError::ValidationError("OBJ 文件不包含任何模型".to_string()).into());
        }

        let mut mesh_data = MeshData::with_name(name);
        let mut has_normals = false;
        let mut has_texcoords = false;

        // 每个非空的 OBJ 对象对应一个子网格
        for model in models {
            let mesh = &model.mesh;
            if mesh.indices.is_empty() {
                tracing::debug!(object = %model.name, "Skipping OBJ object without faces");
                continue;
            }
            let subset_id = mesh_data.subsets.len() as u32;
            let positions = &mesh.positions;
            let normals = &mesh.normals;
            let texcoords = &mesh.texcoords;

            if positions.len() % 3 != 0 {
                return Err(MeshLoadError::InvalidGeometry(
                    format!("顶点位置数据不完整: {} 个浮点数", positions.len())
                ).into());
            }

            let vertex_start = mesh_data.vertices.len() as u32;
            let face_start = mesh_data.triangle_count() as u32;
            let vertex_count = positions.len() / 3;

            has_normals |= !normals.is_empty();
            has_texcoords |= !texcoords.is_empty();

            for i in 0..vertex_count {
                let position = [positions[i * 3], positions[i * 3 + 1], -positions[i * 3 + 2]];

                let normal = if normals.len() >= (i + 1) * 3 {
                    [normals[i * 3], normals[i * 3 + 1], -normals[i * 3 + 2]]
                } else {
                    [0.0, 0.0, 0.0]
                };

                let texcoord = if texcoords.len() >= (i + 1) * 2 {
                    [texcoords[i * 2], 1.0 - texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };

                mesh_data.vertices.push(Vertex::new(position, normal, texcoord, [0.0; 3]));
            }

            // 镜像 Z 之后交换第 2、3 个索引保持正面朝外
            for triangle in mesh.indices.chunks_exact(3) {
                mesh_data.indices.extend_from_slice(&[
                    vertex_start + triangle[0],
                    vertex_start + triangle[2],
                    vertex_start + triangle[1],
                ]);
            }

            mesh_data.subsets.push(Subset::new(
                subset_id,
                vertex_start,
                vertex_count as u32,
                face_start,
                (mesh.indices.len() / 3) as u32,
            ));
        }

        if mesh_data.indices.is_empty() {
            return Err(MeshLoadError::ValidationError("OBJ 文件不包含任何三角形".to_string()).into());
        }

        if !has_normals {
            tracing::info!("OBJ 文件缺少法线数据，正在重建...");
            reconstruct_normals(&mut mesh_data.vertices, &mesh_data.indices);
        }

        smooth_normals_by_position(&mut mesh_data.vertices, 1e-5);

        if has_texcoords {
            compute_tangent_space(&mut mesh_data.vertices, &mesh_data.indices);
        } else {
            tracing::warn!("OBJ 文件缺少UV坐标，跳过切线空间计算");
        }

        mesh_data.validate().map_err(MeshLoadError::ValidationError)?;

        tracing::info!(
            vertices = mesh_data.vertex_count(),
            triangles = mesh_data.triangle_count(),
            subsets = mesh_data.subsets.len(),
            "Loaded OBJ mesh '{}'",
            name
        );

        Ok(mesh_data)
    }
}

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<MeshData> {
        if !path.exists() {
            return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
        }

        let (models, _materials) = tobj::load_obj(path, &load_options())
            .map_err(|e| MeshLoadError::ParseError(format!("tobj 解析失败: {}", e)))?;

        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Unnamed");
        Self::build_mesh(name, &models)
    }

    /// 从内存加载；`mtllib` 引用被忽略
    fn load_from_memory(data: &[u8]) -> Result<MeshData> {
        let mut reader = BufReader::new(data);
        let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
            Ok(Default::default())
        })
        .map_err(|e| MeshLoadError::ParseError(format!("tobj 解析失败: {}", e)))?;

        Self::build_mesh("memory", &models)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 0.0 -1.0
v 0.0 0.0 -1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ObjLoader::supported_extensions(), &["obj"]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ObjLoader::load_from_file(Path::new("nonexistent.obj"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_quad_from_memory() {
        let mesh = ObjLoader::load_from_memory(QUAD.as_bytes()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.subsets.len(), 1);

        // Z 被镜像
        assert!(mesh.vertices.iter().any(|v| v.position == [1.0, 0.0, 1.0]));

        // 右手坐标系中朝上的面在转换后依旧朝上
        for v in &mesh.vertices {
            assert!((v.normal[1] - 1.0).abs() < 1e-5, "{:?}", v.normal);
        }

        // V 轴翻转
        assert!(mesh.vertices.iter().any(|v| v.texcoord == [0.0, 1.0]));
    }

    #[test]
    fn test_empty_obj_rejected() {
        let result = ObjLoader::load_from_memory(b"# nothing here\n");
        assert!(matches!(
            result,
            Err(crate::core::SkyRenderError::MeshLoading(MeshLoadError::ValidationError(_)))
        ));

        // 只有顶点没有面
        let result = ObjLoader::load_from_memory(b"v 0 0 0\nv 1 0 0\nv 0 1 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_faceless_objects_skipped() {
        let source = format!("o empty\n{}", QUAD);
        let mesh = ObjLoader::load_from_memory(source.as_bytes()).unwrap();

        assert_eq!(mesh.subsets.len(), 1);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.subsets[0].id, 0);
    }
}

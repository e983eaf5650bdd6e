//! 程序生成的基本几何体
//!
//! 所有几何体都以左手坐标系生成，三角形从外侧看为顺时针，
//! 与 `FrontFace::Cw` + 背面剔除的管线配合使用。天空球关闭剔除，
//! 因此从球内部观察同一个网格也能正常绘制。

use crate::core::math::constants::{PI, TAU};
use crate::geometry::mesh::MeshData;
use crate::geometry::vertex::Vertex;

/// 球体默认的纬线层数
pub const DEFAULT_SPHERE_LEVELS: u32 = 20;

/// 球体默认的经线切片数
pub const DEFAULT_SPHERE_SLICES: u32 = 20;

/// 以默认细分生成球体
pub fn create_sphere(radius: f32) -> MeshData {
    create_sphere_with(radius, DEFAULT_SPHERE_LEVELS, DEFAULT_SPHERE_SLICES)
}

/// 生成 UV 球体
///
/// 顶点布局：北极点，`levels - 1` 圈纬线（每圈 `slices + 1` 个顶点，
/// 首尾位置相同、u 不同），南极点。
///
/// - 顶点数：`2 + (levels - 1) * (slices + 1)`
/// - 索引数：`6 * (levels - 1) * slices`
///
/// `levels < 2` 按 2 处理，`slices < 3` 按 3 处理。
pub fn create_sphere_with(radius: f32, levels: u32, slices: u32) -> MeshData {
    let levels = levels.max(2);
    let slices = slices.max(3);

    let ring = slices + 1;
    let vertex_count = 2 + (levels - 1) * ring;
    let index_count = 6 * (levels - 1) * slices;
    let mut mesh = MeshData::with_capacity(vertex_count as usize, index_count as usize);
    mesh.name = Some("sphere".to_string());

    let per_phi = PI / levels as f32;
    let per_theta = TAU / slices as f32;

    mesh.vertices.push(Vertex::new(
        [0.0, radius, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0],
        [1.0, 0.0, 0.0],
    ));

    for i in 1..levels {
        let phi = per_phi * i as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for j in 0..=slices {
            let theta = per_theta * j as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            mesh.vertices.push(Vertex::new(
                [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                [theta / TAU, phi / PI],
                [-sin_theta, 0.0, cos_theta],
            ));
        }
    }

    mesh.vertices.push(Vertex::new(
        [0.0, -radius, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 1.0],
        [-1.0, 0.0, 0.0],
    ));

    // 北极帽
    for j in 1..=slices {
        mesh.indices.extend_from_slice(&[0, j % ring + 1, j]);
    }

    // 中间的四边形带
    for i in 1..levels - 1 {
        let upper = (i - 1) * ring;
        let lower = i * ring;
        for j in 1..=slices {
            mesh.indices.extend_from_slice(&[
                upper + j,
                upper + j % ring + 1,
                lower + j % ring + 1,
                lower + j % ring + 1,
                lower + j,
                upper + j,
            ]);
        }
    }

    // 南极帽
    let last_ring = (levels - 2) * ring;
    let south = vertex_count - 1;
    for j in 1..=slices {
        mesh.indices.extend_from_slice(&[last_ring + j, last_ring + j % ring + 1, south]);
    }

    mesh
}

/// 生成以原点为中心的长方体（每个面 4 个独立顶点）
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let (w, h, d) = (width * 0.5, height * 0.5, depth * 0.5);

    // (法线, 切线, 按 uv (0,1) (0,0) (1,0) (1,1) 排列的角点)
    #[rustfmt::skip]
    let faces: [([f32; 3], [f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0],
         [[w, -h, -d], [w, h, -d], [w, h, d], [w, -h, d]]),
        // -X
        ([-1.0, 0.0, 0.0], [0.0, 0.0, -1.0],
         [[-w, -h, d], [-w, h, d], [-w, h, -d], [-w, -h, -d]]),
        // +Y
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0],
         [[-w, h, -d], [-w, h, d], [w, h, d], [w, h, -d]]),
        // -Y
        ([0.0, -1.0, 0.0], [-1.0, 0.0, 0.0],
         [[w, -h, -d], [w, -h, d], [-w, -h, d], [-w, -h, -d]]),
        // +Z
        ([0.0, 0.0, 1.0], [-1.0, 0.0, 0.0],
         [[w, -h, d], [w, h, d], [-w, h, d], [-w, -h, d]]),
        // -Z
        ([0.0, 0.0, -1.0], [1.0, 0.0, 0.0],
         [[-w, -h, -d], [-w, h, -d], [w, h, -d], [w, -h, -d]]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let mut mesh = MeshData::with_capacity(24, 36);
    mesh.name = Some("box".to_string());

    for (face, (normal, tangent, corners)) in faces.iter().enumerate() {
        for (corner, uv) in corners.iter().zip(UVS) {
            mesh.vertices.push(Vertex::new(*corner, *normal, uv, *tangent));
        }
        let base = face as u32 * 4;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    mesh
}

/// 生成位于 XZ 平面、朝向 +Y 的矩形
///
/// `tex_u`、`tex_v` 为纹理重复次数，配合 Repeat 寻址模式使用。
pub fn create_plane(width: f32, depth: f32, tex_u: f32, tex_v: f32) -> MeshData {
    let (w, d) = (width * 0.5, depth * 0.5);
    let normal = [0.0, 1.0, 0.0];
    let tangent = [1.0, 0.0, 0.0];

    let mut mesh = MeshData::with_capacity(4, 6);
    mesh.name = Some("plane".to_string());
    mesh.vertices.extend_from_slice(&[
        Vertex::new([-w, 0.0, -d], normal, [0.0, tex_v], tangent),
        Vertex::new([-w, 0.0, d], normal, [0.0, 0.0], tangent),
        Vertex::new([w, 0.0, d], normal, [tex_u, 0.0], tangent),
        Vertex::new([w, 0.0, -d], normal, [tex_u, tex_v], tangent),
    ]);
    mesh.indices.extend_from_slice(&[0, 1, 2, 2, 3, 0]);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector3;

    /// 每个三角形的几何法线都应与面中心方向同向（凸体外侧为正面）
    fn assert_faces_point_outward(mesh: &MeshData) {
        for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
            let p: Vec<Vector3> = tri
                .iter()
                .map(|&i| Vector3::from(mesh.vertices[i as usize].position))
                .collect();
            let normal = (p[1] - p[0]).cross(&(p[2] - p[0]));
            let centroid = (p[0] + p[1] + p[2]) / 3.0;
            assert!(normal.dot(&centroid) > 0.0, "triangle {} faces inward: {:?}", t, tri);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = create_sphere(1.0);
        assert_eq!(mesh.vertex_count(), 2 + 19 * 21);
        assert_eq!(mesh.index_count(), 6 * 19 * 20);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_sphere_custom_counts() {
        let mesh = create_sphere_with(2.0, 5, 7);
        assert_eq!(mesh.vertex_count(), 2 + 4 * 8);
        assert_eq!(mesh.index_count(), 6 * 4 * 7);
    }

    #[test]
    fn test_sphere_clamps_degenerate_subdivision() {
        let mesh = create_sphere_with(1.0, 0, 1);
        assert_eq!(mesh.vertex_count(), 2 + 4);
        assert_eq!(mesh.index_count(), 6 * 3);
        assert!(mesh.validate().is_ok());
        assert_faces_point_outward(&mesh);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let radius = 3.5;
        let mesh = create_sphere(radius);
        for v in &mesh.vertices {
            let len = Vector3::from(v.position).norm();
            assert!((len - radius).abs() < 1e-4);
        }
        assert_eq!(mesh.vertices[0].position, [0.0, radius, 0.0]);
        assert_eq!(mesh.vertices.last().map(|v| v.position), Some([0.0, -radius, 0.0]));
    }

    #[test]
    fn test_sphere_ring_seam_and_uv() {
        let mesh = create_sphere_with(1.0, 4, 8);
        // 第一圈：索引 1..=9，首尾位置一致，u 分别为 0 和 1
        let first = &mesh.vertices[1];
        let last = &mesh.vertices[9];
        for k in 0..3 {
            assert!((first.position[k] - last.position[k]).abs() < 1e-5);
        }
        assert_eq!(first.texcoord[0], 0.0);
        assert!((last.texcoord[0] - 1.0).abs() < 1e-6);
        assert!((first.texcoord[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_winding() {
        assert_faces_point_outward(&create_sphere(1.0));
    }

    #[test]
    fn test_sphere_fits_u16() {
        assert!(create_sphere(5000.0).indices_u16().is_ok());
    }

    #[test]
    fn test_box() {
        let mesh = create_box(2.0, 4.0, 6.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_faces_point_outward(&mesh);

        let bounds = mesh.bounding_box();
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_normals_match_faces() {
        let mesh = create_box(1.0, 1.0, 1.0);
        for tri in mesh.indices.chunks_exact(3) {
            let p: Vec<Vector3> = tri
                .iter()
                .map(|&i| Vector3::from(mesh.vertices[i as usize].position))
                .collect();
            let geometric = (p[1] - p[0]).cross(&(p[2] - p[0])).normalize();
            let stored = Vector3::from(mesh.vertices[tri[0] as usize].normal);
            assert!((geometric - stored).norm() < 1e-5);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = create_plane(10.0, 20.0, 5.0, 4.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);

        for tri in mesh.indices.chunks_exact(3) {
            let p: Vec<Vector3> = tri
                .iter()
                .map(|&i| Vector3::from(mesh.vertices[i as usize].position))
                .collect();
            assert!((p[1] - p[0]).cross(&(p[2] - p[0])).y > 0.0);
        }

        let max_uv = mesh
            .vertices
            .iter()
            .fold([0.0f32; 2], |acc, v| [acc[0].max(v.texcoord[0]), acc[1].max(v.texcoord[1])]);
        assert_eq!(max_uv, [5.0, 4.0]);
    }
}

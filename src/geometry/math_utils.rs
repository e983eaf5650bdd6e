//! 几何数学工具模块
//!
//! 网格后处理：法线重建、按位置平滑法线、切线空间计算。
//!
//! 三角形按左手坐标系顺时针为正面，`cross(p1 - p0, p2 - p0)` 指向外侧。

use std::collections::HashMap;

use crate::core::math::Vector3;
use crate::geometry::vertex::Vertex;

/// 从三角形面重建顶点法线
///
/// 面法线（未归一化，即按面积加权）累加到三个顶点上，最后逐顶点归一化。
///
/// ```rust
/// use sky_render::geometry::math_utils::reconstruct_normals;
/// use sky_render::geometry::vertex::Vertex;
///
/// let mut vertices = vec![
///     Vertex::new([0.0, 0.0, 0.0], [0.0; 3], [0.0, 0.0], [0.0; 3]),
///     Vertex::new([0.0, 0.0, 1.0], [0.0; 3], [0.0, 1.0], [0.0; 3]),
///     Vertex::new([1.0, 0.0, 0.0], [0.0; 3], [1.0, 0.0], [0.0; 3]),
/// ];
/// reconstruct_normals(&mut vertices, &[0, 1, 2]);
/// assert!(vertices[0].normal[1] > 0.99);
/// ```
pub fn reconstruct_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vector3::zeros(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];

        let p0 = Vector3::from(vertices[i0].position);
        let p1 = Vector3::from(vertices[i1].position);
        let p2 = Vector3::from(vertices[i2].position);

        let face_normal = (p1 - p0).cross(&(p2 - p0));

        sums[i0] += face_normal;
        sums[i1] += face_normal;
        sums[i2] += face_normal;
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = normalize_or_zero(sum).into();
    }
}

/// 根据位置平滑法线
///
/// OBJ 常在 UV seam 处拆分顶点，同一位置出现多条法线而产生"切边"。
/// 位置量化到 `epsilon` 网格后落在同一格的顶点共享平均法线。
pub fn smooth_normals_by_position(vertices: &mut [Vertex], epsilon: f32) {
    if vertices.is_empty() || epsilon <= 0.0 {
        return;
    }

    let quantize = |p: [f32; 3]| -> (i32, i32, i32) {
        (
            (p[0] / epsilon).round() as i32,
            (p[1] / epsilon).round() as i32,
            (p[2] / epsilon).round() as i32,
        )
    };

    // 每组以第一条法线为参考，反向的法线先翻转再累加
    let mut groups: HashMap<(i32, i32, i32), (Vector3, Vector3)> = HashMap::new();
    for v in vertices.iter() {
        let n = Vector3::from(v.normal);
        let (reference, sum) = groups
            .entry(quantize(v.position))
            .or_insert((n, Vector3::zeros()));
        *sum += if reference.dot(&n) < 0.0 { -n } else { n };
    }

    for v in vertices.iter_mut() {
        if let Some((_, sum)) = groups.get(&quantize(v.position)) {
            v.normal = normalize_or_zero(*sum).into();
        }
    }
}

/// 计算顶点的切线空间向量
///
/// 按 UV 导数求每个三角形的切线并累加，再对每个顶点做 Gram-Schmidt 正交化。
/// 顶点必须已经有有效法线。UV 退化的三角形被跳过。
pub fn compute_tangent_space(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vector3::zeros(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let (v0, v1, v2) = (&vertices[i0], &vertices[i1], &vertices[i2]);

        let dp1 = Vector3::from(v1.position) - Vector3::from(v0.position);
        let dp2 = Vector3::from(v2.position) - Vector3::from(v0.position);

        let duv1 = [v1.texcoord[0] - v0.texcoord[0], v1.texcoord[1] - v0.texcoord[1]];
        let duv2 = [v2.texcoord[0] - v0.texcoord[0], v2.texcoord[1] - v0.texcoord[1]];

        let det = duv1[0] * duv2[1] - duv1[1] * duv2[0];
        if det.abs() < 1e-6 {
            continue;
        }

        let tangent = (dp1 * duv2[1] - dp2 * duv1[1]) / det;

        sums[i0] += tangent;
        sums[i1] += tangent;
        sums[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(sums) {
        let normal = Vector3::from(vertex.normal);
        let orthogonal = tangent - normal * normal.dot(&tangent);
        vertex.tangent = normalize_or_zero(orthogonal).into();
    }
}

/// 零向量保持为零
#[inline]
fn normalize_or_zero(v: Vector3) -> Vector3 {
    v.try_normalize(1e-6).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_triangle() -> Vec<Vertex> {
        vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0], [0.0; 3]),
            Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0], [0.0; 3]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0], [0.0; 3]),
        ]
    }

    #[test]
    fn test_reconstruct_normals_clockwise_faces_up() {
        let mut vertices = flat_triangle();
        for v in vertices.iter_mut() {
            v.normal = [0.0; 3];
        }

        reconstruct_normals(&mut vertices, &[0, 1, 2]);

        // 从 +Y 俯视，0 -> 1 -> 2 为顺时针
        for vertex in &vertices {
            assert!((vertex.normal[1] - 1.0).abs() < 1e-6, "{:?}", vertex.normal);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_zero_normal() {
        let mut vertices = flat_triangle();
        vertices.push(Vertex::default());
        reconstruct_normals(&mut vertices, &[0, 1, 2]);
        assert_eq!(vertices[3].normal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_smooth_normals_merges_seam() {
        let mut vertices = vec![
            Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0], [0.0; 3]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0], [0.0; 3]),
        ];
        smooth_normals_by_position(&mut vertices, 1e-5);

        let s = std::f32::consts::FRAC_1_SQRT_2;
        for v in &vertices {
            assert!((v.normal[0] - s).abs() < 1e-5);
            assert!((v.normal[1] - s).abs() < 1e-5);
        }
    }

    #[test]
    fn test_compute_tangent_space_follows_u() {
        let mut vertices = flat_triangle();
        compute_tangent_space(&mut vertices, &[0, 1, 2]);

        for vertex in &vertices {
            // u 沿 +X 增加
            assert!((vertex.tangent[0] - 1.0).abs() < 1e-5, "{:?}", vertex.tangent);

            let n = Vector3::from(vertex.normal);
            let t = Vector3::from(vertex.tangent);
            assert!(n.dot(&t).abs() < 1e-5);
        }
    }
}

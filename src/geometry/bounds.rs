/// 轴对齐包围盒
///
/// 对应 DirectX::BoundingBox 的用法：模型保存局部包围盒，
/// 场景物体用世界矩阵把它变换到世界空间。

use crate::core::math::{Matrix4, Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// 包住所有点的最小盒；没有点时退化为原点处的盒
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        iter.fold(Self::new(first, first), |mut bounds, p| {
            bounds.min = bounds.min.inf(&p);
            bounds.max = bounds.max.sup(&p);
            bounds
        })
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// 半边长
    pub fn extents(&self) -> Vector3 {
        (self.max - self.min) * 0.5
    }

    /// 8 个角点
    pub fn corners(&self) -> [Vector3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }

    /// 变换 8 个角点后重新拟合
    pub fn transform(&self, m: &Matrix4) -> Self {
        Self::from_points(
            self.corners()
                .iter()
                .map(|c| m.transform_point(&Point3::from(*c)).coords),
        )
    }

    pub fn merge(&self, other: &BoundingBox) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn contains_point(&self, p: &Vector3) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::{constants, matrix, utils};

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_empty_points() {
        let bounds = BoundingBox::from_points(std::iter::empty());
        assert_eq!(bounds, BoundingBox::default());
    }

    #[test]
    fn test_center_and_extents() {
        let bounds = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.center(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.extents(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_transform_translation() {
        let moved = unit_box().transform(&matrix::translation(5.0, 0.0, 0.0));
        assert!(utils::approx_eq_vec3(&moved.min, &Vector3::new(4.0, -1.0, -1.0), 1e-6));
        assert!(utils::approx_eq_vec3(&moved.max, &Vector3::new(6.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_transform_rotation_refits() {
        let bounds = BoundingBox::new(Vector3::new(-2.0, -1.0, -1.0), Vector3::new(2.0, 1.0, 1.0));
        let rotated = bounds.transform(&matrix::rotation_y(constants::HALF_PI));
        assert!(utils::approx_eq_vec3(&rotated.extents(), &Vector3::new(1.0, 1.0, 2.0), 1e-5));
    }

    #[test]
    fn test_merge_and_contains() {
        let other = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(3.0, 3.0, 3.0));
        let merged = unit_box().merge(&other);
        assert!(merged.contains_point(&Vector3::new(-1.0, 2.5, 0.0)));
        assert!(!merged.contains_point(&Vector3::new(-1.5, 0.0, 0.0)));
    }
}

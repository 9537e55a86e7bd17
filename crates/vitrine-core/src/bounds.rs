//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: [f32::INFINITY; 3],
        max: [f32::NEG_INFINITY; 3],
    };

    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.extend_point(*p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|k| self.min[k] > self.max[k])
    }

    pub fn extend_point(&mut self, p: [f32; 3]) {
        for k in 0..3 {
            self.min[k] = self.min[k].min(p[k]);
            self.max[k] = self.max[k].max(p[k]);
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.extend_point(other.min);
        out.extend_point(other.max);
        out
    }

    pub fn center(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Edge lengths along X, Y and Z
    pub fn size(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Length of the diagonal
    pub fn diagonal(&self) -> f32 {
        let [x, y, z] = self.size();
        (x * x + y * y + z * z).sqrt()
    }

    pub fn volume(&self) -> f32 {
        let [x, y, z] = self.size();
        x * y * z
    }

    pub fn translated(&self, offset: [f32; 3]) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb {
            min: [
                self.min[0] + offset[0],
                self.min[1] + offset[1],
                self.min[2] + offset[2],
            ],
            max: [
                self.max[0] + offset[0],
                self.max[1] + offset[1],
                self.max[2] + offset[2],
            ],
        }
    }

    /// The eight corners; bit 0 selects X, bit 1 Y, bit 2 Z
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let mut out = [[0.0; 3]; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            *corner = [
                if i & 1 == 0 { self.min[0] } else { self.max[0] },
                if i & 2 == 0 { self.min[1] } else { self.max[1] },
                if i & 4 == 0 { self.min[2] } else { self.max[2] },
            ];
        }
        out
    }

    /// The 12 box edges as 24 line-list endpoints.
    ///
    /// Used for both the whole-model box and the selected-mesh box. Empty
    /// boxes produce no edges.
    pub fn wireframe_edges(&self) -> Vec<[f32; 3]> {
        const EDGES: [(usize, usize); 12] = [
            // bottom
            (0, 1),
            (1, 3),
            (3, 2),
            (2, 0),
            // top
            (4, 5),
            (5, 7),
            (7, 6),
            (6, 4),
            // verticals
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];

        if self.is_empty() {
            return Vec::new();
        }
        let c = self.corners();
        EDGES.iter().flat_map(|&(a, b)| [c[a], c[b]]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Aabb {
        Aabb::new([-0.5; 3], [0.5; 3])
    }

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points(&[[1.0, 2.0, 3.0], [-1.0, 0.0, 5.0]]);
        assert_eq!(aabb.min, [-1.0, 0.0, 3.0]);
        assert_eq!(aabb.max, [1.0, 2.0, 5.0]);
        assert_eq!(aabb.center(), [0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_empty_box() {
        let aabb = Aabb::from_points(&[]);
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), [0.0; 3]);
        assert!(aabb.wireframe_edges().is_empty());
        assert_eq!(aabb.translated([1.0; 3]), aabb);
    }

    #[test]
    fn test_wireframe_edges_are_axis_aligned() {
        let edges = unit_cube().wireframe_edges();
        assert_eq!(edges.len(), 24);
        for pair in edges.chunks(2) {
            let differing = (0..3).filter(|&k| pair[0][k] != pair[1][k]).count();
            assert_eq!(differing, 1);
        }
    }

    #[test]
    fn test_union_and_volume() {
        let a = Aabb::new([0.0; 3], [1.0; 3]);
        let b = Aabb::new([1.0; 3], [2.0, 3.0, 2.0]);
        let u = a.union(&b);
        assert_eq!(u.size(), [2.0, 3.0, 2.0]);
        assert_eq!(u.volume(), 12.0);
        assert_eq!(a.union(&Aabb::EMPTY), a);
    }
}

//! Scene definition: a single octahedron described by its signed distance

use nalgebra::{Point3, Vector3};

/// Exact SDF for a regular octahedron centered at the origin, with vertices
/// at (±s, 0, 0), (0, ±s, 0) and (0, 0, ±s).
///
/// Negative inside the surface, zero on it, positive outside.
pub fn sd_octahedron(p: Point3<f32>, s: f32) -> f32 {
    // Fold into the positive octant; the shape is reflection-symmetric.
    let p = p.coords.abs();
    let m = p.x + p.y + p.z - s;

    // Three permuted edge-region cases. The permutation order and the clamp
    // bounds below encode which part of the octahedron is closest.
    let q = if 3.0 * p.x < m {
        p
    } else if 3.0 * p.y < m {
        Vector3::new(p.y, p.z, p.x)
    } else if 3.0 * p.z < m {
        Vector3::new(p.z, p.x, p.y)
    } else {
        // Face region: closed-form distance along the face normal (1/sqrt 3).
        return m * 0.577_350_27;
    };

    let k = (0.5 * (q.z - q.y + s)).clamp(0.0, s);
    Vector3::new(q.x, q.y - s + k, q.z - k).magnitude()
}

/// The renderable scene.
///
/// A single primitive for now; [`Scene::distance`] is where further
/// primitives would be combined (min of the member distances for a union).
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub size: f32,
}

impl Scene {
    /// The octahedron of size 2 this program animates.
    pub fn octahedron() -> Self {
        Self { size: 2.0 }
    }

    /// Signed distance from `p` to the nearest scene surface.
    pub fn distance(&self, p: Point3<f32>) -> f32 {
        sd_octahedron(p, self.size)
    }
}

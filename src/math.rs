// Math utilities: rotation and perspective projection

use glam::{Vec2, Vec3};

/// Rotates every vertex about the Y axis by `angle` radians.
///
/// Works in place on the caller's buffer, so pass a per-frame copy and never
/// the canonical geometry.
pub fn rotate_y(vertices: &mut [Vec3], angle: f32) {
    let (sin, cos) = angle.sin_cos();
    for v in vertices.iter_mut() {
        let x = v.x * cos + v.z * sin;
        let z = -v.x * sin + v.z * cos;
        v.x = x;
        v.z = z;
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Field-of-view scale, in pixels.
    pub fov: f32,
    pub viewer_distance: f32,
}

impl Projection {
    pub fn new(fov: f32, viewer_distance: f32) -> Self {
        Self {
            fov,
            viewer_distance,
        }
    }

    /// Project a 3D point to screen space for a `width` x `height` target.
    ///
    /// Screen y grows downward, so y is flipped. The divide is not guarded:
    /// a point at `z == -viewer_distance` yields non-finite coordinates.
    pub fn project(&self, vertex: Vec3, width: u32, height: u32) -> Vec2 {
        let factor = self.fov / (self.viewer_distance + vertex.z);
        let center = Vec2::new((width / 2) as f32, (height / 2) as f32);
        Vec2::new(vertex.x * factor, -vertex.y * factor) + center
    }

    /// Project a fixed-size vertex set.
    pub fn project_all<const N: usize>(
        &self,
        vertices: &[Vec3; N],
        width: u32,
        height: u32,
    ) -> [Vec2; N] {
        vertices.map(|v| self.project(v, width, height))
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(256.0, 4.0)
    }
}

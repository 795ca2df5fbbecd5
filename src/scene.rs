// Scene module: the cube and its wireframe topology

use glam::{Vec2, Vec3};

use crate::math::{rotate_y, Projection};

/// Half the edge length of the cube.
pub const CUBE_SIZE: f32 = 1.0;

/// Canonical cube corners, back face (z = -1) first, then front face.
pub const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-CUBE_SIZE, -CUBE_SIZE, -CUBE_SIZE),
    Vec3::new(CUBE_SIZE, -CUBE_SIZE, -CUBE_SIZE),
    Vec3::new(CUBE_SIZE, CUBE_SIZE, -CUBE_SIZE),
    Vec3::new(-CUBE_SIZE, CUBE_SIZE, -CUBE_SIZE),
    Vec3::new(-CUBE_SIZE, -CUBE_SIZE, CUBE_SIZE),
    Vec3::new(CUBE_SIZE, -CUBE_SIZE, CUBE_SIZE),
    Vec3::new(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE),
    Vec3::new(-CUBE_SIZE, CUBE_SIZE, CUBE_SIZE),
];

/// Vertex index pairs forming the visible edges.
#[rustfmt::skip]
pub const CUBE_EDGES: [[usize; 2]; 12] = [
    [0, 1], [1, 2], [2, 3], [3, 0],
    [4, 5], [5, 6], [6, 7], [7, 4],
    [0, 4], [1, 5], [2, 6], [3, 7],
];

/// The single object in the scene: fixed geometry plus edge topology.
#[derive(Debug, Clone)]
pub struct Wireframe {
    vertices: [Vec3; 8],
    edges: [[usize; 2]; 12],
}

impl Wireframe {
    /// The unit cube centered at the origin.
    pub fn cube() -> Self {
        Self {
            vertices: CUBE_VERTICES,
            edges: CUBE_EDGES,
        }
    }

    pub fn vertices(&self) -> &[Vec3; 8] {
        &self.vertices
    }

    pub fn edges(&self) -> &[[usize; 2]; 12] {
        &self.edges
    }

    /// Rotate a copy of the geometry by `angle` about Y and project it.
    ///
    /// The stored vertices are never touched, so error cannot build up from
    /// frame to frame.
    pub fn project(
        &self,
        angle: f32,
        projection: &Projection,
        width: u32,
        height: u32,
    ) -> [Vec2; 8] {
        let mut transformed = self.vertices;
        rotate_y(&mut transformed, angle);
        projection.project_all(&transformed, width, height)
    }

    /// Screen-space segments for each edge of an already projected vertex set.
    pub fn segments<'a>(
        &'a self,
        projected: &'a [Vec2; 8],
    ) -> impl Iterator<Item = (Vec2, Vec2)> + 'a {
        self.edges
            .iter()
            .map(move |&[a, b]| (projected[a], projected[b]))
    }
}

impl Default for Wireframe {
    fn default() -> Self {
        Self::cube()
    }
}

//! The ring shaped placement marker.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix4, Point3, Rad, SquareMatrix, Transform, Vector3};

use crate::{
    config::ReticleConfig,
    data_structures::model::{Mesh, ModelVertex},
};

/**
 * Flat annulus in the XY plane, built like a triangle fan with two rings of vertices
 * (inner and outer), `segments + 1` vertices each so the seam gets its own UVs.
 */
pub fn ring_geometry(inner_radius: f32, outer_radius: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(2 * (segments as usize + 1));
    for radius in [inner_radius, outer_radius] {
        for s in 0..=segments {
            let theta = 2.0 * PI * s as f32 / segments as f32;
            let (x, y) = (radius * theta.cos(), radius * theta.sin());
            vertices.push(ModelVertex {
                position: [x, y, 0.0],
                tex_coords: [(x / outer_radius + 1.0) / 2.0, (y / outer_radius + 1.0) / 2.0],
                normal: [0.0, 0.0, 1.0],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity(6 * segments as usize);
    for s in 0..segments {
        let a = s;
        let b = s + stride;
        let c = s + stride + 1;
        let d = s + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    Mesh::new("reticle", vertices, indices)
}

/// Applies `rotation` to every vertex position and normal in place.
pub fn rotate_mesh(mesh: &mut Mesh, rotation: Matrix4<f32>) {
    for vertex in mesh.vertices.iter_mut() {
        let p = rotation.transform_point(Point3::from(vertex.position));
        let n = rotation.transform_vector(Vector3::from(vertex.normal));
        vertex.position = p.into();
        vertex.normal = n.into();
    }
}

/// Placement marker. Its pose comes straight from the hit-test result, so it is stored as a
/// matrix and never rebuilt from position/rotation/scale.
#[derive(Clone, Debug)]
pub struct Reticle {
    pub visible: bool,
    pose: Matrix4<f32>,
    mesh: Mesh,
}

impl Reticle {
    pub fn new(config: &ReticleConfig) -> Self {
        let mut mesh = ring_geometry(config.inner_radius, config.outer_radius, config.segments);
        // lie flat on the detected surface
        rotate_mesh(&mut mesh, Matrix4::from_angle_x(Rad(-FRAC_PI_2)));
        Self {
            visible: false,
            pose: Matrix4::identity(),
            mesh,
        }
    }

    pub fn pose(&self) -> Matrix4<f32> {
        self.pose
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Shows the reticle at `pose`.
    pub fn show_at(&mut self, pose: Matrix4<f32>) {
        self.pose = pose;
        self.visible = true;
    }

    /// Hides the reticle. The last pose is kept, it just isn't drawn.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Pose a tap should anchor to, if there currently is a surface.
    pub fn anchor(&self) -> Option<Matrix4<f32>> {
        self.visible.then_some(self.pose)
    }
}

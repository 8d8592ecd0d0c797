//! CPU-side mesh data for placed models and the reticle.
//!
//! Meshes are kept as plain vertex/index arrays. The renderer uploads them the first time they
//! are drawn, using [`Mesh::vertex_bytes`] / [`Mesh::index_bytes`] and the [`Vertex`] layout.

use cgmath::{Matrix4, Point3, SquareMatrix, Transform};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

const MODEL_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MODEL_VERTEX_ATTRIBUTES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into [`LoadedModel::materials`].
    pub material: usize,
    /// Transform of the glTF node this mesh hangs off, relative to the model root.
    pub transform: Matrix4<f32>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            material: 0,
            transform: Matrix4::identity(),
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn num_elements(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Axis aligned bounding box in model space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn size(&self) -> cgmath::Vector3<f32> {
        self.max - self.min
    }
}

/// A fully loaded asset. Immutable once it is part of the scene.
#[derive(Clone, Debug)]
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl LoadedModel {
    /// Bounds over all mesh vertices after applying their node transforms.
    /// `None` for models without geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.meshes.iter().flat_map(|mesh| {
            mesh.vertices
                .iter()
                .map(move |v| mesh.transform.transform_point(Point3::from(v.position)))
        });
        let first = points.next()?;
        let bounds = points.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: Point3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
                max: Point3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
            },
        );
        Some(bounds)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> ModelVertex {
        ModelVertex {
            position: [x, y, z],
            ..Default::default()
        }
    }

    #[test]
    fn bounds_respect_node_transforms() {
        let mut mesh = Mesh::new("quad", vec![vertex(-1.0, 0.0, 0.0), vertex(1.0, 2.0, 0.5)], vec![0, 1]);
        mesh.transform = Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0));
        let model = LoadedModel {
            name: "m".into(),
            meshes: vec![mesh],
            materials: vec![Material::default()],
        };
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(bounds.max, Point3::new(1.0, 2.0, 1.5));
        assert_eq!(bounds.size(), Vector3::new(2.0, 2.0, 0.5));
    }

    #[test]
    fn empty_model_has_no_bounds() {
        let model = LoadedModel {
            name: "empty".into(),
            meshes: vec![],
            materials: vec![],
        };
        assert!(model.bounds().is_none());
    }

    #[test]
    fn vertex_bytes_are_tightly_packed() {
        let mesh = Mesh::new("one", vec![vertex(0.0, 0.0, 0.0)], vec![0, 0, 0]);
        assert_eq!(mesh.vertex_bytes().len(), std::mem::size_of::<ModelVertex>());
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.num_elements(), 3);
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = ModelVertex::desc();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
        let normal_offset = std::mem::offset_of!(ModelVertex, normal) as u64;
        assert_eq!(layout.attributes[2].offset, normal_offset);
    }
}

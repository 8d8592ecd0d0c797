//! Loading placeable models from glTF files.
//!
//! Parsing is done by the `gltf` crate. This module fetches the file and its external buffers,
//! then flattens the node tree of the default scene into a [`LoadedModel`].

use anyhow::{Context, bail};
use base64::{Engine, engine::general_purpose};
use cgmath::{Matrix4, SquareMatrix};
use futures::{FutureExt, future::LocalBoxFuture};

use crate::{
    data_structures::model::{LoadedModel, Material, Mesh, ModelVertex},
    placement::AssetLoader,
};

pub mod io;

pub use io::{AssetRoot, load_binary};

pub async fn load_model_gltf(
    root: &AssetRoot,
    dir: &str,
    file_name: &str,
) -> anyhow::Result<LoadedModel> {
    let gltf_bytes = load_binary(root, dir, file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)
        .with_context(|| format!("parsing {}", file_name))?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .as_deref()
                .context("GLB references a binary chunk it does not contain")?
                .to_vec(),
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri)
                .with_context(|| {
                    format!("decoding embedded buffer {} of {}", buffer.index(), file_name)
                })?,
            gltf::buffer::Source::Uri(uri) => load_binary(root, dir, uri).await?,
        };
        if data.len() < buffer.length() {
            bail!(
                "buffer {} of {} holds {} bytes, {} expected",
                buffer.index(),
                file_name,
                data.len(),
                buffer.length()
            );
        }
        buffer_data.push(data);
    }

    to_loaded_model(file_name, &gltf.document, &buffer_data)
}

/// Payload of a `data:` URI. glTF exporters embed buffers base64 encoded, other encodings are
/// rejected.
pub fn decode_data_uri(uri: &str) -> anyhow::Result<Vec<u8>> {
    let rest = uri.strip_prefix("data:").context("not a data URI")?;
    let (header, payload) = rest.split_once(',').context("data URI without payload")?;
    if !header.ends_with(";base64") {
        bail!("data URI is not base64 encoded ({})", header);
    }
    Ok(general_purpose::STANDARD.decode(payload)?)
}

/// Flattens the default scene (or the first one) of `document` into meshes with
/// model-space node transforms.
pub fn to_loaded_model(
    name: &str,
    document: &gltf::Document,
    buffers: &[Vec<u8>],
) -> anyhow::Result<LoadedModel> {
    let mut materials: Vec<Material> = document
        .materials()
        .map(|material| Material {
            name: material.name().unwrap_or("unnamed_material").to_string(),
            base_color: material.pbr_metallic_roughness().base_color_factor(),
        })
        .collect();
    // primitives without a material point here
    let default_material = materials.len();
    materials.push(Material::default());

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .with_context(|| format!("{} contains no scene", name))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_meshes(node, Matrix4::identity(), buffers, default_material, &mut meshes);
    }

    Ok(LoadedModel {
        name: name.to_string(),
        meshes,
        materials,
    })
}

fn collect_meshes(
    node: gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    default_material: usize,
    out: &mut Vec<Mesh>,
) {
    let transform = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of mesh {:?}: only triangle lists are supported",
                    primitive.index(),
                    mesh.name()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

            let Some(positions) = reader.read_positions() else {
                log::warn!("Primitive {} of mesh {:?} has no positions", primitive.index(), mesh.name());
                continue;
            };
            let mut vertices: Vec<ModelVertex> = positions
                .map(|position| ModelVertex {
                    position,
                    ..Default::default()
                })
                .collect();
            if let Some(normals) = reader.read_normals() {
                vertices.iter_mut().zip(normals).for_each(|(v, n)| v.normal = n);
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|t| t.into_f32()) {
                vertices.iter_mut().zip(tex_coords).for_each(|(v, t)| v.tex_coords = t);
            }

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            out.push(Mesh {
                name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                vertices,
                indices,
                material: primitive.material().index().unwrap_or(default_material),
                transform,
            });
        }
    }
    for child in node.children() {
        collect_meshes(child, transform, buffers, default_material, out);
    }
}

/// [`AssetLoader`] reading glTF files below an [`AssetRoot`].
#[derive(Clone, Debug, Default)]
pub struct GltfLoader {
    root: AssetRoot,
}

impl GltfLoader {
    pub fn new(root: AssetRoot) -> Self {
        Self { root }
    }
}

impl AssetLoader for GltfLoader {
    fn load(&self, dir: &str, file: &str) -> LocalBoxFuture<'static, anyhow::Result<LoadedModel>> {
        let root = self.root.clone();
        let dir = dir.to_string();
        let file = file.to_string();
        async move { load_model_gltf(&root, &dir, &file).await }.boxed_local()
    }
}

use cgmath::Matrix4;

use crate::{
    data_structures::{
        light::HemisphereLight,
        model::{ModelVertex, Vertex},
    },
    render::{Draw, DrawKind, RenderView},
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// cgmath and WebXR produce OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_view(view: &RenderView) -> Self {
        Self {
            view_proj: (OPENGL_TO_WGPU_MATRIX * view.view_projection()).into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    sky_color: [f32; 3],
    intensity: f32,
    ground_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    direction: [f32; 3],
    _padding2: u32,
}

impl LightUniform {
    pub fn from_light(light: &HemisphereLight) -> Self {
        Self {
            sky_color: light.sky_color,
            intensity: light.intensity,
            ground_color: light.ground_color,
            _padding: 0,
            direction: light.direction().into(),
            _padding2: 0,
        }
    }

    /// White from every side, for frames without a scene.
    pub fn unlit() -> Self {
        Self {
            sky_color: [1.0; 3],
            intensity: 1.0,
            ground_color: [1.0; 3],
            _padding: 0,
            direction: [0.0, 1.0, 0.0],
            _padding2: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    /// x: 1.0 when the hemisphere light applies, the other lanes are padding.
    params: [f32; 4],
}

impl DrawUniform {
    pub fn from_draw(draw: &Draw<'_>) -> Self {
        let lit = match draw.kind {
            DrawKind::Reticle => 0.0,
            DrawKind::Placed { .. } => 1.0,
        };
        Self {
            model: draw.world.into(),
            base_color: draw.base_color,
            params: [lit, 0.0, 0.0, 0.0],
        }
    }

    pub fn is_lit(&self) -> bool {
        self.params[0] > 0.5
    }
}

/// Size of one slot in a dynamically offset uniform buffer: `T` rounded up to `alignment`.
pub fn uniform_stride<T>(alignment: u32) -> u64 {
    let size = std::mem::size_of::<T>() as u64;
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

/// Lays `items` out back to back with `stride` bytes per item, ready for one `write_buffer`.
pub fn pack_uniforms<T: bytemuck::Pod>(items: &[T], stride: u64) -> Vec<u8> {
    let stride = (stride as usize).max(std::mem::size_of::<T>());
    let mut bytes = vec![0u8; items.len() * stride];
    for (slot, item) in bytes.chunks_exact_mut(stride).zip(items) {
        let raw = bytemuck::bytes_of(item);
        slot[..raw.len()].copy_from_slice(raw);
    }
    bytes
}

/// Viewport of `view` inside a `target` sized texture as `[x, y, width, height]` with a top left
/// origin, the way wgpu wants it. `None` when the view lies completely outside the target.
pub fn viewport_rect(view: &RenderView, target: (u32, u32)) -> Option<[f32; 4]> {
    let (target_width, target_height) = target;
    let Some(rect) = view.viewport else {
        return Some([0.0, 0.0, target_width as f32, target_height as f32]);
    };
    let x = rect.x.min(target_width);
    let bottom = rect.y.min(target_height);
    let width = rect.width.min(target_width - x);
    let height = rect.height.min(target_height - bottom);
    if width == 0 || height == 0 {
        return None;
    }
    let top = target_height - bottom - height;
    Some([x as f32, top as f32, width as f32, height as f32])
}

fn uniform_entry(binding: u32, has_dynamic_offset: bool, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

/// Group 0: one camera slot per view (dynamic offset) and the light.
pub fn mk_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(0, true, std::mem::size_of::<CameraUniform>()),
            uniform_entry(1, false, std::mem::size_of::<LightUniform>()),
        ],
        label: Some("frame_bind_group_layout"),
    })
}

/// Group 1: one slot per draw (dynamic offset).
pub fn mk_draw_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0, true, std::mem::size_of::<DrawUniform>())],
        label: Some("draw_bind_group_layout"),
    })
}

pub fn mk_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera_buffer: &wgpu::Buffer,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: camera_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<CameraUniform>() as u64),
                }),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: light_buffer.as_entire_binding(),
            },
        ],
        label: Some("frame_bind_group"),
    })
}

pub fn mk_draw_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    draw_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: draw_buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
            }),
        }],
        label: Some("draw_bind_group"),
    })
}

pub fn mk_basic_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    frame_bind_group_layout: &wgpu::BindGroupLayout,
    draw_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &[frame_bind_group_layout, draw_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("mesh.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(DEPTH_FORMAT),
        &[ModelVertex::desc()],
        shader,
    )
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the reticle is seen from both sides and glTF materials may be double sided
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, SquareMatrix, Vector4};

    use super::*;
    use crate::{
        camera::PerspectiveCamera,
        config::Config,
        data_structures::{model::Mesh, scene_graph::Scene},
        render::PixelRect,
    };

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 96);
    }

    #[test]
    fn near_and_far_plane_map_to_wgpu_depth_range() {
        let camera = PerspectiveCamera::new(1, 1, Deg(70.0), 0.01, 20.0);
        let uniform = CameraUniform::from_view(&RenderView::from_camera(&camera));
        let view_proj = Matrix4::from(uniform.view_proj);
        let near = view_proj * Vector4::new(0.0, 0.0, -0.01, 1.0);
        let far = view_proj * Vector4::new(0.0, 0.0, -20.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn light_uniform_carries_the_scene_light() {
        let scene = Scene::new(&Config::default());
        let uniform = LightUniform::from_light(scene.light());
        assert_eq!(uniform.sky_color, [1.0, 1.0, 1.0]);
        assert_eq!(uniform.ground_color, scene.light().ground_color);
        assert_eq!(uniform.direction, Into::<[f32; 3]>::into(scene.light().direction()));
        assert_ne!(uniform, LightUniform::unlit());
    }

    #[test]
    fn only_placed_models_are_lit() {
        let mesh = Mesh::new("m", vec![], vec![]);
        let reticle = Draw {
            kind: DrawKind::Reticle,
            mesh: &mesh,
            world: Matrix4::identity(),
            base_color: [1.0; 4],
        };
        let placed = Draw {
            kind: DrawKind::Placed { model: 0, mesh: 0 },
            ..reticle.clone()
        };
        assert!(!DrawUniform::from_draw(&reticle).is_lit());
        assert!(DrawUniform::from_draw(&placed).is_lit());
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(uniform_stride::<DrawUniform>(256), 256);
        assert_eq!(uniform_stride::<DrawUniform>(64), 128);
        assert_eq!(uniform_stride::<CameraUniform>(64), 64);
        assert_eq!(uniform_stride::<CameraUniform>(0), 64);
    }

    #[test]
    fn packed_uniforms_start_at_slot_boundaries() {
        let items = [[1.0f32, 2.0], [3.0, 4.0]];
        let bytes = pack_uniforms(&items, 16);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[16..24], bytemuck::bytes_of(&items[1]));
        assert!(bytes[8..16].iter().all(|b| *b == 0));
    }

    #[test]
    fn viewports_flip_to_top_left_origin() {
        let mut view = RenderView::from_camera(&PerspectiveCamera::new(1, 1, Deg(70.0), 0.01, 20.0));
        assert_eq!(viewport_rect(&view, (800, 600)), Some([0.0, 0.0, 800.0, 600.0]));

        // right eye of a side by side layer
        view.viewport = Some(PixelRect {
            x: 400,
            y: 0,
            width: 400,
            height: 500,
        });
        assert_eq!(viewport_rect(&view, (800, 600)), Some([400.0, 100.0, 400.0, 500.0]));

        view.viewport = Some(PixelRect {
            x: 900,
            y: 0,
            width: 10,
            height: 10,
        });
        assert_eq!(viewport_rect(&view, (800, 600)), None);
    }
}

//! wgpu implementation of [`Renderer`].
//!
//! [`GpuRenderer`] draws a [`DrawList`] into a surface (the page canvas on wasm) or, for headless
//! use, into an offscreen texture. It keeps one pipeline, a light uniform and two dynamically
//! offset uniform buffers: one camera slot per view and one slot per draw. Meshes are uploaded
//! the first time they are drawn and stay cached until [`GpuRenderer::clear_meshes`].

use std::{collections::HashMap, iter};

use anyhow::Context;
use wgpu::util::DeviceExt;

use crate::{
    camera::Viewport,
    data_structures::model::Mesh,
    pipelines::basic::{
        self, CameraUniform, DEPTH_FORMAT, DrawUniform, LightUniform, pack_uniforms,
        uniform_stride, viewport_rect,
    },
    render::{DrawKind, DrawList, Renderer},
};

enum Target {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    #[cfg(not(target_arch = "wasm32"))]
    Texture {
        texture: wgpu::Texture,
        format: wgpu::TextureFormat,
    },
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
}

/// Uniform buffer holding `capacity` aligned slots of one uniform type.
struct UniformSlots {
    label: &'static str,
    buffer: wgpu::Buffer,
    stride: u64,
    capacity: usize,
}

impl UniformSlots {
    fn new<T>(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let stride = uniform_stride::<T>(device.limits().min_uniform_buffer_offset_alignment);
        Self {
            label,
            buffer: Self::create_buffer(device, label, stride, capacity),
            stride,
            capacity,
        }
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &str,
        stride: u64,
        capacity: usize,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Makes room for `count` slots. Returns `true` when the buffer was replaced and bind groups
    /// pointing at it have to be rebuilt.
    fn reserve(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        self.capacity = count.next_power_of_two();
        self.buffer = Self::create_buffer(device, self.label, self.stride, self.capacity);
        log::debug!("{} grown to {} slots", self.label, self.capacity);
        true
    }

    fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, items: &[T]) {
        if !items.is_empty() {
            queue.write_buffer(&self.buffer, 0, &pack_uniforms(items, self.stride));
        }
    }

    fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }
}

pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: Target,
    size: (u32, u32),
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    light_buffer: wgpu::Buffer,
    cameras: UniformSlots,
    draws: UniformSlots,
    frame_bind_group: wgpu::BindGroup,
    draw_bind_group: wgpu::BindGroup,
    meshes: HashMap<DrawKind, GpuMesh>,
    clear_colour: wgpu::Color,
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            // WebGL doesn't support all of wgpu's features, so if
            // we're building for the web we'll have to disable some.
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            memory_hints: Default::default(),
            experimental_features: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("requesting a graphics device")
}

fn create_depth_view(device: &wgpu::Device, size: (u32, u32)) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(not(target_arch = "wasm32"))]
fn create_target_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: (u32, u32),
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Render Target"),
        size: wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

impl GpuRenderer {
    /// Renders into `surface`, which was created from `instance`.
    pub async fn with_surface(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can draw to this surface")?;
        let (device, queue) = request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        // the canvas has to stay see-through where nothing is drawn
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Rendering with {:?} to a {}x{} {:?} surface",
            adapter.get_info().backend,
            config.width,
            config.height,
            format
        );

        let size = (config.width, config.height);
        Ok(Self::build(
            device,
            queue,
            Target::Surface { surface, config },
            format,
            size,
        ))
    }

    /// Renders into an offscreen texture that can be read back with [`Self::read_pixels`].
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn headless(width: u32, height: u32) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter available")?;
        let (device, queue) = request_device(&adapter).await?;

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let size = (width.max(1), height.max(1));
        let texture = create_target_texture(&device, format, size);
        Ok(Self::build(
            device,
            queue,
            Target::Texture { texture, format },
            format,
            size,
        ))
    }

    fn build(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target: Target,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        let frame_layout = basic::mk_frame_bind_group_layout(&device);
        let draw_layout = basic::mk_draw_bind_group_layout(&device);
        let pipeline = basic::mk_basic_pipeline(&device, format, &frame_layout, &draw_layout);

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::unlit()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let cameras = UniformSlots::new::<CameraUniform>(&device, "Camera Buffer", 2);
        let draws = UniformSlots::new::<DrawUniform>(&device, "Draw Buffer", 16);
        let frame_bind_group =
            basic::mk_frame_bind_group(&device, &frame_layout, &cameras.buffer, &light_buffer);
        let draw_bind_group = basic::mk_draw_bind_group(&device, &draw_layout, &draws.buffer);
        let depth_view = create_depth_view(&device, size);

        Self {
            device,
            queue,
            target,
            size,
            depth_view,
            pipeline,
            frame_layout,
            draw_layout,
            light_buffer,
            cameras,
            draws,
            frame_bind_group,
            draw_bind_group,
            meshes: HashMap::new(),
            clear_colour: wgpu::Color::TRANSPARENT,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Resizes the render target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        match &mut self.target {
            Target::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
            #[cfg(not(target_arch = "wasm32"))]
            Target::Texture { texture, format } => {
                *texture = create_target_texture(&self.device, *format, self.size);
            }
        }
        self.depth_view = create_depth_view(&self.device, self.size);
    }

    /// Forgets all uploaded meshes. Call when the scene they belonged to is gone.
    pub fn clear_meshes(&mut self) {
        self.meshes.clear();
    }

    pub fn cached_meshes(&self) -> usize {
        self.meshes.len()
    }

    fn upload(&mut self, kind: DrawKind, mesh: &Mesh) {
        if mesh.indices.is_empty() || mesh.vertices.is_empty() {
            return;
        }
        if let Some(cached) = self.meshes.get(&kind) {
            if cached.num_elements == mesh.num_elements() {
                return;
            }
        }
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
                contents: mesh.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", mesh.name)),
                contents: mesh.index_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });
        log::debug!("Uploaded {:?} '{}' ({} indices)", kind, mesh.name, mesh.num_elements());
        self.meshes.insert(
            kind,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                num_elements: mesh.num_elements(),
            },
        );
    }

    fn write_uniforms(&mut self, draw_list: &DrawList<'_>) {
        let light = draw_list
            .light
            .map_or_else(LightUniform::unlit, LightUniform::from_light);
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[light]));

        let cameras: Vec<CameraUniform> = draw_list
            .views
            .iter()
            .map(CameraUniform::from_view)
            .collect();
        let draws: Vec<DrawUniform> = draw_list.draws.iter().map(DrawUniform::from_draw).collect();
        if self.cameras.reserve(&self.device, cameras.len()) {
            self.frame_bind_group = basic::mk_frame_bind_group(
                &self.device,
                &self.frame_layout,
                &self.cameras.buffer,
                &self.light_buffer,
            );
        }
        if self.draws.reserve(&self.device, draws.len()) {
            self.draw_bind_group =
                basic::mk_draw_bind_group(&self.device, &self.draw_layout, &self.draws.buffer);
        }
        self.cameras.write(&self.queue, &cameras);
        self.draws.write(&self.queue, &draws);
    }

    /// Copies the offscreen target into tightly packed RGBA rows. Fails for surface targets.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn read_pixels(&self) -> anyhow::Result<Vec<u8>> {
        let Target::Texture { texture, .. } = &self.target else {
            anyhow::bail!("only offscreen targets can be read back");
        };
        let (width, height) = self.size;
        let unpadded = 4 * width;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (padded * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(iter::once(encoder.finish()));

        let (tx, rx) = futures::channel::oneshot::channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(std::time::Duration::from_secs(3)),
            })
            .map_err(|e| anyhow::anyhow!("waiting for the GPU: {:?}", e))?;
        rx.await
            .context("readback was cancelled")?
            .context("mapping the readback buffer")?;

        let data = buffer_slice.get_mapped_range();
        let pixels = data
            .chunks(padded as usize)
            .flat_map(|row| &row[..unpadded as usize])
            .copied()
            .collect();
        Ok(pixels)
    }
}

impl Renderer for GpuRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        let scale = |v: u32| (v as f64 * viewport.pixel_ratio).round() as u32;
        self.resize(scale(viewport.width), scale(viewport.height));
    }

    fn render(&mut self, draw_list: &DrawList<'_>) {
        self.write_uniforms(draw_list);
        for draw in &draw_list.draws {
            self.upload(draw.kind, draw.mesh);
        }

        let (frame, view) = match &self.target {
            Target::Surface { surface, .. } => match surface.get_current_texture() {
                Ok(frame) => {
                    let view = frame
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default());
                    (Some(frame), view)
                }
                Err(e) => {
                    log::warn!("Skipping frame, surface not available: {}", e);
                    return;
                }
            },
            #[cfg(not(target_arch = "wasm32"))]
            Target::Texture { texture, .. } => (
                None,
                texture.create_view(&wgpu::TextureViewDescriptor::default()),
            ),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            for (view_idx, render_view) in draw_list.views.iter().enumerate() {
                let Some([x, y, width, height]) = viewport_rect(render_view, self.size) else {
                    continue;
                };
                render_pass.set_viewport(x, y, width, height, 0.0, 1.0);
                render_pass.set_bind_group(
                    0,
                    &self.frame_bind_group,
                    &[self.cameras.offset(view_idx)],
                );
                for (draw_idx, draw) in draw_list.draws.iter().enumerate() {
                    let Some(mesh) = self.meshes.get(&draw.kind) else {
                        continue;
                    };
                    render_pass.set_bind_group(
                        1,
                        &self.draw_bind_group,
                        &[self.draws.offset(draw_idx)],
                    );
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }
    }
}

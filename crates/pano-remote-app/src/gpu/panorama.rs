use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BufferBindingType, ColorTargetState,
    CommandEncoder, Device, FragmentState, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PrimitiveState, Queue, RenderPipeline, SamplerBindingType, ShaderStages, TextureFormat,
    TextureSampleType, TextureView, TextureViewDimension, VertexState,
};

use super::fullscreen_quad::FULLSCREEN_TRIANGLE_VS_WITH_UV;
use crate::media::types::DecodedFrame;
use crate::pano::view::RectilinearView;

const EQUIRECT_FS: &str = include_str!("../../../../assets/shaders/equirect.wgsl");

/// Must be kept in sync with the WGSL `PanoUniforms` struct (64 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PanoUniforms {
    /// Column-major mat3x3, each column padded to 16 bytes.
    pub rotation: [[f32; 4]; 3],
    pub tan_half_vfov: f32,
    pub aspect: f32,
    pub has_frame: f32,
    pub _pad: f32,
}

impl PanoUniforms {
    pub fn from_view(view: &RectilinearView, aspect: f32, has_frame: bool) -> Self {
        let m = view.rotation();
        let col = |v: glam::Vec3| [v.x, v.y, v.z, 0.0];
        Self {
            rotation: [col(m.x_axis), col(m.y_axis), col(m.z_axis)],
            tan_half_vfov: (view.fov * 0.5).tan() as f32,
            aspect,
            has_frame: if has_frame { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }
}

struct FrameTexture {
    texture: wgpu::Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl FrameTexture {
    fn new(device: &Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pano-frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // sRGB for auto-conversion on sample
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    fn write(&self, queue: &Queue, data: &[u8]) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Draws the current video frame as an equirectangular panorama seen
/// through a rectilinear view. Renders black until the first frame arrives.
pub struct PanoramaRenderer {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    bind_group: BindGroup,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    frame: FrameTexture,
    has_frame: bool,
}

impl PanoramaRenderer {
    pub fn new(device: &Device, queue: &Queue, target_format: TextureFormat) -> Self {
        // 1x1 black until a video is attached
        let frame = FrameTexture::new(device, 1, 1);
        frame.write(queue, &[0, 0, 0, 255]);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("pano-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            // Longitude wraps, latitude stops at the poles
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pano-uniforms"),
            size: std::mem::size_of::<PanoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bind group layout: texture(0), sampler(1), uniform(2)
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("pano-bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<PanoUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let full_source = format!("{FULLSCREEN_TRIANGLE_VS_WITH_UV}\n{EQUIRECT_FS}");
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pano-equirect"),
            source: wgpu::ShaderSource::Wgsl(full_source.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("pano-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pano-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &frame.view,
            &sampler,
            &uniform_buffer,
        );

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            sampler,
            uniform_buffer,
            frame,
            has_frame: false,
        }
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        frame_view: &TextureView,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("pano-bg"),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(frame_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    pub fn has_frame(&self) -> bool {
        self.has_frame
    }

    /// Upload a decoded frame, reallocating the texture if its size changed.
    pub fn upload_frame(&mut self, device: &Device, queue: &Queue, frame: &DecodedFrame) {
        let expected = (frame.width as usize) * (frame.height as usize) * 4;
        if frame.data.len() != expected {
            log::warn!(
                "Dropping frame with {} bytes, expected {} for {}x{}",
                frame.data.len(),
                expected,
                frame.width,
                frame.height
            );
            return;
        }

        if frame.width != self.frame.width || frame.height != self.frame.height {
            log::info!("Panorama texture {}x{}", frame.width, frame.height);
            self.frame = FrameTexture::new(device, frame.width, frame.height);
            self.bind_group = Self::create_bind_group(
                device,
                &self.bind_group_layout,
                &self.frame.view,
                &self.sampler,
                &self.uniform_buffer,
            );
        }
        self.frame.write(queue, &frame.data);
        self.has_frame = true;
    }

    pub fn update_view(&self, queue: &Queue, view: &RectilinearView, aspect: f32) {
        let uniforms = PanoUniforms::from_view(view, aspect, self.has_frame);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&self, encoder: &mut CommandEncoder, target: &TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pano-render"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

//! Render pipelines for trace, denoise, TAA and present, and the executor
//! that records a frame's [`PassStep`]s into a command encoder.
//!
//! All passes are fullscreen triangles. History writes are texture copies.
//! wgpu's resource tracking orders the passes inside the single encoder.

use crate::error::{GpuError, ShaderError};
use crate::passes::{run_frame, PassExecutor, PassStep, Target};
use crate::shaders::{self, ShaderStage};
use crate::uniforms::{BindingTable, FrameSnapshot, PassUniforms, UniformBinder, SCENE_BLOCK};

use super::targets::{RenderTargets, TargetTexture, TARGET_FORMAT};
use super::GpuContext;

const DENOISE_STRENGTH: f32 = 1.0;

struct Layouts {
    trace: wgpu::BindGroupLayout,
    denoise: wgpu::BindGroupLayout,
    taa: wgpu::BindGroupLayout,
    present: wgpu::BindGroupLayout,
}

struct BindGroups {
    trace: wgpu::BindGroup,
    denoise: wgpu::BindGroup,
    taa: wgpu::BindGroup,
    present: wgpu::BindGroup,
}

/// GPU side of a frame: targets, uniform buffers and the four pipelines.
pub struct FramePipeline {
    targets: RenderTargets,
    binder: UniformBinder,
    scene_buffer: wgpu::Buffer,
    pass_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    layouts: Layouts,
    bind_groups: BindGroups,
    trace: wgpu::RenderPipeline,
    denoise: wgpu::RenderPipeline,
    taa: wgpu::RenderPipeline,
    present: wgpu::RenderPipeline,
    cadence: u32,
}

impl FramePipeline {
    /// Validate the shaders, reflect the scene uniforms and build every
    /// pipeline. Targets are sized `width`×`height`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        cadence: u32,
    ) -> Result<Self, GpuError> {
        let trace_src = ShaderStage::Trace.source();
        for stage in ShaderStage::ALL {
            shaders::validate(&stage.source(), stage.name())?;
        }

        let table = BindingTable::resolve(&trace_src, SCENE_BLOCK, ShaderStage::Trace.name())?;
        if table.group() != 0 {
            return Err(ShaderError::new("Trace", format!("`{SCENE_BLOCK}` must be in @group(0)")).into());
        }
        let scene_binding = table.binding();
        let scene_size = (table.size() as u64).next_multiple_of(16).max(16);
        let binder = UniformBinder::new(table);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: scene_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pass_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pass Uniform Buffer"),
            size: std::mem::size_of::<PassUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Target Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layouts = Layouts {
            trace: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Trace Bind Group Layout"),
                entries: &[uniform_entry(scene_binding)],
            }),
            denoise: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Denoise Bind Group Layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    sampler_entry(3),
                    uniform_entry(4),
                ],
            }),
            taa: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("TAA Bind Group Layout"),
                entries: &[texture_entry(0), texture_entry(1), sampler_entry(2), uniform_entry(3)],
            }),
            present: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Present Bind Group Layout"),
                entries: &[texture_entry(0), sampler_entry(1)],
            }),
        };

        let offscreen = Some(wgpu::ColorTargetState {
            format: TARGET_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        });
        let swapchain = Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        });

        let trace = fullscreen_pipeline(
            device,
            ShaderStage::Trace,
            &trace_src,
            &layouts.trace,
            &[offscreen.clone(), offscreen.clone()],
        );
        let denoise = fullscreen_pipeline(
            device,
            ShaderStage::Denoise,
            &ShaderStage::Denoise.source(),
            &layouts.denoise,
            &[offscreen.clone()],
        );
        let taa = fullscreen_pipeline(device, ShaderStage::Taa, &ShaderStage::Taa.source(), &layouts.taa, &[offscreen]);
        let present = fullscreen_pipeline(
            device,
            ShaderStage::Present,
            &ShaderStage::Present.source(),
            &layouts.present,
            &[swapchain],
        );

        let targets = RenderTargets::new(device, width, height);
        let bind_groups = create_bind_groups(device, &layouts, &targets, &sampler, &scene_buffer, scene_binding, &pass_buffer);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::new("Pipeline", err.to_string()).into());
        }

        log::info!("frame pipeline ready: targets {}x{}, history reset every {} frames", width, height, cadence);

        Ok(Self {
            targets,
            binder,
            scene_buffer,
            pass_buffer,
            sampler,
            layouts,
            bind_groups,
            trace,
            denoise,
            taa,
            present,
            cadence,
        })
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    pub fn binder(&self) -> &UniformBinder {
        &self.binder
    }

    /// Reallocate every target at a new size. History starts over black.
    pub fn resize_targets(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = RenderTargets::new(device, width, height);
        let scene_binding = self.binder.table().binding();
        self.bind_groups = create_bind_groups(
            device,
            &self.layouts,
            &self.targets,
            &self.sampler,
            &self.scene_buffer,
            scene_binding,
            &self.pass_buffer,
        );
    }

    /// Upload the snapshot and run `frame`'s schedule onto the surface.
    pub fn render(&mut self, ctx: &GpuContext, snapshot: &FrameSnapshot, frame: u64) -> Result<(), wgpu::SurfaceError> {
        let bytes = self.binder.push(snapshot);
        ctx.queue.write_buffer(&self.scene_buffer, 0, bytes);

        let (width, height) = self.targets.size();
        let pass = PassUniforms {
            resolution: [width as f32, height as f32],
            time: snapshot.time,
            frame: frame as u32,
            denoise_strength: DENOISE_STRENGTH,
            _pad: 0.0,
        };
        ctx.queue.write_buffer(&self.pass_buffer, 0, bytemuck::bytes_of(&pass));

        let output = ctx.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let mut executor = GpuPassExecutor::new(&mut encoder, self, &view);
            run_frame(&mut executor, frame, self.cadence);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Records pass steps into a command encoder.
pub struct GpuPassExecutor<'a> {
    encoder: &'a mut wgpu::CommandEncoder,
    pipeline: &'a FramePipeline,
    surface_view: &'a wgpu::TextureView,
}

impl<'a> GpuPassExecutor<'a> {
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        pipeline: &'a FramePipeline,
        surface_view: &'a wgpu::TextureView,
    ) -> Self {
        Self {
            encoder,
            pipeline,
            surface_view,
        }
    }
}

impl PassExecutor for GpuPassExecutor<'_> {
    fn execute(&mut self, step: PassStep) {
        let p = self.pipeline;
        let views: Vec<&wgpu::TextureView> = step
            .writes()
            .iter()
            .map(|&target| match p.targets.get(target) {
                Some(texture) => &texture.view,
                None => self.surface_view,
            })
            .collect();

        match step {
            PassStep::Trace => draw(self.encoder, "Trace Pass", &p.trace, &p.bind_groups.trace, &views),
            PassStep::Denoise => draw(self.encoder, "Denoise Pass", &p.denoise, &p.bind_groups.denoise, &views),
            PassStep::Taa => draw(self.encoder, "TAA Pass", &p.taa, &p.bind_groups.taa, &views),
            PassStep::Present => draw(self.encoder, "Present Pass", &p.present, &p.bind_groups.present, &views),
            PassStep::HistoryReset => p.targets.copy(self.encoder, Target::Denoised, Target::History),
            PassStep::HistoryCommit => p.targets.copy(self.encoder, Target::TaaOutput, Target::History),
        }
    }
}

fn draw(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    views: &[&wgpu::TextureView],
) {
    let attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = views
        .iter()
        .map(|&view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })
        })
        .collect();

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &attachments,
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    targets: &[Option<wgpu::ColorTargetState>],
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.name()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(stage.name()),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(stage.name()),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_bind_groups<'a>(
    device: &wgpu::Device,
    layouts: &Layouts,
    targets: &'a RenderTargets,
    sampler: &'a wgpu::Sampler,
    scene_buffer: &wgpu::Buffer,
    scene_binding: u32,
    pass_buffer: &'a wgpu::Buffer,
) -> BindGroups {
    let sampler = wgpu::BindingResource::Sampler(sampler);
    let view = |texture: &'a TargetTexture| wgpu::BindingResource::TextureView(&texture.view);

    BindGroups {
        trace: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Trace Bind Group"),
            layout: &layouts.trace,
            entries: &[wgpu::BindGroupEntry {
                binding: scene_binding,
                resource: scene_buffer.as_entire_binding(),
            }],
        }),
        denoise: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Denoise Bind Group"),
            layout: &layouts.denoise,
            entries: &[
                entry(0, view(&targets.noisy)),
                entry(1, view(&targets.normals)),
                entry(2, view(&targets.history)),
                entry(3, sampler.clone()),
                entry(4, pass_buffer.as_entire_binding()),
            ],
        }),
        taa: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("TAA Bind Group"),
            layout: &layouts.taa,
            entries: &[
                entry(0, view(&targets.denoised)),
                entry(1, view(&targets.history)),
                entry(2, sampler.clone()),
                entry(3, pass_buffer.as_entire_binding()),
            ],
        }),
        present: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout: &layouts.present,
            entries: &[entry(0, view(&targets.taa_output)), entry(1, sampler)],
        }),
    }
}

fn entry(binding: u32, resource: wgpu::BindingResource<'_>) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry { binding, resource }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

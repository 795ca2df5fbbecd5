// Renderer: window, GPU presentation and the frame loop

use std::sync::Arc;

use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use crate::config::RenderSettings;
use crate::error::InitError;
use crate::frame_loop::{Clock, FrameLoop};
use crate::framebuffer::Framebuffer;
use crate::scene::Wireframe;

/// Texture format of the uploaded frame buffer.
const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_texture: wgpu::Texture,
    frame_bind_group: wgpu::BindGroup,
    window: Arc<Window>,
    framebuffer: Framebuffer,
    scene: Wireframe,
    settings: RenderSettings,
    frame_loop: FrameLoop,
    clock: Clock,
}

impl Renderer {
    /// Open the fullscreen window and everything needed to present frames.
    ///
    /// Anything acquired before a failing step is released on return.
    pub async fn new(
        event_loop: &EventLoop<()>,
        settings: RenderSettings,
    ) -> Result<Self, InitError> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(settings.title.as_str())
                .with_fullscreen(Some(Fullscreen::Borderless(None)))
                .build(event_loop)?,
        );

        // Some platforms report 0x0 until the fullscreen switch lands; a
        // Resized event follows with the real size.
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        log::info!("window created at {}x{}", width, height);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(InitError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Renderer Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(InitError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // The frame buffer maps 1:1 onto the surface, so no filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let (frame_texture, frame_bind_group) =
            create_frame_target(&device, &bind_group_layout, &sampler, width, height);

        let scene = Wireframe::cube();
        log::info!(
            "drawing {} vertices, {} edges",
            scene.vertices().len(),
            scene.edges().len()
        );

        let clock = Clock::new();
        let frame_loop = FrameLoop::new(
            settings.rotation_step,
            settings.fps_window_ms,
            clock.ticks_ms(),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            frame_texture,
            frame_bind_group,
            window,
            framebuffer: Framebuffer::new(width, height),
            scene,
            settings,
            frame_loop,
            clock,
        })
    }

    /// Drive the frame loop until a quit request arrives.
    pub fn run(mut self, event_loop: EventLoop<()>) -> Result<(), InitError> {
        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { window_id, event } if window_id == self.window.id() => {
                        match event {
                            WindowEvent::CloseRequested => self.frame_loop.request_quit(),
                            WindowEvent::Resized(physical_size) => self.resize(physical_size),
                            WindowEvent::RedrawRequested => self.render_frame(),
                            _ => {}
                        }
                    }
                    Event::AboutToWait if self.frame_loop.is_running() => {
                        self.window.request_redraw();
                    }
                    Event::LoopExiting => {
                        log::info!(
                            "stopped after {} frames ({:.1} fps)",
                            self.frame_loop.frames_drawn(),
                            self.frame_loop.fps()
                        );
                    }
                    _ => {}
                }

                if !self.frame_loop.is_running() {
                    target.exit();
                }
            })
            .map_err(InitError::Run)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if new_size.width == self.config.width && new_size.height == self.config.height {
            return;
        }
        log::info!("resized to {}x{}", new_size.width, new_size.height);

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.framebuffer.resize(new_size.width, new_size.height);
        let (texture, bind_group) = create_frame_target(
            &self.device,
            &self.bind_group_layout,
            &self.sampler,
            new_size.width,
            new_size.height,
        );
        self.frame_texture = texture;
        self.frame_bind_group = bind_group;
    }

    /// One iteration: rotate, project, rasterize, present, then pace.
    fn render_frame(&mut self) {
        if !self.frame_loop.is_running() {
            return;
        }

        let projected = self.scene.project(
            self.frame_loop.angle(),
            &self.settings.projection,
            self.framebuffer.width(),
            self.framebuffer.height(),
        );

        self.framebuffer.clear(self.settings.background);
        self.framebuffer.set_draw_color(self.settings.foreground);
        let mut skipped = 0;
        for (from, to) in self.scene.segments(&projected) {
            if !self.framebuffer.draw_segment(from, to) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            log::trace!("skipped {} edges that are off-screen or not finite", skipped);
        }

        self.present();

        if let Some(fps) = self.frame_loop.end_frame(self.clock.ticks_ms()) {
            log::info!("{:.1} fps", fps);
        }

        std::thread::sleep(self.settings.frame_delay);
    }

    /// Upload the frame buffer and draw it over the whole surface.
    fn present(&mut self) {
        let size = wgpu::Extent3d {
            width: self.framebuffer.width(),
            height: self.framebuffer.height(),
            depth_or_array_layers: 1,
        };
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.framebuffer.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::warn!("skipping frame: {}", err);
                return;
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

/// Texture the frame buffer is copied into, plus the bind group sampling it.
fn create_frame_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Frame Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    (texture, bind_group)
}

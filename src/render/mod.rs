pub mod camera;
pub mod instance;
pub mod pipeline;
pub mod texture;

use std::sync::Arc;
use winit::window::Window;

use self::instance::SpriteInstance;
use self::pipeline::SpritePipeline;
use self::texture::SpriteTexture;

/// Window clear color — the deep red backdrop behind the angel.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.404,
    g: 0.016,
    b: 0.016,
    a: 1.0,
};

/// Core GPU state — device, queue, surface, pipeline, sprite textures.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub sprite_pipeline: SpritePipeline,
    /// One texture per sprite, in draw order, parallel to the instance
    /// buffer. Empty until `load_sprites` runs.
    pub sprites: Vec<SpriteTexture>,
}

impl GpuState {
    /// Initialize wgpu and the sprite rendering pipeline.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window)
            .expect("failed to create wgpu surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("no suitable GPU adapter found");

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("seraph_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .expect("failed to create wgpu device");

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .find(|f| **f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Surface format: {format:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Fifo is universally supported and vsync suits a fixed scene.
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sprite_pipeline = SpritePipeline::new(&device, format);

        Self {
            device,
            queue,
            surface,
            surface_config,
            sprite_pipeline,
            sprites: Vec::new(),
        }
    }

    /// Load the scene's sprite textures, in draw order. Any decode or I/O
    /// failure is returned and treated as fatal by the caller.
    pub fn load_sprites(&mut self, paths: &[&str]) -> Result<(), image::ImageError> {
        self.sprites.clear();
        for path in paths {
            let sprite = SpriteTexture::load(
                &self.device,
                &self.queue,
                &self.sprite_pipeline.texture_layout,
                path,
            )?;
            self.sprites.push(sprite);
        }
        Ok(())
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Upload instance data for this frame.
    pub fn update_instances(&mut self, instances: &[SpriteInstance]) {
        self.sprite_pipeline.update_instances(&self.queue, instances);
    }

    /// Render one frame: clear, draw every sprite back to front, present.
    /// Surface loss is handled by reconfiguring and skipping the frame.
    pub fn render_frame(&mut self) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let p = &self.sprite_pipeline;
            let drawn = (p.num_instances as usize).min(self.sprites.len());
            if drawn > 0 {
                render_pass.set_pipeline(&p.pipeline);
                render_pass.set_bind_group(0, &p.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, p.instance_buffer.slice(..));
                render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

                // One draw per sprite: each has its own texture, so bind
                // group 1 swaps while the instance index selects the matrix.
                for (i, sprite) in self.sprites.iter().take(drawn).enumerate() {
                    render_pass.set_bind_group(1, &sprite.bind_group, &[]);
                    render_pass.draw_indexed(0..6, 0, i as u32..i as u32 + 1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

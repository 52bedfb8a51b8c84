use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::camera;
use super::instance::SpriteInstance;
use super::texture;

/// Quad vertex — position in world units relative to the sprite center,
/// UV coords.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Unit quad centered at the origin. V runs top-down so the image is
/// upright: bottom corners sample v=1, top corners v=0.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { position: [-0.5, -0.5], uv: [0.0, 1.0] }, // bottom-left
    Vertex { position: [ 0.5, -0.5], uv: [1.0, 1.0] }, // bottom-right
    Vertex { position: [ 0.5,  0.5], uv: [1.0, 0.0] }, // top-right
    Vertex { position: [-0.5,  0.5], uv: [0.0, 0.0] }, // top-left
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Instance buffer capacity. The scene only ever holds five sprites, but a
/// little headroom costs nothing.
pub const MAX_SPRITES: usize = 16;

/// All GPU resources for the sprite rendering pipeline.
pub struct SpritePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub instance_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub texture_layout: wgpu::BindGroupLayout,
    pub num_instances: u32,
}

impl SpritePipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        // Load shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        // Bind group layout for the camera uniform
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = texture::bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        // Render pipeline — straight alpha blending, matching the
        // straight-alpha sprite PNGs.
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), SpriteInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // 2D sprites, no culling
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Create buffers
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite_instance_buffer"),
            size: (MAX_SPRITES * std::mem::size_of::<SpriteInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The camera never moves; upload its matrix once.
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform_buffer"),
            contents: bytemuck::cast_slice(&camera::view_proj().to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            camera_bind_group,
            texture_layout,
            num_instances: 0,
        }
    }

    /// Upload new instance data to the GPU.
    pub fn update_instances(&mut self, queue: &wgpu::Queue, instances: &[SpriteInstance]) {
        let count = instances.len().min(MAX_SPRITES);
        self.num_instances = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_uv_mapping_matches_triangles() {
        // Indexed triangles (0,1,2) and (0,2,3) must expand to the fixed
        // texture mapping {(0,1),(1,1),(1,0)} and {(0,1),(1,0),(0,0)}.
        let tri_a: Vec<[f32; 2]> = [0, 1, 2]
            .iter()
            .map(|&i| QUAD_VERTICES[i as usize].uv)
            .collect();
        let tri_b: Vec<[f32; 2]> = [0, 2, 3]
            .iter()
            .map(|&i| QUAD_VERTICES[i as usize].uv)
            .collect();

        assert_eq!(tri_a, vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]);
        assert_eq!(tri_b, vec![[0.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
        assert_eq!(QUAD_INDICES, [0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn quad_is_unit_sized() {
        for v in QUAD_VERTICES {
            assert_eq!(v.position[0].abs(), 0.5);
            assert_eq!(v.position[1].abs(), 0.5);
        }
    }
}

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-sprite data uploaded to the GPU each frame: the model matrix,
/// column-major, fed to the shader as four vec4 attributes.
/// Stride = 64 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteInstance {
    pub model: [[f32; 4]; 4],
}

impl SpriteInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4,  // model column 0
        3 => Float32x4,  // model column 1
        4 => Float32x4,  // model column 2
        5 => Float32x4,  // model column 3
    ];

    pub fn from_matrix(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn matrix_round_trips_column_major() {
        let m = Mat4::from_translation(Vec3::new(2.0, -1.0, 0.0));
        let instance = SpriteInstance::from_matrix(m);
        // Translation lands in the last column.
        assert_eq!(instance.model[3][0], 2.0);
        assert_eq!(instance.model[3][1], -1.0);
        assert_eq!(Mat4::from_cols_array_2d(&instance.model), m);
    }
}

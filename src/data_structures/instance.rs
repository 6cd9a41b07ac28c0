//! Instance transformation data for GPU rendering.
//!
//! Scene nodes carry a local [`Transform`]. Walking the tree multiplies the
//! local matrices into world matrices which end up, together with the material
//! colour, in an [`InstanceRaw`] per drawn mesh.

use cgmath::{Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Local position, rotation and scale of a scene node.
///
/// `rotation` holds Euler angles in radians which are applied in X, Y, Z
/// order, i.e. the rotation matrix is `Rx * Ry * Rz`. Animations add to the
/// individual angles, so they are kept as angles instead of a quaternion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverse transpose of the upper 3x3 block, used to transform normals under
/// non-uniform scale. Degenerate matrices fall back to the plain 3x3 block.
pub fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    match linear.invert() {
        Some(inverse) => inverse.transpose(),
        None => linear,
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub colour: [f32; 4],
}

impl InstanceRaw {
    pub fn new(world: Matrix4<f32>, colour: [f32; 4]) -> Self {
        Self {
            model: world.into(),
            normal: normal_matrix(&world).into(),
            colour,
        }
    }

    /// Translation part of the world matrix.
    pub fn position(&self) -> [f32; 3] {
        let [x, y, z, _] = self.model[3];
        [x, y, z]
    }
}

/**
 * As we store vertex data directly in the GPU memory we need to tell what the bytes refer to:
 *
 * Stride layout here: world matrix as four vec4s, the normal matrix as three vec3s and the
 * material colour as one vec4.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance instead of once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use cgmath::{InnerSpace, Vector4};

    use super::*;
    use crate::data_structures::model::Vertex;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn identity_is_default() {
        assert_eq!(Transform::default().to_matrix(), Matrix4::identity());
    }

    #[test]
    fn rotation_is_applied_x_then_y_then_z() {
        let transform = Transform::new().with_rotation(FRAC_PI_2, 0.0, FRAC_PI_2);
        // Rz first maps +X onto +Y, Rx then maps +Y onto +Z
        let moved = transform.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!(approx(moved.truncate(), Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn scale_happens_before_translation() {
        let transform = Transform::at(1.0, 2.0, 3.0).with_scale(2.0, 2.0, 2.0);
        let moved = transform.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx(moved.truncate(), Vector3::new(3.0, 2.0, 3.0)));
    }

    #[test]
    fn normals_stay_perpendicular_under_non_uniform_scale() {
        let world = Transform::new().with_scale(4.0, 1.0, 1.0).to_matrix();
        // a surface tilted 45° in the XY plane
        let tangent = (world * Vector4::new(1.0, -1.0, 0.0, 0.0)).truncate();
        let normal = normal_matrix(&world) * Vector3::new(1.0, 1.0, 0.0);
        assert!(tangent.dot(normal).abs() < 1e-5);
    }

    #[test]
    fn degenerate_scale_does_not_panic() {
        let world = Transform::new().with_scale(0.0, 1.0, 1.0).to_matrix();
        let raw = InstanceRaw::new(world, [1.0; 4]);
        assert_eq!(raw.normal[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn layout_covers_the_whole_struct() {
        let desc = InstanceRaw::desc();
        assert_eq!(desc.array_stride, 29 * 4);
        assert_eq!(desc.attributes.last().map(|a| a.shader_location), Some(12));
    }
}

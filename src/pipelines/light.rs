//! Scene lighting and fog uniforms.
//!
//! The scene is lit by one directional light and a flat ambient term. Linear
//! fog shares the uniform since every lit fragment needs both.

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Unit vector from the scene towards the light.
    direction: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    /// Linear colour premultiplied by the intensity.
    colour: [f32; 3],
    _padding2: u32,
    ambient: [f32; 3],
    _padding3: u32,
    fog_colour: [f32; 3],
    fog_near: f32,
    fog_far: f32,
    _padding4: [u32; 3],
}

impl LightUniform {
    pub fn new(position: [f32; 3], colour: [f32; 3], ambient: [f32; 3]) -> Self {
        let mut uniform = Self {
            direction: [0.0, 1.0, 0.0],
            _padding: 0,
            colour,
            _padding2: 0,
            ambient,
            _padding3: 0,
            fog_colour: [0.0; 3],
            // no fog until configured
            fog_near: f32::MAX,
            fog_far: f32::MAX,
            _padding4: [0; 3],
        };
        uniform.set_position(position);
        uniform
    }

    /// A directional light shines from `position` towards the origin.
    pub fn set_position(&mut self, position: [f32; 3]) {
        let direction = Vector3::from(position);
        if direction.magnitude2() > 0.0 {
            self.direction = direction.normalize().into();
        }
    }

    pub fn set_fog(&mut self, colour: [f32; 3], near: f32, far: f32) {
        self.fog_colour = colour;
        self.fog_near = near;
        self.fog_far = far.max(near);
    }

    #[cfg(test)]
    pub fn direction(&self) -> [f32; 3] {
        self.direction
    }

    /// Share of the fog colour at view depth `depth`.
    ///
    /// CPU reference of the fog term in `phong.wgsl`; the renderer never calls
    /// it, it pins down what the shader is expected to compute.
    pub fn fog_factor(&self, depth: f32) -> f32 {
        if self.fog_far <= self.fog_near {
            return if depth >= self.fog_far { 1.0 } else { 0.0 };
        }
        let t = ((depth - self.fog_near) / (self.fog_far - self.fog_near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0], [1.0; 3], [0.0; 3])
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<LightUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
    }

    #[test]
    fn position_becomes_a_unit_direction() {
        let light = LightUniform::new([1.0, 1.0, 1.0], [1.0; 3], [0.1; 3]);
        let expected = 1.0 / 3f32.sqrt();
        for c in light.direction() {
            assert!((c - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn fog_ramps_between_near_and_far() {
        let mut light = LightUniform::default();
        assert_eq!(light.fog_factor(10_000.0), 0.0);
        light.set_fog([0.0; 3], 50.0, 2000.0);
        assert_eq!(light.fog_factor(10.0), 0.0);
        assert_eq!(light.fog_factor(50.0), 0.0);
        assert_eq!(light.fog_factor(2000.0), 1.0);
        let mid = light.fog_factor(1025.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}

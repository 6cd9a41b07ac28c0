//! Dot-screen post-process.
//!
//! Reads a finished colour target, turns it into a rotated halftone pattern
//! and blends the result over whatever is already on the destination.
//! [`shade`] mirrors the fragment shader on the CPU.

use wgpu::util::DeviceExt;

use crate::data_structures::texture::{self, Texture};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DotScreenUniform {
    pub center: [f32; 2],
    pub t_size: [f32; 2],
    pub angle: f32,
    pub scale: f32,
    _padding: [f32; 2],
}

impl DotScreenUniform {
    pub fn new(center: [f32; 2], angle: f32, scale: f32, t_size: [f32; 2]) -> Self {
        Self {
            center,
            t_size,
            angle,
            scale,
            _padding: [0.0; 2],
        }
    }

    /// Halftone pattern in [-4, 4] at `uv` (origin bottom left).
    pub fn pattern(&self, uv: [f32; 2]) -> f32 {
        let (s, c) = self.angle.sin_cos();
        let tex = [
            uv[0] * self.t_size[0] - self.center[0],
            uv[1] * self.t_size[1] - self.center[1],
        ];
        let point = [
            (c * tex[0] - s * tex[1]) * self.scale,
            (s * tex[0] + c * tex[1]) * self.scale,
        ];
        point[0].sin() * point[1].sin() * 4.0
    }
}

impl Default for DotScreenUniform {
    fn default() -> Self {
        Self::new([0.5, 0.5], 1.57, 1.0, [256.0, 256.0])
    }
}

/// CPU reference of `dot_screen.wgsl`'s fragment stage; channels saturate like
/// a unorm target. The renderer never calls it, it pins down what the shader is
/// expected to compute.
pub fn shade(uniform: &DotScreenUniform, rgba: [f32; 4], uv: [f32; 2]) -> [f32; 4] {
    let average = (rgba[0] + rgba[1] + rgba[2]) / 3.0;
    let value = (average * 10.0 - 5.0 + uniform.pattern(uv)).clamp(0.0, 1.0);
    [value, value, value, rgba[3]]
}

#[derive(Debug)]
pub struct DotScreenResources {
    pub uniform: DotScreenUniform,
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    pub pipeline: wgpu::RenderPipeline,
}

impl DotScreenResources {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        uniform: DotScreenUniform,
        source: &Texture,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dot Screen Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("dot_screen_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer, source);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Dot Screen Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Dot Screen Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("dot_screen.wgsl").into()),
        };
        // A single oversized triangle generated in the vertex shader covers the screen
        let pipeline = crate::pipelines::basic::mk_render_pipeline(
            device,
            &layout,
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            None,
            false,
            wgpu::PrimitiveTopology::TriangleList,
            &[],
            shader,
        );

        Self {
            uniform,
            buffer,
            bind_group_layout,
            bind_group,
            pipeline,
        }
    }

    /// The source target is recreated on resize, so the bind group has to follow.
    pub fn rebind(&mut self, device: &wgpu::Device, source: &Texture) {
        self.bind_group = mk_bind_group(device, &self.bind_group_layout, &self.buffer, source);
    }

    pub fn set_uniform(&mut self, queue: &wgpu::Queue, uniform: DotScreenUniform) {
        self.uniform = uniform;
        self.write(queue);
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    source: &Texture,
) -> wgpu::BindGroup {
    let fallback;
    let sampler = match &source.sampler {
        Some(sampler) => sampler,
        None => {
            fallback = texture::create_default_sampler(device);
            &fallback
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("dot_screen_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&source.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<DotScreenUniform>(), 32);
    }

    #[test]
    fn pattern_is_bounded() {
        let uniform = DotScreenUniform {
            scale: 100.0,
            ..Default::default()
        };
        for i in 0..50 {
            for j in 0..50 {
                let p = uniform.pattern([i as f32 / 50.0, j as f32 / 50.0]);
                assert!((-4.0..=4.0).contains(&p));
            }
        }
    }

    #[test]
    fn pattern_vanishes_at_the_center() {
        let uniform = DotScreenUniform::default();
        // uv * t_size == center maps to the rotation origin
        let uv = [0.5 / 256.0, 0.5 / 256.0];
        assert!(uniform.pattern(uv).abs() < 1e-6);
    }

    #[test]
    fn dark_and_bright_inputs_saturate() {
        let uniform = DotScreenUniform::default();
        let uv = [0.3, 0.7];
        assert_eq!(shade(&uniform, [0.0, 0.0, 0.0, 1.0], uv), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(shade(&uniform, [1.0, 1.0, 1.0, 0.5], uv), [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn alpha_is_passed_through() {
        let uniform = DotScreenUniform::default();
        assert_eq!(shade(&uniform, [0.5, 0.5, 0.5, 0.0], [0.1, 0.2])[3], 0.0);
    }
}

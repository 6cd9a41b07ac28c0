//! Mesh, vertex and material definitions.
//!
//! The engine only knows procedurally generated primitives, so a [`Mesh`] is a
//! pair of GPU buffers built from a [`Geometry`](super::geometry::Geometry). The
//! surface appearance is described by a plain [`Material`] which travels with
//! every instance instead of living in a bind group.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::{colour, geometry::Geometry};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Phong-like surface description.
///
/// `colour` is linear RGB. Transparent materials are drawn after all opaque
/// ones with alpha blending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub colour: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
}

impl Material {
    pub fn phong(hex: u32) -> Self {
        Self {
            colour: colour::hex_to_linear(hex),
            opacity: 1.0,
            transparent: false,
        }
    }

    /// Semi-transparent variant; any opacity below 1 enables blending.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    pub fn rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.colour;
        [r, g, b, self.opacity]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::phong(0xffffff)
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn from_geometry(device: &wgpu::Device, name: &str, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        }
    }
}

pub trait DrawModel<'a> {
    /// Draw `mesh` once per instance in `instances`. The instance buffer must
    /// already be bound to vertex slot 1.
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_below_one_is_transparent() {
        let blade = Material::phong(0xffffff).with_opacity(0.5);
        assert!(blade.transparent);
        assert_eq!(blade.rgba()[3], 0.5);
        assert!(!Material::default().transparent);
    }

    #[test]
    fn vertex_layout_matches_struct_size() {
        let desc = ModelVertex::desc();
        assert_eq!(desc.array_stride, 24);
        assert_eq!(desc.attributes.len(), 2);
    }
}

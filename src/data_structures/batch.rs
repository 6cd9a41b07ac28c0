//! Instance batching.
//!
//! Every mesh node of every tree that shares a shape, a blend mode and a layer
//! mask is drawn with a single instanced call. [`InstanceBatches`] groups the
//! flattened nodes on the CPU; [`MeshBatches`] owns the matching GPU meshes and
//! instance buffers and turns them into a [`Render`].

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::Shape,
        instance::InstanceRaw,
        layers::Layers,
        model::Mesh,
        scene_graph::{SceneNode, WorldMesh},
    },
    render::{Instanced, Render},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchKey {
    /// Index into [`InstanceBatches::shapes`].
    pub shape: usize,
    pub transparent: bool,
    pub layers: Layers,
}

#[derive(Debug, Default)]
pub struct InstanceBatches {
    shapes: Vec<Shape>,
    batches: Vec<(BatchKey, Vec<InstanceRaw>)>,
}

impl InstanceBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every batch but keep shape and batch order stable between frames.
    pub fn clear(&mut self) {
        self.batches
            .iter_mut()
            .for_each(|(_, instances)| instances.clear());
    }

    pub fn push(&mut self, mesh: WorldMesh) {
        let shape = match self.shapes.iter().position(|s| *s == mesh.shape) {
            Some(idx) => idx,
            None => {
                self.shapes.push(mesh.shape);
                self.shapes.len() - 1
            }
        };
        let key = BatchKey {
            shape,
            transparent: mesh.material.transparent,
            layers: mesh.layers,
        };
        match self.batches.iter_mut().find(|(k, _)| *k == key) {
            Some((_, instances)) => instances.push(mesh.raw),
            None => self.batches.push((key, vec![mesh.raw])),
        }
    }

    pub fn extend_from(&mut self, root: &SceneNode) {
        root.collect_instances(&mut |mesh| self.push(mesh));
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn batches(&self) -> &[(BatchKey, Vec<InstanceRaw>)] {
        &self.batches
    }

    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(|(_, instances)| instances.len()).sum()
    }
}

#[derive(Debug)]
struct GpuBatch {
    key: BatchKey,
    buffer: wgpu::Buffer,
    amount: usize,
    capacity: usize,
}

/// GPU side of [`InstanceBatches`]: one mesh per shape and one instance
/// buffer per batch.
#[derive(Debug, Default)]
pub struct MeshBatches {
    cpu: InstanceBatches,
    meshes: Vec<Mesh>,
    gpu: Vec<GpuBatch>,
}

impl MeshBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance_count(&self) -> usize {
        self.cpu.instance_count()
    }

    /// Re-flatten `roots` and upload the result.
    ///
    /// Buffers are only recreated when a batch outgrows them, otherwise the
    /// contents are overwritten in place.
    pub fn write_to_buffers<'n>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        roots: impl IntoIterator<Item = &'n SceneNode>,
    ) {
        self.cpu.clear();
        for root in roots {
            self.cpu.extend_from(root);
        }

        for shape in &self.cpu.shapes()[self.meshes.len()..] {
            let label = shape.label();
            log::debug!("Creating mesh {}", label);
            self.meshes
                .push(Mesh::from_geometry(device, &label, &shape.geometry()));
        }

        for (idx, (key, instances)) in self.cpu.batches().iter().enumerate() {
            let needs_new_buffer = self
                .gpu
                .get(idx)
                .is_none_or(|batch| batch.capacity < instances.len());
            if needs_new_buffer {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Instance Buffer"),
                    contents: bytemuck::cast_slice(instances),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                let batch = GpuBatch {
                    key: *key,
                    buffer,
                    amount: instances.len(),
                    capacity: instances.len(),
                };
                if idx < self.gpu.len() {
                    self.gpu[idx] = batch;
                } else {
                    self.gpu.push(batch);
                }
            } else if let Some(batch) = self.gpu.get_mut(idx) {
                queue.write_buffer(&batch.buffer, 0, bytemuck::cast_slice(instances));
                batch.amount = instances.len();
            }
        }
    }

    pub fn get_render(&self) -> Render<'_> {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for batch in &self.gpu {
            let Some(mesh) = self.meshes.get(batch.key.shape) else {
                continue;
            };
            let instanced = Instanced {
                instance: &batch.buffer,
                mesh,
                amount: batch.amount,
                layers: batch.key.layers,
            };
            if batch.key.transparent {
                transparent.push(instanced);
            } else {
                opaque.push(instanced);
            }
        }
        Render::Composed(vec![
            Render::Defaults(opaque),
            Render::Transparents(transparent),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{instance::Transform, model::Material};

    fn blade() -> SceneNode {
        SceneNode::model(
            "blade",
            Shape::cylinder(0.4, 0.45, 0.01, 32),
            Material::phong(0xffffff).with_opacity(0.5),
        )
    }

    fn hub() -> SceneNode {
        SceneNode::model("hub", Shape::cylinder(0.3, 0.3, 0.3, 32), Material::default())
    }

    #[test]
    fn same_shape_and_mode_share_a_batch() {
        let root = SceneNode::container("root").with_children([
            hub(),
            hub().with_transform(Transform::at(1.0, 0.0, 0.0)),
            blade(),
        ]);
        let mut batches = InstanceBatches::new();
        batches.extend_from(&root);
        assert_eq!(batches.shapes().len(), 2);
        assert_eq!(batches.batches().len(), 2);
        assert_eq!(batches.batches()[0].1.len(), 2);
        assert!(batches.batches()[1].0.transparent);
    }

    #[test]
    fn layers_split_batches() {
        let mut moved = hub();
        moved.set_layer_recursive(1);
        let root = SceneNode::container("root").with_children([hub(), moved]);
        let mut batches = InstanceBatches::new();
        batches.extend_from(&root);
        assert_eq!(batches.shapes().len(), 1);
        let layers: Vec<_> = batches.batches().iter().map(|(k, _)| k.layers).collect();
        assert_eq!(layers, vec![Layers::only(0), Layers::only(1)]);
    }

    #[test]
    fn clear_keeps_order_for_the_next_frame() {
        let root = SceneNode::container("root").with_children([blade(), hub()]);
        let mut batches = InstanceBatches::new();
        batches.extend_from(&root);
        let keys: Vec<_> = batches.batches().iter().map(|(k, _)| *k).collect();
        batches.clear();
        assert_eq!(batches.instance_count(), 0);
        batches.extend_from(&root);
        let again: Vec<_> = batches.batches().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, again);
        assert_eq!(batches.instance_count(), 2);
    }
}

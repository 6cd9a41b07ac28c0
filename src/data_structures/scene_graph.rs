//! Scene graph and hierarchical scene organization.
//!
//! A [`SceneNode`] is plain data: a local transform, a layer mask, an optional
//! mesh description and owned children. Cloning a node deep-copies its whole
//! subtree, so copies never share transforms with the original.
//!
//! Nothing in here touches the GPU. [`SceneNode::collect_instances`] flattens a
//! tree into world-space [`InstanceRaw`]s which the batching code uploads.

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::{
    geometry::Shape,
    instance::{InstanceRaw, Transform},
    layers::Layers,
    model::Material,
};

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// A group that only carries a transform for its children.
    Container,
    Model { shape: Shape, material: Material },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: &'static str,
    pub transform: Transform,
    pub layers: Layers,
    pub kind: NodeKind,
    children: Vec<SceneNode>,
}

/// A mesh node flattened into world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldMesh {
    pub shape: Shape,
    pub material: Material,
    pub layers: Layers,
    pub raw: InstanceRaw,
}

impl SceneNode {
    pub fn container(name: &'static str) -> Self {
        Self {
            name,
            transform: Transform::default(),
            layers: Layers::default(),
            kind: NodeKind::Container,
            children: Vec::new(),
        }
    }

    pub fn model(name: &'static str, shape: Shape, material: Material) -> Self {
        Self {
            kind: NodeKind::Model { shape, material },
            ..Self::container(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn child(&self, idx: usize) -> Option<&SceneNode> {
        self.children.get(idx)
    }

    pub fn child_mut(&mut self, idx: usize) -> Option<&mut SceneNode> {
        self.children.get_mut(idx)
    }

    /// Depth-first search by name, including `self`.
    #[cfg(test)]
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Pre-order traversal of the subtree.
    pub fn traverse(&self, f: &mut dyn FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        f(self);
        for child in self.children.iter_mut() {
            child.traverse_mut(f);
        }
    }

    /// Move the whole subtree to `layer`, dropping any other membership.
    pub fn set_layer_recursive(&mut self, layer: u8) {
        self.traverse_mut(&mut |node| node.layers.set(layer));
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| {
            if let NodeKind::Model { .. } = node.kind {
                count += 1;
            }
        });
        count
    }

    /// Flatten the subtree into world space and hand every mesh node to `sink`.
    pub fn collect_instances(&self, sink: &mut dyn FnMut(WorldMesh)) {
        self.collect_with_parent(Matrix4::identity(), sink);
    }

    fn collect_with_parent(&self, parent: Matrix4<f32>, sink: &mut dyn FnMut(WorldMesh)) {
        let world = parent * self.transform.to_matrix();
        if let NodeKind::Model { shape, material } = self.kind {
            sink(WorldMesh {
                shape,
                material,
                layers: self.layers,
                raw: InstanceRaw::new(world, material.rgba()),
            });
        }
        for child in &self.children {
            child.collect_with_parent(world, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn tree() -> SceneNode {
        let cube = Shape::cuboid(1.0, 1.0, 1.0);
        SceneNode::container("root")
            .with_transform(Transform::at(0.0, 1.0, 0.0))
            .with_child(
                SceneNode::container("arm")
                    .with_transform(Transform::new().with_rotation(0.0, 0.0, FRAC_PI_2))
                    .with_child(
                        SceneNode::model("hand", cube, Material::default())
                            .with_transform(Transform::at(2.0, 0.0, 0.0)),
                    ),
            )
            .with_child(SceneNode::model("foot", cube, Material::phong(0xff0000)))
    }

    #[test]
    fn world_transform_is_parent_times_local() {
        let mut positions = Vec::new();
        tree().collect_instances(&mut |mesh| positions.push(mesh.raw.position()));
        // hand: rotated 90° about Z then lifted by the root
        let [x, y, z] = positions[0];
        assert!(x.abs() < 1e-5 && (y - 3.0).abs() < 1e-5 && z.abs() < 1e-5);
        assert_eq!(positions[1], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn clones_are_independent() {
        let original = tree();
        let mut copy = original.clone();
        if let Some(arm) = copy.child_mut(0) {
            arm.transform.rotation.z += 1.0;
        }
        assert_ne!(original, copy);
        assert_eq!(original, tree());
    }

    #[test]
    fn layers_are_replaced_in_the_whole_subtree() {
        let mut root = tree();
        root.set_layer_recursive(1);
        let mut all_on_one = true;
        root.traverse(&mut |node| all_on_one &= node.layers == Layers::only(1));
        assert!(all_on_one);
    }

    #[test]
    fn find_and_count() {
        let root = tree();
        assert_eq!(root.mesh_count(), 2);
        assert!(root.find("hand").is_some());
        assert!(root.find("tail").is_none());
        assert_eq!(root.child(1).map(|n| n.name), Some("foot"));
    }
}

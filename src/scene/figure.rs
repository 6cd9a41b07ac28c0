//! The electric fan figure.
//!
//! The tree is built once and afterwards only the wing and neck rotations
//! change:
//!
//! ```text
//! root (y = 1.8)
//! ├── neck
//! │   ├── wing: 4 blades, 3 hub cylinders
//! │   ├── 70 grille rings
//! │   └── cover, cap, button
//! └── support: post, taper, foot, base plate, peg
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::data_structures::{
    geometry::Shape,
    instance::Transform,
    model::Material,
    scene_graph::SceneNode,
};

pub const ROOT_HEIGHT: f32 = 1.8;
pub const BLADES: usize = 4;
pub const GRILLE_RINGS: usize = 70;
/// The figure is drawn by the filtered pass.
pub const FIGURE_LAYER: u8 = 1;

const NECK: usize = 0;
const SUPPORT: usize = 1;
const WING: usize = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    root: SceneNode,
}

impl Figure {
    pub fn build() -> Self {
        let mut root = SceneNode::container("figure")
            .with_transform(Transform::at(0.0, ROOT_HEIGHT, 0.0))
            .with_child(neck())
            .with_child(support());
        root.set_layer_recursive(FIGURE_LAYER);
        log::debug!("Built figure with {} meshes", root.mesh_count());
        Self { root }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn neck(&self) -> Option<&SceneNode> {
        self.root.child(NECK)
    }

    pub fn neck_mut(&mut self) -> Option<&mut SceneNode> {
        self.root.child_mut(NECK)
    }

    pub fn wing(&self) -> Option<&SceneNode> {
        self.neck()?.child(WING)
    }

    pub fn wing_mut(&mut self) -> Option<&mut SceneNode> {
        self.neck_mut()?.child_mut(WING)
    }

    pub fn support(&self) -> Option<&SceneNode> {
        self.root.child(SUPPORT)
    }
}

/// The child of a figure root that swings, used on copies of the tree.
pub fn neck_of(root: &mut SceneNode) -> Option<&mut SceneNode> {
    root.child_mut(NECK)
}

fn white() -> Material {
    Material::phong(0xffffff)
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Shape {
    Shape::cylinder(radius_top, radius_bottom, height, segments)
}

fn wing() -> SceneNode {
    let blades = (0..BLADES).map(|i| {
        let theta = i as f32 / BLADES as f32 * TAU;
        let blade = SceneNode::model(
            "blade",
            cylinder(0.4, 0.45, 0.01, 32),
            white().with_opacity(0.5),
        )
        .with_transform(
            Transform::new()
                .with_rotation(0.6 * PI, 0.0, 0.0)
                .with_scale(2.0, 1.4, 1.4),
        );
        SceneNode::container("blade_group")
            .with_transform(
                Transform::at(0.8 * theta.cos(), 0.8 * theta.sin(), 0.75)
                    .with_rotation(0.0, 0.0, theta),
            )
            .with_child(blade)
    });

    let hub = |name, radius, height, z| {
        SceneNode::model(name, cylinder(radius, radius, height, 32), white())
            .with_transform(Transform::at(0.0, 0.0, z).with_rotation(FRAC_PI_2, 0.0, 0.0))
    };

    SceneNode::container("wing")
        .with_children(blades)
        .with_child(hub("hub_front", 0.3, 0.3, 0.75))
        .with_child(hub("hub_shaft", 0.1, 0.5, 0.4))
        .with_child(hub("motor", 0.5, 1.2, -0.3))
}

fn neck() -> SceneNode {
    let rings = (0..GRILLE_RINGS).map(|i| {
        let angle = i as f32 / GRILLE_RINGS as f32 * TAU;
        let ring = SceneNode::model("grille_ring", Shape::torus(1.9, 0.01, 12, 48), white())
            .with_transform(Transform::new().with_rotation(FRAC_PI_2, 0.0, 0.0));
        SceneNode::container("grille_ring_group")
            .with_transform(
                Transform::at(0.0, 0.0, 0.8)
                    .with_rotation(0.0, 0.0, angle)
                    .with_scale(1.0, 1.0, 0.3),
            )
            .with_child(ring)
    });

    SceneNode::container("neck")
        .with_child(wing())
        .with_children(rings)
        .with_child(
            SceneNode::model("cover", Shape::torus(1.9, 0.05, 16, 20), white())
                .with_transform(Transform::at(0.0, 0.0, 0.8)),
        )
        .with_child(
            SceneNode::model("cap", cylinder(0.5, 0.5, 0.1, 16), white()).with_transform(
                Transform::at(0.0, 0.0, 1.4).with_rotation(FRAC_PI_2, 0.0, 0.0),
            ),
        )
        .with_child(
            SceneNode::model("button", cylinder(0.03, 0.03, 0.5, 16), white())
                .with_transform(Transform::at(0.0, 0.4, -0.01)),
        )
}

fn support() -> SceneNode {
    let part = |name, shape, x, y, z| {
        SceneNode::model(name, shape, white()).with_transform(Transform::at(x, y, z))
    };
    SceneNode::container("support")
        .with_child(part("post", cylinder(0.1, 0.1, 4.0, 32), 0.0, -2.0, 0.0))
        .with_child(part("taper", cylinder(0.13, 0.23, 3.0, 32), 0.0, -3.0, 0.0))
        .with_child(part("foot", cylinder(0.5, 0.7, 0.5, 32), 0.0, -4.36, 0.0))
        .with_child(part("base_plate", Shape::cuboid(3.1, 0.2, 3.1), 0.0, -4.5, 0.0))
        .with_child(part("peg", cylinder(0.05, 0.05, 0.3, 8), 1.0, -4.3, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{layers::Layers, scene_graph::NodeKind};

    fn count_named(node: &SceneNode, name: &str) -> usize {
        let mut count = 0;
        node.traverse(&mut |n| {
            if n.name == name {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn figure_has_all_parts() {
        let figure = Figure::build();
        let root = figure.root();
        assert_eq!(root.mesh_count(), 85);
        assert_eq!(count_named(root, "blade"), 4);
        assert_eq!(count_named(root, "grille_ring"), 70);
        assert_eq!(figure.wing().map(SceneNode::mesh_count), Some(7));
        assert_eq!(figure.support().map(SceneNode::mesh_count), Some(5));
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn root_children_are_neck_then_support() {
        let figure = Figure::build();
        assert_eq!(figure.neck().map(|n| n.name), Some("neck"));
        assert_eq!(figure.support().map(|n| n.name), Some("support"));
        assert_eq!(figure.wing().map(|n| n.name), Some("wing"));
        assert_eq!(figure.root().transform.position.y, ROOT_HEIGHT);
    }

    #[test]
    fn whole_figure_is_on_the_filtered_layer() {
        let figure = Figure::build();
        figure.root().traverse(&mut |node| {
            assert_eq!(node.layers, Layers::only(FIGURE_LAYER), "{}", node.name);
        });
    }

    #[test]
    fn only_blades_are_transparent() {
        let figure = Figure::build();
        figure.root().traverse(&mut |node| {
            if let NodeKind::Model { material, .. } = &node.kind {
                assert_eq!(material.transparent, node.name == "blade", "{}", node.name);
            }
        });
    }

    #[test]
    fn wing_rotation_moves_only_the_wing() {
        let mut figure = Figure::build();
        if let Some(wing) = figure.wing_mut() {
            wing.transform.rotation.z += 0.3;
        }
        assert_eq!(figure.wing().map(|w| w.transform.rotation.z), Some(0.3));
        assert_eq!(figure.neck().map(|n| n.transform.rotation.z), Some(0.0));
    }
}

#![allow(dead_code)]

use rand::{SeedableRng, rngs::StdRng};
use senpuki::{
    data_structures::scene_graph::SceneNode,
    scene::{figure::Figure, instancer, params::GridParams},
};

pub const SEED: u64 = 0x5e4f;

/// The primary figure and a seeded default grid of copies.
pub fn fan_field() -> (Figure, Vec<SceneNode>) {
    let figure = Figure::build();
    let mut rng = StdRng::seed_from_u64(SEED);
    let instances = instancer::instantiate(figure.root(), &GridParams::default(), &mut rng);
    (figure, instances)
}

pub fn neck_rotation(root: &SceneNode) -> (f32, f32) {
    let neck = &root.children()[0].transform.rotation;
    (neck.y, neck.z)
}

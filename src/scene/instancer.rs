//! Grid of randomised figure copies.

use std::f32::consts::TAU;

use cgmath::Vector3;
use rand::Rng;

use crate::{data_structures::scene_graph::SceneNode, scene::params::GridParams};

/// Deep copies of `template`, one per grid cell in row-major order.
///
/// Each copy keeps the template's height and Y rotation and gets a jittered X
/// position, random X and Z rotations and a random per-axis scale.
pub fn instantiate<R: Rng + ?Sized>(
    template: &SceneNode,
    grid: &GridParams,
    rng: &mut R,
) -> Vec<SceneNode> {
    let mut instances = Vec::with_capacity(grid.len());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let [x, z] = grid.base_position(row, col);
            let mut copy = template.clone();
            let transform = &mut copy.transform;
            transform.position.x = x + uniform(rng, grid.jitter);
            transform.position.z = z;
            transform.rotation.x = uniform(rng, TAU);
            transform.rotation.z = uniform(rng, TAU) - 1.0;
            transform.scale = Vector3::new(
                uniform(rng, grid.max_scale),
                uniform(rng, grid.max_scale),
                uniform(rng, grid.max_scale),
            );
            instances.push(copy);
        }
    }
    log::info!(
        "Placed {} figure copies on a {}x{} grid",
        instances.len(),
        grid.rows,
        grid.cols
    );
    instances
}

/// Sample from `[0, max)`; an empty range yields 0.
fn uniform<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::scene::figure::{Figure, ROOT_HEIGHT};

    #[test]
    fn copies_follow_the_grid() {
        let figure = Figure::build();
        let grid = GridParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let instances = instantiate(figure.root(), &grid, &mut rng);
        assert_eq!(instances.len(), 100);

        for (idx, instance) in instances.iter().enumerate() {
            let [x, z] = grid.base_position(idx / grid.cols, idx % grid.cols);
            let t = &instance.transform;
            assert!(t.position.x >= x && t.position.x < x + grid.jitter);
            assert_eq!(t.position.z, z);
            assert_eq!(t.position.y, ROOT_HEIGHT);
            assert!((0.0..TAU).contains(&t.rotation.x));
            assert!((-1.0..TAU - 1.0).contains(&t.rotation.z));
            assert_eq!(t.rotation.y, 0.0);
            for s in [t.scale.x, t.scale.y, t.scale.z] {
                assert!((0.0..grid.max_scale).contains(&s));
            }
        }
    }

    #[test]
    fn same_seed_same_field() {
        let figure = Figure::build();
        let grid = GridParams::default();
        let a = instantiate(figure.root(), &grid, &mut StdRng::seed_from_u64(3));
        let b = instantiate(figure.root(), &grid, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_jitter_keeps_the_base_position() {
        let figure = Figure::build();
        let grid = GridParams {
            jitter: 0.0,
            ..Default::default()
        };
        let instances = instantiate(figure.root(), &grid, &mut StdRng::seed_from_u64(1));
        assert_eq!(instances[0].transform.position.x, -90.0);
        assert_eq!(instances[99].transform.position.x, 90.0);
    }
}

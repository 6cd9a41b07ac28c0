use senpuki::data_structures::{
    batch::InstanceBatches,
    layers::Layers,
    scene_graph::{NodeKind, SceneNode},
};

mod common;

fn shapes_of(root: &SceneNode) -> Vec<String> {
    let mut shapes = Vec::new();
    root.traverse(&mut |node| {
        if let NodeKind::Model { shape, .. } = &node.kind {
            shapes.push(shape.label());
        }
    });
    shapes
}

#[test]
fn copies_are_deep_and_independent() {
    let (figure, mut instances) = common::fan_field();
    assert_eq!(instances.len(), 100);
    let untouched = instances[1].clone();
    let primary = figure.root().clone();

    instances[0].transform.position.y += 10.0;
    instances[0]
        .child_mut(0)
        .expect("neck")
        .transform
        .rotation
        .y += 1.0;

    assert_eq!(instances[1], untouched);
    assert_eq!(figure.root(), &primary);
    assert_eq!(shapes_of(&instances[0]), shapes_of(figure.root()));
}

#[test]
fn first_copy_sits_in_the_grid_corner() {
    let (_, instances) = common::fan_field();
    let first = &instances[0].transform.position;
    assert!((-90.0..-88.0).contains(&first.x));
    assert_eq!(first.z, -90.0);
    let last = &instances[99].transform.position;
    assert!((90.0..92.0).contains(&last.x));
    assert_eq!(last.z, 90.0);
}

#[test]
fn whole_field_is_batched_on_the_figure_layer() {
    let (figure, instances) = common::fan_field();
    let mut batches = InstanceBatches::new();
    batches.extend_from(figure.root());
    for instance in &instances {
        batches.extend_from(instance);
    }

    assert_eq!(batches.instance_count(), 85 * 101);
    for (key, _) in batches.batches() {
        assert_eq!(key.layers, Layers::only(1));
    }
    let transparent: usize = batches
        .batches()
        .iter()
        .filter(|(key, _)| key.transparent)
        .map(|(_, instances)| instances.len())
        .sum();
    assert_eq!(transparent, 4 * 101);
}

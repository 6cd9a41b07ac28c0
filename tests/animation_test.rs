use senpuki::animation::AnimationState;

mod common;

#[test]
fn stays_still_until_toggled() {
    let (mut figure, mut instances) = common::fan_field();
    let mut state = AnimationState::default();
    for _ in 0..120 {
        state.frame(&mut figure, &mut instances);
    }
    assert_eq!(figure.wing().map(|w| w.transform.rotation.z), Some(0.0));
    assert_eq!(figure.neck().map(|n| n.transform.rotation.y), Some(0.0));
    for instance in &instances {
        assert_eq!(common::neck_rotation(instance), (0.0, 0.0));
    }
}

#[test]
fn spins_up_then_eases_back_to_rest() {
    let (mut figure, mut instances) = common::fan_field();
    let mut state = AnimationState::default();

    state.toggle();
    for _ in 0..30 {
        state.frame(&mut figure, &mut instances);
    }
    assert!((state.wing.speed - 0.3).abs() < 1e-5);

    state.toggle();
    let mut last = state.wing.speed;
    for _ in 0..30 {
        let delta = state.frame(&mut figure, &mut instances);
        assert!(delta.wing >= 0.0);
        if last > 0.0 {
            assert!(delta.wing < last);
        }
        last = delta.wing;
    }

    let mut frames = 0;
    while state.wing.speed > 0.0 || state.neck.speed > 0.0 {
        state.frame(&mut figure, &mut instances);
        frames += 1;
        assert!(frames < 1000);
    }
    let before = figure.wing().map_or(0.0, |w| w.transform.rotation.z);
    state.frame(&mut figure, &mut instances);
    assert_eq!(figure.wing().map(|w| w.transform.rotation.z), Some(before));
}

#[test]
fn copies_follow_the_primary_neck() {
    let (mut figure, mut instances) = common::fan_field();
    let mut state = AnimationState::default();
    state.toggle();
    for _ in 0..200 {
        state.frame(&mut figure, &mut instances);
    }
    let primary_neck = figure.neck().map_or(0.0, |n| n.transform.rotation.y);
    let primary_wing = figure.wing().map_or(0.0, |w| w.transform.rotation.z);
    assert!((0.0..std::f32::consts::TAU).contains(&primary_wing));
    for instance in &instances {
        let (y, z) = common::neck_rotation(instance);
        assert!((y - primary_neck).abs() < 1e-4);
        assert_eq!(z, primary_wing);
    }
}

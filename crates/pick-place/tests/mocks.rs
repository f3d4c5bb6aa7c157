use pick_place::{
    ForceSensor, Manipulator, ManipulatorState, MockForceSensor, MockManipulator,
    MockObjectDetector, ObjectDetector, SharedWorld, Vec3, WorldState,
};

const OBJECT: Vec3 = Vec3::new(1.0, 2.0, 3.0);

fn shared_world(slip_probability: f64) -> SharedWorld {
    WorldState::new(OBJECT, ManipulatorState::new("arm"))
        .with_slip_probability(slip_probability)
        .into_shared()
}

fn reliable_arm(world: &SharedWorld) -> MockManipulator {
    MockManipulator::new(world.clone(), 1)
        .with_move_success_rate(1.0)
        .with_grasp_success_rate(1.0)
}

#[test]
fn successful_move_sets_the_end_effector() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world);

    assert!(arm.move_to_position(Vec3::new(3.0, 3.0, 3.0)));
    assert_eq!(arm.endeffector_position(), Some(Vec3::new(3.0, 3.0, 3.0)));
}

#[test]
fn failed_move_leaves_the_end_effector_unknown() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world).with_move_success_rate(0.0);

    let grasp = arm.grasp_position_for(OBJECT);
    assert!(!arm.move_to_position(grasp));
    assert_eq!(arm.endeffector_position(), None);

    // Even though the arm was sent to the exact grasp pose, nothing can be attached.
    assert!(!world.borrow().is_object_within_grasp_offset());
    assert!(arm.grasp());
    assert!(!world.borrow().holding_object());
}

#[test]
fn grasp_and_release_update_the_world() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world);

    let grasp = arm.grasp_position_for(OBJECT);
    assert!(arm.move_to_position(grasp));
    assert!(arm.grasp());
    assert!(world.borrow().holding_object());

    assert!(arm.release());
    assert!(!world.borrow().holding_object());
}

#[test]
fn grasp_is_idempotent_when_closed() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world);
    assert!(arm.grasp());

    // A closed gripper reports success without another draw, whatever the rate.
    let mut arm = arm.with_grasp_success_rate(0.0);
    for _ in 0..5 {
        assert!(arm.grasp());
        assert!(arm.gripper_closed());
    }
}

#[test]
fn release_is_idempotent_when_open() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world);
    for _ in 0..5 {
        assert!(arm.release());
        assert!(!arm.gripper_closed());
    }
}

#[test]
fn failed_grasp_leaves_the_gripper_open() {
    let world = shared_world(0.0);
    let mut arm = reliable_arm(&world).with_grasp_success_rate(0.0);
    assert!(!arm.grasp());
    assert!(!arm.gripper_closed());
}

#[test]
fn detector_reports_the_true_position_or_nothing() {
    let world = shared_world(0.0);
    let mut detector = MockObjectDetector::new(world.clone(), 3).with_detection_rate(0.5);

    let mut seen = 0;
    for _ in 0..200 {
        if let Some(position) = detector.detect_object() {
            assert_eq!(position, OBJECT);
            seen += 1;
        }
    }
    assert!(seen > 0 && seen < 200);
}

#[test]
fn detector_never_sees_a_hidden_object() {
    let world = shared_world(0.0);
    world.borrow_mut().set_object_visible(false);
    let mut detector = MockObjectDetector::new(world.clone(), 3).with_detection_rate(1.0);
    assert_eq!(detector.detect_object(), None);
}

#[test]
fn force_sensor_has_no_false_positives() {
    let world = shared_world(0.0);
    let mut sensor = MockForceSensor::new(world.clone(), 5).with_detection_rate(1.0);
    assert!(!sensor.detect_force());

    let mut arm = reliable_arm(&world);
    let grasp = arm.grasp_position_for(OBJECT);
    arm.move_to_position(grasp);
    arm.grasp();
    assert!(sensor.detect_force());
}

#[test]
fn slipped_grasp_is_invisible_to_the_force_sensor() {
    let world = shared_world(1.0);
    let mut arm = reliable_arm(&world);
    let mut sensor = MockForceSensor::new(world.clone(), 5).with_detection_rate(1.0);

    let grasp = arm.grasp_position_for(OBJECT);
    arm.move_to_position(grasp);
    assert!(arm.grasp());
    assert!(world.borrow().is_slip_latched());
    assert!(!sensor.detect_force());
}

#[test]
fn same_seed_same_outcomes() {
    let outcomes = |seed| {
        let world = shared_world(0.0);
        let mut arm = MockManipulator::new(world, seed);
        (0..32)
            .map(|i| arm.move_to_position(Vec3::new(i as f64, 0.0, 0.0)))
            .collect::<Vec<_>>()
    };
    assert_eq!(outcomes(11), outcomes(11));
}

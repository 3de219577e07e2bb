use super::*;

fn machine() -> ReadinessMachine {
    ReadinessMachine::new(ReadinessConfig::default(), true)
}

fn good(angle: f32) -> ReadinessSignals {
    ReadinessSignals {
        visible_ratio: 1.0,
        in_start_position: true,
        in_motion_range: true,
        tracked_angle: Some(angle),
    }
}

fn out_of_position(angle: f32) -> ReadinessSignals {
    ReadinessSignals {
        in_start_position: false,
        ..good(angle)
    }
}

fn invisible() -> ReadinessSignals {
    ReadinessSignals {
        visible_ratio: 0.0,
        in_start_position: false,
        in_motion_range: false,
        tracked_angle: None,
    }
}

fn drive_to_ready(m: &mut ReadinessMachine) {
    for _ in 0..8 {
        m.update(&good(170.0));
    }
    assert_eq!(m.state(), ReadinessState::ReadyToStart);
}

fn drive_to_exercising(m: &mut ReadinessMachine) {
    drive_to_ready(m);
    m.update(&good(160.0));
    assert_eq!(m.state(), ReadinessState::Exercising);
}

#[test]
fn test_first_good_frame_starts_confirmation() {
    let mut m = machine();
    let update = m.update(&good(170.0));
    assert_eq!(m.state(), ReadinessState::GettingReady);
    assert_eq!(m.confirm_count(), 1);
    assert_eq!(
        update.transition,
        Some(ReadinessTransition {
            from: ReadinessState::NotReady,
            to: ReadinessState::GettingReady,
        })
    );
}

#[test]
fn test_confirmation_reaches_ready_on_eighth_frame() {
    let mut m = machine();
    for _ in 0..7 {
        m.update(&good(170.0));
    }
    assert_eq!(m.state(), ReadinessState::GettingReady);
    m.update(&good(170.0));
    assert_eq!(m.state(), ReadinessState::ReadyToStart);
}

#[test]
fn test_single_bad_frame_does_not_reset() {
    let mut m = machine();
    for _ in 0..7 {
        m.update(&good(170.0));
    }
    m.update(&out_of_position(170.0));
    assert_eq!(m.state(), ReadinessState::GettingReady);
    assert_eq!(m.confirm_count(), 7);
    assert_eq!(m.bad_count(), 1);
}

#[test]
fn test_exceeding_bad_frame_tolerance_resets() {
    let mut m = machine();
    for _ in 0..5 {
        m.update(&good(170.0));
    }
    for _ in 0..20 {
        m.update(&out_of_position(170.0));
    }
    assert_eq!(m.state(), ReadinessState::GettingReady);

    m.update(&out_of_position(170.0));
    assert_eq!(m.state(), ReadinessState::NotReady);
    assert_eq!(m.confirm_count(), 0);
    assert_eq!(m.bad_count(), 0);
}

#[test]
fn test_invisible_frame_short_circuits_before_exercising() {
    let mut m = machine();
    for _ in 0..5 {
        m.update(&good(170.0));
    }
    let update = m.update(&invisible());
    assert!(!update.complete);
    assert_eq!(m.state(), ReadinessState::NotReady);
    assert_eq!(m.confirm_count(), 0);
}

#[test]
fn test_invisible_frames_never_advance() {
    let mut m = machine();
    for _ in 0..50 {
        m.update(&invisible());
        assert_eq!(m.state(), ReadinessState::NotReady);
    }
}

#[test]
fn test_ready_waits_for_movement() {
    let mut m = machine();
    drive_to_ready(&mut m);
    m.update(&good(171.0));
    assert_eq!(m.state(), ReadinessState::ReadyToStart);
    let update = m.update(&good(165.0));
    assert_eq!(m.state(), ReadinessState::Exercising);
    assert_eq!(update.transition.map(|t| t.to), Some(ReadinessState::Exercising));
}

#[test]
fn test_exercising_survives_short_visibility_loss() {
    let mut m = machine();
    drive_to_exercising(&mut m);
    for _ in 0..30 {
        m.update(&invisible());
    }
    assert_eq!(m.state(), ReadinessState::Exercising);
    m.update(&good(150.0));
    assert_eq!(m.out_of_range_count(), 0);
}

#[test]
fn test_exercising_uses_relaxed_completeness() {
    let mut m = machine();
    drive_to_exercising(&mut m);
    let partial = ReadinessSignals {
        visible_ratio: 0.7,
        ..good(120.0)
    };
    let update = m.update(&partial);
    assert!(update.complete);
    assert_eq!(m.out_of_range_count(), 0);
}

#[test]
fn test_exercising_exits_after_tolerance() {
    let mut m = machine();
    drive_to_exercising(&mut m);
    let out_of_range = ReadinessSignals {
        in_motion_range: false,
        ..good(10.0)
    };
    for _ in 0..90 {
        m.update(&out_of_range);
    }
    assert_eq!(m.state(), ReadinessState::Exercising);
    let update = m.update(&out_of_range);
    assert_eq!(m.state(), ReadinessState::NotReady);
    assert_eq!(update.transition.map(|t| t.from), Some(ReadinessState::Exercising));
}

#[test]
fn test_static_hold_skips_movement_wait() {
    let mut m = ReadinessMachine::new(ReadinessConfig::default(), false);
    for _ in 0..8 {
        m.update(&good(175.0));
    }
    assert_eq!(m.state(), ReadinessState::Exercising);
}

#[test]
fn test_messages_follow_state() {
    let mut m = machine();
    m.update(&invisible());
    assert_eq!(
        m.message("Squat", "stand tall", 0),
        "Step back so your whole body is visible"
    );

    m.update(&out_of_position(120.0));
    assert_eq!(m.message("Squat", "stand tall", 0), "Get into position: stand tall");

    for _ in 0..3 {
        m.update(&good(170.0));
    }
    assert_eq!(m.message("Squat", "stand tall", 0), "Hold still... (3/8)");

    for _ in 0..5 {
        m.update(&good(170.0));
    }
    assert_eq!(m.message("Squat", "stand tall", 0), "Ready, begin your squat");

    m.update(&good(150.0));
    assert_eq!(m.message("Squat", "stand tall", 4), "Reps: 4");
}

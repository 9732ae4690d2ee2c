use super::*;

#[test]
fn phases_are_globally_ordered() {
    assert!(Phase::PreTrigger < Phase::Collapse);
    assert!(Phase::Collapse < Phase::Ignition);
    assert!(Phase::Ignition < Phase::Settle);
    assert!(Phase::Settle < Phase::Steady);
    assert!(Phase::Steady < Phase::Active);
    assert!(Phase::Active < Phase::Retired);
}

#[test]
fn sanitize_clamps_every_channel() {
    let s = VisualState {
        position: Vec3::new(f32::NAN, 0.0, 0.0),
        size: -3.0,
        color: Vec3::new(-1.0, 2.0, f32::NAN),
        opacity: 1.7,
        phase: Phase::Steady,
    }
    .sanitized();
    assert_eq!(s.size, 0.0);
    assert_eq!(s.opacity, 0.0);
    assert_eq!(s.color, Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(s.position, Vec3::ZERO);
    assert!(!s.is_visible());
}

#[test]
fn sanitize_keeps_valid_states() {
    let s = VisualState {
        position: Vec3::ONE,
        size: 2.0,
        color: Vec3::splat(0.5),
        opacity: 0.4,
        phase: Phase::Active,
    };
    assert_eq!(s.sanitized(), s);
    assert!(s.is_visible());
}

#[test]
fn default_durations_validate() {
    PhaseDurations::default().validate().unwrap();
}

#[test]
fn bad_durations_are_rejected() {
    let mut d = PhaseDurations::default();
    d.flash = 0.0;
    assert!(d.validate().is_err());

    let mut d = PhaseDurations::default();
    d.settle = 0.5;
    assert!(d.validate().is_err());

    let mut d = PhaseDurations::default();
    d.wind_end = Some(0.1);
    assert!(d.validate().is_err());
}

#[test]
fn durations_fill_missing_fields_from_defaults() {
    let d: PhaseDurations = serde_json::from_str(r#"{"flash":1.0}"#).unwrap();
    assert_eq!(d.flash, 1.0);
    assert_eq!(d.settle, PhaseDurations::default().settle);
}

use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = 123.0 * fps.frame_duration_secs();
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn clock_caps_large_deltas() {
    let mut clock = SimClock::new(0.1);
    assert_eq!(clock.advance(0.05), 0.05);
    assert_eq!(clock.advance(2.0), 0.1);
    assert!((clock.elapsed() - 0.15).abs() < 1e-12);
}

#[test]
fn clock_ignores_negative_and_nan() {
    let mut clock = SimClock::new(0.1);
    assert_eq!(clock.advance(-1.0), 0.0);
    assert_eq!(clock.advance(f64::NAN), 0.0);
    assert_eq!(clock.elapsed(), 0.0);
}

#[test]
fn clock_without_cap_accepts_any_delta() {
    let mut clock = SimClock::new(0.0);
    clock.advance(5.0);
    assert_eq!(clock.elapsed(), 5.0);
}

#[test]
fn linear_color_is_premultiplied() {
    let px = Rgba8Premul::from_linear(Vec3::new(1.0, 0.5, 0.0), 0.5);
    assert_eq!(px.a, 128);
    assert_eq!(px.r, 128);
    assert_eq!(px.g, 64);
    assert_eq!(px.b, 0);
}

use super::*;

fn particle(kind: ParticleKind, trigger: f32) -> Particle {
    Particle {
        id: 0,
        kind,
        base_position: Vec3::new(1.0, 2.0, 3.0),
        base_offset: Vec3::new(4.0, -2.0, 1.0),
        anchor: None,
        trigger_time: trigger,
        base_color: Vec3::new(0.7, 0.85, 1.0),
        base_size: 10.0,
        base_opacity: 0.9,
        intensity: 2.0,
        phase: 1.3,
        direction: Vec3::new(0.0, 0.6, 0.8),
    }
}

const ALL_KINDS: [ParticleKind; 17] = [
    ParticleKind::Singularity,
    ParticleKind::Foam,
    ParticleKind::Plasma,
    ParticleKind::Proton,
    ParticleKind::Neutron,
    ParticleKind::Electron,
    ParticleKind::Helium,
    ParticleKind::Star,
    ParticleKind::BirthCloud,
    ParticleKind::AccretionDisk,
    ParticleKind::ShockFront,
    ParticleKind::StellarWind,
    ParticleKind::Void,
    ParticleKind::ProtoStar,
    ParticleKind::Dust,
    ParticleKind::Nebula,
    ParticleKind::Filament,
];

#[test]
fn ignition_flash_is_white_and_oversized() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::Star, 2.0);
    let s = evolve(&p, Vec3::ZERO, 2.4, &d);
    assert_eq!(s.phase, Phase::Ignition);
    assert_eq!(s.color, Vec3::ONE);
    assert!(s.size > p.base_size * p.intensity);
}

#[test]
fn star_is_hidden_before_trigger() {
    let d = PhaseDurations::default();
    let s = evolve(&particle(ParticleKind::Star, 5.0), Vec3::ZERO, 1.0, &d);
    assert_eq!(s.size, 0.0);
    assert_eq!(s.phase, Phase::PreTrigger);
}

#[test]
fn star_settles_then_twinkles_within_bounds() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::Star, 0.0);
    assert_eq!(evolve(&p, Vec3::ZERO, 1.5, &d).phase, Phase::Settle);
    let nominal = p.base_size * p.intensity;
    for i in 0..200 {
        let s = evolve(&p, Vec3::ZERO, 3.0 + f64::from(i) * 0.05, &d);
        assert_eq!(s.phase, Phase::Steady);
        assert!(s.size >= nominal * 0.7 - 1e-4 && s.size <= nominal + 1e-4);
        assert_eq!(s.color, p.base_color);
    }
}

#[test]
fn phases_never_regress_over_increasing_time() {
    let d = PhaseDurations::default();
    for kind in ALL_KINDS {
        let p = particle(kind, 6.0);
        let mut last = Phase::PreTrigger;
        for i in 0..=2_000 {
            let s = evolve(&p, Vec3::ZERO, f64::from(i) * 0.01, &d);
            assert!(s.phase >= last, "{kind:?} regressed from {last:?} to {:?}", s.phase);
            last = s.phase;
        }
    }
}

#[test]
fn size_and_opacity_stay_in_range_everywhere() {
    let mut d = PhaseDurations::default();
    d.flash_gain = 12.0;
    for kind in ALL_KINDS {
        for trigger in [-3.0f32, 0.0, 2.0, 9.5] {
            let p = particle(kind, trigger);
            for i in 0..1_500 {
                let s = evolve(&p, Vec3::ZERO, f64::from(i) * 0.013, &d);
                assert!(s.size >= 0.0, "{kind:?} size {}", s.size);
                assert!((0.0..=1.0).contains(&s.opacity));
                assert!(s.color.min_element() >= 0.0);
            }
        }
    }
}

#[test]
fn evaluation_is_idempotent() {
    let d = PhaseDurations::default();
    for kind in ALL_KINDS {
        let p = particle(kind, 1.0);
        for t in [0.0, 0.5, 1.2, 3.3, 7.9, 42.0] {
            assert_eq!(evolve(&p, Vec3::ONE, t, &d), evolve(&p, Vec3::ONE, t, &d));
        }
    }
}

#[test]
fn collapse_pulls_cloud_toward_anchor() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::BirthCloud, 10.0);
    let early = evolve(&p, Vec3::ZERO, 6.5, &d);
    let late = evolve(&p, Vec3::ZERO, 9.9, &d);
    assert_eq!(early.phase, Phase::Collapse);
    assert!(late.position.length() < early.position.length());
    assert!(late.color.x > p.base_color.x);
}

#[test]
fn dispersing_cloud_retires() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::BirthCloud, 0.0);
    assert_eq!(evolve(&p, Vec3::ZERO, 1.0, &d).phase, Phase::Active);
    let gone = evolve(&p, Vec3::ZERO, f64::from(d.dispersal) + 0.1, &d);
    assert_eq!(gone.phase, Phase::Retired);
    assert!(!gone.is_visible());
}

#[test]
fn captured_electron_orbits_at_fixed_radius() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::Electron, 0.0);
    let center = Vec3::new(3.0, 3.0, 3.0);
    for i in 0..50 {
        let s = evolve(&p, center, 1.0 + f64::from(i) * 0.1, &d);
        assert_eq!(s.phase, Phase::Active);
        assert!((s.position.distance(center) - d.orbit_radius).abs() < 1e-4);
    }
}

#[test]
fn ejecta_moves_outward_and_retires() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::ShockFront, 0.0);
    let a = evolve(&p, Vec3::ZERO, 0.5, &d);
    let b = evolve(&p, Vec3::ZERO, 2.0, &d);
    assert!(b.position.length() > a.position.length());
    assert!(b.position.length() <= d.ejecta_radius + 1e-3);
    let done = evolve(&p, Vec3::ZERO, f64::from(d.ejecta_age) + 0.01, &d);
    assert_eq!(done.phase, Phase::Retired);
    assert_eq!(done.size, 0.0);
}

#[test]
fn wind_wraps_on_its_period() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::StellarWind, 0.0);
    let a = evolve(&p, Vec3::ZERO, 1.0, &d);
    let b = evolve(&p, Vec3::ZERO, 1.0 + f64::from(d.wind_period), &d);
    assert!((a.position - b.position).length() < 1e-3);
    assert!(a.position.length() <= d.wind_radius + 1e-3);
    assert_eq!(evolve(&p, Vec3::ZERO, 8.5, &d).phase, Phase::Retired);
}

#[test]
fn disk_is_consumed_by_the_flash() {
    let d = PhaseDurations::default();
    let p = particle(ParticleKind::AccretionDisk, 5.0);
    assert_eq!(evolve(&p, Vec3::ZERO, 1.0, &d).size, 0.0);
    assert_eq!(evolve(&p, Vec3::ZERO, 4.0, &d).phase, Phase::Collapse);
    let flash = evolve(&p, Vec3::ZERO, 5.2, &d);
    assert_eq!(flash.phase, Phase::Ignition);
    assert_eq!(flash.color, Vec3::ONE);
    assert_eq!(evolve(&p, Vec3::ZERO, 6.0, &d).phase, Phase::Retired);
}

#[test]
fn ambient_kinds_are_visible_before_trigger() {
    let d = PhaseDurations::default();
    let s = evolve(&particle(ParticleKind::Dust, 5.0), Vec3::ZERO, 1.0, &d);
    assert_eq!(s.phase, Phase::PreTrigger);
    assert!(s.is_visible());
}

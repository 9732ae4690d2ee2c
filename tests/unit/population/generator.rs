use super::*;
use crate::population::kind::Span;
use rand::{SeedableRng, rngs::StdRng};

fn stars(count: usize) -> PopulationSpec {
    PopulationSpec::new(
        "stars",
        count,
        Distribution::Sphere { radius: 50.0 },
        vec![Variant::solid(
            ParticleKind::Star,
            1.0,
            Vec3::ONE,
            Span::new(8.0, 20.0),
        )],
    )
    .with_trigger(TriggerSpec::Staggered {
        span: 15.0,
        jitter: 2.0,
    })
}

fn clouds(count: usize) -> PopulationSpec {
    PopulationSpec::new(
        "clouds",
        count,
        Distribution::Shell {
            inner: 8.0,
            outer: 28.0,
            exponent: 1.0,
        },
        vec![Variant::solid(
            ParticleKind::BirthCloud,
            1.0,
            Vec3::new(0.2, 0.3, 0.5),
            Span::new(2.5, 7.5),
        )],
    )
    .anchored_to("stars")
    .with_trigger(TriggerSpec::InheritAnchor { offset: 0.0 })
}

#[test]
fn population_has_requested_count_and_unique_ids() {
    let mut rng = StdRng::seed_from_u64(11);
    let pop = generate(&stars(180), &mut rng, None).unwrap();
    assert_eq!(pop.len(), 180);
    for (i, p) in pop.particles().iter().enumerate() {
        assert_eq!(p.id as usize, i);
        assert_eq!(p.base_offset, Vec3::ZERO);
        assert!(p.anchor.is_none());
    }
}

#[test]
fn staggered_triggers_follow_sequence_within_jitter() {
    let mut rng = StdRng::seed_from_u64(12);
    let pop = generate(&stars(100), &mut rng, None).unwrap();
    for p in pop.particles() {
        let nominal = p.id as f32 / 100.0 * 15.0;
        assert!((p.trigger_time - nominal).abs() <= 1.0 + 1e-5);
    }
}

#[test]
fn linked_indices_stay_within_anchor_bounds() {
    let mut rng = StdRng::seed_from_u64(13);
    let anchor = generate(&stars(100), &mut rng, None).unwrap();
    let linked = generate(&clouds(20_000), &mut rng, Some(&anchor)).unwrap();
    assert_eq!(linked.len(), 20_000);
    for p in linked.particles() {
        let idx = p.anchor.unwrap() as usize;
        assert!(idx < 100);
        let host = &anchor.particles()[idx];
        assert_eq!(p.trigger_time, host.trigger_time);
        assert!((p.base_position - (host.base_position + p.base_offset)).length() < 1e-4);
    }
}

#[test]
fn linked_spec_without_anchor_is_an_error() {
    let mut rng = StdRng::seed_from_u64(14);
    let err = generate(&clouds(10), &mut rng, None).unwrap_err();
    assert!(err.to_string().starts_with("generation error:"));

    let empty = generate(&stars(0), &mut rng, None).unwrap();
    assert!(generate(&clouds(10), &mut rng, Some(&empty)).is_err());
}

#[test]
fn unlinked_spec_rejects_a_supplied_anchor() {
    let mut rng = StdRng::seed_from_u64(15);
    let anchor = generate(&stars(4), &mut rng, None).unwrap();
    assert!(generate(&stars(4), &mut rng, Some(&anchor)).is_err());
}

#[test]
fn inherit_trigger_requires_anchor_name() {
    let spec = stars(4).with_trigger(TriggerSpec::InheritAnchor { offset: 0.0 });
    assert!(spec.validate().is_err());
}

#[test]
fn seeded_generation_is_reproducible() {
    let a = generate(&stars(32), &mut StdRng::seed_from_u64(99), None).unwrap();
    let b = generate(&stars(32), &mut StdRng::seed_from_u64(99), None).unwrap();
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn home_applies_frame_spin() {
    let spec = stars(1).with_spin(Vec3::new(0.0, 1.0, 0.0));
    let pop = generate(&spec, &mut StdRng::seed_from_u64(5), None).unwrap();
    let p0 = pop.home(0, 0.0).unwrap();
    let p1 = pop.home(0, 1.0).unwrap();
    assert_eq!(p0, pop.particles()[0].base_position);
    assert!((p0.length() - p1.length()).abs() < 1e-3);
    assert!(pop.home(1, 0.0).is_none());
}

#[test]
fn sampled_attributes_respect_variant_ranges() {
    let pop = generate(&stars(500), &mut StdRng::seed_from_u64(6), None).unwrap();
    for p in pop.particles() {
        assert!((8.0..=20.0).contains(&p.base_size));
        assert!((0.0..=std::f32::consts::TAU).contains(&p.phase));
        assert!((p.direction.length() - 1.0).abs() < 1e-4);
    }
}

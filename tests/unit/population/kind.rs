use super::*;

fn nucleons() -> Vec<Variant> {
    let size = Span::new(0.1, 0.2);
    vec![
        Variant::solid(ParticleKind::Proton, 6.0, Vec3::X, size),
        Variant::solid(ParticleKind::Neutron, 1.0, Vec3::ONE, size),
        Variant::solid(ParticleKind::Electron, 1.0, Vec3::Z, size),
    ]
}

#[test]
fn pick_follows_cumulative_weights() {
    let variants = nucleons();
    let table = KindTable::new(&variants).unwrap();
    assert_eq!(table.pick(0.0).kind, ParticleKind::Proton);
    assert_eq!(table.pick(0.74).kind, ParticleKind::Proton);
    assert_eq!(table.pick(0.76).kind, ParticleKind::Neutron);
    assert_eq!(table.pick(0.9).kind, ParticleKind::Electron);
    assert_eq!(table.pick(1.0).kind, ParticleKind::Electron);
}

#[test]
fn zero_weight_entries_are_never_picked() {
    let size = Span::fixed(1.0);
    let variants = vec![
        Variant::solid(ParticleKind::Dust, 1.0, Vec3::ONE, size),
        Variant::solid(ParticleKind::Nebula, 0.0, Vec3::ONE, size),
    ];
    let table = KindTable::new(&variants).unwrap();
    for i in 0..=100 {
        assert_eq!(table.pick(i as f32 / 100.0).kind, ParticleKind::Dust);
    }
}

#[test]
fn empty_or_weightless_tables_are_rejected() {
    assert!(KindTable::new(&[]).is_err());
    let variants = vec![Variant::solid(
        ParticleKind::Dust,
        0.0,
        Vec3::ONE,
        Span::fixed(1.0),
    )];
    assert!(KindTable::new(&variants).is_err());
}

#[test]
fn negative_sizes_are_rejected() {
    let variants = vec![Variant::solid(
        ParticleKind::Star,
        1.0,
        Vec3::ONE,
        Span::new(-1.0, 2.0),
    )];
    assert!(KindTable::new(&variants).is_err());
}

#[test]
fn span_samples_stay_in_range() {
    let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(9);
    let span = Span::new(2.0, 5.0);
    for _ in 0..64 {
        let v = span.sample(&mut rng);
        assert!((2.0..=5.0).contains(&v));
    }
}

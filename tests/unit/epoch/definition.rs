use super::*;
use crate::{
    foundation::core::Vec3,
    population::{
        distribution::Distribution,
        kind::{ParticleKind, Span, Variant},
    },
};

fn spec(name: &str) -> PopulationSpec {
    PopulationSpec::new(
        name,
        10,
        Distribution::Sphere { radius: 1.0 },
        vec![Variant::solid(
            ParticleKind::Dust,
            1.0,
            Vec3::ONE,
            Span::fixed(0.1),
        )],
    )
}

fn minimal() -> EpochDefinition {
    EpochDefinition {
        id: EpochId::DarkAges,
        populations: vec![spec("a")],
        durations: PhaseDurations::default(),
        complete_after: 5.0,
        transition: TimelineScript::default(),
        limits: ControlLimits::default(),
        post: PostPreset::default(),
        materials: vec![MaterialBinding::new(MaterialId::Void)],
    }
}

#[test]
fn epoch_order_is_linear() {
    assert_eq!(EpochId::Planck.next(), Some(EpochId::Inflation));
    assert_eq!(EpochId::DarkAges.next(), Some(EpochId::CosmicDawn));
    assert_eq!(EpochId::CosmicDawn.next(), None);
    for pair in EpochId::ALL.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn epoch_ids_parse_from_cli_names() {
    assert_eq!("dark-ages".parse::<EpochId>().unwrap(), EpochId::DarkAges);
    assert_eq!("Cosmic_Dawn".parse::<EpochId>().unwrap(), EpochId::CosmicDawn);
    assert!("big-crunch".parse::<EpochId>().is_err());
    assert_eq!(EpochId::Recombination.to_string(), "recombination");
    assert_eq!(EpochId::Plasma.label(), "Quark-Gluon Plasma");
}

#[test]
fn anchors_must_precede_dependents() {
    let mut def = minimal();
    def.validate().unwrap();
    def.populations.insert(0, spec("b").anchored_to("a"));
    let err = def.validate().unwrap_err();
    assert!(err.to_string().contains("not defined before"));
}

#[test]
fn duplicate_names_and_materials_are_rejected() {
    let mut def = minimal();
    def.populations.push(spec("a"));
    assert!(def.validate().is_err());

    let mut def = minimal();
    def.materials.push(MaterialBinding::new(MaterialId::Void));
    assert!(def.validate().is_err());
}

#[test]
fn completion_time_must_be_positive() {
    let mut def = minimal();
    def.complete_after = 0.0;
    assert!(def.validate().is_err());
    def.complete_after = f64::NAN;
    assert!(def.validate().is_err());
}

#[test]
fn post_preset_clamps_into_stage() {
    let preset = PostPreset {
        bloom_intensity: -1.0,
        bloom_threshold: 2.0,
        vignette_offset: 0.2,
        vignette_darkness: 0.9,
        noise_opacity: 0.5,
    };
    let mut post = PostFx::default();
    preset.apply(&mut post);
    assert_eq!(post.bloom_intensity, 0.0);
    assert_eq!(post.bloom_threshold, 1.0);
    assert_eq!(post.vignette_darkness, 0.9);
}

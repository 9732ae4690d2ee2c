use std::{f64::consts::PI, fs::File, io::BufReader, path::Path};

use crate::{
    animation::ease::Ease,
    controls::orbit::ControlLimits,
    epoch::definition::{EpochDefinition, EpochId, MaterialBinding, PostPreset},
    evolution::state::PhaseDurations,
    foundation::{
        core::{DVec3, Vec2, Vec3},
        error::{CosmosError, CosmosResult},
    },
    population::{
        distribution::Distribution,
        generator::{PopulationSpec, TriggerSpec},
        kind::{ParticleKind, Span, Variant},
    },
    timeline::{
        driver::{Cue, CueAction, ScheduledEffect, TimelineScript},
        stage::{MaterialId, MaterialUniforms, ParamTarget, ParamValue, Uniform},
    },
};

/// The full table of epoch definitions, one per [`EpochId`] in timeline order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Catalog {
    /// Definitions in timeline order.
    pub epochs: Vec<EpochDefinition>,
}

impl Catalog {
    /// The seven built-in epochs.
    pub fn builtin() -> Self {
        Self {
            epochs: vec![
                planck(),
                inflation(),
                plasma(),
                nucleosynthesis(),
                recombination(),
                dark_ages(),
                cosmic_dawn(),
            ],
        }
    }

    /// Parse a catalog from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> CosmosResult<Self> {
        let catalog: Self = serde_json::from_reader(r)
            .map_err(|e| CosmosError::serde(format!("parse catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string and validate it.
    pub fn from_json(s: &str) -> CosmosResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a catalog from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> CosmosResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CosmosError::validation(format!("open catalog JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON.
    pub fn to_json_pretty(&self) -> CosmosResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CosmosError::serde(format!("serialize catalog JSON: {e}")))
    }

    /// Definition of `id`.
    pub fn get(&self, id: EpochId) -> Option<&EpochDefinition> {
        self.epochs.iter().find(|d| d.id == id)
    }

    /// Check every definition plus the cross-epoch rules: all seven epochs present once, in
    /// order, and every material a transition writes registered by that epoch or the one
    /// before it.
    pub fn validate(&self) -> CosmosResult<()> {
        let ids: Vec<EpochId> = self.epochs.iter().map(|d| d.id).collect();
        if ids != EpochId::ALL {
            return Err(CosmosError::validation(format!(
                "catalog must list every epoch once in timeline order, got {ids:?}"
            )));
        }
        for (i, def) in self.epochs.iter().enumerate() {
            def.validate()?;
            let previous = i.checked_sub(1).map(|p| &self.epochs[p]);
            for id in def.script_materials() {
                let owned = def.materials.iter().any(|m| m.id == id)
                    || previous.is_some_and(|p| p.materials.iter().any(|m| m.id == id));
                if !owned {
                    return Err(CosmosError::validation(format!(
                        "epoch '{}' transition writes material {id:?}, which neither it nor the previous epoch registers",
                        def.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn material(id: MaterialId, uniform: Uniform) -> ParamTarget {
    ParamTarget::Material { id, uniform }
}

fn scalar(v: f64) -> ParamValue {
    ParamValue::Scalar(v)
}

fn vec3(x: f64, y: f64, z: f64) -> ParamValue {
    ParamValue::Vec3(DVec3::new(x, y, z))
}

fn hex(rgb: u32) -> Vec3 {
    let c = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(c(16), c(8), c(0))
}

fn camera_move(
    at: f64,
    duration: f64,
    position: (ParamValue, Ease),
    rotation: (ParamValue, Ease),
    fov: (f64, Ease),
) -> [ScheduledEffect; 3] {
    [
        ScheduledEffect::to(ParamTarget::CameraPosition, position.0, at, duration, position.1),
        ScheduledEffect::to(ParamTarget::CameraRotation, rotation.0, at, duration, rotation.1),
        ScheduledEffect::to(ParamTarget::CameraFov, scalar(fov.0), at, duration, fov.1),
    ]
}

fn release(at: f64, limits: ControlLimits) -> Cue {
    Cue {
        at,
        action: CueAction::ReleaseCamera(limits),
    }
}

fn stage_cue(at: f64, stage: u8) -> Cue {
    Cue {
        at,
        action: CueAction::SetStage(stage),
    }
}

fn planck() -> EpochDefinition {
    let limits = ControlLimits {
        min_distance: 1.0,
        max_distance: 20.0,
        ..ControlLimits::default()
    };
    EpochDefinition {
        id: EpochId::Planck,
        populations: vec![
            PopulationSpec::new(
                "singularity",
                1,
                Distribution::Point,
                vec![
                    Variant::solid(ParticleKind::Singularity, 1.0, Vec3::ONE, Span::fixed(0.3))
                        .with_intensity(Span::fixed(3.0)),
                ],
            ),
            PopulationSpec::new(
                "foam",
                10_000,
                Distribution::Sphere { radius: 2.0 },
                vec![Variant::solid(
                    ParticleKind::Foam,
                    1.0,
                    hex(0xaaaaaa),
                    Span::new(0.01, 0.02),
                )],
            ),
            PopulationSpec::new(
                "distant_foam",
                5_000,
                Distribution::Sphere { radius: 5.0 },
                vec![Variant::solid(
                    ParticleKind::Foam,
                    1.0,
                    hex(0x555555),
                    Span::new(0.007, 0.013),
                )],
            ),
        ],
        durations: PhaseDurations::default(),
        complete_after: 4.0,
        transition: TimelineScript {
            effects: vec![
                ScheduledEffect::to(
                    ParamTarget::CameraPosition,
                    vec3(0.0, 0.0, 5.0),
                    0.0,
                    2.0,
                    Ease::OutCubic,
                )
                .from(vec3(0.0, 0.0, 9.0)),
            ],
            cues: vec![release(2.0, limits)],
        },
        limits,
        post: PostPreset::default(),
        materials: vec![
            MaterialBinding::new(MaterialId::PlanckPoint),
            MaterialBinding::new(MaterialId::Foam),
            MaterialBinding::new(MaterialId::DistantFoam),
        ],
    }
}

fn inflation() -> EpochDefinition {
    let limits = ControlLimits {
        min_distance: 1.0,
        max_distance: 50.0,
        ..ControlLimits::default()
    };
    let mut effects = vec![
        ScheduledEffect::to(
            ParamTarget::CameraPosition,
            vec3(0.0, 0.0, 2.0),
            0.0,
            1.5,
            Ease::InCubic,
        ),
        ScheduledEffect::to(ParamTarget::CameraFov, scalar(120.0), 0.0, 1.5, Ease::InCubic),
        ScheduledEffect::to(
            ParamTarget::UniverseScale,
            scalar(100.0),
            0.2,
            2.5,
            Ease::InOutQuart,
        ),
        ScheduledEffect::to(
            material(MaterialId::PlanckPoint, Uniform::Opacity),
            scalar(0.0),
            0.5,
            1.0,
            Ease::OutQuad,
        ),
        ScheduledEffect::to(
            ParamTarget::ChromaticOffset,
            ParamValue::Vec2(Vec2::new(0.02, 0.02)),
            0.0,
            0.3,
            Ease::InQuart,
        ),
        ScheduledEffect::to(
            ParamTarget::ChromaticOffset,
            ParamValue::Vec2(Vec2::ZERO),
            0.3,
            1.5,
            Ease::OutCubic,
        ),
    ];
    for id in [MaterialId::Foam, MaterialId::DistantFoam] {
        effects.push(ScheduledEffect::to(
            material(id, Uniform::Inflation),
            scalar(1.0),
            0.2,
            2.0,
            Ease::InCubic,
        ));
    }
    EpochDefinition {
        id: EpochId::Inflation,
        populations: vec![PopulationSpec::new(
            "inflaton",
            6_000,
            Distribution::Shell {
                inner: 0.5,
                outer: 3.0,
                exponent: 1.0,
            },
            vec![
                Variant::solid(
                    ParticleKind::Foam,
                    1.0,
                    hex(0x8899ff),
                    Span::new(0.008, 0.02),
                )
                .shaded(hex(0x6677dd), hex(0xccddff)),
            ],
        )],
        durations: PhaseDurations::default(),
        complete_after: 3.0,
        transition: TimelineScript {
            effects,
            cues: vec![release(2.7, limits)],
        },
        limits,
        post: PostPreset {
            bloom_intensity: 1.5,
            ..PostPreset::default()
        },
        materials: vec![],
    }
}

fn plasma() -> EpochDefinition {
    const RADIUS: f32 = 15.0;
    let limits = ControlLimits {
        min_distance: 5.0,
        max_distance: 80.0,
        ..ControlLimits::default()
    };
    let quark = |min: u32, max: u32| {
        Variant::solid(ParticleKind::Plasma, 1.0, hex(min), Span::new(0.05, 0.15))
            .shaded(hex(min), hex(max))
            .with_intensity(Span::new(0.8, 1.6))
    };
    let mut effects = vec![
        ScheduledEffect::to(
            ParamTarget::UniverseScale,
            scalar(1.0),
            0.0,
            1.5,
            Ease::OutCubic,
        ),
        ScheduledEffect::to(
            ParamTarget::ChromaticOffset,
            ParamValue::Vec2(Vec2::ZERO),
            0.0,
            0.5,
            Ease::OutQuad,
        ),
    ];
    effects.extend(camera_move(
        0.0,
        2.5,
        (vec3(0.0, 0.0, 30.0), Ease::InOutCubic),
        (vec3(0.0, 0.0, 0.0), Ease::InOutCubic),
        (75.0, Ease::OutCubic),
    ));
    EpochDefinition {
        id: EpochId::Plasma,
        populations: vec![
            PopulationSpec::new(
                "core",
                3_000,
                Distribution::Shell {
                    inner: 0.0,
                    outer: RADIUS * 0.15,
                    exponent: 1.5,
                },
                vec![quark(0xffeeaa, 0xffffff)],
            ),
            PopulationSpec::new(
                "medium",
                6_000,
                Distribution::Shell {
                    inner: RADIUS * 0.15,
                    outer: RADIUS * 0.5,
                    exponent: 1.0,
                },
                vec![quark(0xff8833, 0xffcc55)],
            ),
            PopulationSpec::new(
                "outer",
                4_000,
                Distribution::Shell {
                    inner: RADIUS * 0.5,
                    outer: RADIUS,
                    exponent: 1.0,
                },
                vec![quark(0x992266, 0xff4455)],
            ),
        ],
        durations: PhaseDurations::default(),
        complete_after: 6.0,
        transition: TimelineScript {
            effects,
            cues: vec![release(2.5, limits)],
        },
        limits,
        post: PostPreset {
            bloom_intensity: 1.8,
            bloom_threshold: 0.3,
            vignette_offset: 0.05,
            vignette_darkness: 0.6,
            noise_opacity: 0.03,
        },
        materials: vec![MaterialBinding::new(MaterialId::Plasma)],
    }
}

fn nucleosynthesis() -> EpochDefinition {
    let limits = ControlLimits {
        min_distance: 5.0,
        max_distance: 60.0,
        ..ControlLimits::default()
    };
    let mut effects = camera_move(
        0.0,
        3.0,
        (vec3(0.0, 4.0, 25.0), Ease::InOutCubic),
        (vec3(-0.15, 0.0, 0.0), Ease::InOutCubic),
        (70.0, Ease::OutCubic),
    )
    .to_vec();
    effects.push(ScheduledEffect::to(
        material(MaterialId::Nucleons, Uniform::Intensity),
        scalar(1.6),
        1.0,
        4.0,
        Ease::InOutSine,
    ));
    EpochDefinition {
        id: EpochId::Nucleosynthesis,
        populations: vec![
            PopulationSpec::new(
                "nucleons",
                4_000,
                Distribution::Sphere { radius: 12.0 },
                vec![
                    Variant::solid(ParticleKind::Proton, 0.75, hex(0xff3355), Span::new(0.12, 0.2)),
                    Variant::solid(
                        ParticleKind::Neutron,
                        0.125,
                        hex(0x8899bb),
                        Span::new(0.12, 0.2),
                    ),
                    Variant::solid(
                        ParticleKind::Electron,
                        0.125,
                        hex(0x00eeff),
                        Span::new(0.04, 0.07),
                    ),
                ],
            ),
            PopulationSpec::new(
                "helium",
                400,
                Distribution::Sphere { radius: 0.3 },
                vec![
                    Variant::solid(ParticleKind::Helium, 1.0, hex(0xffcc00), Span::new(0.2, 0.3))
                        .with_intensity(Span::new(1.0, 1.5)),
                ],
            )
            .anchored_to("nucleons")
            .with_trigger(TriggerSpec::Staggered {
                span: 10.0,
                jitter: 1.0,
            }),
        ],
        durations: PhaseDurations::default(),
        complete_after: 12.0,
        transition: TimelineScript {
            effects,
            cues: vec![release(3.0, limits)],
        },
        limits,
        post: PostPreset {
            bloom_intensity: 1.5,
            bloom_threshold: 0.4,
            vignette_offset: 0.08,
            vignette_darkness: 0.7,
            noise_opacity: 0.03,
        },
        materials: vec![MaterialBinding::new(MaterialId::Nucleons)],
    }
}

fn recombination() -> EpochDefinition {
    const TEMPERATURE_START: f64 = 3000.0;
    const TEMPERATURE_END: f64 = 2725.0;
    let limits = ControlLimits {
        min_distance: 8.0,
        max_distance: 45.0,
        ..ControlLimits::default()
    };

    let mut effects = Vec::new();
    effects.extend(camera_move(
        0.0,
        3.5,
        (vec3(-14.0, 12.0, 20.0), Ease::OutCubic),
        (vec3(-0.5, -0.6, -0.15), Ease::OutCubic),
        (58.0, Ease::OutCubic),
    ));
    effects.extend(camera_move(
        4.0,
        5.0,
        (vec3(10.0, 6.0, 16.0), Ease::InOutQuad),
        (vec3(-0.32, 0.5, 0.12), Ease::InOutQuad),
        (42.0, Ease::InCubic),
    ));
    effects.extend(camera_move(
        9.0,
        5.0,
        (vec3(-6.0, -5.0, 18.0), Ease::InOutQuad),
        (vec3(0.22, -0.32, -0.08), Ease::InOutQuad),
        (52.0, Ease::InOutSine),
    ));
    effects.extend(camera_move(
        14.0,
        5.0,
        (vec3(0.0, 0.0, 24.0), Ease::InOutCubic),
        (vec3(0.0, 0.0, 0.0), Ease::InOutCubic),
        (72.0, Ease::OutCubic),
    ));
    effects.extend([
        ScheduledEffect::to(
            ParamTarget::UniverseRotation,
            vec3(PI * 0.2, PI * 0.4, 0.0),
            2.0,
            7.0,
            Ease::InOutQuad,
        ),
        ScheduledEffect::to(
            ParamTarget::UniverseRotation,
            vec3(-PI * 0.15, PI * 0.8, 0.0),
            9.0,
            6.0,
            Ease::InOutQuad,
        ),
        ScheduledEffect::to(
            ParamTarget::UniverseRotation,
            vec3(0.0, 0.0, 0.0),
            15.0,
            4.0,
            Ease::OutCubic,
        ),
        ScheduledEffect::to(
            material(MaterialId::Atoms, Uniform::Temperature),
            scalar(TEMPERATURE_END),
            0.0,
            19.0,
            Ease::OutQuad,
        )
        .from(scalar(TEMPERATURE_START)),
    ]);

    EpochDefinition {
        id: EpochId::Recombination,
        populations: vec![
            PopulationSpec::new(
                "nuclei",
                155,
                Distribution::Shell {
                    inner: 0.0,
                    outer: 6.84,
                    exponent: 0.6,
                },
                vec![
                    Variant::solid(ParticleKind::Proton, 120.0, hex(0xff3355), Span::fixed(0.18))
                        .shaded(hex(0xff3355), hex(0xff6688)),
                    Variant::solid(ParticleKind::Helium, 35.0, hex(0xffcc00), Span::fixed(0.25))
                        .shaded(hex(0xffcc00), hex(0xffee66)),
                ],
            ),
            PopulationSpec::new(
                "electrons",
                600,
                Distribution::Shell {
                    inner: 1.5,
                    outer: 4.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(ParticleKind::Electron, 1.0, hex(0x00eeff), Span::fixed(0.06))
                        .shaded(hex(0x00eeff), hex(0x88ffff)),
                ],
            )
            .anchored_to("nuclei")
            .with_trigger(TriggerSpec::Uniform {
                min: 6.0,
                max: 15.0,
            }),
        ],
        durations: PhaseDurations {
            orbit_radius: 0.45,
            orbit_speed: 3.0,
            ..PhaseDurations::default()
        },
        complete_after: 20.0,
        transition: TimelineScript {
            effects,
            cues: vec![
                stage_cue(2.5, 1),
                stage_cue(6.0, 2),
                stage_cue(15.0, 3),
                release(19.0, limits),
            ],
        },
        limits,
        post: PostPreset {
            bloom_intensity: 1.2,
            bloom_threshold: 0.3,
            vignette_offset: 0.15,
            vignette_darkness: 0.8,
            noise_opacity: 0.02,
        },
        materials: vec![MaterialBinding {
            id: MaterialId::Atoms,
            uniforms: MaterialUniforms {
                temperature: TEMPERATURE_START,
                ..MaterialUniforms::default()
            },
        }],
    }
}

fn dark_ages() -> EpochDefinition {
    let limits = ControlLimits {
        min_distance: 10.0,
        max_distance: 120.0,
        ..ControlLimits::default()
    };
    let mut effects = camera_move(
        0.0,
        5.0,
        (vec3(0.0, 10.0, 60.0), Ease::InOutCubic),
        (vec3(-0.15, 0.0, 0.0), Ease::InOutCubic),
        (70.0, Ease::InOutSine),
    )
    .to_vec();
    effects.push(ScheduledEffect::to(
        ParamTarget::BloomIntensity,
        scalar(0.6),
        0.0,
        3.0,
        Ease::OutQuad,
    ));
    effects.push(ScheduledEffect::to(
        material(MaterialId::Void, Uniform::Opacity),
        scalar(1.0),
        0.0,
        3.0,
        Ease::InOutSine,
    ));
    EpochDefinition {
        id: EpochId::DarkAges,
        populations: vec![
            PopulationSpec::new(
                "void",
                12_000,
                Distribution::Shell {
                    inner: 5.0,
                    outer: 40.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(
                        ParticleKind::Void,
                        1.0,
                        Vec3::new(0.01, 0.005, 0.015),
                        Span::new(0.05, 0.2),
                    )
                    .shaded(Vec3::new(0.01, 0.005, 0.015), Vec3::new(0.21, 0.105, 0.315))
                    .with_opacity(Span::new(0.1, 0.4)),
                ],
            )
            .with_spin(Vec3::new(0.003, 0.008, 0.002)),
            PopulationSpec::new(
                "protostars",
                800,
                Distribution::Shell {
                    inner: 15.0,
                    outer: 45.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(
                        ParticleKind::ProtoStar,
                        0.7,
                        Vec3::new(0.6, 0.3, 0.15),
                        Span::new(0.3, 0.8),
                    )
                    .shaded(Vec3::new(0.6, 0.3, 0.15), Vec3::new(0.9, 0.5, 0.3)),
                    Variant::solid(
                        ParticleKind::ProtoStar,
                        0.3,
                        Vec3::new(0.25, 0.15, 0.35),
                        Span::new(0.2, 0.5),
                    )
                    .shaded(Vec3::new(0.25, 0.15, 0.35), Vec3::new(0.45, 0.3, 0.55)),
                ],
            )
            .with_spin(Vec3::new(0.004, -0.012, 0.0)),
            PopulationSpec::new(
                "dust",
                5_000,
                Distribution::Shell {
                    inner: 4.0,
                    outer: 29.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(
                        ParticleKind::Dust,
                        1.0,
                        Vec3::new(0.15, 0.1, 0.08),
                        Span::new(0.03, 0.1),
                    )
                    .with_opacity(Span::new(0.2, 0.6)),
                ],
            )
            .with_spin(Vec3::new(0.002, 0.005, 0.001)),
            PopulationSpec::new(
                "nebula",
                3_000,
                Distribution::Shell {
                    inner: 8.0,
                    outer: 28.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(
                        ParticleKind::Nebula,
                        1.0,
                        Vec3::new(0.2, 0.08, 0.3),
                        Span::new(0.5, 1.5),
                    )
                    .shaded(Vec3::new(0.2, 0.08, 0.3), Vec3::new(0.35, 0.15, 0.5))
                    .with_opacity(Span::new(0.05, 0.2)),
                ],
            )
            .with_spin(Vec3::new(-0.001, 0.004, 0.0)),
            PopulationSpec::new(
                "filaments",
                4_000,
                Distribution::Filament {
                    strands: 24,
                    extent: 35.0,
                    length: 30.0,
                    jitter: 1.2,
                },
                vec![
                    Variant::solid(
                        ParticleKind::Filament,
                        1.0,
                        Vec3::new(0.12, 0.1, 0.25),
                        Span::new(0.05, 0.15),
                    )
                    .with_opacity(Span::new(0.15, 0.45)),
                ],
            )
            .with_spin(Vec3::new(0.0, 0.003, 0.0)),
        ],
        durations: PhaseDurations::default(),
        complete_after: 15.0,
        transition: TimelineScript {
            effects,
            cues: vec![release(5.0, limits)],
        },
        limits,
        post: PostPreset::default(),
        materials: vec![MaterialBinding {
            id: MaterialId::Void,
            uniforms: MaterialUniforms {
                opacity: 0.0,
                ..MaterialUniforms::default()
            },
        }],
    }
}

fn cosmic_dawn() -> EpochDefinition {
    let limits = ControlLimits {
        min_distance: 20.0,
        max_distance: 400.0,
        ..ControlLimits::default()
    };
    let centers = (0..6)
        .map(|i| {
            Vec3::new(
                ((i % 3) as f32 - 1.0) * 80.0,
                (((i / 3) % 2) as f32 - 0.5) * 50.0,
                -30.0,
            )
        })
        .collect();
    let hot = |weight: f32, color: Vec3| {
        Variant::solid(ParticleKind::Star, weight, color, Span::new(1.5, 3.0))
            .with_intensity(Span::new(1.8, 4.0))
    };
    let inherit = TriggerSpec::InheritAnchor { offset: 0.0 };

    let mut effects = camera_move(
        0.0,
        4.0,
        (vec3(0.0, 30.0, 160.0), Ease::InOutCubic),
        (vec3(-0.18, 0.0, 0.0), Ease::InOutCubic),
        (70.0, Ease::InOutSine),
    )
    .to_vec();
    effects.push(ScheduledEffect::to(
        ParamTarget::BloomIntensity,
        scalar(2.0),
        1.0,
        2.0,
        Ease::InOutQuad,
    ));

    EpochDefinition {
        id: EpochId::CosmicDawn,
        populations: vec![
            PopulationSpec::new(
                "stars",
                180,
                Distribution::Clustered {
                    centers,
                    local: Box::new(Distribution::Shell {
                        inner: 15.0,
                        outer: 50.0,
                        exponent: 1.0,
                    }),
                },
                vec![
                    hot(0.4, Vec3::new(0.7, 0.85, 1.0)),
                    hot(0.3, Vec3::new(0.85, 0.9, 1.0)),
                    hot(0.3, Vec3::new(0.8, 0.88, 1.0)),
                ],
            )
            .with_trigger(TriggerSpec::Staggered {
                span: 15.0,
                jitter: 2.0,
            }),
            PopulationSpec::new(
                "birth_clouds",
                15_000,
                Distribution::Shell {
                    inner: 8.0,
                    outer: 28.0,
                    exponent: 1.0,
                },
                vec![
                    Variant::solid(
                        ParticleKind::BirthCloud,
                        1.0,
                        Vec3::new(0.12, 0.18, 0.35),
                        Span::new(0.3, 1.0),
                    )
                    .shaded(Vec3::new(0.12, 0.18, 0.35), Vec3::new(0.32, 0.43, 0.7))
                    .with_opacity(Span::new(0.3, 0.7)),
                ],
            )
            .anchored_to("stars")
            .with_trigger(inherit),
            PopulationSpec::new(
                "accretion_disks",
                8_000,
                Distribution::Point,
                vec![
                    Variant::solid(
                        ParticleKind::AccretionDisk,
                        1.0,
                        Vec3::new(0.9, 0.7, 0.4),
                        Span::new(0.2, 0.5),
                    )
                    .shaded(Vec3::new(0.9, 0.7, 0.4), Vec3::new(1.0, 0.9, 0.7)),
                ],
            )
            .anchored_to("stars")
            .with_trigger(inherit),
            PopulationSpec::new(
                "shockwaves",
                4_000,
                Distribution::Point,
                vec![Variant::solid(
                    ParticleKind::ShockFront,
                    1.0,
                    Vec3::new(0.9, 0.95, 1.0),
                    Span::new(0.3, 0.8),
                )],
            )
            .anchored_to("stars")
            .with_trigger(inherit),
            PopulationSpec::new(
                "stellar_wind",
                6_000,
                Distribution::Point,
                vec![
                    Variant::solid(
                        ParticleKind::StellarWind,
                        1.0,
                        Vec3::new(0.7, 0.8, 1.0),
                        Span::new(0.1, 0.3),
                    )
                    .shaded(Vec3::new(0.7, 0.8, 1.0), Vec3::ONE),
                ],
            )
            .anchored_to("stars")
            .with_trigger(inherit),
        ],
        durations: PhaseDurations::default(),
        complete_after: 18.0,
        transition: TimelineScript {
            effects,
            cues: vec![release(4.0, limits)],
        },
        limits,
        post: PostPreset {
            bloom_threshold: 0.4,
            ..PostPreset::default()
        },
        materials: vec![MaterialBinding::new(MaterialId::Stars)],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/epoch/catalog.rs"]
mod tests;

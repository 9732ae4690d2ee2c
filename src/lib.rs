//! Cosmic Epochs is a particle-epoch animation framework.
//!
//! A scene is a strictly ordered chain of cosmological epochs. Each epoch:
//!
//! - generates typed particle populations procedurally ([`PopulationSpec`], [`generate`])
//! - evolves every particle per frame through phase-dependent rules ([`EvolutionRule`])
//! - choreographs camera, post-processing and material uniforms with a [`TimelineScript`]
//! - signals completion to the [`Scene`] that sequences the transitions
//!
//! The host owns the render loop: it calls [`Scene::tick`] once per display refresh, reads
//! [`Scene::presentation`] and the epochs' visual buffers, and drains [`SceneEvent`]s.
//! [`render_scene`] splats the buffers into an RGBA8 frame for headless previews.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod controls;
pub(crate) mod epoch;
pub(crate) mod evolution;
pub(crate) mod population;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Canvas, DVec3, Fps, FrameIndex, Rgba8Premul, SimClock, Vec2, Vec3,
};
pub use crate::foundation::error::{CosmosError, CosmosResult};

pub use crate::animation::anim::{Lerp, Tween, window_progress};
pub use crate::animation::ease::Ease;
pub use crate::controls::orbit::{ControlLimits, OrbitControls, OrbitInput};
pub use crate::epoch::catalog::Catalog;
pub use crate::epoch::controller::{EpochController, EpochState};
pub use crate::epoch::definition::{EpochDefinition, EpochId, MaterialBinding, PostPreset};
pub use crate::evolution::rules::{CollapseEnd, EvolutionRule, evolve};
pub use crate::evolution::state::{Phase, PhaseDurations, VisualState};
pub use crate::population::distribution::Distribution;
pub use crate::population::generator::{
    Particle, Population, PopulationSpec, TriggerSpec, generate,
};
pub use crate::population::kind::{ParticleKind, Span, Variant};
pub use crate::render::preview::{FrameRgba, PreviewSettings, render_preview, render_scene};
pub use crate::scene::config::{OverlapPolicy, SceneConfig};
pub use crate::scene::orchestrator::{
    Command, CommandOutcome, RejectReason, Scene, SceneEvent, TransitionOutcome,
};
pub use crate::scene::presentation::PresentationState;
pub use crate::timeline::driver::{
    Cue, CueAction, DriverStatus, DriverTick, ScheduledEffect, TimelineDriver, TimelineScript,
};
pub use crate::timeline::stage::{
    CameraRig, MaterialId, MaterialTable, MaterialUniforms, ParamTarget, ParamValue, PostFx,
    Stage, Uniform, UniverseTransform, ValueKind,
};

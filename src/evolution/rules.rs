use std::f32::consts::{PI, TAU};

use crate::{
    evolution::state::{Phase, PhaseDurations, VisualState},
    foundation::{
        core::Vec3,
        math::{rotate_euler, safe_normalize},
    },
    population::{
        generator::{Particle, Population},
        kind::ParticleKind,
    },
};

const FLASH_RISE: f32 = 0.2;
const FLASH_DECAY: f32 = 5.0;
const SETTLE_RATE: f32 = 4.0;
const DRIFT_RATE: f32 = 0.15;

/// What a collapsing particle does once its trigger passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseEnd {
    /// Blown outward and faded (birth clouds).
    Disperse,
    /// Bound into a circular orbit around the anchor (captured electrons).
    Orbit,
}

/// Per-kind phase machine.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum EvolutionRule {
    /// `PreTrigger -> Ignition -> Settle -> Steady`.
    Ignite,
    /// `PreTrigger -> Collapse -> Active [-> Retired]`.
    Collapse {
        /// Post-trigger behavior.
        then: CollapseEnd,
    },
    /// `PreTrigger -> Collapse -> Ignition -> Retired`: a disk that forms and is consumed.
    Disk,
    /// `PreTrigger -> Active -> Retired`: one outward burst.
    Ejecta,
    /// `PreTrigger -> Active -> Retired`: outward flow looping on a fixed period.
    Wind,
    /// `PreTrigger -> Steady`: visible throughout with drift and a periodic size wobble.
    Ambient {
        /// Wobble angular rate (rad/s).
        rate: f32,
        /// Wobble depth in `[0, 1]`.
        depth: f32,
        /// Drift amplitude.
        drift: f32,
    },
}

impl ParticleKind {
    /// The evolution rule this kind follows.
    pub fn rule(self) -> EvolutionRule {
        match self {
            Self::Star | Self::Helium => EvolutionRule::Ignite,
            Self::BirthCloud => EvolutionRule::Collapse {
                then: CollapseEnd::Disperse,
            },
            Self::Electron => EvolutionRule::Collapse {
                then: CollapseEnd::Orbit,
            },
            Self::AccretionDisk => EvolutionRule::Disk,
            Self::ShockFront => EvolutionRule::Ejecta,
            Self::StellarWind => EvolutionRule::Wind,
            Self::Singularity => ambient(50.0, 0.05, 0.0),
            Self::Foam => ambient(1.5, 0.1, 0.0),
            Self::Plasma => ambient(3.0, 0.2, 0.1),
            Self::Proton | Self::Neutron => ambient(2.2, 0.15, 0.3),
            Self::ProtoStar => ambient(0.3, 0.3, 0.0),
            Self::Void => ambient(0.0, 0.0, 0.0),
            Self::Dust | Self::Nebula | Self::Filament => ambient(0.15, 0.05, 0.5),
        }
    }
}

fn ambient(rate: f32, depth: f32, drift: f32) -> EvolutionRule {
    EvolutionRule::Ambient { rate, depth, drift }
}

/// Visual state of `particle` at local time `time`.
///
/// `center` is the point the particle is attached to: its own rest position for unlinked
/// particles, or the anchor's current position for linked ones. The result is a pure function
/// of the inputs and is sanitized before it is returned.
pub fn evolve(
    particle: &Particle,
    center: Vec3,
    time: f64,
    durations: &PhaseDurations,
) -> VisualState {
    let t = time as f32;
    let delta = t - particle.trigger_time;
    let state = match particle.kind.rule() {
        EvolutionRule::Ignite => ignite(particle, center, t, delta, durations),
        EvolutionRule::Collapse { then } => collapse(particle, center, t, delta, durations, then),
        EvolutionRule::Disk => disk(particle, center, t, delta, durations),
        EvolutionRule::Ejecta => ejecta(particle, center, delta, durations),
        EvolutionRule::Wind => wind(particle, center, delta, durations),
        EvolutionRule::Ambient { rate, depth, drift } => {
            ambient_state(particle, center, t, delta, rate, depth, drift)
        }
    };
    state.sanitized()
}

fn flash_envelope(progress: f32) -> f32 {
    progress.powf(FLASH_RISE) * (-FLASH_DECAY * progress).exp()
}

/// Flash size normalized so the envelope peak maps to `nominal * (1 + gain)`.
fn flash_size(nominal: f32, progress: f32, gain: f32) -> f32 {
    let peak = flash_envelope(FLASH_RISE / FLASH_DECAY);
    nominal * (1.0 + gain * flash_envelope(progress) / peak)
}

fn twinkle(t: f32, phase: f32) -> f32 {
    0.85 + 0.15 * (t * 2.0 + phase).sin()
}

fn ignite(p: &Particle, center: Vec3, t: f32, delta: f32, d: &PhaseDurations) -> VisualState {
    let home = center + p.base_offset;
    let nominal = p.base_size * p.intensity;
    if delta < 0.0 {
        return VisualState::hidden(home, Phase::PreTrigger);
    }
    if delta < d.flash {
        return VisualState {
            position: home,
            size: flash_size(nominal, delta / d.flash, d.flash_gain),
            color: Vec3::ONE,
            opacity: p.base_opacity,
            phase: Phase::Ignition,
        };
    }
    if delta < d.settle {
        let progress = (delta - d.flash) / (d.settle - d.flash);
        let settle = 1.0 - (-progress * SETTLE_RATE).exp();
        let from = flash_size(nominal, 1.0, d.flash_gain);
        let pulse = 1.0 + (delta * 10.0).sin() * (1.0 - settle) * 0.5;
        return VisualState {
            position: home,
            size: (from + (nominal - from) * settle) * pulse,
            color: Vec3::ONE.lerp(p.base_color, settle),
            opacity: p.base_opacity,
            phase: Phase::Settle,
        };
    }
    VisualState {
        position: home,
        size: nominal * twinkle(t, p.phase),
        color: p.base_color,
        opacity: p.base_opacity,
        phase: Phase::Steady,
    }
}

fn orbit_offset(p: &Particle, t: f32, d: &PhaseDurations) -> Vec3 {
    let axis = safe_normalize(p.direction, Vec3::Z);
    let u = axis.any_orthonormal_vector();
    let v = axis.cross(u);
    let angle = p.phase + t * d.orbit_speed;
    (u * angle.cos() + v * angle.sin()) * d.orbit_radius
}

fn collapse(
    p: &Particle,
    center: Vec3,
    t: f32,
    delta: f32,
    d: &PhaseDurations,
    then: CollapseEnd,
) -> VisualState {
    let offset = p.base_offset;
    if delta < -d.collapse_lead {
        let drift = (t * DRIFT_RATE + p.phase).sin() * 0.5;
        return VisualState {
            position: center + offset + Vec3::new(drift, drift * 0.7, drift * 0.5),
            size: p.base_size * 0.9,
            color: p.base_color,
            opacity: p.base_opacity,
            phase: Phase::PreTrigger,
        };
    }
    if delta < 0.0 {
        let progress = (delta + d.collapse_lead) / d.collapse_lead;
        let remaining = (1.0 - progress).powf(2.5);
        let angle = t * progress * progress * 10.0;
        let (sin, cos) = angle.sin_cos();
        let swirled = Vec3::new(
            cos * offset.x - sin * offset.y,
            sin * offset.x + cos * offset.y,
            offset.z,
        );
        let settled = match then {
            CollapseEnd::Disperse => Vec3::ZERO,
            CollapseEnd::Orbit => orbit_offset(p, t, d),
        };
        return VisualState {
            position: center + swirled * remaining + settled * (1.0 - remaining),
            size: p.base_size * (remaining * 0.7 + 0.3),
            color: p.base_color
                * Vec3::new(1.0 + progress * 3.0, 1.0 + progress * 2.0, 1.0 + progress * 0.5),
            opacity: p.base_opacity,
            phase: Phase::Collapse,
        };
    }
    match then {
        CollapseEnd::Disperse => {
            let blow = delta / d.dispersal;
            if blow >= 1.0 {
                return VisualState::hidden(center + offset * 13.0, Phase::Retired);
            }
            VisualState {
                position: center + offset * (1.0 + blow * 12.0),
                size: p.base_size * (1.0 - blow * 0.9),
                color: p.base_color * (1.0 - blow),
                opacity: p.base_opacity,
                phase: Phase::Active,
            }
        }
        CollapseEnd::Orbit => VisualState {
            position: center + orbit_offset(p, t, d),
            size: p.base_size,
            color: p.base_color,
            opacity: p.base_opacity,
            phase: Phase::Active,
        },
    }
}

fn disk(p: &Particle, center: Vec3, t: f32, delta: f32, d: &PhaseDurations) -> VisualState {
    if delta < -d.disk_lead {
        return VisualState::hidden(center, Phase::PreTrigger);
    }
    if delta < 0.0 {
        let progress = (delta + d.disk_lead) / d.disk_lead;
        let radius = d.disk_radius * (1.0 - progress * 0.6);
        let (sin, cos) = (p.phase + t * 2.0).sin_cos();
        let glow = progress * 2.0;
        return VisualState {
            position: center + Vec3::new(cos * radius, sin * radius * 0.3, sin * radius),
            size: p.base_size * (1.0 + progress),
            color: p.base_color * Vec3::new(1.0 + glow, 1.0 + glow * 0.8, 1.0 + glow * 0.5),
            opacity: p.base_opacity,
            phase: Phase::Collapse,
        };
    }
    if delta < d.flash {
        let progress = delta / d.flash;
        return VisualState {
            position: center,
            size: p.base_size * (3.0 + progress * 5.0) * (1.0 - progress),
            color: Vec3::ONE,
            opacity: p.base_opacity,
            phase: Phase::Ignition,
        };
    }
    VisualState::hidden(center, Phase::Retired)
}

fn ejecta(p: &Particle, center: Vec3, delta: f32, d: &PhaseDurations) -> VisualState {
    if delta < 0.0 {
        return VisualState::hidden(center, Phase::PreTrigger);
    }
    if delta >= d.ejecta_age {
        return VisualState::hidden(center + p.direction * d.ejecta_radius, Phase::Retired);
    }
    let progress = delta / d.ejecta_age;
    let radius = progress.powf(0.6) * d.ejecta_radius;
    let flash = (-progress * 6.0).exp() * 8.0;
    VisualState {
        position: center + p.direction * radius,
        size: p.base_size * (1.0 + flash) * (1.0 - progress * 0.8),
        color: p.base_color * ((1.0 - progress) * (1.0 + flash * 0.3)),
        opacity: p.base_opacity,
        phase: Phase::Active,
    }
}

fn wind(p: &Particle, center: Vec3, delta: f32, d: &PhaseDurations) -> VisualState {
    if delta < d.wind_start {
        return VisualState::hidden(center, Phase::PreTrigger);
    }
    if d.wind_end.is_some_and(|end| delta >= end) {
        return VisualState::hidden(center, Phase::Retired);
    }
    // Slots are reused by wrapping the local delta on the loop period.
    let age = ((delta - d.wind_start) / d.wind_period + p.phase / TAU).rem_euclid(1.0);
    let fade = (age * PI).sin();
    VisualState {
        position: center + p.direction * (age * d.wind_radius),
        size: p.base_size * fade,
        color: p.base_color * fade,
        opacity: p.base_opacity,
        phase: Phase::Active,
    }
}

fn ambient_state(
    p: &Particle,
    center: Vec3,
    t: f32,
    delta: f32,
    rate: f32,
    depth: f32,
    drift: f32,
) -> VisualState {
    let wobble = 1.0 + depth.clamp(0.0, 1.0) * (rate * t + p.phase).sin();
    let sway = (t * DRIFT_RATE + p.phase).sin() * drift;
    VisualState {
        position: center + p.base_offset + Vec3::new(sway, sway * 0.7, sway * 0.5),
        size: p.base_size * p.intensity * wobble,
        color: p.base_color,
        opacity: p.base_opacity,
        phase: if delta < 0.0 {
            Phase::PreTrigger
        } else {
            Phase::Steady
        },
    }
}

impl Population {
    /// Evaluate every particle at `time` into `out`, reusing its allocation.
    ///
    /// Linked particles follow `anchor`'s current rest positions; unlinked ones follow this
    /// population's spinning frame. `out` holds exactly `self.len()` states afterwards.
    pub fn evaluate_into(
        &self,
        time: f64,
        durations: &PhaseDurations,
        anchor: Option<&Population>,
        out: &mut Vec<VisualState>,
    ) {
        out.clear();
        out.reserve(self.len());
        let angles = self.spin() * time as f32;
        out.extend(self.particles().iter().map(|p| {
            let center = match p.anchor {
                Some(idx) => anchor
                    .and_then(|a| a.home(idx as usize, time))
                    .unwrap_or(p.base_position - p.base_offset),
                None => rotate_euler(p.base_position, angles),
            };
            evolve(p, center, time, durations)
        }));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/evolution/rules.rs"]
mod tests;

use rand::Rng;

use crate::{
    foundation::{
        core::Vec3,
        error::{CosmosError, CosmosResult},
        math::rotate_euler,
    },
    population::{
        distribution::{Distribution, direction, uniform},
        kind::{KindTable, ParticleKind, Variant},
    },
};

/// How per-particle trigger times are assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// Every particle triggers at local time zero.
    #[default]
    Immediate,
    /// `i / count * span` plus a uniform `±jitter / 2`.
    Staggered {
        /// Time over which the sequence is spread.
        span: f32,
        /// Full width of the random perturbation.
        jitter: f32,
    },
    /// Uniform in `[min, max]`.
    Uniform {
        /// Earliest trigger.
        min: f32,
        /// Latest trigger.
        max: f32,
    },
    /// Copy the linked anchor's trigger time, shifted by `offset`.
    InheritAnchor {
        /// Shift added to the anchor trigger.
        #[serde(default)]
        offset: f32,
    },
}

/// Declarative description of one population.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PopulationSpec {
    /// Name, unique within an epoch.
    pub name: String,
    /// Particle count; fixed for the population's lifetime.
    pub count: usize,
    /// Position pattern, or offset pattern for linked populations.
    pub distribution: Distribution,
    /// Weighted kind table.
    pub variants: Vec<Variant>,
    /// Name of an earlier population in the same epoch whose particles anchor this one.
    #[serde(default)]
    pub anchor: Option<String>,
    /// Trigger time assignment.
    #[serde(default)]
    pub trigger: TriggerSpec,
    /// Constant angular velocity (rad/s, XYZ Euler) of the population frame.
    #[serde(default)]
    pub spin: Vec3,
}

impl PopulationSpec {
    /// Unlinked population with immediate triggers and no spin.
    pub fn new(
        name: impl Into<String>,
        count: usize,
        distribution: Distribution,
        variants: Vec<Variant>,
    ) -> Self {
        Self {
            name: name.into(),
            count,
            distribution,
            variants,
            anchor: None,
            trigger: TriggerSpec::Immediate,
            spin: Vec3::ZERO,
        }
    }

    /// Link to an earlier population by name.
    pub fn anchored_to(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Set the trigger assignment.
    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the frame spin.
    pub fn with_spin(mut self, spin: Vec3) -> Self {
        self.spin = spin;
        self
    }

    /// Check everything that does not depend on other populations.
    pub fn validate(&self) -> CosmosResult<()> {
        if self.name.trim().is_empty() {
            return Err(CosmosError::validation("population name must be non-empty"));
        }
        self.distribution.validate()?;
        KindTable::new(&self.variants)?;
        match self.trigger {
            TriggerSpec::Immediate => {}
            TriggerSpec::Staggered { span, jitter } => {
                if !(span.is_finite() && jitter.is_finite() && span >= 0.0 && jitter >= 0.0) {
                    return Err(CosmosError::validation(format!(
                        "population '{}' stagger span/jitter must be finite and >= 0",
                        self.name
                    )));
                }
            }
            TriggerSpec::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(CosmosError::validation(format!(
                        "population '{}' uniform trigger range must be ordered",
                        self.name
                    )));
                }
            }
            TriggerSpec::InheritAnchor { offset } => {
                if self.anchor.is_none() {
                    return Err(CosmosError::validation(format!(
                        "population '{}' inherits anchor triggers but has no anchor",
                        self.name
                    )));
                }
                if !offset.is_finite() {
                    return Err(CosmosError::validation("trigger offset must be finite"));
                }
            }
        }
        if !self.spin.is_finite() {
            return Err(CosmosError::validation("spin must be finite"));
        }
        Ok(())
    }
}

/// One generated particle. All fields are immutable seed data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Identity, unique within the population.
    pub id: u32,
    /// Kind tag.
    pub kind: ParticleKind,
    /// Absolute initial position.
    pub base_position: Vec3,
    /// Offset from the anchor; zero for unlinked particles.
    pub base_offset: Vec3,
    /// Index into the anchor population.
    pub anchor: Option<u32>,
    /// Local-clock time at which this particle's phase sequence starts.
    pub trigger_time: f32,
    /// Base linear color.
    pub base_color: Vec3,
    /// Base size.
    pub base_size: f32,
    /// Base opacity.
    pub base_opacity: f32,
    /// Steady-state brightness multiplier.
    pub intensity: f32,
    /// Phase offset in `[0, TAU)` that desynchronizes periodic motion.
    pub phase: f32,
    /// Unit direction used for ejection and orbit planes.
    pub direction: Vec3,
}

/// A fixed-size set of particles.
///
/// There is no API that adds or removes particles after generation, so indices held by
/// linked populations stay in bounds for the population's lifetime.
#[derive(Clone, Debug)]
pub struct Population {
    name: String,
    anchor_name: Option<String>,
    spin: Vec3,
    particles: Vec<Particle>,
}

impl Population {
    /// Population name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the anchor population, if linked.
    pub fn anchor_name(&self) -> Option<&str> {
        self.anchor_name.as_deref()
    }

    /// Frame angular velocity.
    pub fn spin(&self) -> Vec3 {
        self.spin
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the population holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Read-only particle slice.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Rest position of particle `idx` at `time`, including the frame spin.
    pub fn home(&self, idx: usize, time: f64) -> Option<Vec3> {
        let p = self.particles.get(idx)?;
        Some(rotate_euler(p.base_position, self.spin * time as f32))
    }
}

/// Generate a population from `spec`.
///
/// `anchor` must be supplied exactly when `spec.anchor` is set; each linked particle picks a
/// uniformly random anchor index and samples its offset from the distribution.
#[tracing::instrument(skip(spec, rng, anchor), fields(name = %spec.name, count = spec.count))]
pub fn generate<R: Rng + ?Sized>(
    spec: &PopulationSpec,
    rng: &mut R,
    anchor: Option<&Population>,
) -> CosmosResult<Population> {
    spec.validate()?;
    let anchor = match (&spec.anchor, anchor) {
        (Some(name), Some(a)) => {
            if a.is_empty() {
                return Err(CosmosError::generation(format!(
                    "anchor population '{name}' is empty"
                )));
            }
            Some(a)
        }
        (Some(name), None) => {
            return Err(CosmosError::generation(format!(
                "population '{}' links to '{name}' but no anchor was supplied",
                spec.name
            )));
        }
        (None, Some(_)) => {
            return Err(CosmosError::generation(format!(
                "population '{}' is unlinked but an anchor was supplied",
                spec.name
            )));
        }
        (None, None) => None,
    };

    let count = u32::try_from(spec.count).map_err(|_| {
        CosmosError::generation(format!("population '{}' is too large", spec.name))
    })?;
    let table = KindTable::new(&spec.variants)?;
    let sampler = spec.distribution.prepare(rng)?;

    let mut particles = Vec::with_capacity(spec.count);
    for id in 0..count {
        let variant = table.pick(uniform(rng));
        let sample = sampler.sample(rng);

        let (base_position, base_offset, anchor_idx, anchor_trigger) = match anchor {
            Some(a) => {
                let idx = rng.gen_range(0..a.len());
                let host = &a.particles[idx];
                (
                    host.base_position + sample,
                    sample,
                    Some(idx as u32),
                    host.trigger_time,
                )
            }
            None => (sample, Vec3::ZERO, None, 0.0),
        };

        let trigger_time = match spec.trigger {
            TriggerSpec::Immediate => 0.0,
            TriggerSpec::Staggered { span, jitter } => {
                (id as f32 / count as f32) * span + (uniform(rng) - 0.5) * jitter
            }
            TriggerSpec::Uniform { min, max } => min + uniform(rng) * (max - min),
            TriggerSpec::InheritAnchor { offset } => anchor_trigger + offset,
        };

        let shade = uniform(rng);
        particles.push(Particle {
            id,
            kind: variant.kind,
            base_position,
            base_offset,
            anchor: anchor_idx,
            trigger_time,
            base_color: variant.color_min.lerp(variant.color_max, shade),
            base_size: variant.size.sample(rng),
            base_opacity: variant.opacity.sample(rng).clamp(0.0, 1.0),
            intensity: variant.intensity.sample(rng).max(0.0),
            phase: uniform(rng) * std::f32::consts::TAU,
            direction: direction(rng),
        });
    }

    tracing::debug!(len = particles.len(), linked = anchor.is_some(), "population generated");
    Ok(Population {
        name: spec.name.clone(),
        anchor_name: spec.anchor.clone(),
        spin: spec.spin,
        particles,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/population/generator.rs"]
mod tests;

use rand::Rng;

use crate::{
    foundation::{
        core::Vec3,
        error::{CosmosError, CosmosResult},
    },
    population::distribution::uniform,
};

/// Categorical particle tag; selects value ranges at generation and the evolution rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    /// The pre-inflation point.
    Singularity,
    /// Quantum foam point.
    Foam,
    /// Quark-gluon plasma sample.
    Plasma,
    /// Free proton.
    Proton,
    /// Free neutron.
    Neutron,
    /// Electron (free or captured).
    Electron,
    /// Fused helium nucleus.
    Helium,
    /// First-generation star.
    Star,
    /// Collapsing gas around a forming star.
    BirthCloud,
    /// Disk material consumed at ignition.
    AccretionDisk,
    /// Shock front ejecta.
    ShockFront,
    /// Looping stellar wind sample.
    StellarWind,
    /// Near-invisible void particle.
    Void,
    /// Faint proto-star.
    ProtoStar,
    /// Dust fog.
    Dust,
    /// Nebula wisp.
    Nebula,
    /// Gas along the cosmic web.
    Filament,
}

/// Closed value interval sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Span {
    /// Build a span.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A degenerate span.
    pub const fn fixed(v: f32) -> Self {
        Self { min: v, max: v }
    }

    pub(crate) fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f32 {
        self.min + uniform(rng) * (self.max - self.min)
    }

    fn is_valid(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// One weighted entry of a population's kind table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Variant {
    /// Kind assigned to particles drawn from this entry.
    pub kind: ParticleKind,
    /// Relative weight (need not sum to one across the table).
    pub weight: f32,
    /// Darkest base color.
    pub color_min: Vec3,
    /// Brightest base color; the shade is one uniform lerp between the two.
    pub color_max: Vec3,
    /// Base size range.
    pub size: Span,
    /// Brightness multiplier range applied to steady-state size.
    #[serde(default = "unit_span")]
    pub intensity: Span,
    /// Base opacity range.
    #[serde(default = "unit_span")]
    pub opacity: Span,
}

fn unit_span() -> Span {
    Span::fixed(1.0)
}

impl Variant {
    /// Single-color variant with fixed intensity and opacity.
    pub fn solid(kind: ParticleKind, weight: f32, color: Vec3, size: Span) -> Self {
        Self {
            kind,
            weight,
            color_min: color,
            color_max: color,
            size,
            intensity: unit_span(),
            opacity: unit_span(),
        }
    }

    /// Replace the color range.
    pub fn shaded(mut self, min: Vec3, max: Vec3) -> Self {
        self.color_min = min;
        self.color_max = max;
        self
    }

    /// Replace the intensity range.
    pub fn with_intensity(mut self, intensity: Span) -> Self {
        self.intensity = intensity;
        self
    }

    /// Replace the opacity range.
    pub fn with_opacity(mut self, opacity: Span) -> Self {
        self.opacity = opacity;
        self
    }

    pub(crate) fn validate(&self) -> CosmosResult<()> {
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(CosmosError::validation(format!(
                "{:?} weight must be finite and >= 0",
                self.kind
            )));
        }
        if !self.size.is_valid() || self.size.min < 0.0 {
            return Err(CosmosError::validation(format!(
                "{:?} size range must be non-negative and ordered",
                self.kind
            )));
        }
        if !self.intensity.is_valid() || !self.opacity.is_valid() {
            return Err(CosmosError::validation(format!(
                "{:?} intensity/opacity ranges must be ordered",
                self.kind
            )));
        }
        if !self.color_min.is_finite() || !self.color_max.is_finite() {
            return Err(CosmosError::validation(format!(
                "{:?} colors must be finite",
                self.kind
            )));
        }
        Ok(())
    }
}

/// Cumulative-probability table over a population's variants.
#[derive(Debug)]
pub(crate) struct KindTable<'a> {
    variants: &'a [Variant],
    cumulative: Vec<f32>,
    total: f32,
}

impl<'a> KindTable<'a> {
    pub(crate) fn new(variants: &'a [Variant]) -> CosmosResult<Self> {
        if variants.is_empty() {
            return Err(CosmosError::generation("variant table is empty"));
        }
        let mut cumulative = Vec::with_capacity(variants.len());
        let mut total = 0.0f32;
        for v in variants {
            v.validate()?;
            total += v.weight;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(CosmosError::generation("variant weights sum to zero"));
        }
        Ok(Self {
            variants,
            cumulative,
            total,
        })
    }

    /// Map a uniform `u` in `[0, 1)` to a variant in one sweep over the table.
    pub(crate) fn pick(&self, u: f32) -> &'a Variant {
        let target = u.clamp(0.0, 1.0) * self.total;
        let idx = self
            .cumulative
            .iter()
            .position(|&c| target < c)
            .unwrap_or_else(|| self.last_weighted());
        &self.variants[idx]
    }

    fn last_weighted(&self) -> usize {
        self.variants
            .iter()
            .rposition(|v| v.weight > 0.0)
            .unwrap_or(self.variants.len() - 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/population/kind.rs"]
mod tests;

use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::{
    controls::orbit::ControlLimits,
    evolution::state::PhaseDurations,
    foundation::error::{CosmosError, CosmosResult},
    population::generator::PopulationSpec,
    timeline::{
        driver::TimelineScript,
        stage::{MaterialId, MaterialUniforms, ParamTarget, PostFx},
    },
};

/// The seven cosmological epochs, in their only allowed order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EpochId {
    /// Planck era: a single point and quantum foam.
    Planck,
    /// Cosmic inflation.
    Inflation,
    /// Quark-gluon plasma.
    Plasma,
    /// Big Bang nucleosynthesis.
    Nucleosynthesis,
    /// Recombination and the first atoms.
    Recombination,
    /// The dark ages.
    DarkAges,
    /// Cosmic dawn and the first stars.
    CosmicDawn,
}

impl EpochId {
    /// Every epoch in timeline order.
    pub const ALL: [Self; 7] = [
        Self::Planck,
        Self::Inflation,
        Self::Plasma,
        Self::Nucleosynthesis,
        Self::Recombination,
        Self::DarkAges,
        Self::CosmicDawn,
    ];

    /// Position in timeline order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The epoch that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Human-readable label shown by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planck => "Planck Epoch",
            Self::Inflation => "Inflation",
            Self::Plasma => "Quark-Gluon Plasma",
            Self::Nucleosynthesis => "Nucleosynthesis",
            Self::Recombination => "Recombination",
            Self::DarkAges => "Dark Ages",
            Self::CosmicDawn => "Cosmic Dawn",
        }
    }

    /// Machine name, as used in JSON and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Planck => "planck",
            Self::Inflation => "inflation",
            Self::Plasma => "plasma",
            Self::Nucleosynthesis => "nucleosynthesis",
            Self::Recombination => "recombination",
            Self::DarkAges => "dark_ages",
            Self::CosmicDawn => "cosmic_dawn",
        }
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EpochId {
    type Err = CosmosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|id| id.name() == key)
            .ok_or_else(|| CosmosError::validation(format!("unknown epoch '{s}'")))
    }
}

/// Post-processing values installed when an epoch's transition starts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PostPreset {
    /// Bloom strength.
    pub bloom_intensity: f64,
    /// Bloom luminance threshold.
    pub bloom_threshold: f64,
    /// Vignette offset.
    pub vignette_offset: f64,
    /// Vignette darkness.
    pub vignette_darkness: f64,
    /// Film grain opacity.
    pub noise_opacity: f64,
}

impl Default for PostPreset {
    fn default() -> Self {
        let fx = PostFx::default();
        Self {
            bloom_intensity: fx.bloom_intensity,
            bloom_threshold: fx.bloom_threshold,
            vignette_offset: fx.vignette_offset,
            vignette_darkness: fx.vignette_darkness,
            noise_opacity: fx.noise_opacity,
        }
    }
}

impl PostPreset {
    /// Copy these values into `post`, clamped to their valid ranges.
    pub fn apply(&self, post: &mut PostFx) {
        post.bloom_intensity = self.bloom_intensity.max(0.0);
        post.bloom_threshold = self.bloom_threshold.clamp(0.0, 1.0);
        post.vignette_offset = self.vignette_offset.max(0.0);
        post.vignette_darkness = self.vignette_darkness.clamp(0.0, 1.0);
        post.noise_opacity = self.noise_opacity.clamp(0.0, 1.0);
    }

    fn validate(&self) -> CosmosResult<()> {
        let all = [
            self.bloom_intensity,
            self.bloom_threshold,
            self.vignette_offset,
            self.vignette_darkness,
            self.noise_opacity,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(CosmosError::validation("post preset values must be finite"));
        }
        Ok(())
    }
}

/// A material an epoch registers on mount, with its starting uniforms.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialBinding {
    /// Material.
    pub id: MaterialId,
    /// Initial uniform values.
    #[serde(default)]
    pub uniforms: MaterialUniforms,
}

impl MaterialBinding {
    /// Binding with default uniforms.
    pub fn new(id: MaterialId) -> Self {
        Self {
            id,
            uniforms: MaterialUniforms::default(),
        }
    }
}

/// Everything that parameterizes one epoch: its populations, phase timing, completion time,
/// transition choreography, camera hand-off limits, post preset and materials.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EpochDefinition {
    /// Which epoch this is.
    pub id: EpochId,
    /// Populations in generation order; anchors must precede their dependents.
    pub populations: Vec<PopulationSpec>,
    /// Phase timing shared by every population of the epoch.
    #[serde(default)]
    pub durations: PhaseDurations,
    /// Local-clock time (seconds) at which the epoch reports completion.
    pub complete_after: f64,
    /// Choreography played when the scene transitions into this epoch.
    #[serde(default)]
    pub transition: TimelineScript,
    /// Interactive camera limits installed when the transition finishes.
    #[serde(default)]
    pub limits: ControlLimits,
    /// Post-processing installed when the transition starts.
    #[serde(default)]
    pub post: PostPreset,
    /// Materials registered on mount.
    #[serde(default)]
    pub materials: Vec<MaterialBinding>,
}

impl EpochDefinition {
    /// Check the definition in isolation.
    pub fn validate(&self) -> CosmosResult<()> {
        if !(self.complete_after.is_finite() && self.complete_after > 0.0) {
            return Err(CosmosError::validation(format!(
                "epoch '{}' completion time must be finite and > 0",
                self.id
            )));
        }
        self.durations.validate()?;
        self.transition.validate()?;
        self.limits.validate()?;
        self.post.validate()?;

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for spec in &self.populations {
            spec.validate()?;
            if let Some(anchor) = &spec.anchor
                && !seen.contains(anchor.as_str())
            {
                return Err(CosmosError::validation(format!(
                    "epoch '{}' population '{}' links to '{anchor}', which is not defined before it",
                    self.id, spec.name
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(CosmosError::validation(format!(
                    "epoch '{}' defines population '{}' twice",
                    self.id, spec.name
                )));
            }
        }

        let mut materials = BTreeSet::new();
        for m in &self.materials {
            if !materials.insert(m.id) {
                return Err(CosmosError::validation(format!(
                    "epoch '{}' registers material {:?} twice",
                    self.id, m.id
                )));
            }
        }
        Ok(())
    }

    /// Materials this epoch's transition script writes.
    pub fn script_materials(&self) -> BTreeSet<MaterialId> {
        self.transition
            .effects
            .iter()
            .filter_map(|e| match e.target {
                ParamTarget::Material { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/epoch/definition.rs"]
mod tests;

use std::fmt;

use rand::Rng;

use crate::{
    epoch::definition::{EpochDefinition, EpochId},
    evolution::state::VisualState,
    foundation::error::{CosmosError, CosmosResult},
    population::generator::{Population, generate},
    timeline::stage::{Stage, Uniform},
};

/// Lifecycle of a mounted epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpochState {
    /// Not mounted yet; no buffers exist.
    Dormant,
    /// Populations generated and materials registered; waiting for the first frame.
    Mounted,
    /// Local clock running.
    Animating,
    /// Completion reported; keeps animating until unmounted.
    Complete,
    /// Buffers released. Terminal.
    Unmounted,
}

#[derive(Debug)]
struct Layer {
    population: Population,
    anchor: Option<usize>,
    states: Vec<VisualState>,
}

/// Runs one [`EpochDefinition`]: owns its populations and per-frame visual buffers, drives
/// its local clock and latches completion.
///
/// The local clock starts on the first tick after mounting, not at mount time, so timing is
/// independent of mount latency. Completion fires once, when the clock reaches
/// `complete_after`.
pub struct EpochController {
    definition: EpochDefinition,
    state: EpochState,
    layers: Vec<Layer>,
    clock: f64,
    stage_marker: u8,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for EpochController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpochController")
            .field("id", &self.definition.id)
            .field("state", &self.state)
            .field("layers", &self.layers.len())
            .field("clock", &self.clock)
            .field("stage_marker", &self.stage_marker)
            .finish_non_exhaustive()
    }
}

fn scaled_count(count: usize, scale: f64) -> usize {
    if count == 0 {
        return 0;
    }
    ((count as f64 * scale).round() as usize).max(1)
}

impl EpochController {
    /// A dormant controller for `definition`.
    pub fn new(definition: EpochDefinition) -> Self {
        Self {
            definition,
            state: EpochState::Dormant,
            layers: Vec::new(),
            clock: 0.0,
            stage_marker: 0,
            on_complete: None,
        }
    }

    /// Which epoch this runs.
    pub fn id(&self) -> EpochId {
        self.definition.id
    }

    /// The definition being run.
    pub fn definition(&self) -> &EpochDefinition {
        &self.definition
    }

    /// Lifecycle state.
    pub fn state(&self) -> EpochState {
        self.state
    }

    /// Whether buffers exist (mounted, animating or complete).
    pub fn is_mounted(&self) -> bool {
        matches!(
            self.state,
            EpochState::Mounted | EpochState::Animating | EpochState::Complete
        )
    }

    /// Local clock in seconds; zero until the first tick.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Epoch-internal stage marker set by timeline cues.
    pub fn stage_marker(&self) -> u8 {
        self.stage_marker
    }

    /// Set the stage marker.
    pub fn set_stage_marker(&mut self, marker: u8) {
        self.stage_marker = marker;
    }

    /// Generate every population and register materials.
    ///
    /// Population counts are multiplied by `population_scale`; a non-empty population keeps at
    /// least one particle. Returns `Ok(false)` when already mounted. On error nothing is
    /// registered and the controller stays dormant.
    #[tracing::instrument(skip(self, rng, stage), fields(epoch = %self.definition.id))]
    pub fn mount<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        population_scale: f64,
        stage: &mut Stage,
    ) -> CosmosResult<bool> {
        match self.state {
            EpochState::Dormant => {}
            EpochState::Unmounted => {
                return Err(CosmosError::precondition(format!(
                    "epoch '{}' was unmounted and cannot be remounted",
                    self.definition.id
                )));
            }
            _ => return Ok(false),
        }
        if !(population_scale.is_finite() && population_scale > 0.0) {
            return Err(CosmosError::validation(
                "population scale must be finite and > 0",
            ));
        }
        self.definition.validate()?;

        let mut layers: Vec<Layer> = Vec::with_capacity(self.definition.populations.len());
        for spec in &self.definition.populations {
            let anchor = match &spec.anchor {
                Some(name) => Some(
                    layers
                        .iter()
                        .position(|l| l.population.name() == name.as_str())
                        .ok_or_else(|| {
                            CosmosError::generation(format!("anchor '{name}' is not generated"))
                        })?,
                ),
                None => None,
            };
            let mut scaled = spec.clone();
            scaled.count = scaled_count(spec.count, population_scale);
            let population = generate(&scaled, rng, anchor.map(|a| &layers[a].population))?;
            layers.push(Layer {
                states: Vec::with_capacity(population.len()),
                population,
                anchor,
            });
        }

        for m in &self.definition.materials {
            stage.materials.register(m.id, m.uniforms);
        }
        let particles: usize = layers.iter().map(|l| l.population.len()).sum();
        self.layers = layers;
        self.state = EpochState::Mounted;
        tracing::info!(particles, "epoch mounted");
        Ok(true)
    }

    /// Register a completion callback. Fires at most once; immediately if already complete,
    /// never once unmounted.
    pub fn on_complete(&mut self, callback: impl FnOnce() + 'static) {
        match self.state {
            EpochState::Complete => callback(),
            EpochState::Unmounted => {}
            _ => self.on_complete = Some(Box::new(callback)),
        }
    }

    /// Advance one frame by `dt` seconds and refresh every visual buffer.
    ///
    /// The first tick after mounting starts the clock at zero and initializes the epoch's
    /// materials. Returns `true` on the tick that completes the epoch.
    pub fn tick(&mut self, dt: f64, stage: &mut Stage) -> bool {
        match self.state {
            EpochState::Dormant | EpochState::Unmounted => return false,
            EpochState::Mounted => {
                self.state = EpochState::Animating;
                self.clock = 0.0;
                for m in &self.definition.materials {
                    stage.materials.initialize(m.id);
                }
                tracing::debug!(epoch = %self.definition.id, "epoch animating");
            }
            EpochState::Animating | EpochState::Complete => {
                if dt.is_finite() && dt > 0.0 {
                    self.clock += dt;
                }
            }
        }

        for m in &self.definition.materials {
            if let Some(uniforms) = stage.materials.get_mut(m.id) {
                uniforms.set(Uniform::Time, self.clock);
            }
        }

        let durations = self.definition.durations;
        for i in 0..self.layers.len() {
            let (before, rest) = self.layers.split_at_mut(i);
            let layer = &mut rest[0];
            let anchor = layer.anchor.map(|a| &before[a].population);
            layer
                .population
                .evaluate_into(self.clock, &durations, anchor, &mut layer.states);
        }

        if self.state == EpochState::Animating && self.clock >= self.definition.complete_after {
            self.state = EpochState::Complete;
            tracing::info!(epoch = %self.definition.id, clock = self.clock, "epoch complete");
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            return true;
        }
        false
    }

    /// Release every buffer and material. Terminal; pending callbacks are dropped.
    pub fn unmount(&mut self, stage: &mut Stage) {
        if !self.is_mounted() {
            return;
        }
        for m in &self.definition.materials {
            stage.materials.remove(m.id);
        }
        self.layers = Vec::new();
        self.on_complete = None;
        self.state = EpochState::Unmounted;
        tracing::info!(epoch = %self.definition.id, "epoch unmounted");
    }

    /// Populations with their current visual buffers, in generation order.
    pub fn frames(&self) -> impl Iterator<Item = (&Population, &[VisualState])> + '_ {
        self.layers
            .iter()
            .map(|l| (&l.population, l.states.as_slice()))
    }

    /// Total particles across all populations.
    pub fn particle_count(&self) -> usize {
        self.layers.iter().map(|l| l.population.len()).sum()
    }

    /// Particles currently visible.
    pub fn visible_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|l| l.states.iter())
            .filter(|s| s.is_visible())
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/epoch/controller.rs"]
mod tests;

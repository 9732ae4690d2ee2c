use crate::foundation::{
    core::Vec3,
    error::{CosmosError, CosmosResult},
    math::{non_negative, unit},
};

/// Named phase of a particle's per-frame state machine.
///
/// The declaration order is the global visiting order: for increasing time every rule visits a
/// non-decreasing subsequence of these phases.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the trigger (hidden, or idling).
    PreTrigger,
    /// Drawn in toward the anchor ahead of the trigger.
    Collapse,
    /// Sharp flash right after the trigger.
    Ignition,
    /// Relaxation from the flash toward steady state.
    Settle,
    /// Steady state with bounded twinkle.
    Steady,
    /// Post-trigger motion (ejecta, wind, dispersal, orbit).
    Active,
    /// Finished; zero size and opacity.
    Retired,
}

/// Per-frame derived state of one particle. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VisualState {
    /// World-space position.
    pub position: Vec3,
    /// Point size, `>= 0`.
    pub size: f32,
    /// Linear color, non-negative (may exceed 1 for bloom).
    pub color: Vec3,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Phase the particle is in.
    pub phase: Phase,
}

impl VisualState {
    /// Hidden at `position`.
    pub fn hidden(position: Vec3, phase: Phase) -> Self {
        Self {
            position,
            size: 0.0,
            color: Vec3::ZERO,
            opacity: 0.0,
            phase,
        }
    }

    /// Enforce the buffer invariants (non-negative size and color, unit opacity, finite position).
    pub fn sanitized(mut self) -> Self {
        self.size = non_negative(self.size);
        self.opacity = unit(self.opacity);
        self.color = Vec3::new(
            non_negative(self.color.x),
            non_negative(self.color.y),
            non_negative(self.color.z),
        );
        if !self.position.is_finite() {
            self.position = Vec3::ZERO;
        }
        if self.size == 0.0 {
            self.opacity = 0.0;
        }
        self
    }

    /// Whether the particle contributes anything to a frame.
    pub fn is_visible(&self) -> bool {
        self.size > 0.0 && self.opacity > 0.0
    }
}

/// Timing and shape constants shared by the rules of one epoch (seconds, world units).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    /// Ignition flash length.
    pub flash: f32,
    /// Delta at which settle ends and steady state begins.
    pub settle: f32,
    /// Peak flash size as a multiple above steady size.
    pub flash_gain: f32,
    /// Collapse lead ahead of the trigger.
    pub collapse_lead: f32,
    /// Disk formation lead ahead of the trigger.
    pub disk_lead: f32,
    /// Initial accretion disk radius.
    pub disk_radius: f32,
    /// Time for dispersing clouds to clear after the trigger.
    pub dispersal: f32,
    /// Ejecta lifetime.
    pub ejecta_age: f32,
    /// Ejecta radius at the end of its lifetime.
    pub ejecta_radius: f32,
    /// Delta at which wind starts.
    pub wind_start: f32,
    /// Delta at which wind stops; `None` loops forever.
    pub wind_end: Option<f32>,
    /// Wind loop period.
    pub wind_period: f32,
    /// Wind radius at the end of each loop.
    pub wind_radius: f32,
    /// Radius of captured orbits.
    pub orbit_radius: f32,
    /// Angular speed of captured orbits (rad/s).
    pub orbit_speed: f32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            flash: 0.8,
            settle: 3.0,
            flash_gain: 3.0,
            collapse_lead: 4.0,
            disk_lead: 2.5,
            disk_radius: 5.0,
            dispersal: 2.5,
            ejecta_age: 4.0,
            ejecta_radius: 50.0,
            wind_start: 0.5,
            wind_end: Some(8.0),
            wind_period: 2.0,
            wind_radius: 35.0,
            orbit_radius: 0.6,
            orbit_speed: 4.0,
        }
    }
}

impl PhaseDurations {
    /// Reject tables that would make a rule divide by zero or run phases out of order.
    pub fn validate(&self) -> CosmosResult<()> {
        let positive = [
            ("flash", self.flash),
            ("collapse_lead", self.collapse_lead),
            ("disk_lead", self.disk_lead),
            ("dispersal", self.dispersal),
            ("ejecta_age", self.ejecta_age),
            ("wind_period", self.wind_period),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(CosmosError::validation(format!(
                    "phase duration {name} must be > 0, got {v}"
                )));
            }
        }
        let non_negative = [
            ("flash_gain", self.flash_gain),
            ("disk_radius", self.disk_radius),
            ("ejecta_radius", self.ejecta_radius),
            ("wind_start", self.wind_start),
            ("wind_radius", self.wind_radius),
            ("orbit_radius", self.orbit_radius),
            ("orbit_speed", self.orbit_speed),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(CosmosError::validation(format!(
                    "phase parameter {name} must be >= 0, got {v}"
                )));
            }
        }
        if !(self.settle.is_finite() && self.settle > self.flash) {
            return Err(CosmosError::validation(
                "settle must end after the flash ends",
            ));
        }
        if let Some(end) = self.wind_end
            && !(end.is_finite() && end > self.wind_start)
        {
            return Err(CosmosError::validation("wind_end must follow wind_start"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/evolution/state.rs"]
mod tests;

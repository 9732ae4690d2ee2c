use std::{fs::File, io::BufReader, path::Path};

use crate::{
    epoch::definition::EpochId,
    foundation::error::{CosmosError, CosmosResult},
};

/// What the scene does with a transition request while another is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Refuse the request.
    #[default]
    Reject,
    /// Hold one request and start it when the scene is idle.
    Queue,
}

/// Scene-wide settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for population generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Largest frame delta applied in one tick (seconds).
    pub max_frame_delta: f64,
    /// Delay between mounting an epoch and starting its transition (seconds).
    pub settle_delay: f64,
    /// Start the next epoch's transition once the current one has finished playing.
    pub auto_chain: bool,
    /// Handling of overlapping transition requests.
    pub overlap_policy: OverlapPolicy,
    /// Multiplier applied to every population count.
    pub population_scale: f64,
    /// Epoch the scene opens with.
    pub start_epoch: EpochId,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_frame_delta: 0.1,
            settle_delay: 0.1,
            auto_chain: false,
            overlap_policy: OverlapPolicy::Reject,
            population_scale: 1.0,
            start_epoch: EpochId::Planck,
        }
    }
}

impl SceneConfig {
    /// Check numeric ranges.
    pub fn validate(&self) -> CosmosResult<()> {
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(CosmosError::validation(
                "max_frame_delta must be finite and > 0",
            ));
        }
        if !(self.settle_delay.is_finite() && self.settle_delay >= 0.0) {
            return Err(CosmosError::validation(
                "settle_delay must be finite and >= 0",
            ));
        }
        if !(self.population_scale.is_finite() && self.population_scale > 0.0) {
            return Err(CosmosError::validation(
                "population_scale must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Parse from a JSON reader and validate.
    pub fn from_reader<R: std::io::Read>(r: R) -> CosmosResult<Self> {
        let config: Self = serde_json::from_reader(r)
            .map_err(|e| CosmosError::serde(format!("parse scene config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json(s: &str) -> CosmosResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse from a JSON file on disk and validate.
    pub fn from_path(path: impl AsRef<Path>) -> CosmosResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CosmosError::validation(format!("open scene config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;

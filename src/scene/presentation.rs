use crate::{
    epoch::definition::EpochId,
    foundation::core::Vec2,
    timeline::stage::{CameraRig, Stage},
};

/// Read-only snapshot the host uses to drive UI and post-processing.
///
/// Recomputed from the scene on demand; the scene never calls back into the host to push
/// these values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PresentationState {
    /// Epoch that currently owns the scene, if any transition has started.
    pub epoch: Option<EpochId>,
    /// Display label for `epoch`.
    pub epoch_label: String,
    /// Epoch-internal stage marker.
    pub stage_marker: u8,
    /// Bloom strength.
    pub bloom_intensity: f64,
    /// Bloom threshold.
    pub bloom_threshold: f64,
    /// Chromatic aberration offset.
    pub chromatic_offset: Vec2,
    /// Vignette offset.
    pub vignette_offset: f64,
    /// Vignette darkness.
    pub vignette_darkness: f64,
    /// Film grain opacity.
    pub noise_opacity: f64,
    /// Camera pose and lens.
    pub camera: CameraRig,
    /// Whether a transition is mounting or playing.
    pub transitioning: bool,
}

impl PresentationState {
    pub(crate) fn capture(
        epoch: Option<EpochId>,
        stage_marker: u8,
        stage: &Stage,
        transitioning: bool,
    ) -> Self {
        let post = &stage.post;
        Self {
            epoch,
            epoch_label: epoch.map(EpochId::label).unwrap_or_default().to_string(),
            stage_marker,
            bloom_intensity: post.bloom_intensity,
            bloom_threshold: post.bloom_threshold,
            chromatic_offset: post.chromatic_offset,
            vignette_offset: post.vignette_offset,
            vignette_darkness: post.vignette_darkness,
            noise_opacity: post.noise_opacity,
            camera: stage.camera,
            transitioning,
        }
    }
}

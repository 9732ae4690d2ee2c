use crate::{
    foundation::{
        core::DVec3,
        error::{CosmosError, CosmosResult},
    },
    timeline::stage::CameraRig,
};

/// Interaction limits installed when the camera is handed back to the user.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControlLimits {
    /// Closest allowed distance to the target.
    pub min_distance: f64,
    /// Farthest allowed distance to the target.
    pub max_distance: f64,
    /// Allow panning.
    pub enable_pan: bool,
    /// Allow orbiting.
    pub enable_rotate: bool,
    /// Allow dolly zoom.
    pub enable_zoom: bool,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.5,
            max_distance: 100.0,
            enable_pan: true,
            enable_rotate: true,
            enable_zoom: true,
        }
    }
}

impl ControlLimits {
    /// Check the distance band.
    pub fn validate(&self) -> CosmosResult<()> {
        if !(self.min_distance.is_finite()
            && self.max_distance.is_finite()
            && self.min_distance > 0.0
            && self.min_distance <= self.max_distance)
        {
            return Err(CosmosError::validation(format!(
                "control distance band [{}, {}] is invalid",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }
}

/// One frame of user interaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrbitInput {
    /// Azimuth and elevation deltas in radians.
    #[serde(default)]
    pub rotate: [f64; 2],
    /// Screen-space pan in world units (right, up).
    #[serde(default)]
    pub pan: [f64; 2],
    /// Multiplicative dolly factor; `1.0` is no zoom.
    #[serde(default = "no_zoom")]
    pub zoom: f64,
}

fn no_zoom() -> f64 {
    1.0
}

/// User-driven orbit/pan/zoom camera controller.
///
/// Owns the camera only while enabled; a timeline driver disables it for the length of a
/// transition and a release cue re-enables it with new limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitControls {
    enabled: bool,
    target: DVec3,
    limits: ControlLimits,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            target: DVec3::ZERO,
            limits: ControlLimits::default(),
        }
    }
}

impl OrbitControls {
    /// Whether user input is applied.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Orbit pivot.
    pub fn target(&self) -> DVec3 {
        self.target
    }

    /// Active limits.
    pub fn limits(&self) -> ControlLimits {
        self.limits
    }

    /// Stop applying input.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resume applying input under `limits`.
    pub fn enable(&mut self, limits: ControlLimits) {
        self.limits = limits;
        self.enabled = true;
    }

    /// Apply one input to `camera`. Returns `false` (and leaves the camera untouched) when
    /// disabled.
    pub fn apply(&mut self, camera: &mut CameraRig, input: &OrbitInput) -> bool {
        if !self.enabled {
            return false;
        }
        let limits = self.limits;
        let mut offset = camera.position - self.target;
        let mut radius = offset.length();
        if !radius.is_finite() || radius < 1e-9 {
            radius = limits.min_distance;
            offset = DVec3::Z * radius;
        }

        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if limits.enable_rotate {
            azimuth -= finite_or_zero(input.rotate[0]);
            polar = (polar - finite_or_zero(input.rotate[1]))
                .clamp(1e-3, std::f64::consts::PI - 1e-3);
        }
        if limits.enable_zoom && input.zoom.is_finite() && input.zoom > 0.0 {
            radius *= input.zoom;
        }
        radius = radius.clamp(limits.min_distance, limits.max_distance);

        if limits.enable_pan {
            let right = DVec3::new(azimuth.cos(), 0.0, -azimuth.sin());
            let pan =
                right * finite_or_zero(input.pan[0]) + DVec3::Y * finite_or_zero(input.pan[1]);
            self.target += pan;
        }

        let dir = DVec3::new(
            polar.sin() * azimuth.sin(),
            polar.cos(),
            polar.sin() * azimuth.cos(),
        );
        camera.position = self.target + dir * radius;
        camera.rotation = look_rotation(dir);
        true
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// XYZ Euler angles for a camera at `dir` (unit, from target) looking back at the target.
fn look_rotation(dir: DVec3) -> DVec3 {
    let pitch = -(dir.y.clamp(-1.0, 1.0)).asin();
    let yaw = dir.x.atan2(dir.z);
    DVec3::new(pitch, yaw, 0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/controls/orbit.rs"]
mod tests;

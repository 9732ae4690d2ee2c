use crate::foundation::error::{CosmosError, CosmosResult};

pub use glam::{DVec3, Vec3};
pub use kurbo::Vec2;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Zero-based index of a simulated output frame.
pub struct FrameIndex(pub u64);

/// Rational frame rate used when the host steps a scene at a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, `> 0`.
    pub den: u32,
}

impl Fps {
    /// Build a frame rate; both parts must be non-zero.
    pub fn new(num: u32, den: u32) -> CosmosResult<Self> {
        if den == 0 {
            return Err(CosmosError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(CosmosError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Length of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Whole frames that fit in `secs`.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Local clock advanced by host-supplied frame deltas.
///
/// Deltas are capped so a dropped frame (tab switch, debugger pause) cannot teleport the
/// choreography forward; negative or non-finite deltas count as zero.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimClock {
    elapsed: f64,
    max_delta: f64,
}

impl SimClock {
    /// Clock at zero; a non-positive or non-finite `max_delta` disables the cap.
    pub fn new(max_delta: f64) -> Self {
        Self {
            elapsed: 0.0,
            max_delta: if max_delta.is_finite() && max_delta > 0.0 {
                max_delta
            } else {
                f64::INFINITY
            },
        }
    }

    /// Advance by `dt` and return the delta actually applied.
    pub fn advance(&mut self, dt: f64) -> f64 {
        let applied = if dt.is_finite() {
            dt.clamp(0.0, self.max_delta)
        } else {
            0.0
        };
        self.elapsed += applied;
        applied
    }

    /// Accumulated seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Per-advance cap.
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }
}

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    #[allow(missing_docs)]
    pub r: u8,
    #[allow(missing_docs)]
    pub g: u8,
    #[allow(missing_docs)]
    pub b: u8,
    #[allow(missing_docs)]
    pub a: u8,
}

impl Rgba8Premul {
    /// Quantize a linear color with coverage `alpha` (both clamped to `[0, 1]`).
    pub fn from_linear(color: Vec3, alpha: f32) -> Self {
        fn q(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        let a = alpha.clamp(0.0, 1.0);
        Self {
            r: q(color.x * a),
            g: q(color.y * a),
            b: q(color.z * a),
            a: q(a),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

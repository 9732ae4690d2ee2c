use crate::{
    animation::ease::Ease,
    foundation::core::{DVec3, Vec2, Vec3},
};

/// Interpolation contract for animated value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with factor `t` (not clamped; easing may overshoot).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for DVec3 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        *a + (*b - *a) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        *a + (*b - *a) * t as f32
    }
}

/// Normalized progress of a window `[start, start + duration)` at time `now`.
///
/// Pure in its inputs: re-evaluating at the same `now` yields the same value. A zero-length
/// window jumps from 0 to 1 at `start`.
pub fn window_progress(now: f64, start: f64, duration: f64) -> f64 {
    let local = now - start;
    if !local.is_finite() || local < 0.0 {
        return 0.0;
    }
    if duration <= 0.0 {
        return 1.0;
    }
    (local / duration).clamp(0.0, 1.0)
}

/// A two-point tween between `from` and `to` shaped by an [`Ease`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tween<T> {
    /// Value at progress 0.
    pub from: T,
    /// Value at progress 1.
    pub to: T,
    /// Curve applied to raw progress.
    pub ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    /// Build a tween.
    pub fn new(from: T, to: T, ease: Ease) -> Self {
        Self { from, to, ease }
    }

    /// Sample at raw progress `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> T {
        T::lerp(&self.from, &self.to, self.ease.apply(t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;

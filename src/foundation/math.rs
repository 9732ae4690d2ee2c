use glam::{EulerRot, Quat, Vec3};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Derive a stable child seed from a parent seed and a label.
pub(crate) fn derive_seed(seed: u64, label: &str) -> u64 {
    let mut h = Fnv1a64::new(Fnv1a64::OFFSET_BASIS ^ seed);
    h.write_bytes(label.as_bytes());
    h.finish()
}

/// Clamp to `>= 0`, mapping NaN to zero.
pub(crate) fn non_negative(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}

/// Clamp to `[0, 1]`, mapping NaN to zero.
pub(crate) fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Normalize `v`, falling back to `fallback` for near-zero vectors.
pub(crate) fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > 1e-12 && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Unit vector from two uniforms using `acos(2v - 1)` colatitude (uniform solid angle).
pub(crate) fn unit_sphere_direction(u: f32, v: f32) -> Vec3 {
    let theta = u * std::f32::consts::TAU;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// Rotate `v` by XYZ Euler angles in radians.
pub(crate) fn rotate_euler(v: Vec3, angles: Vec3) -> Vec3 {
    if angles == Vec3::ZERO {
        return v;
    }
    Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z) * v
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

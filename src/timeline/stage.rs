use std::collections::BTreeMap;

use crate::foundation::{
    core::{DVec3, Vec2},
    error::{CosmosError, CosmosResult},
};

/// Perspective camera pose and lens.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraRig {
    /// World position.
    pub position: DVec3,
    /// XYZ Euler rotation in radians.
    pub rotation: DVec3,
    /// Vertical field of view in degrees.
    pub fov: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: DVec3::new(0.0, 0.0, 5.0),
            rotation: DVec3::ZERO,
            fov: 75.0,
        }
    }
}

/// Global post-processing parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PostFx {
    /// Bloom strength.
    pub bloom_intensity: f64,
    /// Luminance threshold for bloom.
    pub bloom_threshold: f64,
    /// Chromatic aberration offset in UV units.
    pub chromatic_offset: Vec2,
    /// Vignette offset.
    pub vignette_offset: f64,
    /// Vignette darkness.
    pub vignette_darkness: f64,
    /// Film grain opacity.
    pub noise_opacity: f64,
}

impl Default for PostFx {
    fn default() -> Self {
        Self {
            bloom_intensity: 1.0,
            bloom_threshold: 0.5,
            chromatic_offset: Vec2::ZERO,
            vignette_offset: 0.1,
            vignette_darkness: 0.5,
            noise_opacity: 0.03,
        }
    }
}

/// Transform of the root group all epoch content hangs under.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniverseTransform {
    /// Uniform scale.
    pub scale: f64,
    /// XYZ Euler rotation in radians.
    pub rotation: DVec3,
}

impl Default for UniverseTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: DVec3::ZERO,
        }
    }
}

/// Shader materials whose uniforms the timeline and epochs write.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MaterialId {
    /// The Planck point sprite.
    PlanckPoint,
    /// Near quantum foam.
    Foam,
    /// Distant parallax foam.
    DistantFoam,
    /// Quark-gluon plasma.
    Plasma,
    /// Nucleon and fusion glow.
    Nucleons,
    /// Recombination nuclei and electrons.
    Atoms,
    /// Dark ages void and dust.
    Void,
    /// First stars and their surroundings.
    Stars,
}

/// Typed uniform names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uniform {
    /// Seconds since the owning epoch started animating.
    Time,
    /// Inflation progress in `[0, 1]`.
    Inflation,
    /// Material opacity in `[0, 1]`.
    Opacity,
    /// Temperature in kelvin.
    Temperature,
    /// Emission multiplier.
    Intensity,
}

/// Uniform block shared by all materials.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialUniforms {
    /// `uTime`.
    pub time: f64,
    /// `uInflation`.
    pub inflation: f64,
    /// `uOpacity`.
    pub opacity: f64,
    /// `uTemperature`.
    pub temperature: f64,
    /// `uIntensity`.
    pub intensity: f64,
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            inflation: 0.0,
            opacity: 1.0,
            temperature: 0.0,
            intensity: 1.0,
        }
    }
}

impl MaterialUniforms {
    /// Read one uniform.
    pub fn get(&self, uniform: Uniform) -> f64 {
        match uniform {
            Uniform::Time => self.time,
            Uniform::Inflation => self.inflation,
            Uniform::Opacity => self.opacity,
            Uniform::Temperature => self.temperature,
            Uniform::Intensity => self.intensity,
        }
    }

    /// Write one uniform.
    pub fn set(&mut self, uniform: Uniform, value: f64) {
        let slot = match uniform {
            Uniform::Time => &mut self.time,
            Uniform::Inflation => &mut self.inflation,
            Uniform::Opacity => &mut self.opacity,
            Uniform::Temperature => &mut self.temperature,
            Uniform::Intensity => &mut self.intensity,
        };
        *slot = value;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MaterialSlot {
    uniforms: MaterialUniforms,
    initialized: bool,
}

/// Registered materials and their uniforms.
///
/// A material is registered when its epoch mounts and becomes initialized on that epoch's
/// first animated frame; only initialized materials are valid timeline targets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialTable {
    slots: BTreeMap<MaterialId, MaterialSlot>,
}

impl MaterialTable {
    /// Register `id` with the given initial uniforms (uninitialized).
    pub fn register(&mut self, id: MaterialId, uniforms: MaterialUniforms) {
        self.slots.insert(
            id,
            MaterialSlot {
                uniforms,
                initialized: false,
            },
        );
    }

    /// Mark `id` ready. Returns `false` if it was never registered.
    pub fn initialize(&mut self, id: MaterialId) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.initialized = true;
                true
            }
            None => false,
        }
    }

    /// Drop `id`.
    pub fn remove(&mut self, id: MaterialId) {
        self.slots.remove(&id);
    }

    /// Whether `id` is registered and initialized.
    pub fn is_live(&self, id: MaterialId) -> bool {
        self.slots.get(&id).is_some_and(|s| s.initialized)
    }

    /// Uniforms of a live material.
    pub fn get(&self, id: MaterialId) -> Option<&MaterialUniforms> {
        self.slots
            .get(&id)
            .filter(|s| s.initialized)
            .map(|s| &s.uniforms)
    }

    /// Mutable uniforms of a live material.
    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut MaterialUniforms> {
        self.slots
            .get_mut(&id)
            .filter(|s| s.initialized)
            .map(|s| &mut s.uniforms)
    }

    /// Iterate over registered ids.
    pub fn ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.slots.keys().copied()
    }
}

/// A value a timeline writes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Scalar.
    Scalar(f64),
    /// 2D vector.
    Vec2(Vec2),
    /// 3D vector.
    Vec3(DVec3),
}

/// Shape of a [`ParamValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// [`ParamValue::Scalar`].
    Scalar,
    /// [`ParamValue::Vec2`].
    Vec2,
    /// [`ParamValue::Vec3`].
    Vec3,
}

impl ParamValue {
    /// Shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Vec2(_) => ValueKind::Vec2,
            Self::Vec3(_) => ValueKind::Vec3,
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_finite(),
            Self::Vec2(v) => v.x.is_finite() && v.y.is_finite(),
            Self::Vec3(v) => v.is_finite(),
        }
    }
}

/// A named, typed stage parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "param", rename_all = "snake_case")]
pub enum ParamTarget {
    /// [`CameraRig::position`].
    CameraPosition,
    /// [`CameraRig::rotation`].
    CameraRotation,
    /// [`CameraRig::fov`], clamped to `[1, 179]`.
    CameraFov,
    /// [`UniverseTransform::scale`], clamped to `>= 0`.
    UniverseScale,
    /// [`UniverseTransform::rotation`].
    UniverseRotation,
    /// [`PostFx::bloom_intensity`], clamped to `>= 0`.
    BloomIntensity,
    /// [`PostFx::bloom_threshold`], clamped to `[0, 1]`.
    BloomThreshold,
    /// [`PostFx::chromatic_offset`].
    ChromaticOffset,
    /// [`PostFx::vignette_offset`], clamped to `>= 0`.
    VignetteOffset,
    /// [`PostFx::vignette_darkness`], clamped to `[0, 1]`.
    VignetteDarkness,
    /// [`PostFx::noise_opacity`], clamped to `[0, 1]`.
    NoiseOpacity,
    /// A material uniform.
    Material {
        /// Material.
        id: MaterialId,
        /// Uniform.
        uniform: Uniform,
    },
}

impl ParamTarget {
    /// Value shape this target accepts.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::CameraPosition | Self::CameraRotation | Self::UniverseRotation => ValueKind::Vec3,
            Self::ChromaticOffset => ValueKind::Vec2,
            _ => ValueKind::Scalar,
        }
    }

    /// Whether writing this target requires exclusive camera ownership.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            Self::CameraPosition | Self::CameraRotation | Self::CameraFov
        )
    }

    /// Clamp a scalar into this target's valid range.
    pub fn clamp_scalar(&self, v: f64) -> f64 {
        let v = if v.is_nan() { 0.0 } else { v };
        match self {
            Self::CameraFov => v.clamp(1.0, 179.0),
            Self::UniverseScale
            | Self::BloomIntensity
            | Self::VignetteOffset
            | Self::Material {
                uniform: Uniform::Temperature | Uniform::Intensity | Uniform::Time,
                ..
            } => v.max(0.0),
            Self::BloomThreshold
            | Self::VignetteDarkness
            | Self::NoiseOpacity
            | Self::Material {
                uniform: Uniform::Opacity | Uniform::Inflation,
                ..
            } => v.clamp(0.0, 1.0),
            _ => v,
        }
    }
}

/// All shared mutable visual state: camera, post-processing, universe transform and materials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stage {
    /// Camera.
    pub camera: CameraRig,
    /// Post-processing.
    pub post: PostFx,
    /// Root transform.
    pub universe: UniverseTransform,
    /// Material uniforms.
    pub materials: MaterialTable,
}

impl Stage {
    /// Whether `target` can be read and written right now.
    pub fn is_live(&self, target: &ParamTarget) -> bool {
        match target {
            ParamTarget::Material { id, .. } => self.materials.is_live(*id),
            _ => true,
        }
    }

    /// Current value of `target`.
    pub fn read(&self, target: &ParamTarget) -> CosmosResult<ParamValue> {
        Ok(match target {
            ParamTarget::CameraPosition => ParamValue::Vec3(self.camera.position),
            ParamTarget::CameraRotation => ParamValue::Vec3(self.camera.rotation),
            ParamTarget::CameraFov => ParamValue::Scalar(self.camera.fov),
            ParamTarget::UniverseScale => ParamValue::Scalar(self.universe.scale),
            ParamTarget::UniverseRotation => ParamValue::Vec3(self.universe.rotation),
            ParamTarget::BloomIntensity => ParamValue::Scalar(self.post.bloom_intensity),
            ParamTarget::BloomThreshold => ParamValue::Scalar(self.post.bloom_threshold),
            ParamTarget::ChromaticOffset => ParamValue::Vec2(self.post.chromatic_offset),
            ParamTarget::VignetteOffset => ParamValue::Scalar(self.post.vignette_offset),
            ParamTarget::VignetteDarkness => ParamValue::Scalar(self.post.vignette_darkness),
            ParamTarget::NoiseOpacity => ParamValue::Scalar(self.post.noise_opacity),
            ParamTarget::Material { id, uniform } => {
                let uniforms = self.materials.get(*id).ok_or_else(|| {
                    CosmosError::precondition(format!("material {id:?} is not initialized"))
                })?;
                ParamValue::Scalar(uniforms.get(*uniform))
            }
        })
    }

    /// Write `value` to `target`, clamping bounded scalars.
    pub fn write(&mut self, target: &ParamTarget, value: ParamValue) -> CosmosResult<()> {
        if value.kind() != target.value_kind() {
            return Err(CosmosError::timeline(format!(
                "{target:?} expects {:?}, got {:?}",
                target.value_kind(),
                value.kind()
            )));
        }
        match (target, value) {
            (ParamTarget::CameraPosition, ParamValue::Vec3(v)) => self.camera.position = v,
            (ParamTarget::CameraRotation, ParamValue::Vec3(v)) => self.camera.rotation = v,
            (ParamTarget::UniverseRotation, ParamValue::Vec3(v)) => self.universe.rotation = v,
            (ParamTarget::ChromaticOffset, ParamValue::Vec2(v)) => self.post.chromatic_offset = v,
            (ParamTarget::Material { id, uniform }, ParamValue::Scalar(v)) => {
                let clamped = target.clamp_scalar(v);
                let uniforms = self.materials.get_mut(*id).ok_or_else(|| {
                    CosmosError::precondition(format!("material {id:?} is not initialized"))
                })?;
                uniforms.set(*uniform, clamped);
            }
            (_, ParamValue::Scalar(v)) => {
                let v = target.clamp_scalar(v);
                let slot = match target {
                    ParamTarget::CameraFov => &mut self.camera.fov,
                    ParamTarget::UniverseScale => &mut self.universe.scale,
                    ParamTarget::BloomIntensity => &mut self.post.bloom_intensity,
                    ParamTarget::BloomThreshold => &mut self.post.bloom_threshold,
                    ParamTarget::VignetteOffset => &mut self.post.vignette_offset,
                    ParamTarget::VignetteDarkness => &mut self.post.vignette_darkness,
                    ParamTarget::NoiseOpacity => &mut self.post.noise_opacity,
                    _ => return Ok(()),
                };
                *slot = v;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/stage.rs"]
mod tests;

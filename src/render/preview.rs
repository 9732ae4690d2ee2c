use glam::{DMat3, EulerRot};

use crate::{
    evolution::state::VisualState,
    foundation::{
        core::{Canvas, DVec3, Rgba8Premul, Vec3},
        error::{CosmosError, CosmosResult},
    },
    scene::orchestrator::Scene,
    timeline::stage::{CameraRig, PostFx, Stage, UniverseTransform},
};

/// Rendered frame pixels (premultiplied RGBA8, row-major).
#[derive(Clone, Debug)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    /// Number of pixels with non-zero coverage.
    pub fn lit_pixels(&self) -> usize {
        self.data.chunks_exact(4).filter(|p| p[3] > 0).count()
    }
}

/// Knobs for [`render_preview`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Output size.
    pub canvas: Canvas,
    /// Screen-space multiplier on projected particle radii.
    pub point_scale: f32,
    /// Smallest splat radius in pixels; distant points never vanish below it.
    pub min_radius_px: f32,
    /// Largest splat radius in pixels.
    pub max_radius_px: f32,
    /// Apply bloom and vignette from the stage's post-processing parameters.
    pub post: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 640,
                height: 360,
            },
            point_scale: 1.0,
            min_radius_px: 0.75,
            max_radius_px: 24.0,
            post: true,
        }
    }
}

impl PreviewSettings {
    fn validate(&self) -> CosmosResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CosmosError::validation("preview canvas must be non-empty"));
        }
        if !(self.point_scale.is_finite() && self.point_scale > 0.0) {
            return Err(CosmosError::validation("point_scale must be finite and > 0"));
        }
        if !(self.min_radius_px.is_finite()
            && self.max_radius_px.is_finite()
            && self.min_radius_px > 0.0
            && self.min_radius_px <= self.max_radius_px)
        {
            return Err(CosmosError::validation("splat radius band is invalid"));
        }
        Ok(())
    }
}

/// Pinhole projection of world points through a [`CameraRig`].
///
/// The camera looks down its local `-Z` axis with `+Y` up, matching the convention the
/// timeline scripts are authored in.
#[derive(Clone, Copy, Debug)]
struct Projector {
    position: DVec3,
    world_to_view: DMat3,
    universe: DMat3,
    universe_scale: f64,
    focal_px: f64,
    half_w: f64,
    half_h: f64,
}

impl Projector {
    fn new(camera: &CameraRig, universe: &UniverseTransform, canvas: Canvas) -> Self {
        let r = camera.rotation;
        let u = universe.rotation;
        let half_fov = camera.fov.to_radians() * 0.5;
        let half_h = canvas.height as f64 * 0.5;
        Self {
            position: camera.position,
            world_to_view: DMat3::from_euler(EulerRot::XYZ, r.x, r.y, r.z).transpose(),
            universe: DMat3::from_euler(EulerRot::XYZ, u.x, u.y, u.z),
            universe_scale: universe.scale,
            focal_px: half_h / half_fov.tan().max(1e-6),
            half_w: canvas.width as f64 * 0.5,
            half_h,
        }
    }

    /// Screen position and pixels-per-world-unit at that depth, or `None` behind the camera.
    fn project(&self, local: Vec3) -> Option<(f64, f64, f64)> {
        let world = self.universe * (local.as_dvec3() * self.universe_scale);
        let view = self.world_to_view * (world - self.position);
        let depth = -view.z;
        if !depth.is_finite() || depth <= 1e-3 {
            return None;
        }
        let px_per_unit = self.focal_px / depth;
        let x = self.half_w + view.x * px_per_unit;
        let y = self.half_h - view.y * px_per_unit;
        Some((x, y, px_per_unit * self.universe_scale))
    }
}

/// Splat `layers` through the stage's camera into a premultiplied RGBA8 frame.
///
/// Blending is additive in linear light; each particle is a soft disc whose radius follows its
/// projected size. Hidden particles (zero size or opacity) are skipped.
pub fn render_preview<'a>(
    stage: &Stage,
    layers: impl IntoIterator<Item = &'a [VisualState]>,
    settings: &PreviewSettings,
) -> CosmosResult<FrameRgba> {
    settings.validate()?;
    let Canvas { width, height } = settings.canvas;
    let projector = Projector::new(&stage.camera, &stage.universe, settings.canvas);
    let mut accum = vec![[0.0f32; 4]; (width as usize) * (height as usize)];

    let mut splats = 0usize;
    for layer in layers {
        for state in layer.iter().filter(|s| s.is_visible()) {
            let Some((cx, cy, px_per_unit)) = projector.project(state.position) else {
                continue;
            };
            let radius = ((state.size as f64 * px_per_unit) as f32 * settings.point_scale)
                .clamp(settings.min_radius_px, settings.max_radius_px);
            splat(&mut accum, width, height, (cx as f32, cy as f32), radius, state);
            splats += 1;
        }
    }
    tracing::debug!(splats, width, height, "preview rendered");

    let post = settings.post.then_some(&stage.post);
    let mut data = Vec::with_capacity(accum.len() * 4);
    for (i, px) in accum.iter().enumerate() {
        let x = (i % width as usize) as f32;
        let y = (i / width as usize) as f32;
        let mut rgb = Vec3::new(px[0], px[1], px[2]);
        let mut alpha = px[3].min(1.0);
        if let Some(post) = post {
            rgb = bloom(rgb, post);
            let v = vignette((x + 0.5) / width as f32, (y + 0.5) / height as f32, post);
            rgb *= v;
            alpha *= v;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let rgb = rgb.min(Vec3::splat(alpha));
        data.extend_from_slice(&[q(rgb.x), q(rgb.y), q(rgb.z), q(alpha)]);
    }
    Ok(FrameRgba {
        width,
        height,
        data,
    })
}

/// Render every mounted epoch of `scene`.
pub fn render_scene(scene: &Scene, settings: &PreviewSettings) -> CosmosResult<FrameRgba> {
    let layers = scene
        .mounted()
        .flat_map(|epoch| epoch.frames().map(|(_, states)| states));
    render_preview(scene.stage(), layers, settings)
}

fn splat(
    accum: &mut [[f32; 4]],
    width: u32,
    height: u32,
    center: (f32, f32),
    radius: f32,
    state: &VisualState,
) {
    let (cx, cy) = center;
    let x0 = (cx - radius).floor().max(0.0) as i64;
    let y0 = (cy - radius).floor().max(0.0) as i64;
    let x1 = ((cx + radius).ceil() as i64).min(width as i64 - 1);
    let y1 = ((cy + radius).ceil() as i64).min(height as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }
    let premul = state.color * state.opacity;
    let inv_r2 = 1.0 / (radius * radius);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d2 = (dx * dx + dy * dy) * inv_r2;
            if d2 >= 1.0 {
                continue;
            }
            let falloff = (1.0 - d2) * (1.0 - d2);
            let px = &mut accum[(y as usize) * (width as usize) + x as usize];
            px[0] += premul.x * falloff;
            px[1] += premul.y * falloff;
            px[2] += premul.z * falloff;
            px[3] += state.opacity * falloff;
        }
    }
}

fn bloom(rgb: Vec3, post: &PostFx) -> Vec3 {
    let luma = rgb.dot(Vec3::new(0.2126, 0.7152, 0.0722));
    let excess = (luma - post.bloom_threshold as f32).max(0.0);
    if excess <= 0.0 || luma <= 0.0 {
        return rgb;
    }
    rgb * (1.0 + post.bloom_intensity as f32 * 0.25 * excess / luma)
}

fn vignette(u: f32, v: f32, post: &PostFx) -> f32 {
    let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt() * std::f32::consts::SQRT_2;
    let offset = post.vignette_offset as f32;
    let edge = ((d - offset).max(0.0) / (1.0 - offset).max(1e-3)).clamp(0.0, 1.0);
    (1.0 - post.vignette_darkness as f32 * edge * edge).max(0.0)
}

fn q(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;

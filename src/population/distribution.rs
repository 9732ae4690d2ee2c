use rand::Rng;

use crate::foundation::{
    core::Vec3,
    error::{CosmosError, CosmosResult},
    math::unit_sphere_direction,
};

/// Spatial pattern a population's positions (or anchor-relative offsets) are drawn from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Every sample at the origin.
    Point,
    /// Uniform in volume (`cbrt` radius sampling).
    Sphere {
        /// Outer radius.
        radius: f32,
    },
    /// Uniform solid angle with radius drawn from a band.
    ///
    /// The radius is `inner + u^exponent * (outer - inner)`; `exponent = 1` gives a flat band,
    /// `exponent > 1` concentrates samples toward `inner`.
    Shell {
        /// Inner band radius.
        inner: f32,
        /// Outer band radius.
        outer: f32,
        /// Radial concentration exponent.
        #[serde(default = "one")]
        exponent: f32,
    },
    /// Pick one of `centers`, then offset by a sample of `local`.
    Clustered {
        /// Cluster centers.
        centers: Vec<Vec3>,
        /// Local offset pattern; must not itself be clustered or filamentary.
        local: Box<Distribution>,
    },
    /// Samples spread along randomly placed straight strands with lateral jitter.
    Filament {
        /// Number of strands drawn per population.
        strands: u32,
        /// Strand midpoints lie uniformly inside this radius.
        extent: f32,
        /// Strand length.
        length: f32,
        /// Lateral jitter radius around the strand axis.
        jitter: f32,
    },
}

fn one() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug)]
struct Strand {
    mid: Vec3,
    dir: Vec3,
}

/// A distribution with its per-population random structure (strands) already drawn.
#[derive(Debug)]
pub(crate) struct Sampler<'a> {
    dist: &'a Distribution,
    strands: Vec<Strand>,
}

impl Distribution {
    /// Check radii and structural constraints.
    pub fn validate(&self) -> CosmosResult<()> {
        fn radius(name: &str, v: f32) -> CosmosResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(CosmosError::validation(format!(
                    "distribution {name} must be finite and >= 0, got {v}"
                )))
            }
        }

        match self {
            Self::Point => Ok(()),
            Self::Sphere { radius: r } => radius("radius", *r),
            Self::Shell {
                inner,
                outer,
                exponent,
            } => {
                radius("inner", *inner)?;
                radius("outer", *outer)?;
                if inner > outer {
                    return Err(CosmosError::validation(format!(
                        "shell inner radius {inner} exceeds outer radius {outer}"
                    )));
                }
                if !(exponent.is_finite() && *exponent > 0.0) {
                    return Err(CosmosError::validation("shell exponent must be > 0"));
                }
                Ok(())
            }
            Self::Clustered { centers, local } => {
                if centers.is_empty() {
                    return Err(CosmosError::validation(
                        "clustered distribution needs at least one center",
                    ));
                }
                if centers.iter().any(|c| !c.is_finite()) {
                    return Err(CosmosError::validation("cluster centers must be finite"));
                }
                if matches!(**local, Self::Clustered { .. } | Self::Filament { .. }) {
                    return Err(CosmosError::validation(
                        "cluster-local distribution must be point, sphere or shell",
                    ));
                }
                local.validate()
            }
            Self::Filament {
                strands,
                extent,
                length,
                jitter,
            } => {
                if *strands == 0 {
                    return Err(CosmosError::validation("filament needs at least one strand"));
                }
                radius("extent", *extent)?;
                radius("length", *length)?;
                radius("jitter", *jitter)
            }
        }
    }

    /// Validate and draw per-population structure.
    pub(crate) fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> CosmosResult<Sampler<'_>> {
        self.validate()?;
        let strands = match self {
            Self::Filament {
                strands, extent, ..
            } => (0..*strands)
                .map(|_| Strand {
                    mid: in_sphere(rng, *extent),
                    dir: direction(rng),
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(Sampler { dist: self, strands })
    }
}

impl Sampler<'_> {
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self.dist {
            Distribution::Filament { length, jitter, .. } if !self.strands.is_empty() => {
                let s = self.strands[rng.gen_range(0..self.strands.len())];
                let along = (uniform(rng) - 0.5) * length;
                s.mid + s.dir * along + in_sphere(rng, *jitter)
            }
            other => sample_simple(other, rng),
        }
    }
}

fn sample_simple<R: Rng + ?Sized>(dist: &Distribution, rng: &mut R) -> Vec3 {
    match dist {
        Distribution::Point | Distribution::Filament { .. } => Vec3::ZERO,
        Distribution::Sphere { radius } => in_sphere(rng, *radius),
        Distribution::Shell {
            inner,
            outer,
            exponent,
        } => {
            let r = inner + uniform(rng).powf(*exponent) * (outer - inner);
            direction(rng) * r
        }
        Distribution::Clustered { centers, local } => {
            let c = centers[rng.gen_range(0..centers.len())];
            c + sample_simple(local, rng)
        }
    }
}

pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0f32..1.0)
}

pub(crate) fn direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let u = uniform(rng);
    let v = uniform(rng);
    unit_sphere_direction(u, v)
}

fn in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let r = uniform(rng).cbrt() * radius;
    direction(rng) * r
}

#[cfg(test)]
#[path = "../../tests/unit/population/distribution.rs"]
mod tests;

use super::*;
use rand::{SeedableRng, rngs::StdRng};

fn draw(dist: &Distribution, n: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sampler = dist.prepare(&mut rng).unwrap();
    (0..n).map(|_| sampler.sample(&mut rng)).collect()
}

#[test]
fn sphere_samples_stay_inside_with_volume_mean_radius() {
    let pts = draw(&Distribution::Sphere { radius: 3.0 }, 10_000, 1);
    let max = pts.iter().map(|p| p.length()).fold(0.0f32, f32::max);
    assert!(max <= 3.0 + 1e-4, "max radius {max}");
    let mean = pts.iter().map(|p| p.length()).sum::<f32>() / pts.len() as f32;
    assert!((mean - 0.75 * 3.0).abs() < 0.05, "mean radius {mean}");
}

#[test]
fn shell_samples_stay_in_band() {
    let dist = Distribution::Shell {
        inner: 5.0,
        outer: 40.0,
        exponent: 1.0,
    };
    for p in draw(&dist, 5_000, 2) {
        let r = p.length();
        assert!((5.0 - 1e-3..=40.0 + 1e-3).contains(&r), "r = {r}");
    }
}

#[test]
fn shell_directions_cover_both_hemispheres_evenly() {
    let dist = Distribution::Shell {
        inner: 1.0,
        outer: 1.0,
        exponent: 1.0,
    };
    let pts = draw(&dist, 10_000, 3);
    let mean_z = pts.iter().map(|p| p.z).sum::<f32>() / pts.len() as f32;
    assert!(mean_z.abs() < 0.05, "mean z {mean_z}");
}

#[test]
fn clustered_samples_stay_near_a_center() {
    let centers = vec![Vec3::new(-80.0, 0.0, 0.0), Vec3::new(80.0, 0.0, 0.0)];
    let dist = Distribution::Clustered {
        centers: centers.clone(),
        local: Box::new(Distribution::Sphere { radius: 10.0 }),
    };
    for p in draw(&dist, 2_000, 4) {
        let nearest = centers
            .iter()
            .map(|c| c.distance(p))
            .fold(f32::MAX, f32::min);
        assert!(nearest <= 10.0 + 1e-3);
    }
}

#[test]
fn filament_samples_are_bounded_by_strand_geometry() {
    let dist = Distribution::Filament {
        strands: 6,
        extent: 20.0,
        length: 30.0,
        jitter: 1.0,
    };
    for p in draw(&dist, 3_000, 5) {
        assert!(p.length() <= 20.0 + 15.0 + 1.0 + 1e-3);
    }
}

#[test]
fn invalid_shapes_are_rejected() {
    assert!(Distribution::Sphere { radius: -1.0 }.validate().is_err());
    assert!(
        Distribution::Shell {
            inner: 4.0,
            outer: 2.0,
            exponent: 1.0
        }
        .validate()
        .is_err()
    );
    assert!(
        Distribution::Clustered {
            centers: vec![],
            local: Box::new(Distribution::Point)
        }
        .validate()
        .is_err()
    );
    assert!(
        Distribution::Filament {
            strands: 0,
            extent: 1.0,
            length: 1.0,
            jitter: 0.0
        }
        .validate()
        .is_err()
    );
}

#[test]
fn shell_exponent_defaults_to_one() {
    let dist: Distribution =
        serde_json::from_str(r#"{"type":"shell","inner":1.0,"outer":2.0}"#).unwrap();
    assert_eq!(
        dist,
        Distribution::Shell {
            inner: 1.0,
            outer: 2.0,
            exponent: 1.0
        }
    );
}

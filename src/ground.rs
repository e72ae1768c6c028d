//! Ground point cloud sampling.
//!
//! Points are scattered over an annulus in the XZ plane. The radius is drawn
//! as `inner + (outer - inner) * t^exponent` with `t ~ U[0, 1)`, so an
//! exponent above one packs points toward the inner edge.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use rand::Rng;

/// Parameters for the ground annulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundConfig {
    /// Number of points generated.
    pub count: u32,
    /// Radius of the empty circle in the middle.
    pub inner_radius: f32,
    /// Outer radius of the ground.
    pub ground_radius: f32,
    /// Shape of the radial density curve.
    pub exponent: f32,
    /// Height of the ground plane.
    pub base_height: f32,
    /// Total vertical spread around `base_height`.
    pub height_jitter: f32,
    pub min_size: f32,
    /// Sizes fall in `[min_size, min_size + size_range)`.
    pub size_range: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            count: 20_000,
            inner_radius: 0.55,
            ground_radius: 50.0 * 0.5,
            exponent: 1.5,
            base_height: -2.0,
            height_jitter: 0.2,
            min_size: 0.05,
            size_range: 0.35,
        }
    }
}

/// One ground point, laid out for direct upload as an instance attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GroundPoint {
    pub position: [f32; 3],
    pub size: f32,
}

impl GroundPoint {
    /// Distance from the vertical axis.
    pub fn radius(&self) -> f32 {
        self.position[0].hypot(self.position[2])
    }
}

/// Sample `config.count` ground points.
pub fn sample_ground<R: Rng>(config: &GroundConfig, rng: &mut R) -> Vec<GroundPoint> {
    let span = config.ground_radius - config.inner_radius;

    (0..config.count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let t: f32 = rng.gen();
            let radius = (config.inner_radius + span * t.powf(config.exponent))
                .clamp(config.inner_radius, config.ground_radius);
            let jitter = (rng.gen::<f32>() - 0.5) * config.height_jitter;
            let size = config.min_size + rng.gen::<f32>() * config.size_range;

            GroundPoint {
                position: [
                    angle.cos() * radius,
                    config.base_height + jitter,
                    angle.sin() * radius,
                ],
                size,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_count_and_bounds() {
        let config = GroundConfig::default();
        let points = sample_ground(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(points.len(), 20_000);

        for p in &points {
            let r = p.radius();
            assert!(r >= config.inner_radius - 1e-4, "radius {} below inner", r);
            assert!(r <= config.ground_radius + 1e-4, "radius {} above outer", r);
            assert!((p.position[1] - config.base_height).abs() <= 0.1 + 1e-6);
            assert!(p.size >= 0.05 && p.size < 0.4 + 1e-6);
        }
    }

    #[test]
    fn test_density_is_biased_inward() {
        let config = GroundConfig::default();
        let points = sample_ground(&config, &mut StdRng::seed_from_u64(11));
        let midpoint = (config.inner_radius + config.ground_radius) * 0.5;
        let inner_half = points.iter().filter(|p| p.radius() < midpoint).count();
        // P(t^1.5 < 0.5) = 0.5^(2/3) ~= 0.63
        assert!(inner_half as f32 / points.len() as f32 > 0.58);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = GroundConfig { count: 64, ..Default::default() };
        let a = sample_ground(&config, &mut StdRng::seed_from_u64(3));
        let b = sample_ground(&config, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_count() {
        let config = GroundConfig { count: 0, ..Default::default() };
        assert!(sample_ground(&config, &mut StdRng::seed_from_u64(0)).is_empty());
    }
}

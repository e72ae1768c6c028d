//! Square texel grid that stores one particle per texel.
//!
//! A grid for `n` particles has side `ceil(sqrt(n))`. Texels are addressed in
//! row-major order: particle `i` lives at column `i % side`, row `i / side`.
//! Only the first `n` texels are live; the rest are padding and are never
//! drawn.

use crate::error::SceneError;

/// Dimensions of the simulation state texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationGrid {
    side: u32,
    particle_count: u32,
}

impl SimulationGrid {
    /// Size a grid for `particle_count` particles.
    ///
    /// Zero particles cannot be simulated and yield
    /// [`SceneError::DegenerateInput`].
    pub fn for_particles(particle_count: usize) -> Result<Self, SceneError> {
        if particle_count == 0 {
            return Err(SceneError::DegenerateInput(
                "cannot size a simulation grid for zero particles".into(),
            ));
        }
        let particle_count = u32::try_from(particle_count).map_err(|_| {
            SceneError::DegenerateInput(format!("{} particles exceed the u32 range", particle_count))
        })?;

        Ok(Self {
            side: ceil_sqrt(particle_count),
            particle_count,
        })
    }

    /// Width and height of the grid in texels.
    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Number of live particles.
    #[inline]
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Total texels, live and padding.
    #[inline]
    pub fn texel_count(&self) -> u32 {
        self.side * self.side
    }

    /// Texels past the last particle.
    #[inline]
    pub fn padding(&self) -> u32 {
        self.texel_count() - self.particle_count
    }

    /// `(column, row)` of particle `index`, or `None` past the live range.
    pub fn texel_of(&self, index: u32) -> Option<(u32, u32)> {
        (index < self.particle_count).then(|| (index % self.side, index / self.side))
    }

    /// Texel-center UV of particle `index`.
    pub fn uv_of(&self, index: u32) -> Option<[f32; 2]> {
        let side = self.side as f32;
        self.texel_of(index)
            .map(|(col, row)| [(col as f32 + 0.5) / side, (row as f32 + 0.5) / side])
    }

    /// The UV map for every live particle, in particle order.
    pub fn uv_map(&self) -> Vec<[f32; 2]> {
        (0..self.particle_count)
            .filter_map(|i| self.uv_of(i))
            .collect()
    }
}

/// Smallest `s` with `s * s >= n`.
fn ceil_sqrt(n: u32) -> u32 {
    let n = n as u64;
    let mut s = (n as f64).sqrt().ceil() as u64;
    while s * s < n {
        s += 1;
    }
    while s > 0 && (s - 1) * (s - 1) >= n {
        s -= 1;
    }
    s as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_zero_particles_is_degenerate() {
        assert!(matches!(
            SimulationGrid::for_particles(0),
            Err(SceneError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_single_particle_grid() {
        let grid = SimulationGrid::for_particles(1).unwrap();
        assert_eq!(grid.side(), 1);
        assert_eq!(grid.texel_count(), 1);
        assert_eq!(grid.padding(), 0);
        assert_eq!(grid.uv_of(0), Some([0.5, 0.5]));
    }

    #[test]
    fn test_side_is_tight_ceiling() {
        for n in 1..=2_000u32 {
            let grid = SimulationGrid::for_particles(n as usize).unwrap();
            let side = grid.side();
            assert!(side * side >= n, "side {} too small for {}", side, n);
            assert!((side - 1) * (side - 1) < n, "side {} too large for {}", side, n);
        }
    }

    #[test]
    fn test_perfect_squares() {
        assert_eq!(ceil_sqrt(16), 4);
        assert_eq!(ceil_sqrt(17), 5);
        assert_eq!(ceil_sqrt(65_536), 256);
        assert_eq!(ceil_sqrt(65_537), 257);
    }

    #[test]
    fn test_uv_map_is_injective() {
        let grid = SimulationGrid::for_particles(10).unwrap();
        assert_eq!(grid.side(), 4);
        assert_eq!(grid.padding(), 6);

        let texels: HashSet<(u32, u32)> = (0..10).filter_map(|i| grid.texel_of(i)).collect();
        assert_eq!(texels.len(), 10);
        assert!(texels.iter().all(|&(c, r)| c < 4 && r < 4));
        assert_eq!(grid.texel_of(10), None);
    }

    #[test]
    fn test_uv_row_major_layout() {
        let grid = SimulationGrid::for_particles(9).unwrap();
        let uvs = grid.uv_map();
        assert_eq!(uvs.len(), 9);
        let third = 1.0 / 3.0;
        assert!((uvs[1][0] - 1.5 * third).abs() < 1e-6);
        assert!((uvs[1][1] - 0.5 * third).abs() < 1e-6);
        assert!((uvs[3][0] - 0.5 * third).abs() < 1e-6);
        assert!((uvs[3][1] - 1.5 * third).abs() < 1e-6);
    }
}

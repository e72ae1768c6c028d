//! Particle state stored as an RGBA32F texture.
//!
//! Each texel packs one [`ParticleRecord`]: `(x, y, z, seed)`. The same layout
//! is used for the seed texture built from a mesh, for the GPU ping-pong
//! targets, and for CPU readbacks of the current state.
//!
//! # Snapshots
//!
//! [`StateTexture::save_png`] writes a viewable image of the state, with
//! positions normalized to the bounding box of the live particles. This is
//! what the debug key in the scene window produces.

use std::path::Path;

use glam::Vec3;

use crate::grid::SimulationGrid;

/// One simulated particle, as packed into a texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRecord {
    pub position: Vec3,
    /// Random value in `[0, 1)`, constant for the lifetime of the particle.
    pub seed: f32,
}

impl ParticleRecord {
    /// Unpack from an `(x, y, z, seed)` texel.
    #[inline]
    pub fn from_texel(texel: [f32; 4]) -> Self {
        Self {
            position: Vec3::new(texel[0], texel[1], texel[2]),
            seed: texel[3],
        }
    }

    /// Pack into an `(x, y, z, seed)` texel.
    #[inline]
    pub fn to_texel(self) -> [f32; 4] {
        [self.position.x, self.position.y, self.position.z, self.seed]
    }
}

/// Raw RGBA32F texel data covering a whole [`SimulationGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct StateTexture {
    grid: SimulationGrid,
    texels: Vec<[f32; 4]>,
}

impl StateTexture {
    /// Wrap texel data, one entry per grid texel (padding included).
    ///
    /// # Panics
    ///
    /// Panics if `texels.len()` differs from the grid's texel count.
    pub fn from_texels(grid: SimulationGrid, texels: Vec<[f32; 4]>) -> Self {
        assert_eq!(
            texels.len(),
            grid.texel_count() as usize,
            "state texel count mismatch"
        );
        Self { grid, texels }
    }

    #[inline]
    pub fn grid(&self) -> SimulationGrid {
        self.grid
    }

    /// All texels, padding included.
    #[inline]
    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    /// Texels of live particles only.
    #[inline]
    pub fn live_texels(&self) -> &[[f32; 4]] {
        &self.texels[..self.grid.particle_count() as usize]
    }

    /// Particle `index`, or `None` for padding and out-of-range indices.
    pub fn particle(&self, index: u32) -> Option<ParticleRecord> {
        (index < self.grid.particle_count())
            .then(|| ParticleRecord::from_texel(self.texels[index as usize]))
    }

    /// Iterate over live particles.
    pub fn particles(&self) -> impl Iterator<Item = ParticleRecord> + '_ {
        self.live_texels().iter().copied().map(ParticleRecord::from_texel)
    }

    /// Texel bytes for GPU upload (16 bytes per texel, row-major).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Build a viewable RGBA8 image of the state.
    ///
    /// Positions map to RGB through the live bounding box; alpha is 255 for
    /// live texels and 0 for padding.
    pub fn to_image(&self) -> image::RgbaImage {
        let (min, max) = self
            .particles()
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(p.position), hi.max(p.position))
            });
        let extent = (max - min).max(Vec3::splat(f32::EPSILON));

        let side = self.grid.side();
        image::RgbaImage::from_fn(side, side, |x, y| {
            let index = y * side + x;
            match self.particle(index) {
                Some(p) => {
                    let n = ((p.position - min) / extent).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
                    image::Rgba([n.x as u8, n.y as u8, n.z as u8, 255])
                }
                None => image::Rgba([0, 0, 0, 0]),
            }
        })
    }

    /// Save [`Self::to_image`] as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.to_image()
            .save_with_format(path.as_ref(), image::ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_particles() -> StateTexture {
        let grid = SimulationGrid::for_particles(3).unwrap();
        StateTexture::from_texels(
            grid,
            vec![
                [0.0, 0.0, 0.0, 0.1],
                [2.0, 1.0, 0.0, 0.2],
                [1.0, 2.0, 4.0, 0.3],
                [9.0, 9.0, 9.0, 9.0],
            ],
        )
    }

    #[test]
    fn test_particles_skip_padding() {
        let state = three_particles();
        assert_eq!(state.particles().count(), 3);
        assert!(state.particle(3).is_none());
        assert_eq!(state.particle(2).unwrap().seed, 0.3);
    }

    #[test]
    fn test_record_round_trip() {
        let texel = [1.5, -2.0, 3.25, 0.75];
        assert_eq!(ParticleRecord::from_texel(texel).to_texel(), texel);
    }

    #[test]
    fn test_bytes_are_sixteen_per_texel() {
        let state = three_particles();
        assert_eq!(state.as_bytes().len(), 4 * 16);
    }

    #[test]
    fn test_image_normalizes_live_texels() {
        let image = three_particles().to_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0).0[0], 255);
        assert_eq!(image.get_pixel(0, 1).0[2], 255);
        // padding texel is transparent even though its data is non-zero
        assert_eq!(image.get_pixel(1, 1).0[3], 0);
    }

    #[test]
    #[should_panic(expected = "state texel count mismatch")]
    fn test_wrong_texel_count_panics() {
        let grid = SimulationGrid::for_particles(5).unwrap();
        StateTexture::from_texels(grid, vec![[0.0; 4]; 5]);
    }
}

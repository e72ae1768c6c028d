//! Initial particle state built from mesh vertices.

use rand::Rng;

use crate::error::SceneError;
use crate::grid::SimulationGrid;
use crate::mesh::MeshData;
use crate::texture::StateTexture;

/// Pack mesh vertices into a seed texture.
///
/// Texel `i` holds `(x, y + offset_y, z, seed)` for vertex `i`, where `seed` is
/// drawn from `[0, 1)`. Padding texels are zero. A mesh without vertices is a
/// [`SceneError::DegenerateInput`].
pub fn build_seed_texture<R: Rng>(
    mesh: &MeshData,
    offset_y: f32,
    rng: &mut R,
) -> Result<StateTexture, SceneError> {
    if mesh.is_empty() {
        return Err(SceneError::DegenerateInput(
            "seed mesh has zero vertices".into(),
        ));
    }
    let grid = SimulationGrid::for_particles(mesh.vertex_count())?;

    let mut texels = Vec::with_capacity(grid.texel_count() as usize);
    texels.extend(
        mesh.positions
            .iter()
            .map(|&[x, y, z]| [x, y + offset_y, z, rng.gen::<f32>()]),
    );
    texels.resize(grid.texel_count() as usize, [0.0; 4]);

    Ok(StateTexture::from_texels(grid, texels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_offset_applies_to_y_only() {
        let mesh = MeshData::from_positions(vec![[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]]);
        let seed = build_seed_texture(&mesh, -2.0, &mut StdRng::seed_from_u64(1)).unwrap();

        let p = seed.particle(0).unwrap();
        assert_eq!(p.position.to_array(), [1.0, 0.0, 3.0]);
        let p = seed.particle(1).unwrap();
        assert_eq!(p.position.to_array(), [-1.0, -1.5, 0.0]);
    }

    #[test]
    fn test_seeds_in_unit_range() {
        let mesh = MeshData::from_positions(vec![[0.0; 3]; 500]);
        let seed = build_seed_texture(&mesh, 0.0, &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(seed.particles().all(|p| (0.0..1.0).contains(&p.seed)));
    }

    #[test]
    fn test_padding_is_zeroed() {
        let mesh = MeshData::from_positions(vec![[4.0; 3]; 5]);
        let seed = build_seed_texture(&mesh, 0.0, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(seed.grid().side(), 3);
        assert_eq!(seed.texels().len(), 9);
        assert!(seed.texels()[5..].iter().all(|t| *t == [0.0; 4]));
    }

    #[test]
    fn test_empty_mesh_is_degenerate() {
        let err = build_seed_texture(&MeshData::default(), -2.0, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, SceneError::DegenerateInput(_)));
    }
}

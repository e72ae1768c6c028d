//! Seed mesh loading.
//!
//! The scene only needs the raw vertex stream of one mesh: positions, optional
//! vertex colors, and triangle indices. Positions are taken as stored in the
//! file, without applying node transforms.

use std::path::Path;

use crate::error::AssetError;

/// Vertex data of the seed mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex RGB colors, same length as `positions` when present.
    pub colors: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// A colorless, unindexed point cloud.
    pub fn from_positions(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            colors: None,
            indices: Vec::new(),
        }
    }

    /// Attach per-vertex colors.
    pub fn with_colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        self.colors = Some(colors);
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Color of vertex `index`, white when the mesh carries no colors.
    pub fn color(&self, index: usize) -> [f32; 3] {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or([1.0, 1.0, 1.0])
    }
}

/// Load the first mesh of a glTF / GLB file.
///
/// All primitives of that mesh are concatenated. Color channel 0 is used when
/// every primitive provides it.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = document
        .meshes()
        .next()
        .ok_or_else(|| AssetError::NoMesh(path.to_path_buf()))?;

    let mut data = MeshData::default();
    let mut colors = Vec::new();
    let mut all_colored = true;

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let base = data.positions.len() as u32;
        data.positions.extend(positions);
        let added = data.positions.len() - base as usize;

        match reader.read_colors(0) {
            Some(read) => colors.extend(read.into_rgb_f32().take(added)),
            None => all_colored = false,
        }

        match reader.read_indices() {
            Some(indices) => data
                .indices
                .extend(indices.into_u32().map(|i| i + base)),
            None => data.indices.extend(base..base + added as u32),
        }
    }

    if data.positions.is_empty() {
        return Err(AssetError::NoPositions(path.to_path_buf()));
    }
    if all_colored && colors.len() == data.positions.len() {
        data.colors = Some(colors);
    }

    log::info!(
        "Loaded mesh '{}' ({} vertices, {} indices, colors: {})",
        path.display(),
        data.vertex_count(),
        data.indices.len(),
        data.colors.is_some()
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_asset_error() {
        let err = load_mesh("definitely/not/here.glb").unwrap_err();
        assert!(matches!(err, AssetError::Gltf { .. }));
        assert!(err.to_string().contains("here.glb"));
    }

    #[test]
    fn test_default_color_is_white() {
        let mesh = MeshData::from_positions(vec![[0.0; 3]; 2]);
        assert_eq!(mesh.color(1), [1.0, 1.0, 1.0]);

        let mesh = mesh.with_colors(vec![[0.2, 0.4, 0.6], [0.1, 0.1, 0.1]]);
        assert_eq!(mesh.color(0), [0.2, 0.4, 0.6]);
        assert_eq!(mesh.vertex_count(), 2);
    }
}

//! Scene configuration and launch flags.

use std::path::PathBuf;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::SceneError;
use crate::flow::FlowFieldParams;
use crate::ground::GroundConfig;

/// Mesh loaded when no path is given.
pub const DEFAULT_MESH_PATH: &str = "assets/tree.glb";

/// Camera start positions for wide and narrow viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPresets {
    pub desktop: Vec3,
    pub mobile: Vec3,
}

impl Default for CameraPresets {
    fn default() -> Self {
        Self {
            desktop: Vec3::new(8.0, 6.0, 16.0),
            mobile: Vec3::new(12.0, 8.0, 24.0),
        }
    }
}

impl CameraPresets {
    pub fn for_mobile(&self, is_mobile: bool) -> Vec3 {
        if is_mobile {
            self.mobile
        } else {
            self.desktop
        }
    }
}

/// Everything needed to build a scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub mesh_path: PathBuf,
    /// Added to every mesh vertex's y before seeding.
    pub offset_y: f32,
    /// Global particle sprite size.
    pub particle_size: f32,
    pub flow_field: FlowFieldParams,
    /// Life-phase cycles per second; `0` disables respawn.
    pub respawn_rate: f32,
    pub ground: GroundConfig,
    pub camera: CameraPresets,
    pub debug: bool,
    /// Fixed RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from(DEFAULT_MESH_PATH),
            offset_y: -2.0,
            particle_size: 0.07,
            flow_field: FlowFieldParams::default(),
            respawn_rate: 0.3,
            ground: GroundConfig::default(),
            camera: CameraPresets::default(),
            debug: false,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Parse launch arguments (without the program name).
    ///
    /// Accepted: `--debug`, `--debug=true|false`, `--seed=N` and at most one
    /// positional mesh path.
    pub fn from_args<I, S>(args: I) -> Result<Self, SceneError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut mesh_given = false;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--debug" {
                config.debug = true;
            } else if let Some(value) = arg.strip_prefix("--debug=") {
                config.debug = parse_bool(value)
                    .ok_or_else(|| SceneError::InvalidArgument(format!("bad debug value '{}'", value)))?;
            } else if let Some(value) = arg.strip_prefix("--seed=") {
                let seed = value
                    .parse()
                    .map_err(|_| SceneError::InvalidArgument(format!("bad seed '{}'", value)))?;
                config.seed = Some(seed);
            } else if arg.starts_with("--") {
                return Err(SceneError::InvalidArgument(format!("unknown flag '{}'", arg)));
            } else if mesh_given {
                return Err(SceneError::InvalidArgument(format!(
                    "unexpected extra argument '{}'",
                    arg
                )));
            } else {
                config.mesh_path = PathBuf::from(arg);
                mesh_given = true;
            }
        }

        Ok(config)
    }

    /// The scene's random source.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.mesh_path, PathBuf::from("assets/tree.glb"));
        assert_eq!(config.offset_y, -2.0);
        assert_eq!(config.particle_size, 0.07);
        assert!(!config.debug);
    }

    #[test]
    fn test_parse_flags() {
        let config = SceneConfig::from_args(["--debug", "--seed=42", "model.glb"]).unwrap();
        assert!(config.debug);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.mesh_path, PathBuf::from("model.glb"));

        let config = SceneConfig::from_args(["--debug=false"]).unwrap();
        assert!(!config.debug);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = SceneConfig::from_args(["--wireframe"]).unwrap_err();
        assert!(matches!(err, SceneError::InvalidArgument(_)));
        assert!(SceneConfig::from_args(["--seed=abc"]).is_err());
        assert!(SceneConfig::from_args(["a.glb", "b.glb"]).is_err());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = SceneConfig { seed: Some(7), ..Default::default() };
        let a: f32 = config.rng().gen();
        let b: f32 = config.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_camera_preset_choice() {
        let presets = CameraPresets::default();
        assert_eq!(presets.for_mobile(true), Vec3::new(12.0, 8.0, 24.0));
        assert_eq!(presets.for_mobile(false), Vec3::new(8.0, 6.0, 16.0));
    }
}

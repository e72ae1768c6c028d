//! Error types for flowgarden.
//!
//! Every fatal condition is raised before the frame loop starts: a missing or
//! corrupt mesh, a mesh without vertices, or a GPU that cannot be brought up.
//! Conditions that can happen while the loop runs (resize races, clock
//! anomalies) are handled structurally and have no variant here.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during GPU initialization and readback.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map buffer for reading.
    BufferMapping(String),
    /// The simulation grid does not fit in a single 2D texture on this device.
    TextureTooLarge { side: u32, max: u32 },
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
            GpuError::TextureTooLarge { side, max } => write!(
                f,
                "Simulation grid of {}x{} texels exceeds the device limit of {}",
                side, side, max
            ),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading the seed mesh.
#[derive(Debug)]
pub enum AssetError {
    /// The glTF file is missing, unreadable or malformed.
    Gltf { path: PathBuf, source: gltf::Error },
    /// The file parsed but holds no mesh.
    NoMesh(PathBuf),
    /// The first mesh has no `POSITION` attribute.
    NoPositions(PathBuf),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Gltf { path, source } => {
                write!(f, "Failed to load mesh '{}': {}", path.display(), source)
            }
            AssetError::NoMesh(path) => write!(f, "'{}' contains no mesh", path.display()),
            AssetError::NoPositions(path) => {
                write!(f, "First mesh in '{}' has no vertex positions", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Gltf { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors that can occur when building or running a scene.
#[derive(Debug)]
pub enum SceneError {
    /// The seed mesh could not be loaded.
    AssetLoad(AssetError),
    /// The input cannot size a simulation grid (e.g. a mesh with zero vertices).
    DegenerateInput(String),
    /// A launch flag could not be understood.
    InvalidArgument(String),
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::AssetLoad(e) => write!(f, "Asset error: {}", e),
            SceneError::DegenerateInput(reason) => write!(f, "Degenerate input: {}", reason),
            SceneError::InvalidArgument(arg) => write!(f, "Invalid argument: {}", arg),
            SceneError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SceneError::Window(e) => write!(f, "Failed to create window: {}", e),
            SceneError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::AssetLoad(e) => Some(e),
            SceneError::EventLoop(e) => Some(e),
            SceneError::Window(e) => Some(e),
            SceneError::Gpu(e) => Some(e),
            SceneError::DegenerateInput(_) | SceneError::InvalidArgument(_) => None,
        }
    }
}

impl From<AssetError> for SceneError {
    fn from(e: AssetError) -> Self {
        SceneError::AssetLoad(e)
    }
}

impl From<winit::error::EventLoopError> for SceneError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SceneError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SceneError {
    fn from(e: winit::error::OsError) -> Self {
        SceneError::Window(e)
    }
}

impl From<GpuError> for SceneError {
    fn from(e: GpuError) -> Self {
        SceneError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_degenerate_input_message() {
        let err = SceneError::DegenerateInput("mesh has zero vertices".into());
        assert_eq!(err.to_string(), "Degenerate input: mesh has zero vertices");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_gpu_error_chains_through_scene_error() {
        let err: SceneError = GpuError::TextureTooLarge { side: 9000, max: 8192 }.into();
        assert!(err.to_string().contains("9000x9000"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_asset_error_wraps_path() {
        let err: SceneError = AssetError::NoMesh(PathBuf::from("tree.glb")).into();
        assert!(err.to_string().contains("tree.glb"));
    }
}

//! Every generated WGSL source must parse and validate with naga.

use flowgarden::shader_utils::{ground_wgsl, kernel_wgsl, particles_wgsl, sky_wgsl};

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect()
}

#[test]
fn test_kernel_shader_validates() {
    let module = validate_wgsl(&kernel_wgsl()).unwrap();
    let eps = entry_points(&module);
    assert_eq!(eps, vec![("main", naga::ShaderStage::Compute)]);
    assert_eq!(module.entry_points[0].workgroup_size, [8, 8, 1]);
}

#[test]
fn test_particle_shader_validates() {
    let module = validate_wgsl(&particles_wgsl()).unwrap();
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn test_ground_shader_validates() {
    let module = validate_wgsl(&ground_wgsl()).unwrap();
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

#[test]
fn test_sky_shader_validates() {
    let module = validate_wgsl(&sky_wgsl()).unwrap();
    let eps = entry_points(&module);
    assert!(eps.contains(&("vs_main", naga::ShaderStage::Vertex)));
    assert!(eps.contains(&("fs_main", naga::ShaderStage::Fragment)));
}

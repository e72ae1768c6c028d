//! WGSL sources.
//!
//! # Kernel
//!
//! [`kernel_wgsl`] is the advection compute shader. It binds, in group 0:
//! - `0`: `params` (`KernelUniforms`)
//! - `1`: `base_state`, the seed texture (respawn targets and gate anchors)
//! - `2`: `previous_state`, the current ping-pong target
//! - `3`: `next_state`, the other target, as an `rgba32float` storage texture
//!
//! # Render
//!
//! [`particles_wgsl`], [`ground_wgsl`] and [`sky_wgsl`] share the
//! `SceneUniforms` block at group 0, binding 0 (see `gpu::SceneUniforms`).
//!
//! ## Noise
//! - `noise3(p: vec3<f32>) -> f32` - 3D simplex noise in [-1, 1]

/// WGSL code for gradient noise functions.
pub const NOISE_WGSL: &str = r#"
// Gradient noise helpers
fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute4(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt4(r: vec4<f32>) -> vec4<f32> {
    return 1.79284291400159 - 0.85373472095314 * r;
}

// 3D Simplex noise
fn noise3(v: vec3<f32>) -> f32 {
    let C = vec2<f32>(1.0/6.0, 1.0/3.0);
    let D = vec4<f32>(0.0, 0.5, 1.0, 2.0);

    // First corner
    var i = floor(v + dot(v, vec3(C.y)));
    let x0 = v - i + dot(i, vec3(C.x));

    // Other corners
    let g = step(x0.yzx, x0.xyz);
    let l = 1.0 - g;
    let i1 = min(g.xyz, l.zxy);
    let i2 = max(g.xyz, l.zxy);

    let x1 = x0 - i1 + C.x;
    let x2 = x0 - i2 + C.y;
    let x3 = x0 - D.yyy;

    // Permutations
    i = mod289_3(i);
    let p = permute4(permute4(permute4(
        i.z + vec4<f32>(0.0, i1.z, i2.z, 1.0))
      + i.y + vec4<f32>(0.0, i1.y, i2.y, 1.0))
      + i.x + vec4<f32>(0.0, i1.x, i2.x, 1.0));

    // Gradients
    let n_ = 0.142857142857;
    let ns = n_ * D.wyz - D.xzx;

    let j = p - 49.0 * floor(p * ns.z * ns.z);

    let x_ = floor(j * ns.z);
    let y_ = floor(j - 7.0 * x_);

    let x = x_ * ns.x + ns.yyyy;
    let y = y_ * ns.x + ns.yyyy;
    let h = 1.0 - abs(x) - abs(y);

    let b0 = vec4<f32>(x.xy, y.xy);
    let b1 = vec4<f32>(x.zw, y.zw);

    let s0 = floor(b0) * 2.0 + 1.0;
    let s1 = floor(b1) * 2.0 + 1.0;
    let sh = -step(h, vec4<f32>(0.0));

    let a0 = b0.xzyw + s0.xzyw * sh.xxyy;
    let a1 = b1.xzyw + s1.xzyw * sh.zzww;

    var p0 = vec3<f32>(a0.xy, h.x);
    var p1 = vec3<f32>(a0.zw, h.y);
    var p2 = vec3<f32>(a1.xy, h.z);
    var p3 = vec3<f32>(a1.zw, h.w);

    // Normalize gradients
    let norm = taylor_inv_sqrt4(vec4<f32>(dot(p0,p0), dot(p1,p1), dot(p2,p2), dot(p3,p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Mix final noise value
    var m = max(0.6 - vec4<f32>(dot(x0,x0), dot(x1,x1), dot(x2,x2), dot(x3,x3)), vec4<f32>(0.0));
    m = m * m;
    return 42.0 * dot(m*m, vec4<f32>(dot(p0,x0), dot(p1,x1), dot(p2,x2), dot(p3,x3)));
}
"#;

const KERNEL_BODY_WGSL: &str = r#"
struct KernelUniforms {
    time: f32,
    delta_time: f32,
    influence: f32,
    strength: f32,
    frequency: f32,
    height: f32,
    respawn_rate: f32,
    _padding: f32,
};

@group(0) @binding(0) var<uniform> params: KernelUniforms;
@group(0) @binding(1) var base_state: texture_2d<f32>;
@group(0) @binding(2) var previous_state: texture_2d<f32>;
@group(0) @binding(3) var next_state: texture_storage_2d<rgba32float, write>;

const TIME_SCALE: f32 = 0.2;
const GATE_FREQUENCY: f32 = 0.2;

fn flow_noise(p: vec3<f32>, t: f32) -> f32 {
    return noise3(p + vec3<f32>(t, t * 0.5, -t));
}

fn flow_gate(noise_value: f32, influence: f32) -> f32 {
    if influence <= 0.0 {
        return 0.0;
    }
    return smoothstep((0.5 - influence) * 2.0, 1.0, noise_value);
}

fn respawned(seed: f32) -> bool {
    if params.respawn_rate <= 0.0 {
        return false;
    }
    let before = fract(seed + (params.time - params.delta_time) * params.respawn_rate);
    let after = fract(seed + params.time * params.respawn_rate);
    return after < before;
}

fn advance(particle: vec4<f32>, base: vec4<f32>) -> vec4<f32> {
    let dt = params.delta_time;
    if !(dt > 0.0) || params.influence <= 0.0 {
        return particle;
    }
    if respawned(particle.w) {
        return vec4<f32>(base.xyz, particle.w);
    }

    let anchor = vec3<f32>(base.x, base.y - params.height, base.z) * GATE_FREQUENCY;
    let t = params.time * TIME_SCALE;
    let gate = flow_gate(flow_noise(anchor, t + 1.0), params.influence);

    let s = particle.xyz * params.frequency;
    let flow = vec3<f32>(
        flow_noise(s, t),
        flow_noise(s + vec3<f32>(1.0), t),
        flow_noise(s + vec3<f32>(2.0), t)
    );
    let len = length(flow);
    if !(len > 0.000001) {
        return particle;
    }

    let next = particle.xyz + flow / len * dt * gate * params.strength;
    return vec4<f32>(next, particle.w);
}

@compute @workgroup_size(8, 8)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let dims = textureDimensions(previous_state);
    if global_id.x >= dims.x || global_id.y >= dims.y {
        return;
    }

    let coord = vec2<i32>(global_id.xy);
    let particle = textureLoad(previous_state, coord, 0);
    let base = textureLoad(base_state, coord, 0);
    textureStore(next_state, coord, advance(particle, base));
}
"#;

/// Workgroup edge length of the advection kernel.
pub const KERNEL_WORKGROUP_SIZE: u32 = 8;

/// Full advection kernel source.
pub fn kernel_wgsl() -> String {
    format!("{}\n{}", NOISE_WGSL, KERNEL_BODY_WGSL)
}

/// Render uniform block shared by the scene shaders.
pub const SCENE_UNIFORMS_WGSL: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    resolution: vec2<f32>,
    particle_size: f32,
    ground_time: f32,
    sky_time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0) var<uniform> scene: SceneUniforms;

fn quad_corner(vertex_index: u32) -> vec2<f32> {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0)
    );
    return corners[vertex_index];
}

// Clip-space offset for a sprite of `size` that keeps a constant world size.
fn sprite_offset(quad: vec2<f32>, size: f32) -> vec2<f32> {
    let aspect = scene.resolution.y / max(scene.resolution.x, 1.0);
    return quad * size * vec2<f32>(aspect, 1.0);
}
"#;

const PARTICLES_BODY_WGSL: &str = r#"
@group(0) @binding(1) var particle_state: texture_2d<f32>;

struct VertexInput {
    @location(0) uv: vec2<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) quad: vec2<f32>,
    @location(1) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    let side = f32(textureDimensions(particle_state).x);
    let texel = vec2<i32>(in.uv * side);
    let position = textureLoad(particle_state, texel, 0).xyz;

    let quad = quad_corner(vertex_index);
    var clip = scene.view_proj * vec4<f32>(position, 1.0);
    clip = vec4<f32>(clip.xy + sprite_offset(quad, in.size * scene.particle_size), clip.zw);

    var out: VertexOutput;
    out.clip_position = clip;
    out.quad = quad;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.quad);
    if dist > 1.0 {
        discard;
    }
    let alpha = 0.05 / max(dist, 0.05) - 0.1;
    return vec4<f32>(in.color, clamp(alpha, 0.0, 1.0));
}
"#;

/// Simulated particle sprites. Positions come from the state texture.
pub fn particles_wgsl() -> String {
    format!("{}\n{}", SCENE_UNIFORMS_WGSL, PARTICLES_BODY_WGSL)
}

const GROUND_BODY_WGSL: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) quad: vec2<f32>,
    @location(1) brightness: f32,
};

const GROUND_SPRITE_SCALE: f32 = 0.25;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, in: VertexInput) -> VertexOutput {
    let quad = quad_corner(vertex_index);
    var clip = scene.view_proj * vec4<f32>(in.position, 1.0);
    clip = vec4<f32>(clip.xy + sprite_offset(quad, in.size * GROUND_SPRITE_SCALE), clip.zw);

    // per-point phase from the planar position
    let phase = dot(in.position.xz, vec2<f32>(12.9898, 78.233));
    let twinkle = 0.5 + 0.5 * sin(scene.ground_time * 1.5 + phase);

    var out: VertexOutput;
    out.clip_position = clip;
    out.quad = quad;
    out.brightness = mix(0.35, 1.0, twinkle);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.quad);
    if dist > 1.0 {
        discard;
    }
    let alpha = (1.0 - dist) * in.brightness;
    return vec4<f32>(vec3<f32>(0.55, 0.75, 0.6) * in.brightness, alpha);
}
"#;

/// Ground point sprites with a slow twinkle.
pub fn ground_wgsl() -> String {
    format!("{}\n{}", SCENE_UNIFORMS_WGSL, GROUND_BODY_WGSL)
}

const SKY_BODY_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = scene.view_proj * vec4<f32>(position, 1.0);
    out.direction = normalize(position);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let h = clamp(in.direction.y, -1.0, 1.0);
    let horizon = vec3<f32>(0.10, 0.12, 0.22);
    let zenith = vec3<f32>(0.01, 0.02, 0.06);
    var color = mix(horizon, zenith, smoothstep(0.0, 0.6, h));

    let drift = noise3(in.direction * 3.0 + vec3<f32>(scene.sky_time * 0.05, 0.0, 0.0));
    color += vec3<f32>(0.04, 0.02, 0.06) * (drift * 0.5 + 0.5) * (1.0 - abs(h));
    return vec4<f32>(color, 1.0);
}
"#;

/// Sky dome gradient with slowly drifting haze.
pub fn sky_wgsl() -> String {
    format!("{}\n{}\n{}", SCENE_UNIFORMS_WGSL, NOISE_WGSL, SKY_BODY_WGSL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_contains_noise_and_entry() {
        let src = kernel_wgsl();
        assert!(src.contains("fn noise3"));
        assert!(src.contains("@compute @workgroup_size(8, 8)"));
        assert!(src.contains("texture_storage_2d<rgba32float, write>"));
    }

    #[test]
    fn test_render_shaders_share_uniforms() {
        for src in [particles_wgsl(), ground_wgsl(), sky_wgsl()] {
            assert!(src.contains("struct SceneUniforms"));
            assert!(src.contains("fn vs_main"));
            assert!(src.contains("fn fs_main"));
        }
    }
}

//! Flow-field advection.
//!
//! This is the CPU reference of the GPU kernel in
//! [`crate::shader_utils::kernel_wgsl`]. Both compute, per particle:
//!
//! With `influence <= 0` nothing moves, not even respawning particles.
//!
//! 1. **Respawn** - the life phase `fract(seed + time * respawn_rate)` wrapping
//!    during this step sends the particle back to its base position.
//! 2. **Gate** - a slow strength noise sampled at the base position decides how
//!    much this particle moves; `influence` widens the moving region.
//! 3. **Advect** - a normalized 3-channel noise direction at
//!    `position * frequency` moves the particle by
//!    `direction * dt * gate * strength`.
//!
//! The seed channel is never modified.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::noise::noise3;

/// Largest time step fed to the kernel, in seconds.
pub const MAX_STEP_DELTA: f32 = 0.1;

/// Scale applied to the clock before sampling the flow field.
const TIME_SCALE: f32 = 0.2;

/// Scale of the strength-gating noise relative to world space.
const GATE_FREQUENCY: f32 = 0.2;

/// Flow-field tunables, read by the kernel every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowFieldParams {
    /// Share of particles that move (`0` freezes everything).
    pub influence: f32,
    /// Speed of moving particles.
    pub strength: f32,
    /// Spatial frequency of the direction field.
    pub frequency: f32,
    /// Vertical shift of the gating field.
    pub height: f32,
}

impl Default for FlowFieldParams {
    fn default() -> Self {
        Self {
            influence: 0.6,
            strength: 3.5,
            frequency: 0.6,
            height: 0.0,
        }
    }
}

/// Uniform block of the advection kernel.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct KernelUniforms {
    pub time: f32,
    pub delta_time: f32,
    pub influence: f32,
    pub strength: f32,
    pub frequency: f32,
    pub height: f32,
    pub respawn_rate: f32,
    pub _padding: f32,
}

impl KernelUniforms {
    pub fn new(params: &FlowFieldParams, time: f32, delta_time: f32, respawn_rate: f32) -> Self {
        Self {
            time,
            delta_time,
            influence: params.influence,
            strength: params.strength,
            frequency: params.frequency,
            height: params.height,
            respawn_rate,
            _padding: 0.0,
        }
    }
}

/// Make a frame delta safe to integrate with.
///
/// NaN, infinite and negative deltas become `0`; long stalls are capped at
/// [`MAX_STEP_DELTA`].
pub fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta > 0.0 {
        delta.min(MAX_STEP_DELTA)
    } else {
        0.0
    }
}

/// Flow noise at `p`, drifting with `t`.
fn flow_noise(p: Vec3, t: f32) -> f32 {
    noise3(p + Vec3::new(t, t * 0.5, -t))
}

/// How strongly a particle follows the field, in `[0, 1]`.
pub fn flow_gate(noise_value: f32, influence: f32) -> f32 {
    if influence <= 0.0 {
        return 0.0;
    }
    let low = (0.5 - influence) * 2.0;
    smoothstep(low, 1.0, noise_value)
}

fn smoothstep(low: f32, high: f32, x: f32) -> f32 {
    let t = ((x - low) / (high - low)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Whether the life phase wraps between `time - dt` and `time`.
pub fn respawned(seed: f32, time: f32, dt: f32, rate: f32) -> bool {
    if rate <= 0.0 {
        return false;
    }
    let before = (seed + (time - dt) * rate).rem_euclid(1.0);
    let after = (seed + time * rate).rem_euclid(1.0);
    after < before
}

/// Advance one texel by one step.
pub fn advance_texel(particle: [f32; 4], base: [f32; 4], uniforms: &KernelUniforms) -> [f32; 4] {
    let dt = uniforms.delta_time;
    if !(dt > 0.0) {
        return particle;
    }
    // A frozen field holds every particle where it is, respawn included.
    if uniforms.influence <= 0.0 {
        return particle;
    }
    let seed = particle[3];
    if respawned(seed, uniforms.time, dt, uniforms.respawn_rate) {
        return [base[0], base[1], base[2], seed];
    }

    let position = Vec3::new(particle[0], particle[1], particle[2]);
    let anchor = Vec3::new(base[0], base[1] - uniforms.height, base[2]) * GATE_FREQUENCY;
    let t = uniforms.time * TIME_SCALE;
    let gate = flow_gate(flow_noise(anchor, t + 1.0), uniforms.influence);

    let s = position * uniforms.frequency;
    let flow = Vec3::new(
        flow_noise(s, t),
        flow_noise(s + Vec3::splat(1.0), t),
        flow_noise(s + Vec3::splat(2.0), t),
    );
    let length = flow.length();
    if !(length > 1e-6) {
        return particle;
    }

    let next = position + flow / length * dt * gate * uniforms.strength;
    [next.x, next.y, next.z, seed]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(params: FlowFieldParams, time: f32, dt: f32) -> KernelUniforms {
        KernelUniforms::new(&params, time, dt, 0.0)
    }

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(0.016), 0.016);
        assert_eq!(sanitize_delta(0.0), 0.0);
        assert_eq!(sanitize_delta(-0.5), 0.0);
        assert_eq!(sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY), 0.0);
        assert_eq!(sanitize_delta(3.0), MAX_STEP_DELTA);
    }

    #[test]
    fn test_zero_strength_keeps_texel() {
        let params = FlowFieldParams { strength: 0.0, ..Default::default() };
        let texel = [0.3, -1.2, 2.5, 0.42];
        assert_eq!(advance_texel(texel, texel, &uniforms(params, 1.7, 0.016)), texel);
    }

    #[test]
    fn test_zero_influence_keeps_texel() {
        let params = FlowFieldParams { influence: 0.0, ..Default::default() };
        let texel = [1.0, 2.0, 3.0, 0.9];
        assert_eq!(advance_texel(texel, texel, &uniforms(params, 4.0, 0.05)), texel);
    }

    #[test]
    fn test_degenerate_delta_is_skipped() {
        let params = FlowFieldParams { influence: 1.0, ..Default::default() };
        let texel = [1.0, 2.0, 3.0, 0.5];
        for dt in [0.0, -0.1, f32::NAN] {
            assert_eq!(advance_texel(texel, texel, &uniforms(params, 1.0, dt)), texel);
        }
    }

    #[test]
    fn test_full_influence_moves_and_preserves_seed() {
        let params = FlowFieldParams { influence: 1.0, strength: 5.0, ..Default::default() };
        let texel = [0.7, 0.1, -0.4, 0.25];
        let next = advance_texel(texel, texel, &uniforms(params, 2.0, 0.05));
        assert_eq!(next[3], 0.25);

        let moved = Vec3::new(next[0] - texel[0], next[1] - texel[1], next[2] - texel[2]).length();
        // displacement is bounded by dt * strength
        assert!(moved <= 0.05 * 5.0 + 1e-5);
    }

    #[test]
    fn test_gate_bounds() {
        assert_eq!(flow_gate(0.99, 0.0), 0.0);
        assert_eq!(flow_gate(-1.0, 1.0), 0.0);
        assert_eq!(flow_gate(1.0, 1.0), 1.0);
        let g = flow_gate(0.2, 0.6);
        assert!((0.0..=1.0).contains(&g));
    }

    #[test]
    fn test_respawn_returns_to_base() {
        let base = [0.0, -2.0, 0.0, 0.0];
        let drifted = [5.0, 5.0, 5.0, 0.95];
        // phase goes 0.98 -> 1.01 during this step
        let u = KernelUniforms::new(&FlowFieldParams::default(), 0.2, 0.1, 0.3);
        assert!(respawned(0.95, 0.2, 0.1, 0.3));
        assert_eq!(advance_texel(drifted, base, &u), [0.0, -2.0, 0.0, 0.95]);
    }

    #[test]
    fn test_zero_influence_suppresses_respawn() {
        let base = [0.0, -2.0, 0.0, 0.0];
        let drifted = [5.0, 5.0, 5.0, 0.95];
        let params = FlowFieldParams { influence: 0.0, ..Default::default() };
        let u = KernelUniforms::new(&params, 0.2, 0.1, 0.3);
        assert!(respawned(0.95, 0.2, 0.1, 0.3));
        assert_eq!(advance_texel(drifted, base, &u), drifted);
    }

    #[test]
    fn test_respawn_disabled() {
        assert!(!respawned(0.99, 10.0, 0.1, 0.0));
        assert!(!respawned(0.1, 0.2, 0.1, 0.3));
    }
}

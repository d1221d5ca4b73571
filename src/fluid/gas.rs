//! 气体力
//!
//! 比液体更软的两两压力与扩散，半径更大；外加随机湍流、
//! 与速度相反的阻力和统一的浮力基线。

use crate::config::SimulationConfig;
use crate::fluid::kernels::{cubic_falloff, falloff, planar, MIN_DISTANCE};
use crate::particles::Particle;
use glam::Vec2;
use rand::Rng;

/// 气体力参数
#[derive(Debug, Clone, Copy)]
pub struct GasParams {
    pub interaction_radius: f32,
    pub pressure: f32,
    pub diffusion: f32,
    pub drag: f32,
    pub turbulence: f32,
    pub buoyancy: f32,
    pub repulsion: f32,
}

impl GasParams {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            interaction_radius: config.interaction_radius(),
            pressure: config.gas.pressure,
            diffusion: config.gas.diffusion,
            drag: config.gas.drag,
            turbulence: config.gas.turbulence,
            buoyancy: config.gas.buoyancy,
            repulsion: config.gas.repulsion,
        }
    }
}

/// 计算气体力并累加到 `out`
pub fn accumulate<R: Rng + ?Sized>(
    particles: &[Particle],
    params: &GasParams,
    rng: &mut R,
    out: &mut [Vec2],
) {
    let n = particles.len();
    debug_assert_eq!(out.len(), n);

    let radius = params.interaction_radius;
    let radius_sq = radius * radius;

    for i in 0..n {
        let pi = planar(particles[i].position);
        let vi = planar(particles[i].velocity);
        for j in (i + 1)..n {
            let delta = pi - planar(particles[j].position);
            let dist_sq = delta.length_squared();
            if dist_sq >= radius_sq {
                continue;
            }
            let dist = dist_sq.sqrt();
            let q = falloff(dist, radius);

            if dist > MIN_DISTANCE {
                let push = (delta / dist) * (params.pressure * q);
                out[i] += push;
                out[j] -= push;
            }

            let mixing = (planar(particles[j].velocity) - vi) * (params.diffusion * q);
            out[i] += mixing;
            out[j] -= mixing;
        }
    }

    let lift = Vec2::new(0.0, -params.buoyancy);
    for (particle, force) in particles.iter().zip(out.iter_mut()) {
        let jitter = if params.turbulence > 0.0 {
            Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * params.turbulence
        } else {
            Vec2::ZERO
        };
        *force += jitter - planar(particle.velocity) * params.drag + lift;
    }
}

/// 额外的气体排斥，防止结团
///
/// 力大小 `strength·(1 - r/R)³`，等大反向作用于两个粒子。
pub fn apply_repulsion(particles: &[Particle], radius: f32, strength: f32, out: &mut [Vec2]) {
    if strength <= 0.0 {
        return;
    }
    let n = particles.len();
    let radius_sq = radius * radius;

    for i in 0..n {
        let pi = planar(particles[i].position);
        for j in (i + 1)..n {
            let delta = pi - planar(particles[j].position);
            let dist_sq = delta.length_squared();
            if dist_sq >= radius_sq {
                continue;
            }
            let dist = dist_sq.sqrt();
            if dist <= MIN_DISTANCE {
                continue;
            }
            let push = (delta / dist) * (strength * cubic_falloff(dist, radius));
            out[i] += push;
            out[j] -= push;
        }
    }
}

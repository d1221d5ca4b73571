//! 液体力：SPH 风格的双密度松弛
//!
//! 每对邻居（r < h）以 q = 1 - r/h 贡献 q² 的密度和 q³ 的近密度（不含自身）。
//! 压力 `(ρ - ρ₀)·k` 与近压力 `ρ_near·k_near` 沿连线推开两个粒子，
//! 粘度项按相对速度拉近两者速度。两两遍历，O(n²)。

use crate::config::SimulationConfig;
use crate::fluid::kernels::{
    cap_length, density_kernel, falloff, near_density_kernel, planar, MIN_DISTANCE,
};
use crate::particles::Particle;
use glam::Vec2;

/// 液体力参数（构造时从配置解析一次）
#[derive(Debug, Clone, Copy)]
pub struct LiquidParams {
    pub smoothing_radius: f32,
    pub rest_density: f32,
    pub pressure_stiffness: f32,
    pub near_pressure_stiffness: f32,
    pub viscosity: f32,
    pub max_force: f32,
}

impl LiquidParams {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            smoothing_radius: config.smoothing_radius(),
            rest_density: config.fluid.rest_density,
            pressure_stiffness: config.fluid.pressure_stiffness,
            near_pressure_stiffness: config.fluid.near_pressure_stiffness,
            viscosity: config.fluid.viscosity,
            max_force: config.fluid.max_force,
        }
    }
}

/// 液体求解器，持有可复用的密度缓冲区
#[derive(Debug, Default)]
pub struct LiquidSolver {
    densities: Vec<f32>,
    near_densities: Vec<f32>,
}

impl LiquidSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次计算的密度
    pub fn densities(&self) -> &[f32] {
        &self.densities
    }

    /// 计算液体力并累加到 `out`（长度必须等于粒子数）
    pub fn accumulate(&mut self, particles: &[Particle], params: &LiquidParams, out: &mut [Vec2]) {
        let n = particles.len();
        debug_assert_eq!(out.len(), n);

        self.densities.clear();
        self.densities.resize(n, 0.0);
        self.near_densities.clear();
        self.near_densities.resize(n, 0.0);

        let h = params.smoothing_radius;
        let h_sq = h * h;

        // 密度估计
        for i in 0..n {
            let pi = planar(particles[i].position);
            for j in (i + 1)..n {
                let dist_sq = (pi - planar(particles[j].position)).length_squared();
                if dist_sq >= h_sq {
                    continue;
                }
                let q = falloff(dist_sq.sqrt(), h);
                let density = density_kernel(q);
                let near = near_density_kernel(q);
                self.densities[i] += density;
                self.densities[j] += density;
                self.near_densities[i] += near;
                self.near_densities[j] += near;
            }
        }

        // 压力与粘度
        for i in 0..n {
            let pi = planar(particles[i].position);
            let vi = planar(particles[i].velocity);
            let pressure_i = (self.densities[i] - params.rest_density) * params.pressure_stiffness;
            let near_i = self.near_densities[i] * params.near_pressure_stiffness;

            for j in (i + 1)..n {
                let delta = pi - planar(particles[j].position);
                let dist_sq = delta.length_squared();
                if dist_sq >= h_sq {
                    continue;
                }
                let dist = dist_sq.sqrt();
                let q = falloff(dist, h);

                if dist > MIN_DISTANCE {
                    let pressure_j =
                        (self.densities[j] - params.rest_density) * params.pressure_stiffness;
                    let near_j = self.near_densities[j] * params.near_pressure_stiffness;
                    let shared = (pressure_i + pressure_j) * 0.5 * q
                        + (near_i + near_j) * 0.5 * q * q;
                    let push = (delta / dist) * shared;
                    out[i] += push;
                    out[j] -= push;
                }

                let relative = planar(particles[j].velocity) - vi;
                let drag = relative * (params.viscosity * q);
                out[i] += drag;
                out[j] -= drag;
            }
        }

        for force in out.iter_mut() {
            *force = cap_length(*force, params.max_force);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn params() -> LiquidParams {
        LiquidParams {
            smoothing_radius: 16.0,
            rest_density: 0.1,
            pressure_stiffness: 600.0,
            near_pressure_stiffness: 1200.0,
            viscosity: 2.0,
            max_force: 4000.0,
        }
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec3::new(x, y, 0.0),
            alive: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_pair_density_excludes_self() {
        let particles = [particle_at(0.0, 0.0), particle_at(8.0, 0.0)];
        let mut out = vec![Vec2::ZERO; 2];
        let mut solver = LiquidSolver::new();
        solver.accumulate(&particles, &params(), &mut out);
        assert!((solver.densities()[0] - 0.25).abs() < 1e-6);
        assert!((solver.densities()[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_far_particles_do_not_interact() {
        let particles = [particle_at(0.0, 0.0), particle_at(100.0, 0.0)];
        let mut out = vec![Vec2::ZERO; 2];
        LiquidSolver::new().accumulate(&particles, &params(), &mut out);
        assert_eq!(out[0], Vec2::ZERO);
        assert_eq!(out[1], Vec2::ZERO);
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let particles = [particle_at(5.0, 5.0), particle_at(5.0, 5.0)];
        let mut out = vec![Vec2::ZERO; 2];
        LiquidSolver::new().accumulate(&particles, &params(), &mut out);
        assert!(out.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_viscosity_pulls_velocities_together() {
        let mut a = particle_at(0.0, 0.0);
        let mut b = particle_at(0.0, 30.0);
        a.velocity = Vec3::new(10.0, 0.0, 0.0);
        b.velocity = Vec3::new(-10.0, 0.0, 0.0);
        let mut p = params();
        p.smoothing_radius = 40.0;
        p.pressure_stiffness = 0.0;
        p.near_pressure_stiffness = 0.0;

        let mut out = vec![Vec2::ZERO; 2];
        LiquidSolver::new().accumulate(&[a, b], &p, &mut out);
        assert!(out[0].x < 0.0);
        assert!(out[1].x > 0.0);
    }

    #[test]
    fn test_force_is_capped() {
        let particles: Vec<Particle> = (0..20).map(|i| particle_at(i as f32 * 0.5, 0.0)).collect();
        let mut out = vec![Vec2::ZERO; particles.len()];
        let mut p = params();
        p.max_force = 50.0;
        LiquidSolver::new().accumulate(&particles, &p, &mut out);
        assert!(out.iter().all(|f| f.length() <= 50.0 + 1e-3));
    }
}

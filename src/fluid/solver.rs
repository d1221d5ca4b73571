//! 液体/气体力求解器与积分器
//!
//! 每帧顺序固定：
//! 1. 两两区域力（纯液体 / 纯气体 / 按混合值线性混合）
//! 2. 热对流（启用加热或接近纯气体时）
//! 3. 额外气体排斥（气体占主导时）
//! 4. 碰撞分离
//! 5. 软边界
//! 6. 容器晃动
//! 7. 积分：力 → 速度，阻尼，限速
//!
//! 位置积分与硬边界交给系统的更新器完成。

use crate::config::{Bounds, SimulationConfig};
use crate::fluid::containment;
use crate::fluid::gas::{self, GasParams};
use crate::fluid::kernels::lerp;
use crate::fluid::liquid::{LiquidParams, LiquidSolver};
use crate::fluid::mode::{ModeBlend, ModeTarget, PhysicsMode, GAS_THRESHOLD};
use crate::fluid::shake::ShakeTracker;
use crate::fluid::thermal;
use crate::particles::Particle;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 液体/气体力求解器
pub struct FluidSolver {
    config: SimulationConfig,
    liquid_params: LiquidParams,
    gas_params: GasParams,
    boundary_radius: f32,
    mode: ModeBlend,
    gravity_enabled: bool,
    /// 力累加器，与存活粒子数组下标一一对应，只增不减
    forces: Vec<Vec2>,
    liquid_forces: Vec<Vec2>,
    gas_forces: Vec<Vec2>,
    liquid: LiquidSolver,
    shake: ShakeTracker,
    rng: StdRng,
    active: usize,
}

impl FluidSolver {
    /// 创建求解器，配置在此一次性钳制并解析派生半径
    pub fn new(config: SimulationConfig) -> Self {
        let config = config.sanitized();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ 0x5eed_f1u64),
            None => StdRng::from_entropy(),
        };

        tracing::debug!(
            target: "fluid",
            smoothing_radius = config.smoothing_radius(),
            interaction_radius = config.interaction_radius(),
            boundary_radius = config.boundary_radius(),
            "Fluid solver created"
        );

        Self {
            liquid_params: LiquidParams::from_config(&config),
            gas_params: GasParams::from_config(&config),
            boundary_radius: config.boundary_radius(),
            mode: ModeBlend::new(config.mode_lerp_speed),
            gravity_enabled: true,
            forces: Vec::new(),
            liquid_forces: Vec::new(),
            gas_forces: Vec::new(),
            liquid: LiquidSolver::new(),
            shake: ShakeTracker::new(),
            rng,
            active: 0,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 推进一帧：计算并积分所有力，`perturbation` 是本帧的宿主位置采样
    pub fn step(
        &mut self,
        particles: &mut [Particle],
        bounds: &Bounds,
        dt: f32,
        perturbation: Option<Vec2>,
    ) {
        self.mode.advance(dt);
        let shake_force = self.shake.update(perturbation, dt, &self.config.shake);

        let n = particles.len();
        self.active = n;
        if n == 0 {
            return;
        }

        grow_zeroed(&mut self.forces, n);
        let mix = self.mode.mix();

        // 1. 区域力
        if self.mode.is_liquid_only() {
            self.liquid
                .accumulate(particles, &self.liquid_params, &mut self.forces[..n]);
        } else if self.mode.is_gas_only() {
            gas::accumulate(particles, &self.gas_params, &mut self.rng, &mut self.forces[..n]);
        } else {
            grow_zeroed(&mut self.liquid_forces, n);
            grow_zeroed(&mut self.gas_forces, n);
            self.liquid
                .accumulate(particles, &self.liquid_params, &mut self.liquid_forces[..n]);
            gas::accumulate(
                particles,
                &self.gas_params,
                &mut self.rng,
                &mut self.gas_forces[..n],
            );
            for ((force, liquid), gas) in self.forces[..n]
                .iter_mut()
                .zip(&self.liquid_forces[..n])
                .zip(&self.gas_forces[..n])
            {
                *force = *liquid * (1.0 - mix) + *gas * mix;
            }
        }

        // 2. 热对流
        if self.config.heat.enabled || mix > GAS_THRESHOLD {
            thermal::accumulate(
                particles,
                bounds,
                &self.config.heat,
                dt,
                &mut self.forces[..n],
            );
        }

        // 3. 额外气体排斥
        if self.mode.is_gas_dominant() {
            gas::apply_repulsion(
                particles,
                self.gas_params.interaction_radius,
                self.gas_params.repulsion * mix,
                &mut self.forces[..n],
            );
        }

        // 4. 碰撞
        if self.config.collision.enabled {
            containment::apply_collisions(
                particles,
                self.config.collision.strength,
                &mut self.forces[..n],
            );
        }

        // 5. 软边界
        if self.config.boundary.enabled {
            containment::apply_boundary_forces(
                particles,
                bounds,
                self.boundary_radius,
                self.config.boundary.strength,
                &mut self.forces[..n],
            );
        }

        // 6. 晃动
        if shake_force != Vec2::ZERO {
            for force in &mut self.forces[..n] {
                *force += shake_force;
            }
        }

        // 7. 积分
        self.integrate(particles, dt);
    }

    fn integrate(&self, particles: &mut [Particle], dt: f32) {
        let mix = self.mode.mix();
        let gravity = if self.gravity_enabled {
            self.config.gravity
        } else {
            0.0
        };
        let gas = &self.config.gas;
        let damping = lerp(self.config.damping, gas.damping, mix);
        let max_speed = self.config.max_speed;

        for (particle, force) in particles.iter_mut().zip(&self.forces) {
            let temperature = particle.fluid.temperature;

            // 热轻冷重，重力随温度减弱
            let gas_mass = lerp(gas.cold_mass, gas.hot_mass, temperature);
            let gas_gravity = gravity * gas.gravity_scale * (1.0 - temperature);
            let mass = lerp(self.config.fluid.mass, gas_mass, mix);
            let effective_gravity = lerp(gravity, gas_gravity, mix);
            particle.fluid.mass = mass;

            let acceleration = *force / mass + Vec2::new(0.0, effective_gravity);
            particle.velocity.x += acceleration.x * dt;
            particle.velocity.y += acceleration.y * dt;
            particle.velocity *= damping;
            particle.velocity = particle.velocity.clamp_length_max(max_speed);
        }
    }

    /// 设置物理模式，`instant` 时立即切换
    pub fn set_physics_mode(&mut self, target: ModeTarget, instant: bool) {
        self.mode.set_target(target, instant);
        tracing::debug!(
            target: "fluid",
            target_mix = self.mode.target(),
            instant,
            "Physics mode target changed"
        );
    }

    pub fn physics_mode(&self) -> PhysicsMode {
        self.mode.mode()
    }

    pub fn mode_mix(&self) -> f32 {
        self.mode.mix()
    }

    pub fn target_mix(&self) -> f32 {
        self.mode.target()
    }

    /// 切换重力，返回切换后的状态
    pub fn toggle_gravity(&mut self) -> bool {
        self.gravity_enabled = !self.gravity_enabled;
        self.gravity_enabled
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    pub fn is_heat_enabled(&self) -> bool {
        self.config.heat.enabled
    }

    pub fn set_heat_enabled(&mut self, enabled: bool) {
        self.config.heat.enabled = enabled;
    }

    /// 上一帧每个粒子累加的合力（积分前）
    pub fn forces(&self) -> &[Vec2] {
        &self.forces[..self.active.min(self.forces.len())]
    }

    /// 当前的晃动力
    pub fn shake_force(&self) -> Vec2 {
        self.shake.force()
    }

    /// 清除跨帧的瞬态（晃动历史），模式与重力保持不变
    pub fn reset_transients(&mut self) {
        self.shake.reset();
        self.active = 0;
    }
}

/// 长度至少为 n，前 n 个元素清零；从不缩小
fn grow_zeroed(buffer: &mut Vec<Vec2>, n: usize) {
    if buffer.len() < n {
        buffer.resize(n, Vec2::ZERO);
    }
    buffer[..n].fill(Vec2::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig {
            seed: Some(3),
            ..Default::default()
        };
        config.gas.turbulence = 0.0;
        config
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec3::new(x, y, 0.0),
            size: 4.0,
            alive: true,
            lifetime: f32::INFINITY,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_step_is_noop() {
        let mut solver = FluidSolver::new(quiet_config());
        let bounds = Bounds::default();
        solver.step(&mut [], &bounds, 1.0 / 60.0, None);
        assert!(solver.forces().is_empty());
    }

    #[test]
    fn test_buffers_never_shrink() {
        let mut solver = FluidSolver::new(quiet_config());
        let bounds = Bounds::default();
        let mut many: Vec<Particle> = (0..10).map(|i| particle_at(100.0 + i as f32 * 30.0, 300.0)).collect();
        solver.step(&mut many, &bounds, 1.0 / 60.0, None);
        assert_eq!(solver.forces().len(), 10);

        let mut few = vec![particle_at(400.0, 300.0)];
        solver.step(&mut few, &bounds, 1.0 / 60.0, None);
        assert_eq!(solver.forces().len(), 1);
        assert!(solver.forces.len() >= 10);
    }

    #[test]
    fn test_gravity_pulls_down_and_toggles() {
        let mut solver = FluidSolver::new(quiet_config());
        let bounds = Bounds::default();
        let mut particles = vec![particle_at(400.0, 300.0)];
        solver.step(&mut particles, &bounds, 1.0 / 60.0, None);
        assert!(particles[0].velocity.y > 0.0);

        assert!(!solver.toggle_gravity());
        let mut particles = vec![particle_at(400.0, 300.0)];
        solver.step(&mut particles, &bounds, 1.0 / 60.0, None);
        assert_eq!(particles[0].velocity.y, 0.0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut config = quiet_config();
        config.max_speed = 50.0;
        let mut solver = FluidSolver::new(config);
        let bounds = Bounds::default();
        let mut particles = vec![particle_at(400.0, 300.0)];
        particles[0].velocity = Vec3::new(300.0, 400.0, 0.0);
        solver.step(&mut particles, &bounds, 1.0 / 60.0, None);
        assert!(particles[0].speed() <= 50.0 + 1e-3);
        // 方向保持
        assert!(particles[0].velocity.x > 0.0 && particles[0].velocity.y > 0.0);
    }

    #[test]
    fn test_shake_force_reaches_particles() {
        let mut config = quiet_config();
        config.boundary.enabled = false;
        let mut solver = FluidSolver::new(config);
        solver.toggle_gravity();
        let bounds = Bounds::default();
        let mut particles = vec![particle_at(400.0, 300.0)];

        solver.step(&mut particles, &bounds, 1.0 / 60.0, Some(Vec2::ZERO));
        solver.step(&mut particles, &bounds, 1.0 / 60.0, Some(Vec2::new(10.0, 0.0)));
        assert!(solver.shake_force().x < 0.0);
        assert!(solver.forces()[0].x < 0.0);
    }

    #[test]
    fn test_gas_mode_hot_particle_is_lighter() {
        let mut solver = FluidSolver::new(quiet_config());
        solver.set_physics_mode(ModeTarget::Gas, true);
        let bounds = Bounds::default();
        let mut hot = particle_at(300.0, 300.0);
        hot.fluid.temperature = 1.0;
        let mut cold = particle_at(500.0, 300.0);
        cold.fluid.temperature = 0.0;
        let mut particles = vec![hot, cold];
        solver.step(&mut particles, &bounds, 1.0 / 60.0, None);
        assert!(particles[0].fluid.mass < particles[1].fluid.mass);
    }
}

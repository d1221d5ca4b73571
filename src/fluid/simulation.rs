//! 流体模拟门面
//!
//! 把池化粒子系统与液体/气体求解器组合成宿主使用的对外接口。
//! 渲染、窗口与 UI 都在外部；这里只读写数值状态。

use crate::config::{Bounds, SimulationConfig};
use crate::fluid::mode::{ModeTarget, PhysicsMode};
use crate::fluid::shake::PerturbationSource;
use crate::fluid::solver::FluidSolver;
use crate::particles::{
    Emitter, FluidState, Particle, ParticleInstance, ParticleSystem, ParticleSystemStats, Updater,
};
use glam::{Vec3, Vec4};

/// 冷色（温度 0）
const COLD_TINT: Vec4 = Vec4::new(0.25, 0.45, 1.0, 1.0);
/// 热色（温度 1）
const HOT_TINT: Vec4 = Vec4::new(1.0, 0.35, 0.1, 1.0);

/// `spawn` 的可选参数，未指定时以边界中心为原点，散布为边界的 1/4
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnOptions {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub spread_x: Option<f32>,
    pub spread_y: Option<f32>,
}

impl SpawnOptions {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn with_spread(mut self, spread_x: f32, spread_y: f32) -> Self {
        self.spread_x = Some(spread_x);
        self.spread_y = Some(spread_y);
        self
    }
}

/// 流体模拟
pub struct FluidSimulation {
    config: SimulationConfig,
    system: ParticleSystem,
    solver: FluidSolver,
}

impl FluidSimulation {
    /// 创建模拟并按默认布局生成 `initial_particles` 个粒子
    pub fn new(config: SimulationConfig) -> Self {
        let config = config.sanitized();

        let mut system = ParticleSystem::new(config.max_particles)
            .with_updaters(vec![Updater::Velocity, Updater::Contain])
            .with_bounds(config.bounds, config.bounce)
            .with_max_delta(config.max_delta);
        if let Some(seed) = config.seed {
            system = system.with_seed(seed);
        }
        system.warm_up(config.initial_particles);

        let solver = FluidSolver::new(config.clone());

        tracing::info!(
            target: "fluid",
            max_particles = config.max_particles,
            initial_particles = config.initial_particles,
            particle_size = config.particle_size,
            "Fluid simulation created"
        );

        let mut simulation = Self {
            config,
            system,
            solver,
        };
        simulation.spawn_default();
        simulation
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 批量生成粒子，返回实际生成数（受 `max_particles` 限制）
    pub fn spawn(&mut self, count: usize, options: SpawnOptions) -> usize {
        let bounds = self.bounds();
        let center = bounds.center();
        let origin = Vec3::new(
            options.x.unwrap_or(center.x),
            options.y.unwrap_or(center.y),
            0.0,
        );
        let spread = Vec3::new(
            options.spread_x.unwrap_or(bounds.width * 0.25),
            options.spread_y.unwrap_or(bounds.height * 0.25),
            0.0,
        );

        let size = self.config.particle_size;
        let emitter = Emitter::new(origin)
            .with_spread(spread)
            .with_lifetime(f32::INFINITY, f32::INFINITY)
            .with_size(size, size)
            .with_color(self.config.color)
            .with_fluid(FluidState {
                mass: self.config.fluid.mass,
                temperature: self.config.heat.neutral_temp,
            });

        let spawned = self.system.emit(count, &emitter);
        tracing::debug!(target: "fluid", requested = count, spawned, "Spawned particles");
        spawned
    }

    fn spawn_default(&mut self) -> usize {
        self.spawn(self.config.initial_particles, SpawnOptions::default())
    }

    /// 推进一帧（无外部扰动）
    pub fn update(&mut self, dt: f32) {
        self.system.update_with_solver(dt, &mut self.solver, None);
    }

    /// 推进一帧，从 `source` 读取一次宿主位置
    pub fn update_with(&mut self, dt: f32, source: &mut dyn PerturbationSource) {
        let sample = source.sample();
        self.system.update_with_solver(dt, &mut self.solver, sample);
    }

    pub fn particles(&self) -> &[Particle] {
        self.system.particles()
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        self.system.particles_mut()
    }

    pub fn particle_count(&self) -> usize {
        self.system.particle_count()
    }

    pub fn pool_size(&self) -> usize {
        self.system.pool_size()
    }

    pub fn stats(&self) -> ParticleSystemStats {
        self.system.stats()
    }

    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        self.system.write_instances(out);
    }

    /// 当前容器边界
    pub fn bounds(&self) -> Bounds {
        self.system.bounds().unwrap_or(self.config.bounds)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.system.set_bounds(bounds);
        tracing::debug!(target: "fluid", ?bounds, "Bounds changed");
    }

    /// 设置物理模式，`instant` 为 false 时平滑过渡
    pub fn set_physics_mode(&mut self, target: ModeTarget, instant: bool) {
        self.solver.set_physics_mode(target, instant);
    }

    pub fn physics_mode(&self) -> PhysicsMode {
        self.solver.physics_mode()
    }

    pub fn mode_mix(&self) -> f32 {
        self.solver.mode_mix()
    }

    /// 切换重力，返回切换后的状态
    pub fn toggle_gravity(&mut self) -> bool {
        let enabled = self.solver.toggle_gravity();
        tracing::info!(target: "fluid", enabled, "Gravity toggled");
        enabled
    }

    pub fn gravity_enabled(&self) -> bool {
        self.solver.gravity_enabled()
    }

    pub fn is_heat_enabled(&self) -> bool {
        self.solver.is_heat_enabled()
    }

    pub fn set_heat_enabled(&mut self, enabled: bool) {
        self.solver.set_heat_enabled(enabled);
        tracing::info!(target: "fluid", enabled, "Heat toggled");
    }

    /// 清空并按默认布局重新生成同样数量的粒子
    ///
    /// 模式、重力与加热开关保持不变；晃动历史清零。
    pub fn reset(&mut self) {
        self.system.clear();
        self.solver.reset_transients();
        let spawned = self.spawn_default();
        tracing::info!(target: "fluid", spawned, "Simulation reset");
    }

    /// 按温度着色：混合值越偏向气体，越接近冷/热色
    pub fn temperature_color(&self, particle: &Particle) -> Vec4 {
        let t = particle.fluid.temperature.clamp(0.0, 1.0);
        let tint = COLD_TINT.lerp(HOT_TINT, t);
        let mut color = particle.color.lerp(tint, self.solver.mode_mix());
        color.w = particle.color.w;
        color
    }

    pub fn solver(&self) -> &FluidSolver {
        &self.solver
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem {
        &mut self.system
    }
}

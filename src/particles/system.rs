//! 池化粒子系统
//!
//! 持有存活粒子数组与空闲列表，每帧按固定顺序执行：
//! 发射 → 流体求解（可选）→ 更新器 → 回收死亡粒子。
//! 预热之后每帧不做堆分配。

use crate::config::Bounds;
use crate::fluid::FluidSolver;
use crate::particles::emitter::Emitter;
use crate::particles::instance::ParticleInstance;
use crate::particles::particle::Particle;
use crate::particles::pool::{PoolStats, ResettablePool};
use crate::particles::updater::{SystemView, Updater};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// 默认帧步长上限（秒）
pub const DEFAULT_MAX_DELTA: f32 = 1.0 / 30.0;

/// 粒子系统统计信息
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleSystemStats {
    /// 当前存活粒子数
    pub alive_count: usize,
    /// 累计发射数
    pub total_emitted: u64,
    /// 本帧发射数
    pub frame_emitted: usize,
    /// 因达到上限而丢弃的发射数
    pub dropped_spawns: u64,
    /// 上一帧耗时（毫秒）
    pub frame_time_ms: f32,
    /// 累计模拟时间（秒，已钳制的 dt 之和）
    pub elapsed: f32,
}

/// 池化粒子系统
pub struct ParticleSystem {
    particles: Vec<Particle>,
    pool: ResettablePool<Particle>,
    emitters: Vec<Emitter>,
    updaters: Vec<Updater>,
    solver: Option<FluidSolver>,
    bounds: Option<Bounds>,
    bounce: f32,
    max_particles: usize,
    max_delta: f32,
    rng: StdRng,
    stats: ParticleSystemStats,
}

impl ParticleSystem {
    /// 创建粒子系统
    ///
    /// # 参数
    ///
    /// * `max_particles` - 存活粒子上限，也是空闲列表容量
    ///
    /// 默认更新器为 `[Velocity, Lifetime]`。
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles),
            pool: ResettablePool::new(0, max_particles),
            emitters: Vec::new(),
            updaters: vec![Updater::Velocity, Updater::Lifetime],
            solver: None,
            bounds: None,
            bounce: 0.5,
            max_particles,
            max_delta: DEFAULT_MAX_DELTA,
            rng: StdRng::from_entropy(),
            stats: ParticleSystemStats::default(),
        }
    }

    /// 使用固定种子，发射结果可复现
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 设置帧步长上限，非正值被忽略
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        if max_delta.is_finite() && max_delta > 0.0 {
            self.max_delta = max_delta;
        }
        self
    }

    /// 替换更新器列表（按顺序执行）
    pub fn with_updaters(mut self, updaters: Vec<Updater>) -> Self {
        self.updaters = updaters;
        self
    }

    /// 挂接流体求解器
    pub fn with_solver(mut self, solver: FluidSolver) -> Self {
        self.solver = Some(solver);
        self
    }

    /// 设置硬边界与反弹系数
    pub fn with_bounds(mut self, bounds: Bounds, bounce: f32) -> Self {
        self.bounds = Some(bounds.sanitized());
        self.bounce = bounce.clamp(0.0, 1.0);
        self
    }

    /// 添加发射器，返回其下标
    pub fn add_emitter(&mut self, emitter: Emitter) -> usize {
        self.emitters.push(emitter);
        self.emitters.len() - 1
    }

    pub fn emitter_mut(&mut self, index: usize) -> Option<&mut Emitter> {
        self.emitters.get_mut(index)
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// 从空闲列表取出一条记录，空闲列表为空时新建
    pub fn acquire(&mut self) -> Particle {
        self.pool.acquire()
    }

    /// 重置记录并放回空闲列表
    pub fn release(&mut self, particle: Particle) {
        self.pool.release(particle);
    }

    /// 用发射器模板生成最多 `count` 个粒子
    ///
    /// 达到 `max_particles` 时停止，返回实际生成数。超出部分记为丢弃，不是错误。
    pub fn emit(&mut self, count: usize, emitter: &Emitter) -> usize {
        let room = self.max_particles.saturating_sub(self.particles.len());
        let accepted = count.min(room);

        for _ in 0..accepted {
            let mut particle = self.pool.acquire();
            emitter.initialize(&mut particle, &mut self.rng);
            self.particles.push(particle);
        }

        let dropped = count - accepted;
        if dropped > 0 {
            self.stats.dropped_spawns += dropped as u64;
            tracing::trace!(
                target: "particles",
                dropped,
                max_particles = self.max_particles,
                "Particle limit reached, spawns dropped"
            );
        }
        self.stats.total_emitted += accepted as u64;
        self.stats.frame_emitted += accepted;
        self.stats.alive_count = self.particles.len();
        accepted
    }

    /// 推进一帧（无外部扰动）
    pub fn update(&mut self, dt: f32) {
        self.update_with(dt, None);
    }

    /// 推进一帧，使用挂接的求解器（如果有）
    ///
    /// # 参数
    ///
    /// * `dt` - 时间步长，会被钳制到 `[0, max_delta]`
    /// * `perturbation` - 本帧宿主提供的容器位置采样
    pub fn update_with(&mut self, dt: f32, perturbation: Option<Vec2>) {
        let mut solver = self.solver.take();
        self.advance(dt, solver.as_mut(), perturbation);
        self.solver = solver;
    }

    /// 推进一帧，使用外部持有的求解器
    pub fn update_with_solver(
        &mut self,
        dt: f32,
        solver: &mut FluidSolver,
        perturbation: Option<Vec2>,
    ) {
        self.advance(dt, Some(solver), perturbation);
    }

    fn advance(&mut self, dt: f32, solver: Option<&mut FluidSolver>, perturbation: Option<Vec2>) {
        let start = Instant::now();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.max_delta)
        } else {
            0.0
        };
        self.stats.frame_emitted = 0;

        // 发射（临时取出发射器列表以便借用 self）
        let mut emitters = std::mem::take(&mut self.emitters);
        for emitter in &mut emitters {
            let spawn = emitter.update(dt) as usize;
            if spawn > 0 {
                self.emit(spawn, emitter);
            }
        }
        self.emitters = emitters;

        // 力计算与速度积分
        if let Some(solver) = solver {
            let bounds = self.bounds.unwrap_or(solver.config().bounds);
            solver.step(&mut self.particles, &bounds, dt, perturbation);
        }

        // 更新器
        let view = SystemView {
            dt,
            bounds: self.bounds,
            bounce: self.bounce,
        };
        for particle in &mut self.particles {
            for updater in &self.updaters {
                updater.apply(particle, &view);
            }
        }

        self.reclaim();

        self.stats.elapsed += dt;
        self.stats.alive_count = self.particles.len();
        self.stats.frame_time_ms = start.elapsed().as_secs_f32() * 1000.0;
    }

    /// 从后往前回收死亡粒子，swap_remove 保证 O(1)
    fn reclaim(&mut self) {
        let mut index = self.particles.len();
        while index > 0 {
            index -= 1;
            if !self.particles[index].alive {
                let dead = self.particles.swap_remove(index);
                self.pool.release(dead);
            }
        }
    }

    /// 回收所有存活粒子，空闲列表保留容量
    pub fn clear(&mut self) {
        while let Some(particle) = self.particles.pop() {
            self.pool.release(particle);
        }
        self.stats.alive_count = 0;
    }

    /// 预先分配 `count` 条记录（受 `max_particles` 限制）
    pub fn warm_up(&mut self, count: usize) {
        self.pool.warm_up(count);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// 空闲列表中的记录数
    pub fn pool_size(&self) -> usize {
        self.pool.available_count()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    pub fn stats(&self) -> ParticleSystemStats {
        self.stats
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// 导出渲染实例数据，`out` 先被清空
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.particles.iter().map(ParticleInstance::from));
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds.sanitized());
    }

    pub fn solver(&self) -> Option<&FluidSolver> {
        self.solver.as_ref()
    }

    pub fn solver_mut(&mut self) -> Option<&mut FluidSolver> {
        self.solver.as_mut()
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn seeded(max_particles: usize) -> ParticleSystem {
        ParticleSystem::new(max_particles).with_seed(42)
    }

    #[test]
    fn test_emit_respects_limit() {
        let mut system = seeded(5);
        let emitter = Emitter::new(Vec3::ZERO);
        assert_eq!(system.emit(3, &emitter), 3);
        assert_eq!(system.emit(10, &emitter), 2);
        assert_eq!(system.particle_count(), 5);
        assert_eq!(system.stats().dropped_spawns, 8);
        assert_eq!(system.stats().total_emitted, 5);
    }

    #[test]
    fn test_dead_particles_return_to_pool() {
        let mut system = seeded(100).with_max_delta(0.5);
        let emitter = Emitter::new(Vec3::ZERO).with_lifetime(0.05, 0.05);
        system.emit(10, &emitter);
        assert_eq!(system.pool_size(), 0);

        system.update(0.1);
        assert_eq!(system.particle_count(), 0);
        assert_eq!(system.pool_size(), 10);

        // 再次发射全部命中空闲列表
        system.emit(10, &emitter);
        assert_eq!(system.pool_size(), 0);
        assert_eq!(system.pool_stats().cache_hits, 10);
    }

    #[test]
    fn test_reclaim_keeps_survivors() {
        let mut system = seeded(100);
        let short = Emitter::new(Vec3::ZERO).with_lifetime(0.01, 0.01);
        let long = Emitter::new(Vec3::new(5.0, 0.0, 0.0)).with_lifetime(10.0, 10.0);
        system.emit(3, &short);
        system.emit(4, &long);
        system.emit(3, &short);

        system.update(1.0 / 60.0);
        assert_eq!(system.particle_count(), 4);
        assert!(system.particles().iter().all(|p| p.alive && p.lifetime == 10.0));
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut system = seeded(10);
        let emitter = Emitter::new(Vec3::ZERO)
            .with_lifetime(100.0, 100.0)
            .with_velocity(Vec3::new(30.0, 0.0, 0.0), Vec3::ZERO);
        system.emit(1, &emitter);

        system.update(5.0);
        let particle = &system.particles()[0];
        assert!((particle.age - DEFAULT_MAX_DELTA).abs() < 1e-6);
        assert!((particle.position.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_emitters_drive_spawning() {
        let mut system = seeded(1000);
        system.add_emitter(Emitter::new(Vec3::ZERO).with_rate(60.0).with_lifetime(10.0, 10.0));
        for _ in 0..30 {
            system.update(1.0 / 60.0);
        }
        let count = system.particle_count();
        assert!((29..=30).contains(&count));
        assert_eq!(system.stats().total_emitted as usize, count);
    }

    #[test]
    fn test_huge_rate_emitter_is_capped() {
        let mut system = seeded(8);
        system.add_emitter(Emitter::new(Vec3::ZERO).with_rate(1.0e10).with_lifetime(10.0, 10.0));
        system.update(1.0 / 30.0);
        assert_eq!(system.particle_count(), 8);
        assert_eq!(system.stats().total_emitted, 8);
        assert!(system.stats().dropped_spawns > 300_000_000);
    }

    #[test]
    fn test_clear_keeps_pool_capacity() {
        let mut system = seeded(50);
        system.emit(20, &Emitter::default());
        system.clear();
        assert_eq!(system.particle_count(), 0);
        assert_eq!(system.pool_size(), 20);
        system.clear();
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn test_warm_up_is_bounded() {
        let mut system = seeded(16);
        system.warm_up(64);
        assert_eq!(system.pool_size(), 16);
    }

    #[test]
    fn test_attached_solver_applies_gravity() {
        let config = crate::config::SimulationConfig {
            seed: Some(5),
            ..Default::default()
        };
        let mut system = seeded(10)
            .with_solver(FluidSolver::new(config))
            .with_bounds(Bounds::default(), 0.4);
        system.emit(
            1,
            &Emitter::new(Vec3::new(400.0, 300.0, 0.0)).with_lifetime(f32::INFINITY, f32::INFINITY),
        );
        system.update(1.0 / 60.0);
        assert!(system.particles()[0].velocity.y > 0.0);
        assert!(system.particles()[0].position.y > 300.0);
        assert_eq!(system.solver().map(|s| s.forces().len()), Some(1));
    }

    #[test]
    fn test_write_instances() {
        let mut system = seeded(10);
        system.emit(4, &Emitter::new(Vec3::new(1.0, 2.0, 0.0)));
        let mut instances = vec![ParticleInstance::from(&Particle::default()); 9];
        system.write_instances(&mut instances);
        assert_eq!(instances.len(), 4);
        assert_eq!(instances[0].position, system.particles()[0].position.to_array());
    }
}

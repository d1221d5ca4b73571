//! 无界面运行器
//!
//! 读取 `AppConfig`，按固定步长推进模拟若干帧，并定期输出统计。
//! 可选的正弦晃动信号模拟宿主窗口的移动。

use crate::config::AppConfig;
use crate::core::error::{SimError, SimResult};
use crate::core::logging::init_logging;
use crate::fluid::{FluidSimulation, ModeTarget, PerturbationSource, PhysicsMode};
use glam::Vec2;
use std::f32::consts::TAU;

/// 合成晃动的频率（Hz）
const SHAKE_FREQUENCY: f32 = 1.5;

/// 运行结果摘要
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u32,
    pub particle_count: usize,
    pub total_emitted: u64,
    pub dropped_spawns: u64,
    pub mode: PhysicsMode,
    pub mean_speed: f32,
    pub simulated_seconds: f32,
}

/// 水平正弦运动的容器位置
struct SineShake {
    amplitude: f32,
    dt: f32,
    time: f32,
}

impl PerturbationSource for SineShake {
    fn sample(&mut self) -> Option<Vec2> {
        if self.amplitude <= 0.0 {
            return None;
        }
        let x = self.amplitude * (self.time * SHAKE_FREQUENCY * TAU).sin();
        self.time += self.dt;
        Some(Vec2::new(x, 0.0))
    }
}

/// 无界面运行器
pub struct Runner {
    config: AppConfig,
}

impl Runner {
    /// 用给定配置创建运行器，配置无效时返回错误
    pub fn new(config: AppConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 查找配置文件并应用环境变量覆盖
    pub fn from_environment() -> SimResult<Self> {
        let mut config = AppConfig::load_or_default();
        config.apply_env_overrides();
        Self::new(config)
    }

    /// 入口：加载配置、初始化日志并运行
    pub fn run() -> SimResult<RunSummary> {
        let runner = Self::from_environment()?;
        init_logging(&runner.config.logging);
        tracing::info!(target: "runner", "Runner starting");
        let summary = runner.execute()?;
        tracing::info!(target: "runner", ?summary, "Runner finished");
        Ok(summary)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 执行配置中的帧数
    pub fn execute(&self) -> SimResult<RunSummary> {
        let runner = &self.config.runner;
        let target: ModeTarget = runner.mode.parse()?;

        let mut simulation = FluidSimulation::new(self.config.simulation.clone());
        simulation.set_physics_mode(target, true);

        let mut shake = SineShake {
            amplitude: runner.shake_amplitude,
            dt: runner.dt,
            time: 0.0,
        };

        for tick in 1..=runner.ticks {
            simulation.update_with(runner.dt, &mut shake);

            if runner.report_every > 0 && tick % runner.report_every == 0 {
                let stats = simulation.stats();
                tracing::info!(
                    target: "runner",
                    tick,
                    alive = stats.alive_count,
                    mode = %simulation.physics_mode(),
                    frame_ms = stats.frame_time_ms,
                    mean_speed = mean_speed(&simulation),
                    "Progress"
                );
            }
        }

        if simulation.particles().iter().any(|p| !p.position.is_finite()) {
            return Err(SimError::Runner(
                "particle state became non-finite".to_string(),
            ));
        }

        let stats = simulation.stats();
        Ok(RunSummary {
            ticks: runner.ticks,
            particle_count: simulation.particle_count(),
            total_emitted: stats.total_emitted,
            dropped_spawns: stats.dropped_spawns,
            mode: simulation.physics_mode(),
            mean_speed: mean_speed(&simulation),
            simulated_seconds: stats.elapsed,
        })
    }
}

fn mean_speed(simulation: &FluidSimulation) -> f32 {
    let particles = simulation.particles();
    if particles.is_empty() {
        return 0.0;
    }
    particles.iter().map(|p| p.speed()).sum::<f32>() / particles.len() as f32
}

//! # Fluid Particles
//!
//! 池化粒子系统与液体/气体流体求解器，与渲染无关。
//!
//! ## Features
//!
//! - **Pooled particles**: 空闲列表回收粒子记录，预热后每帧零分配
//! - **Emitters & updaters**: 声明式发射模板，可组合的逐粒子更新器
//! - **Liquid/Gas solver**: SPH 风格的两两作用力，模式之间平滑混合
//! - **Thermal convection**: 由垂直位置推出的温度场驱动上浮与下沉
//! - **Containment**: 碰撞分离、软边界与硬边界反弹
//! - **Shake**: 宿主提供的容器位置产生惯性力（雪花球效果）
//!
//! ### Example
//!
//! ```no_run
//! use fluid_particles::prelude::*;
//!
//! let mut sim = FluidSimulation::new(SimulationConfig::default());
//! sim.set_physics_mode(ModeTarget::Gas, false);
//! for _ in 0..60 {
//!     sim.update(1.0 / 60.0);
//! }
//! println!("{} particles, mode {}", sim.particle_count(), sim.physics_mode());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: 错误类型、日志、无界面运行器
//! - [`config`]: 配置结构与加载
//! - [`particles`]: 粒子记录、发射器、对象池、系统
//! - [`fluid`]: 流体求解器与模拟门面

/// Error types, logging and the headless runner
pub mod core;
/// Configuration system
pub mod config;
/// Pooled particle system
pub mod particles;
/// Liquid/gas force solver
pub mod fluid;

/// 常用类型
pub mod prelude {
    pub use crate::config::{AppConfig, Bounds, SimulationConfig};
    pub use crate::core::{SimError, SimResult};
    pub use crate::fluid::{
        FluidSimulation, FluidSolver, ModeTarget, NoPerturbation, PerturbationSource,
        PhysicsMode, ScriptedPerturbation, SpawnOptions,
    };
    pub use crate::particles::{
        Emitter, Particle, ParticleInstance, ParticleShape, ParticleSystem, Updater,
    };
}

//! 粒子模块
//!
//! 池化的粒子记录、发射器与更新器：
//! - `particle` - 粒子数据记录
//! - `emitter` - 发射模板与计时器
//! - `pool` - 空闲列表
//! - `updater` - 逐粒子更新器
//! - `system` - 每帧驱动以上部件的系统
//! - `instance` - 渲染导出格式

pub mod emitter;
pub mod instance;
pub mod particle;
pub mod pool;
pub mod system;
pub mod updater;


pub use emitter::Emitter;
pub use instance::ParticleInstance;
pub use particle::{FluidState, Particle, ParticleShape};
pub use pool::{PoolStats, Resettable, ResettablePool};
pub use system::{ParticleSystem, ParticleSystemStats, DEFAULT_MAX_DELTA};
pub use updater::{ColorGradient, ColorStop, SizeOverLifetime, SystemView, Updater};

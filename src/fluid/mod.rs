//! 流体模块
//!
//! 液体/气体力求解器及其组成部分：
//! - `kernels` - 平滑核与数值工具
//! - `liquid` - 双密度松弛液体力
//! - `gas` - 气体压力、扩散、湍流与排斥
//! - `thermal` - 基于位置的温度场与对流
//! - `containment` - 碰撞分离与软边界
//! - `shake` - 容器晃动与外部扰动源
//! - `mode` - 液体/气体模式混合
//! - `solver` - 每帧的力计算与积分
//! - `simulation` - 对宿主的门面

pub mod containment;
pub mod gas;
pub mod kernels;
pub mod liquid;
pub mod mode;
pub mod shake;
pub mod simulation;
pub mod solver;
pub mod thermal;


pub use mode::{ModeBlend, ModeTarget, PhysicsMode};
pub use shake::{NoPerturbation, PerturbationSource, ScriptedPerturbation, ShakeTracker};
pub use simulation::{FluidSimulation, SpawnOptions};
pub use solver::FluidSolver;

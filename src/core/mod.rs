//! 核心模块
//!
//! 包含模拟核心的外围功能：
//! - `error` - 错误类型定义
//! - `logging` - 日志初始化
//! - `runner` - 无界面运行器
//! - `macros` - 配置样板宏

pub mod error;
pub mod logging;
pub mod runner;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{SimError, SimResult};

pub use logging::init_logging;
pub use runner::Runner;

//! 统一错误处理模块
//!
//! 提供模拟核心范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **配置层错误** (`config::ConfigError`): 配置文件读取、解析与验证
//! - **核心错误** (`core::error`): 模式解析、运行器等外层接口
//!
//! 每帧的 `update()` 不返回错误：实时模拟以稳定优先，异常状态在构造时钳制。

use crate::config::ConfigError;
use thiserror::Error;

/// 模拟核心错误类型
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown physics mode: {0:?} (expected \"liquid\", \"gas\" or a number in [0, 1])")]
    UnknownMode(String),

    #[error("Runner error: {0}")]
    Runner(String),
}

/// 模拟结果类型别名
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::ValidationError("bad bounds".to_string());
        let sim_err: SimError = config_err.into();
        assert!(matches!(sim_err, SimError::Config(_)));
    }

    #[test]
    fn test_missing_file_surfaces_as_config_error() {
        let result: SimResult<_> = crate::config::AppConfig::from_toml_file("/nonexistent/fluid.toml")
            .map_err(SimError::from);
        assert!(matches!(
            result,
            Err(SimError::Config(ConfigError::FileError(_)))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = SimError::UnknownMode("plasma".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown physics mode: \"plasma\" (expected \"liquid\", \"gas\" or a number in [0, 1])"
        );
    }
}

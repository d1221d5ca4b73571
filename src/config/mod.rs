//! 统一配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖，以及模拟参数的一次性校验
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod simulation;

pub use simulation::{
    BoundaryConfig, Bounds, CollisionConfig, FluidConfig, GasConfig, HeatConfig, ShakeConfig,
    SimulationConfig, PARTICLE_LIMIT,
};

use crate::impl_default;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置文件名
const CONFIG_TOML: &str = "fluid.toml";
const CONFIG_JSON: &str = "fluid.json";

/// 应用主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 无界面运行器配置
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl AppConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        let sim = &mut self.simulation;

        if let Ok(val) = env::var("FLUID_MAX_PARTICLES") {
            if let Ok(max) = val.parse() {
                sim.max_particles = max;
            }
        }
        if let Ok(val) = env::var("FLUID_GRAVITY") {
            if let Ok(gravity) = val.parse() {
                sim.gravity = gravity;
            }
        }
        if let Ok(val) = env::var("FLUID_HEAT_ENABLED") {
            sim.heat.enabled = val.parse().unwrap_or(sim.heat.enabled);
        }
        if let Ok(val) = env::var("FLUID_SEED") {
            if let Ok(seed) = val.parse() {
                sim.seed = Some(seed);
            }
        }

        if let Ok(val) = env::var("FLUID_MODE") {
            self.runner.mode = val;
        }
    }

    /// 验证配置
    ///
    /// 模拟参数越界时会被钳制而不是报错，这里只检查运行器与日志。
    pub fn validate(&self) -> ConfigResult<()> {
        self.runner.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./fluid.toml
    /// 2. ./fluid.json
    /// 3. <用户配置目录>/fluid_particles/fluid.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file(CONFIG_TOML) {
            tracing::info!(target: "config", "Loaded config from {}", CONFIG_TOML);
            return config;
        }

        if let Ok(config) = Self::from_json_file(CONFIG_JSON) {
            tracing::info!(target: "config", "Loaded config from {}", CONFIG_JSON);
            return config;
        }

        if let Some(config_path) = Self::user_config_path() {
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "config", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }

    /// 用户级配置文件路径
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fluid_particles").join(CONFIG_TOML))
    }
}

/// 无界面运行器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// 模拟帧数
    pub ticks: u32,
    /// 每帧时间（秒）
    pub dt: f32,
    /// 物理模式："liquid"、"gas" 或 0..1 的混合值
    pub mode: String,
    /// 每隔多少帧输出一次统计
    pub report_every: u32,
    /// 合成晃动信号的振幅（像素），0 表示不晃动
    pub shake_amplitude: f32,
}

impl_default!(RunnerConfig {
    ticks: 600,
    dt: 1.0 / 60.0,
    mode: "liquid".to_string(),
    report_every: 60,
    shake_amplitude: 0.0,
});

impl RunnerConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "runner.dt must be positive, got {}",
                self.dt
            )));
        }
        if !self.shake_amplitude.is_finite() || self.shake_amplitude < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "runner.shake_amplitude must be non-negative, got {}",
                self.shake_amplitude
            )));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "fluid_particles.log".to_string(),
    log_to_console: true,
});

impl LoggingConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.log_to_file && self.log_file_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.log_file_path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

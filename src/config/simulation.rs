use crate::{clamp_field, impl_default};
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// 矩形容器边界（屏幕坐标，+Y 向下）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl_default!(Bounds {
    x: 0.0,
    y: 0.0,
    width: 800.0,
    height: 600.0,
});

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// 归一化的垂直位置：0 = 顶部（冷区），1 = 底部（热区）
    pub fn normalized_depth(&self, y: f32) -> f32 {
        ((y - self.top()) / self.height).clamp(0.0, 1.0)
    }

    /// 宽高至少为 1，且不含 NaN
    pub fn sanitized(mut self) -> Self {
        if !self.x.is_finite() {
            self.x = 0.0;
        }
        if !self.y.is_finite() {
            self.y = 0.0;
        }
        if !self.width.is_finite() || self.width < 1.0 {
            tracing::warn!(target: "config", "bounds.width = {} invalid, using 1", self.width);
            self.width = 1.0;
        }
        if !self.height.is_finite() || self.height < 1.0 {
            tracing::warn!(target: "config", "bounds.height = {} invalid, using 1", self.height);
            self.height = 1.0;
        }
        self
    }
}

/// 液体（SPH 风格）参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    /// 平滑半径，未设置时为 4 倍粒子尺寸
    pub smoothing_radius: Option<f32>,
    /// 静止密度
    pub rest_density: f32,
    /// 压力刚度
    pub pressure_stiffness: f32,
    /// 近压力刚度（硬核排斥）
    pub near_pressure_stiffness: f32,
    /// 粘度
    pub viscosity: f32,
    /// 单粒子合力上限
    pub max_force: f32,
    /// 液体粒子质量
    pub mass: f32,
}

impl_default!(FluidConfig {
    smoothing_radius: None,
    rest_density: 2.0,
    pressure_stiffness: 600.0,
    near_pressure_stiffness: 1200.0,
    viscosity: 2.0,
    max_force: 4000.0,
    mass: 1.0,
});

/// 气体参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// 相互作用半径，未设置时为 6 倍粒子尺寸
    pub interaction_radius: Option<f32>,
    pub pressure: f32,
    pub diffusion: f32,
    pub drag: f32,
    pub turbulence: f32,
    pub buoyancy: f32,
    pub repulsion: f32,
    /// 气体模式下每帧速度衰减
    pub damping: f32,
    /// 最热时的质量
    pub hot_mass: f32,
    /// 最冷时的质量
    pub cold_mass: f32,
    /// 气体模式下重力缩放（再乘以 1 - 温度）
    pub gravity_scale: f32,
}

impl_default!(GasConfig {
    interaction_radius: None,
    pressure: 150.0,
    diffusion: 1.0,
    drag: 0.5,
    turbulence: 60.0,
    buoyancy: 60.0,
    repulsion: 200.0,
    damping: 0.98,
    hot_mass: 0.6,
    cold_mass: 1.4,
    gravity_scale: 0.3,
});

/// 热对流参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    pub enabled: bool,
    /// 底部热区占容器高度的比例
    pub heat_zone: f32,
    /// 顶部冷区占容器高度的比例
    pub cool_zone: f32,
    /// 温度趋近目标的速率（每秒）
    pub rate: f32,
    /// 热粒子上浮力
    pub buoyancy: f32,
    /// 冷粒子下沉力
    pub sinking: f32,
    /// 中性温度两侧的死区半宽
    pub dead_zone: f32,
    pub neutral_temp: f32,
    /// 区域边界的平滑过渡宽度（归一化）
    pub transition_width: f32,
}

impl_default!(HeatConfig {
    enabled: false,
    heat_zone: 0.15,
    cool_zone: 0.15,
    rate: 1.5,
    buoyancy: 600.0,
    sinking: 300.0,
    dead_zone: 0.1,
    neutral_temp: 0.5,
    transition_width: 0.1,
});

/// 碰撞分离参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub enabled: bool,
    pub strength: f32,
}

impl_default!(CollisionConfig {
    enabled: true,
    strength: 200.0,
});

/// 软边界参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub enabled: bool,
    pub strength: f32,
    /// 作用距离，未设置时为 3 倍粒子尺寸
    pub radius: Option<f32>,
}

impl_default!(BoundaryConfig {
    enabled: true,
    strength: 800.0,
    radius: None,
});

/// 容器晃动（雪花球效果）参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub enabled: bool,
    pub sensitivity: f32,
    pub max_force: f32,
    /// 指数平滑系数，越大越平滑
    pub damping: f32,
}

impl_default!(ShakeConfig {
    enabled: true,
    sensitivity: 0.5,
    max_force: 2000.0,
    damping: 0.8,
});

/// 模拟配置
///
/// 构造时通过 [`SimulationConfig::sanitized`] 一次性钳制，之后每帧不再校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fluid: FluidConfig,
    pub gas: GasConfig,
    pub heat: HeatConfig,
    pub collision: CollisionConfig,
    pub boundary: BoundaryConfig,
    pub shake: ShakeConfig,
    /// 重力加速度（+Y 向下）
    pub gravity: f32,
    /// 液体模式下每帧速度衰减
    pub damping: f32,
    /// 撞墙反弹系数
    pub bounce: f32,
    pub max_speed: f32,
    pub max_particles: usize,
    /// reset() 重新生成的粒子数
    pub initial_particles: usize,
    pub particle_size: f32,
    /// 单帧 dt 上限
    pub max_delta: f32,
    /// 模式混合的插值速度
    pub mode_lerp_speed: f32,
    pub bounds: Bounds,
    pub color: Vec4,
    /// 随机种子，None 时从熵源获取
    pub seed: Option<u64>,
}

impl_default!(SimulationConfig {
    fluid: FluidConfig::default(),
    gas: GasConfig::default(),
    heat: HeatConfig::default(),
    collision: CollisionConfig::default(),
    boundary: BoundaryConfig::default(),
    shake: ShakeConfig::default(),
    gravity: 400.0,
    damping: 0.995,
    bounce: 0.4,
    max_speed: 600.0,
    max_particles: 2000,
    initial_particles: 400,
    particle_size: 4.0,
    max_delta: 1.0 / 30.0,
    mode_lerp_speed: 2.0,
    bounds: Bounds::default(),
    color: Vec4::new(0.2, 0.5, 0.9, 1.0),
    seed: None,
});

/// 粒子数量硬上限
pub const PARTICLE_LIMIT: usize = 100_000;

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 钳制所有数值字段并填充派生半径
    pub fn sanitized(mut self) -> Self {
        clamp_field!(self, particle_size, 0.5, 100.0);
        clamp_field!(self, gravity, -10_000.0, 10_000.0);
        clamp_field!(self, damping, 0.0, 1.0);
        clamp_field!(self, bounce, 0.0, 1.0);
        clamp_field!(self, max_speed, 1.0, 100_000.0);
        clamp_field!(self, max_delta, 1.0e-4, 0.25);
        clamp_field!(self, mode_lerp_speed, 0.01, 100.0);

        if self.max_particles > PARTICLE_LIMIT {
            tracing::warn!(
                target: "config",
                "max_particles = {} exceeds {}, clamped",
                self.max_particles,
                PARTICLE_LIMIT
            );
            self.max_particles = PARTICLE_LIMIT;
        }
        self.initial_particles = self.initial_particles.min(self.max_particles);
        self.bounds = self.bounds.sanitized();
        if self.color.is_nan() {
            tracing::warn!(target: "config", color = ?self.color, "NaN particle color, using white");
            self.color = Vec4::ONE;
        } else {
            self.color = self.color.clamp(Vec4::ZERO, Vec4::ONE);
        }

        let size = self.particle_size;

        let fluid = &mut self.fluid;
        let smoothing = fluid.smoothing_radius.unwrap_or(size * 4.0);
        fluid.smoothing_radius = Some(sanitize_radius(smoothing, size * 4.0));
        clamp_field!(fluid, rest_density, 0.0, 100.0);
        clamp_field!(fluid, pressure_stiffness, 0.0, 1.0e6);
        clamp_field!(fluid, near_pressure_stiffness, 0.0, 1.0e6);
        clamp_field!(fluid, viscosity, 0.0, 100.0);
        clamp_field!(fluid, max_force, 0.0, 1.0e7);
        clamp_field!(fluid, mass, 0.01, 1000.0);

        let gas = &mut self.gas;
        let interaction = gas.interaction_radius.unwrap_or(size * 6.0);
        gas.interaction_radius = Some(sanitize_radius(interaction, size * 6.0));
        clamp_field!(gas, pressure, 0.0, 1.0e6);
        clamp_field!(gas, diffusion, 0.0, 100.0);
        clamp_field!(gas, drag, 0.0, 100.0);
        clamp_field!(gas, turbulence, 0.0, 1.0e5);
        clamp_field!(gas, buoyancy, 0.0, 1.0e5);
        clamp_field!(gas, repulsion, 0.0, 1.0e6);
        clamp_field!(gas, damping, 0.0, 1.0);
        clamp_field!(gas, hot_mass, 0.01, 1000.0);
        clamp_field!(gas, cold_mass, 0.01, 1000.0);
        clamp_field!(gas, gravity_scale, -10.0, 10.0);

        let heat = &mut self.heat;
        clamp_field!(heat, heat_zone, 0.0, 1.0);
        clamp_field!(heat, cool_zone, 0.0, 1.0);
        clamp_field!(heat, rate, 0.0, 100.0);
        clamp_field!(heat, buoyancy, 0.0, 1.0e6);
        clamp_field!(heat, sinking, 0.0, 1.0e6);
        clamp_field!(heat, dead_zone, 0.0, 0.5);
        clamp_field!(heat, neutral_temp, 0.0, 1.0);
        clamp_field!(heat, transition_width, 0.0, 1.0);

        clamp_field!(self.collision, strength, 0.0, 1.0e6);

        let boundary = &mut self.boundary;
        let radius = boundary.radius.unwrap_or(size * 3.0);
        boundary.radius = Some(sanitize_radius(radius, size * 3.0));
        clamp_field!(boundary, strength, 0.0, 1.0e7);

        let shake = &mut self.shake;
        clamp_field!(shake, sensitivity, 0.0, 100.0);
        clamp_field!(shake, max_force, 0.0, 1.0e7);
        clamp_field!(shake, damping, 0.0, 0.999);

        self
    }

    /// 液体平滑半径（`sanitized()` 之后总是有值）
    pub fn smoothing_radius(&self) -> f32 {
        self.fluid
            .smoothing_radius
            .unwrap_or(self.particle_size * 4.0)
    }

    /// 气体相互作用半径
    pub fn interaction_radius(&self) -> f32 {
        self.gas
            .interaction_radius
            .unwrap_or(self.particle_size * 6.0)
    }

    /// 软边界作用距离
    pub fn boundary_radius(&self) -> f32 {
        self.boundary.radius.unwrap_or(self.particle_size * 3.0)
    }
}

fn sanitize_radius(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.clamp(0.5, 1000.0)
    } else {
        tracing::warn!(target: "config", "radius {} invalid, using {}", value, fallback);
        fallback.clamp(0.5, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_radii_follow_particle_size() {
        let config = SimulationConfig {
            particle_size: 5.0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.fluid.smoothing_radius, Some(20.0));
        assert_eq!(config.gas.interaction_radius, Some(30.0));
        assert_eq!(config.boundary.radius, Some(15.0));
    }

    #[test]
    fn test_explicit_radius_is_kept() {
        let mut config = SimulationConfig::default();
        config.fluid.smoothing_radius = Some(9.0);
        let config = config.sanitized();
        assert_eq!(config.smoothing_radius(), 9.0);
    }

    #[test]
    fn test_nan_color_falls_back_to_white() {
        let config = SimulationConfig {
            color: Vec4::new(0.2, f32::NAN, 0.4, 1.0),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.color, Vec4::ONE);

        let config = SimulationConfig {
            color: Vec4::new(2.0, -1.0, 0.5, 1.0),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.color, Vec4::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn test_garbage_values_are_clamped() {
        let mut config = SimulationConfig::default();
        config.damping = 3.0;
        config.bounce = -1.0;
        config.max_speed = f32::NAN;
        config.heat.dead_zone = 0.9;
        config.fluid.smoothing_radius = Some(-4.0);
        config.max_particles = 10_000_000;
        config.initial_particles = 20_000_000;
        config.bounds.width = 0.0;

        let config = config.sanitized();
        assert_eq!(config.damping, 1.0);
        assert_eq!(config.bounce, 0.0);
        assert_eq!(config.max_speed, 1.0);
        assert_eq!(config.heat.dead_zone, 0.5);
        assert_eq!(config.smoothing_radius(), 16.0);
        assert_eq!(config.max_particles, PARTICLE_LIMIT);
        assert_eq!(config.initial_particles, PARTICLE_LIMIT);
        assert_eq!(config.bounds.width, 1.0);
    }

    #[test]
    fn test_bounds_helpers() {
        let bounds = Bounds::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bounds.right(), 110.0);
        assert_eq!(bounds.bottom(), 70.0);
        assert_eq!(bounds.center(), Vec2::new(60.0, 45.0));
        assert_eq!(bounds.normalized_depth(20.0), 0.0);
        assert_eq!(bounds.normalized_depth(70.0), 1.0);
        assert_eq!(bounds.normalized_depth(500.0), 1.0);
    }
}

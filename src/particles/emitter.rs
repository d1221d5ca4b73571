//! 粒子发射器
//!
//! 发射器只是一个声明式的生成模板加一个计时器：它不持有粒子，
//! 只负责初始化系统交给它的记录。

use crate::particles::particle::{FluidState, Particle, ParticleShape};
use glam::{Vec3, Vec4};
use rand::Rng;
use std::ops::Range;

/// 粒子发射器
#[derive(Debug, Clone)]
pub struct Emitter {
    /// 发射中心
    pub position: Vec3,
    /// 每个轴上的位置随机范围（±spread）
    pub position_spread: Vec3,
    /// 初始速度
    pub velocity: Vec3,
    /// 每个轴上的速度随机范围（±spread）
    pub velocity_spread: Vec3,
    /// 粒子生命周期范围（秒）
    pub lifetime: Range<f32>,
    /// 初始大小范围
    pub size: Range<f32>,
    /// 基础颜色（按值复制到每个粒子）
    pub color: Vec4,
    pub shape: ParticleShape,
    /// 每秒发射数量
    pub rate: f32,
    /// 发射持续时间（None = 无限）
    pub duration: Option<f32>,
    /// 一次性爆发的粒子数
    pub burst: Option<u32>,
    /// 新粒子的流体扩展字段
    pub fluid: FluidState,
    /// 是否启用
    pub enabled: bool,
    timer: f32,
    elapsed_time: f32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            position_spread: Vec3::ZERO,
            velocity: Vec3::ZERO,
            velocity_spread: Vec3::ZERO,
            lifetime: 1.0..3.0,
            size: 2.0..4.0,
            color: Vec4::ONE,
            shape: ParticleShape::Circle,
            rate: 10.0,
            duration: None,
            burst: None,
            fluid: FluidState::default(),
            enabled: true,
            timer: 0.0,
            elapsed_time: 0.0,
        }
    }
}

impl Emitter {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// 只在第一次 `update` 时发射 `count` 个粒子
    pub fn burst(position: Vec3, count: u32) -> Self {
        Self {
            position,
            rate: 0.0,
            burst: Some(count),
            ..Default::default()
        }
    }

    /// 设置发射速率，负值按 0 处理
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
        self
    }

    /// 设置生命周期
    pub fn with_lifetime(mut self, min: f32, max: f32) -> Self {
        self.lifetime = ordered(min.max(0.0), max.max(0.0));
        self
    }

    /// 设置大小
    pub fn with_size(mut self, min: f32, max: f32) -> Self {
        self.size = ordered(min.max(0.0), max.max(0.0));
        self
    }

    /// 设置初始速度
    pub fn with_velocity(mut self, velocity: Vec3, spread: Vec3) -> Self {
        self.velocity = velocity;
        self.velocity_spread = spread.abs();
        self
    }

    /// 设置位置随机范围
    pub fn with_spread(mut self, spread: Vec3) -> Self {
        self.position_spread = spread.abs();
        self
    }

    /// 设置颜色
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// 设置形状
    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }

    /// 设置持续时间
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration.max(0.0));
        self
    }

    /// 设置流体扩展字段
    pub fn with_fluid(mut self, fluid: FluidState) -> Self {
        self.fluid = fluid;
        self
    }

    /// 计算本帧应发射的粒子数
    ///
    /// 计时器每累计满一个 `1 / rate` 间隔发射一个粒子，余量保留到下一帧。
    /// 计时器始终落在 `[0, 1 / rate)` 内，极高的发射率也只做常数次运算。
    pub fn update(&mut self, delta_time: f32) -> u32 {
        if !self.enabled {
            return 0;
        }

        if let Some(count) = self.burst.take() {
            self.enabled = false;
            return count;
        }

        if let Some(duration) = self.duration {
            if self.elapsed_time >= duration {
                self.enabled = false;
                return 0;
            }
        }
        self.elapsed_time += delta_time;

        if self.rate.is_nan() || self.rate <= 0.0 {
            return 0;
        }

        let interval = 1.0 / self.rate;
        self.timer += delta_time;
        if self.timer < interval {
            return 0;
        }

        // 整数部分一次算出；f32 -> u32 的 `as` 转换饱和
        let whole = (self.timer / interval).floor().max(1.0);
        let remainder = self.timer - whole * interval;
        self.timer = if (0.0..interval).contains(&remainder) {
            remainder
        } else {
            0.0
        };
        whole as u32
    }

    /// 用模板初始化一个粒子
    pub fn initialize<R: Rng + ?Sized>(&self, particle: &mut Particle, rng: &mut R) {
        particle.position = self.position + self.position_spread * unit_jitter(rng);
        particle.velocity = self.velocity + self.velocity_spread * unit_jitter(rng);
        particle.lifetime = sample_range(rng, &self.lifetime);
        particle.size = sample_range(rng, &self.size);
        particle.start_size = particle.size;
        particle.color = self.color;
        particle.start_color = self.color;
        particle.shape = self.shape;
        particle.fluid = self.fluid;
        particle.age = 0.0;
        particle.alive = true;
    }

    /// 重置发射器
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.elapsed_time = 0.0;
        self.enabled = true;
    }

    /// 累积的未发射时间
    pub fn timer(&self) -> f32 {
        self.timer
    }
}

fn ordered(a: f32, b: f32) -> Range<f32> {
    if a <= b {
        a..b
    } else {
        b..a
    }
}

/// 每轴独立的 U(-1, 1)
fn unit_jitter<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    )
}

/// 区间采样，退化区间（min >= max）直接返回下界
pub(crate) fn sample_range<R: Rng + ?Sized>(rng: &mut R, range: &Range<f32>) -> f32 {
    if range.end > range.start {
        rng.gen_range(range.start..=range.end)
    } else {
        range.start
    }
}

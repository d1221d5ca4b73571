//! 粒子记录
//!
//! 纯数据结构，只包含数值状态；渲染层只读取位置、尺寸、颜色和形状。

use crate::particles::pool::Resettable;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// 粒子形状标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleShape {
    #[default]
    Circle,
    Square,
    Triangle,
}

impl ParticleShape {
    /// 渲染层使用的数值 ID
    pub fn id(self) -> u32 {
        match self {
            Self::Circle => 0,
            Self::Square => 1,
            Self::Triangle => 2,
        }
    }
}

/// 流体模拟使用的每粒子扩展字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidState {
    /// 质量
    pub mass: f32,
    /// 温度（0 = 冷，1 = 热）
    pub temperature: f32,
}

impl Default for FluidState {
    fn default() -> Self {
        Self {
            mass: 1.0,
            temperature: 0.5,
        }
    }
}

/// 粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    /// 发射时的尺寸，供缩小/尺寸曲线使用
    pub start_size: f32,
    pub color: Vec4,
    /// 发射时的颜色，供淡出使用
    pub start_color: Vec4,
    pub shape: ParticleShape,
    pub age: f32,
    pub lifetime: f32,
    pub alive: bool,
    pub fluid: FluidState,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            size: 1.0,
            start_size: 1.0,
            color: Vec4::ONE,
            start_color: Vec4::ONE,
            shape: ParticleShape::Circle,
            age: 0.0,
            lifetime: 0.0,
            alive: false,
            fluid: FluidState::default(),
        }
    }
}

impl Particle {
    /// 归一化年龄（0..1），无限寿命时为 0
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime.is_finite() && self.lifetime > 0.0 {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// 当前速度大小
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// 标记死亡，交由系统在本帧末回收
    pub fn kill(&mut self) {
        self.alive = false;
    }
}

impl Resettable for Particle {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

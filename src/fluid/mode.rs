//! 液体/气体模式混合
//!
//! 单个标量 `mix ∈ [0, 1]`（0 = 液体，1 = 气体）每帧向目标插值，
//! 切换模式不会产生突变。

use crate::core::error::SimError;
use std::fmt;
use std::str::FromStr;

/// 低于该值只计算液体力
pub const LIQUID_THRESHOLD: f32 = 0.01;
/// 高于该值只计算气体力
pub const GAS_THRESHOLD: f32 = 0.95;
/// 高于该值启用额外的气体排斥
pub const GAS_DOMINANT: f32 = 0.5;

const SNAP_EPSILON: f32 = 1.0e-4;

/// 当前物理模式（由混合值推断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsMode {
    Liquid,
    Gas,
    Blending,
}

impl fmt::Display for PhysicsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Liquid => "liquid",
            Self::Gas => "gas",
            Self::Blending => "blending",
        };
        f.write_str(name)
    }
}

/// 模式目标
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeTarget {
    Liquid,
    Gas,
    /// 任意混合值，钳制到 [0, 1]
    Blend(f32),
}

impl ModeTarget {
    pub fn value(self) -> f32 {
        match self {
            Self::Liquid => 0.0,
            Self::Gas => 1.0,
            Self::Blend(mix) if mix.is_nan() => 0.0,
            Self::Blend(mix) => mix.clamp(0.0, 1.0),
        }
    }
}

impl FromStr for ModeTarget {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "liquid" => Ok(Self::Liquid),
            "gas" => Ok(Self::Gas),
            other => match other.parse::<f32>() {
                Ok(mix) if (0.0..=1.0).contains(&mix) => Ok(Self::Blend(mix)),
                _ => Err(SimError::UnknownMode(trimmed.to_string())),
            },
        }
    }
}

/// 模式混合状态
#[derive(Debug, Clone)]
pub struct ModeBlend {
    mix: f32,
    target: f32,
    lerp_speed: f32,
}

impl ModeBlend {
    pub fn new(lerp_speed: f32) -> Self {
        Self {
            mix: 0.0,
            target: 0.0,
            lerp_speed,
        }
    }

    /// 设置目标，`instant` 时立即到位
    pub fn set_target(&mut self, target: ModeTarget, instant: bool) {
        self.target = target.value();
        if instant {
            self.mix = self.target;
        }
    }

    /// 向目标插值一步，不会越过目标
    pub fn advance(&mut self, dt: f32) {
        let diff = self.target - self.mix;
        if diff.abs() < SNAP_EPSILON {
            self.mix = self.target;
            return;
        }
        let factor = (dt * self.lerp_speed).clamp(0.0, 1.0);
        self.mix = (self.mix + diff * factor).clamp(0.0, 1.0);
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn mode(&self) -> PhysicsMode {
        if self.mix < LIQUID_THRESHOLD {
            PhysicsMode::Liquid
        } else if self.mix > GAS_THRESHOLD {
            PhysicsMode::Gas
        } else {
            PhysicsMode::Blending
        }
    }

    pub fn is_liquid_only(&self) -> bool {
        self.mix < LIQUID_THRESHOLD
    }

    pub fn is_gas_only(&self) -> bool {
        self.mix > GAS_THRESHOLD
    }

    pub fn is_gas_dominant(&self) -> bool {
        self.mix > GAS_DOMINANT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("liquid".parse::<ModeTarget>().unwrap(), ModeTarget::Liquid);
        assert_eq!(" GAS ".parse::<ModeTarget>().unwrap(), ModeTarget::Gas);
        assert_eq!("0.25".parse::<ModeTarget>().unwrap(), ModeTarget::Blend(0.25));
        assert!(matches!(
            "plasma".parse::<ModeTarget>(),
            Err(SimError::UnknownMode(_))
        ));
        assert!("1.5".parse::<ModeTarget>().is_err());
    }

    #[test]
    fn test_instant_switch() {
        let mut blend = ModeBlend::new(2.0);
        blend.set_target(ModeTarget::Gas, true);
        assert_eq!(blend.mix(), 1.0);
        assert_eq!(blend.mode(), PhysicsMode::Gas);
    }

    #[test]
    fn test_eased_switch_reports_blending() {
        let mut blend = ModeBlend::new(2.0);
        blend.set_target(ModeTarget::Gas, false);
        assert_eq!(blend.mode(), PhysicsMode::Liquid);

        blend.advance(0.1);
        assert!((blend.mix() - 0.2).abs() < 1e-6);
        assert_eq!(blend.mode(), PhysicsMode::Blending);

        for _ in 0..200 {
            blend.advance(1.0 / 30.0);
        }
        assert_eq!(blend.mix(), 1.0);
    }

    #[test]
    fn test_blend_target_is_clamped() {
        assert_eq!(ModeTarget::Blend(3.0).value(), 1.0);
        assert_eq!(ModeTarget::Blend(-1.0).value(), 0.0);
        assert_eq!(ModeTarget::Blend(f32::NAN).value(), 0.0);
    }
}

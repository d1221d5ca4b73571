//! 容器晃动（雪花球效果）
//!
//! 宿主每帧提供一次容器原点位置；由相邻两帧位置求出容器速度，
//! 粒子受到与之相反的惯性力，经指数平滑并限幅。没有采样时力逐渐衰减为 0。

use crate::config::ShakeConfig;
use crate::fluid::kernels::cap_length;
use glam::Vec2;
use std::collections::VecDeque;

/// 低于该值的平滑力视为 0
const REST_FORCE: f32 = 1.0e-3;

/// 外部扰动源（例如窗口在屏幕上的位置）
pub trait PerturbationSource {
    /// 每帧读取一次，None 表示没有可用信号
    fn sample(&mut self) -> Option<Vec2>;
}

/// 永远没有信号
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPerturbation;

impl PerturbationSource for NoPerturbation {
    fn sample(&mut self) -> Option<Vec2> {
        None
    }
}

/// 预先录制的位置序列，读完后没有信号
#[derive(Debug, Clone, Default)]
pub struct ScriptedPerturbation {
    samples: VecDeque<Vec2>,
}

impl ScriptedPerturbation {
    pub fn new<I: IntoIterator<Item = Vec2>>(samples: I) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn push(&mut self, sample: Vec2) {
        self.samples.push_back(sample);
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl PerturbationSource for ScriptedPerturbation {
    fn sample(&mut self) -> Option<Vec2> {
        self.samples.pop_front()
    }
}

/// 晃动跟踪器
#[derive(Debug, Clone, Default)]
pub struct ShakeTracker {
    last_position: Option<Vec2>,
    force: Vec2,
}

impl ShakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入本帧采样，返回作用于每个粒子的力
    pub fn update(&mut self, sample: Option<Vec2>, dt: f32, config: &ShakeConfig) -> Vec2 {
        if !config.enabled {
            self.reset();
            return Vec2::ZERO;
        }

        let target = match (sample, self.last_position) {
            (Some(current), Some(previous)) if dt > 0.0 => {
                let container_velocity = (current - previous) / dt;
                -container_velocity * config.sensitivity
            }
            _ => Vec2::ZERO,
        };
        self.last_position = sample;

        let smoothed = self.force * config.damping + target * (1.0 - config.damping);
        self.force = cap_length(smoothed, config.max_force);
        if self.force.length_squared() < REST_FORCE * REST_FORCE {
            self.force = Vec2::ZERO;
        }
        self.force
    }

    /// 当前平滑后的力
    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub fn reset(&mut self) {
        self.last_position = None;
        self.force = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ShakeConfig {
        ShakeConfig {
            enabled: true,
            sensitivity: 1.0,
            max_force: 1000.0,
            damping: 0.5,
        }
    }

    #[test]
    fn test_no_signal_is_inert() {
        let mut tracker = ShakeTracker::new();
        let mut source = NoPerturbation;
        for _ in 0..10 {
            assert_eq!(tracker.update(source.sample(), 1.0 / 60.0, &config()), Vec2::ZERO);
        }
    }

    #[test]
    fn test_force_opposes_container_motion() {
        let mut tracker = ShakeTracker::new();
        let cfg = config();
        assert_eq!(tracker.update(Some(Vec2::ZERO), 0.1, &cfg), Vec2::ZERO);

        // 容器以 10 px/s 向右移动
        let force = tracker.update(Some(Vec2::new(1.0, 0.0)), 0.1, &cfg);
        assert!((force.x + 5.0).abs() < 1e-4);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn test_force_is_capped() {
        let mut tracker = ShakeTracker::new();
        let mut cfg = config();
        cfg.max_force = 2.0;
        cfg.damping = 0.0;
        tracker.update(Some(Vec2::ZERO), 0.01, &cfg);
        let force = tracker.update(Some(Vec2::new(500.0, 0.0)), 0.01, &cfg);
        assert!((force.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_stale_signal_decays_to_zero() {
        let mut tracker = ShakeTracker::new();
        let cfg = config();
        let mut source = ScriptedPerturbation::new([Vec2::ZERO, Vec2::new(5.0, 5.0)]);
        for _ in 0..2 {
            tracker.update(source.sample(), 0.1, &cfg);
        }
        assert!(tracker.force().length() > 0.0);
        assert_eq!(source.remaining(), 0);

        for _ in 0..64 {
            tracker.update(source.sample(), 0.1, &cfg);
        }
        assert_eq!(tracker.force(), Vec2::ZERO);
    }

    #[test]
    fn test_disabled_resets() {
        let mut tracker = ShakeTracker::new();
        let mut cfg = config();
        tracker.update(Some(Vec2::ZERO), 0.1, &cfg);
        tracker.update(Some(Vec2::new(3.0, 0.0)), 0.1, &cfg);
        cfg.enabled = false;
        assert_eq!(tracker.update(Some(Vec2::new(6.0, 0.0)), 0.1, &cfg), Vec2::ZERO);
        assert_eq!(tracker.force(), Vec2::ZERO);
    }
}

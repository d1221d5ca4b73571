//! 粒子更新器
//!
//! 更新器是固定种类的枚举，按系统中的顺序逐个作用于每个存活粒子。

use crate::config::Bounds;
use crate::particles::particle::Particle;
use glam::Vec4;

// ============================================================================
// 颜色渐变
// ============================================================================

/// 颜色停止点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// 时间点（0-1）
    pub time: f32,
    /// 颜色
    pub color: Vec4,
}

/// 颜色渐变
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGradient {
    /// 颜色停止点（按时间排序）
    pub stops: Vec<ColorStop>,
}

impl ColorGradient {
    pub fn new() -> Self {
        Self { stops: Vec::new() }
    }

    pub fn add_stop(mut self, time: f32, color: Vec4) -> Self {
        self.stops.push(ColorStop {
            time: time.clamp(0.0, 1.0),
            color,
        });
        self.stops.sort_by(|a, b| a.time.total_cmp(&b.time));
        self
    }

    /// 采样颜色
    pub fn sample(&self, t: f32) -> Vec4 {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec4::ONE,
        };

        let t = t.clamp(0.0, 1.0);
        if t <= first.time {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.time && t <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.time) / span);
            }
        }

        last.color
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::new()
            .add_stop(0.0, Vec4::new(1.0, 1.0, 1.0, 1.0))
            .add_stop(1.0, Vec4::new(1.0, 1.0, 1.0, 0.0))
    }
}

// ============================================================================
// 大小随生命周期
// ============================================================================

/// 大小曲线类型（返回值是初始大小的倍数）
#[derive(Debug, Clone, PartialEq)]
pub enum SizeOverLifetime {
    /// 线性变化
    Linear { start: f32, end: f32 },
    /// 分段线性曲线，点按时间排序
    Curve { points: Vec<(f32, f32)> },
}

impl SizeOverLifetime {
    /// 采样大小
    pub fn sample(&self, t: f32) -> f32 {
        match self {
            Self::Linear { start, end } => start + (end - start) * t.clamp(0.0, 1.0),
            Self::Curve { points } => sample_curve(points, t),
        }
    }
}

/// 曲线采样
fn sample_curve(points: &[(f32, f32)], t: f32) -> f32 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return 1.0,
    };

    let t = t.clamp(0.0, 1.0);
    if t <= first.0 {
        return first.1;
    }

    for pair in points.windows(2) {
        let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
        if t >= t0 && t <= t1 {
            if t1 - t0 <= f32::EPSILON {
                return v1;
            }
            let local_t = (t - t0) / (t1 - t0);
            return v0 + (v1 - v0) * local_t;
        }
    }

    last.1
}

// ============================================================================
// 更新器
// ============================================================================

/// 更新器执行时可见的系统状态
#[derive(Debug, Clone, Copy)]
pub struct SystemView {
    /// 本帧时间步长（已钳制）
    pub dt: f32,
    /// 硬边界，None 时 `Contain` 不起作用
    pub bounds: Option<Bounds>,
    /// 撞墙反弹系数
    pub bounce: f32,
}

/// 更新器种类
#[derive(Debug, Clone, PartialEq)]
pub enum Updater {
    /// 位置 += 速度 * dt
    Velocity,
    /// 年龄增长，到达寿命即死亡
    Lifetime,
    /// 透明度随生命周期线性减至 0
    Fade,
    /// 尺寸随生命周期线性减至 0
    Shrink,
    /// 按渐变设置颜色
    ColorOverLife(ColorGradient),
    /// 按曲线缩放初始尺寸
    SizeOverLife(SizeOverLifetime),
    /// 硬边界钳制，越界的速度分量反向并乘以反弹系数
    Contain,
}

impl Updater {
    #[inline]
    pub fn apply(&self, particle: &mut Particle, view: &SystemView) {
        match self {
            Self::Velocity => {
                particle.position += particle.velocity * view.dt;
            }
            Self::Lifetime => {
                particle.age += view.dt;
                if particle.age >= particle.lifetime {
                    particle.age = particle.lifetime;
                    particle.alive = false;
                }
            }
            Self::Fade => {
                let t = particle.life_fraction();
                particle.color.w = particle.start_color.w * (1.0 - t);
            }
            Self::Shrink => {
                let t = particle.life_fraction();
                particle.size = particle.start_size * (1.0 - t);
            }
            Self::ColorOverLife(gradient) => {
                particle.color = gradient.sample(particle.life_fraction());
            }
            Self::SizeOverLife(curve) => {
                particle.size = particle.start_size * curve.sample(particle.life_fraction());
            }
            Self::Contain => {
                if let Some(bounds) = view.bounds {
                    contain(particle, &bounds, view.bounce);
                }
            }
        }
    }
}

/// 把粒子限制在矩形内（`size` 即粒子半径，用作边距）
pub fn contain(particle: &mut Particle, bounds: &Bounds, bounce: f32) {
    let radius = particle.size.min(bounds.width * 0.5).min(bounds.height * 0.5);
    let (min_x, max_x) = (bounds.left() + radius, bounds.right() - radius);
    let (min_y, max_y) = (bounds.top() + radius, bounds.bottom() - radius);

    if particle.position.x < min_x {
        particle.position.x = min_x;
        if particle.velocity.x < 0.0 {
            particle.velocity.x = -particle.velocity.x * bounce;
        }
    } else if particle.position.x > max_x {
        particle.position.x = max_x;
        if particle.velocity.x > 0.0 {
            particle.velocity.x = -particle.velocity.x * bounce;
        }
    }

    if particle.position.y < min_y {
        particle.position.y = min_y;
        if particle.velocity.y < 0.0 {
            particle.velocity.y = -particle.velocity.y * bounce;
        }
    } else if particle.position.y > max_y {
        particle.position.y = max_y;
        if particle.velocity.y > 0.0 {
            particle.velocity.y = -particle.velocity.y * bounce;
        }
    }
}

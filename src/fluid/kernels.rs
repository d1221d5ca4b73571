//! 平滑核与数值小工具
//!
//! 所有核都以 `q = 1 - r/h` 为自变量，r ≥ h 时为 0。

use glam::{Vec2, Vec3};

/// 小于该距离的粒子对视为重合，跳过依赖方向的项
pub const MIN_DISTANCE: f32 = 1.0e-4;

/// 线性衰减 q = 1 - r/h
#[inline]
pub fn falloff(dist: f32, radius: f32) -> f32 {
    if dist >= radius || radius <= 0.0 {
        0.0
    } else {
        1.0 - dist / radius
    }
}

/// 密度核 W = q²
#[inline]
pub fn density_kernel(q: f32) -> f32 {
    q * q
}

/// 近密度核 W = q³
#[inline]
pub fn near_density_kernel(q: f32) -> f32 {
    q * q * q
}

/// 三次衰减 (1 - r/h)³
#[inline]
pub fn cubic_falloff(dist: f32, radius: f32) -> f32 {
    let q = falloff(dist, radius);
    q * q * q
}

/// Hermite 平滑阶跃，e0 == e1 时退化为阶跃函数
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 按比例缩放到最大长度，保持方向
#[inline]
pub fn cap_length(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// 平面位置
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff() {
        assert_eq!(falloff(0.0, 10.0), 1.0);
        assert_eq!(falloff(5.0, 10.0), 0.5);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        assert_eq!(falloff(12.0, 10.0), 0.0);
        assert_eq!(falloff(1.0, 0.0), 0.0);
        assert!((cubic_falloff(5.0, 10.0) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
    }

    #[test]
    fn test_cap_length_preserves_direction() {
        let v = Vec2::new(30.0, 40.0);
        let capped = cap_length(v, 5.0);
        assert!((capped.length() - 5.0).abs() < 1e-4);
        assert!((capped.normalize() - v.normalize()).length() < 1e-6);
        assert_eq!(cap_length(v, 100.0), v);
    }
}

//! 热对流
//!
//! 温度场由垂直位置推出：底部热区趋向 1，顶部冷区趋向 0，其余趋向中性温度，
//! 区域边界用平滑阶跃过渡。粒子温度按 `rate` 向目标积分并钳制在 [0, 1]。
//! 超出中性温度死区的部分产生上浮（热）或下沉（冷）力。

use crate::config::{Bounds, HeatConfig};
use crate::fluid::kernels::smoothstep;
use crate::particles::Particle;
use glam::Vec2;

/// 给定归一化深度（0 = 顶部，1 = 底部）的目标温度
pub fn zone_target(depth: f32, heat: &HeatConfig) -> f32 {
    let half = heat.transition_width * 0.5;

    let hot = if heat.heat_zone > 0.0 {
        let edge = 1.0 - heat.heat_zone;
        smoothstep(edge - half, edge + half, depth)
    } else {
        0.0
    };
    let cold = if heat.cool_zone > 0.0 {
        1.0 - smoothstep(heat.cool_zone - half, heat.cool_zone + half, depth)
    } else {
        0.0
    };

    let neutral = heat.neutral_temp;
    (neutral + hot * (1.0 - neutral) - cold * neutral).clamp(0.0, 1.0)
}

/// 将粒子温度向所在区域的目标积分一步
///
/// `heat.rate` 是每秒速率，单步混合系数为 `rate * dt`，钳制到 [0, 1]。
pub fn update_temperature(particle: &mut Particle, bounds: &Bounds, heat: &HeatConfig, dt: f32) {
    let target = zone_target(bounds.normalized_depth(particle.position.y), heat);
    let blend = (heat.rate * dt).clamp(0.0, 1.0);
    let temperature = particle.fluid.temperature;
    particle.fluid.temperature = (temperature + (target - temperature) * blend).clamp(0.0, 1.0);
}

/// 对流力（+Y 向下，热粒子得到负 Y）
pub fn convection_force(temperature: f32, heat: &HeatConfig) -> Vec2 {
    let excess = temperature - heat.neutral_temp;
    if excess > heat.dead_zone {
        Vec2::new(0.0, -(excess - heat.dead_zone) * heat.buoyancy)
    } else if excess < -heat.dead_zone {
        Vec2::new(0.0, (-excess - heat.dead_zone) * heat.sinking)
    } else {
        Vec2::ZERO
    }
}

/// 更新所有粒子温度并累加对流力
pub fn accumulate(
    particles: &mut [Particle],
    bounds: &Bounds,
    heat: &HeatConfig,
    dt: f32,
    out: &mut [Vec2],
) {
    for (particle, force) in particles.iter_mut().zip(out.iter_mut()) {
        update_temperature(particle, bounds, heat, dt);
        *force += convection_force(particle.fluid.temperature, heat);
    }
}

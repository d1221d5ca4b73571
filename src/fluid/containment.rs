//! 碰撞分离与软边界
//!
//! 两者都只写入力累加器；硬边界钳制由 `Updater::Contain` 在位置积分后完成。

use crate::config::Bounds;
use crate::fluid::kernels::{planar, MIN_DISTANCE};
use crate::particles::Particle;
use glam::Vec2;

/// 圆形碰撞分离，以粒子 `size` 作为半径
///
/// 重叠量乘以强度，等大反向作用于两个粒子。完全重合的粒子沿 X 轴分开。
pub fn apply_collisions(particles: &[Particle], strength: f32, out: &mut [Vec2]) {
    let n = particles.len();
    for i in 0..n {
        let pi = planar(particles[i].position);
        let ri = particles[i].size;
        for j in (i + 1)..n {
            let min_dist = ri + particles[j].size;
            let delta = pi - planar(particles[j].position);
            let dist_sq = delta.length_squared();
            if dist_sq >= min_dist * min_dist {
                continue;
            }
            let dist = dist_sq.sqrt();
            let direction = if dist > MIN_DISTANCE {
                delta / dist
            } else {
                Vec2::X
            };
            let push = direction * ((min_dist - dist) * strength);
            out[i] += push;
            out[j] -= push;
        }
    }
}

/// 软边界：距墙 `radius` 以内按 `(1 - d/r)²` 向内推
pub fn apply_boundary_forces(
    particles: &[Particle],
    bounds: &Bounds,
    radius: f32,
    strength: f32,
    out: &mut [Vec2],
) {
    if radius <= 0.0 {
        return;
    }
    let push = |dist: f32| -> f32 {
        if dist >= radius {
            0.0
        } else {
            let q = 1.0 - dist.max(0.0) / radius;
            strength * q * q
        }
    };

    for (particle, force) in particles.iter().zip(out.iter_mut()) {
        let p = particle.position;
        force.x += push(p.x - bounds.left());
        force.x -= push(bounds.right() - p.x);
        force.y += push(p.y - bounds.top());
        force.y -= push(bounds.bottom() - p.y);
    }
}

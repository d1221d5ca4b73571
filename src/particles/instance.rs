//! 渲染层使用的粒子实例数据

use crate::particles::particle::Particle;

/// 粒子实例（对应着色器中的实例属性）
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// 位置
    pub position: [f32; 3],
    /// 大小
    pub size: f32,
    /// 颜色
    pub color: [f32; 4],
    /// 形状 ID（见 `ParticleShape::id`）
    pub shape: u32,
    pub _padding: [u32; 3],
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            size: particle.size,
            color: particle.color.to_array(),
            shape: particle.shape.id(),
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleShape;
    use glam::Vec3;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 48);
    }

    #[test]
    fn test_instance_from_particle() {
        let particle = Particle {
            position: Vec3::new(1.0, 2.0, 3.0),
            size: 5.0,
            shape: ParticleShape::Triangle,
            ..Default::default()
        };
        let instance = ParticleInstance::from(&particle);
        assert_eq!(instance.position, [1.0, 2.0, 3.0]);
        assert_eq!(instance.size, 5.0);
        assert_eq!(instance.shape, 2);

        let bytes: &[u8] = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), 48);
    }
}

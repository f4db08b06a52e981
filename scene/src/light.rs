//! 光源モデルを定義するモジュール。

use math::{Point3, Ray, World};
use rand::Rng;

use crate::geometry::Geometry;

/// 光源からのレイサンプリング結果。
pub struct RaySample {
    pub ray: Ray<World>,
    pub power: glam::Vec3,
    pub pdf: f32,
}

/// 光源のバリアント。
pub enum Light {
    /// 形状を包んだ面光源。
    Area {
        geometry: Box<Geometry>,
        power: glam::Vec3,
    },
    Point {
        position: Point3<World>,
        power: glam::Vec3,
    },
    DirectedPoint {
        position: Point3<World>,
        direction: glam::Vec3,
        power: glam::Vec3,
        half_angle: f32,
    },
}
impl Light {
    /// 直接光としての放射輝度。
    pub fn illumination(&self) -> glam::Vec3 {
        match self {
            Light::Area { power, .. } => *power,
            Light::Point { power, .. } => *power,
            Light::DirectedPoint { power, .. } => *power,
        }
    }

    pub fn sample_ray(&self, rng: &mut impl Rng) -> RaySample {
        match self {
            Light::Area { geometry, power } => {
                let (surface, pdf) = geometry.sample_point(rng);
                let z = surface.shading_normal.to_vec3();
                let x = math::generate_vertical(z);
                let y = z.cross(x);

                let phi_u: f32 = rng.random();
                let v: f32 = rng.random();
                let phi = 2.0 * std::f32::consts::PI * phi_u;
                let t = v.sqrt();
                let r = (1.0 - t * t).max(0.0).sqrt();
                let local = glam::vec3(r * phi.cos(), r * phi.sin(), t);
                let dir = math::local_to_world(x, y, z, local);

                RaySample {
                    ray: Ray::new(surface.position, math::Vector3::from(dir)),
                    power: t * *power,
                    pdf: pdf * t / std::f32::consts::PI,
                }
            }
            Light::Point { position, power } => {
                let phi: f32 = rng.random::<f32>() * 2.0 * std::f32::consts::PI;
                let z: f32 = rng.random::<f32>() * 2.0 - 1.0;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let dir = glam::vec3(r * phi.cos(), r * phi.sin(), z);
                RaySample {
                    ray: Ray::new(*position, math::Vector3::from(dir)),
                    power: *power,
                    pdf: 1.0 / (4.0 * std::f32::consts::PI),
                }
            }
            Light::DirectedPoint {
                position,
                direction,
                power,
                half_angle,
            } => {
                let threshold = half_angle.cos();
                let phi_u: f32 = rng.random();
                let v: f32 = rng.random();
                let phi = 2.0 * std::f32::consts::PI * phi_u;
                let t = (1.0 - threshold) * v + threshold;
                let r = (1.0 - t * t).max(0.0).sqrt();
                let local = glam::vec3(r * phi.cos(), r * phi.sin(), t);

                let z = *direction;
                let x = math::generate_vertical(z);
                let y = z.cross(x);
                let dir = math::local_to_world(x, y, z, local);

                RaySample {
                    ray: Ray::new(*position, math::Vector3::from(dir)),
                    power: *power,
                    pdf: 1.0 / (2.0 * std::f32::consts::PI * (1.0 - threshold)),
                }
            }
        }
    }
}

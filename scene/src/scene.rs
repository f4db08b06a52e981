//! カメラとシーン全体のコンテナを定義するモジュール。

use math::{Point3, Ray, World};
use rand::Rng;

use crate::geometry::Geometry;
use crate::hit::Hit;
use crate::light::Light;
use crate::material::Material;

/// カメラのバリアント。
///
/// 両方とも正規直交基底`(horizontal, up, direction)`を
/// `direction = normalize(direction)`, `horizontal = normalize(direction × up_input)`,
/// `up = normalize(horizontal × direction)`の順に構築する不変条件を持つ。
pub enum Camera {
    Perspective {
        center: Point3<World>,
        direction: glam::Vec3,
        up: glam::Vec3,
        horizontal: glam::Vec3,
        width: u32,
        height: u32,
        fx: f32,
        fy: f32,
        gamma: f32,
    },
    ThinLens {
        center: Point3<World>,
        direction: glam::Vec3,
        up: glam::Vec3,
        horizontal: glam::Vec3,
        width: u32,
        height: u32,
        fx: f32,
        fy: f32,
        aperture: f32,
        focal_length: f32,
        gamma: f32,
    },
}
impl Camera {
    /// ピンホール（透視投影）カメラを作成する。`angle`は縦方向の画角（ラジアン）。
    pub fn perspective(
        center: Point3<World>,
        direction: glam::Vec3,
        up_input: glam::Vec3,
        width: u32,
        height: u32,
        angle: f32,
        gamma: f32,
    ) -> Self {
        let direction = direction.normalize();
        let horizontal = direction.cross(up_input).normalize();
        let up = horizontal.cross(direction).normalize();
        let fy = height as f32 / (2.0 * (angle / 2.0).tan());
        let fx = fy;
        Camera::Perspective {
            center,
            direction,
            up,
            horizontal,
            width,
            height,
            fx,
            fy,
            gamma,
        }
    }

    /// 薄レンズカメラを作成する。
    pub fn thin_lens(
        center: Point3<World>,
        direction: glam::Vec3,
        up_input: glam::Vec3,
        width: u32,
        height: u32,
        angle: f32,
        aperture: f32,
        focal_length: f32,
        gamma: f32,
    ) -> Self {
        let direction = direction.normalize();
        let horizontal = direction.cross(up_input).normalize();
        let up = horizontal.cross(direction).normalize();
        let fy = height as f32 / (2.0 * (angle / 2.0).tan());
        let fx = fy;
        Camera::ThinLens {
            center,
            direction,
            up,
            horizontal,
            width,
            height,
            fx,
            fy,
            aperture,
            focal_length,
            gamma,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Camera::Perspective { width, .. } => *width,
            Camera::ThinLens { width, .. } => *width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Camera::Perspective { height, .. } => *height,
            Camera::ThinLens { height, .. } => *height,
        }
    }

    pub fn gamma(&self) -> f32 {
        match self {
            Camera::Perspective { gamma, .. } => *gamma,
            Camera::ThinLens { gamma, .. } => *gamma,
        }
    }

    /// ピクセル(x,y)に対応するレイをサンプルする。x,yはジッタで小数値を取りうる。
    pub fn sample_ray(&self, x: u32, y: u32, rng: &mut impl Rng) -> Ray<World> {
        match self {
            Camera::Perspective {
                center,
                direction,
                up,
                horizontal,
                width,
                height,
                fx,
                fy,
                ..
            } => {
                let dir = pixel_direction(x, y, *width, *height, *fx, *fy, rng);
                let rot = glam::Mat3::from_cols(*horizontal, -*up, *direction);
                Ray::new(*center, math::Vector3::from(rot * dir))
            }
            Camera::ThinLens {
                center,
                direction,
                up,
                horizontal,
                width,
                height,
                fx,
                fy,
                aperture,
                focal_length,
                ..
            } => {
                let dir = pixel_direction(x, y, *width, *height, *fx, *fy, rng);
                let rot = glam::Mat3::from_cols(*horizontal, -*up, *direction);

                let (u, v) = sample_unit_disk(rng);
                let r = (u * *up + v * *horizontal) * (aperture / 2.0);

                // レンズ開口上のオフセット`r`をそのまま方向から差し引き、
                // 被写界深度の効果として`focal_length`でスケールする。
                // 正規化はしない（距離を持つ方向として扱う）。
                let final_dir = (rot * dir - r) * *focal_length;
                Ray::new(*center, math::Vector3::from(final_dir))
            }
        }
    }
}

fn pixel_direction(x: u32, y: u32, width: u32, height: u32, fx: f32, fy: f32, rng: &mut impl Rng) -> glam::Vec3 {
    let dx: f32 = rng.random::<f32>() - 0.5;
    let dy: f32 = rng.random::<f32>() - 0.5;
    let px = (x as f32 + dx - width as f32 / 2.0) / fx;
    let py = (height as f32 / 2.0 - y as f32 + dy) / fy;
    glam::vec3(px, py, 1.0).normalize()
}

fn sample_unit_disk(rng: &mut impl Rng) -> (f32, f32) {
    loop {
        let u = rng.random::<f32>() * 2.0 - 1.0;
        let v = rng.random::<f32>() * 2.0 - 1.0;
        if u * u + v * v <= 1.0 {
            return (u, v);
        }
    }
}

/// シーン全体を保持するコンテナ。
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub materials: Vec<Material>,
    pub root: Geometry,
    pub background: glam::Vec3,
    pub ambient: glam::Vec3,
}
impl Scene {
    /// レイとシーン全体(面光源の形状を含む)との交差を判定する。
    pub fn intersect(&self, ray: &Ray<World>, tmin: f32) -> Hit {
        let mut hit = Hit::miss();
        self.root.intersect(ray, &mut hit, tmin);
        for light in &self.lights {
            if let Light::Area { geometry, power } = light {
                let mut candidate = Hit::miss();
                if geometry.intersect(ray, &mut candidate, tmin) && candidate.t < hit.t {
                    candidate.light_emission = Some(*power);
                    hit = candidate;
                }
            }
        }
        hit
    }
}

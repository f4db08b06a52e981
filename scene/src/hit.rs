//! レイと形状の交差結果を表す構造体を定義するモジュール。

use math::{Normal, Point3, World};

/// 交差点の表面情報。
#[derive(Debug, Clone, Copy)]
pub struct HitSurface {
    pub position: Point3<World>,
    pub shading_normal: Normal<World>,
    pub geometric_normal: Normal<World>,
    pub uv: glam::Vec2,
    pub has_texture: bool,
}
impl HitSurface {
    /// シェーディング法線と幾何法線が同一のHitSurfaceを作成する。
    pub fn new(position: Point3<World>, normal: Normal<World>) -> Self {
        Self {
            position,
            shading_normal: normal,
            geometric_normal: normal,
            uv: glam::Vec2::ZERO,
            has_texture: false,
        }
    }
}

/// レイと形状群との交差を蓄積する構造体。
///
/// `t = +∞`で初期化し、`tmin <= t < hit.t`を満たすより近い交差が見つかったときのみ更新する。
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    pub material_index: Option<usize>,
    pub surface: HitSurface,
    /// この交差点が面光源の形状上にあるときの放射輝度。
    pub light_emission: Option<glam::Vec3>,
}
impl Hit {
    /// 無限遠で初期化されたHitを作成する。
    pub fn miss() -> Self {
        Self {
            t: f32::INFINITY,
            material_index: None,
            surface: HitSurface::new(Point3::ZERO, Normal::new(0.0, 0.0, 1.0)),
            light_emission: None,
        }
    }

    /// tmin <= new_t < self.tのときだけ交差情報を更新し、trueを返す。
    pub fn update(&mut self, new_t: f32, tmin: f32, material_index: usize, surface: HitSurface) -> bool {
        if new_t >= tmin && new_t < self.t {
            self.t = new_t;
            self.material_index = Some(material_index);
            self.surface = surface;
            self.light_emission = None;
            true
        } else {
            false
        }
    }

    pub fn is_hit(&self) -> bool {
        self.t.is_finite()
    }
}

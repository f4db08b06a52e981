//! NaNを発生させない数学関数を定義するモジュール。

/// 定義域外の値を与えてもNaNを返さないacos関数の実装トレイト。
pub trait SafeAcos {
    fn safe_acos(self) -> f32;
}
impl SafeAcos for f32 {
    #[inline(always)]
    fn safe_acos(self) -> f32 {
        if self < -1.0 {
            -std::f32::consts::PI
        } else if self > 1.0 {
            std::f32::consts::PI
        } else {
            self.acos()
        }
    }
}

/// 入射方向`i`を法線`n`で鏡面反射させた方向を返す。
#[inline(always)]
pub fn reflect(i: glam::Vec3, n: glam::Vec3) -> glam::Vec3 {
    -i + 2.0 * i.dot(n) * n
}

/// 入射方向`i`を法線`n`越しに屈折させた方向を返す。
///
/// 全反射が起きる場合はゼロベクトルを返す。`n_in`/`n_out`はそれぞれ入射側・出射側の屈折率。
#[inline(always)]
pub fn refract(i: glam::Vec3, n: glam::Vec3, n_in: f32, n_out: f32) -> glam::Vec3 {
    let mu = n_in / n_out;
    let x = i.dot(n);
    debug_assert!(x >= 0.0);

    if mu * mu * (1.0 - x * x) >= 1.0 {
        glam::Vec3::ZERO
    } else {
        mu * (n * x - i) - (1.0 - mu * mu * (1.0 - x * x)).sqrt() * n
    }
}

/// `v`の絶対値が最も小さい成分をゼロにすることで`v`に垂直な単位ベクトルを作る。
#[inline(always)]
pub fn generate_vertical(v: glam::Vec3) -> glam::Vec3 {
    if v.x.abs() <= v.y.abs() && v.x.abs() <= v.z.abs() {
        glam::vec3(0.0, v.z, -v.y).normalize()
    } else if v.y.abs() <= v.x.abs() && v.y.abs() <= v.z.abs() {
        glam::vec3(v.z, 0.0, -v.x).normalize()
    } else {
        glam::vec3(v.y, -v.x, 0.0).normalize()
    }
}

/// 正規直交基底`(x,y,z)`を使ってワールド座標のベクトルをローカル座標に変換する。
#[inline(always)]
pub fn world_to_local(x: glam::Vec3, y: glam::Vec3, z: glam::Vec3, world: glam::Vec3) -> glam::Vec3 {
    glam::vec3(world.dot(x), world.dot(y), world.dot(z))
}

/// 正規直交基底`(x,y,z)`を使ってローカル座標のベクトルをワールド座標に変換する。
#[inline(always)]
pub fn local_to_world(x: glam::Vec3, y: glam::Vec3, z: glam::Vec3, local: glam::Vec3) -> glam::Vec3 {
    local.x * x + local.y * y + local.z * z
}

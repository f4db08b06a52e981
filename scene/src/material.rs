//! マテリアルのBRDF評価・重点的サンプリングを行うモジュール。
//!
//! すべての操作はシェーディング法線が+zになるローカル座標系で行われる。

use rand::Rng;

use crate::texture::Texture;

/// マテリアルの重点的サンプリングの結果。
#[derive(Debug, Clone, Copy)]
pub struct MaterialSample {
    /// 往復のスループット（BSDF値など）。
    pub throughput: glam::Vec3,
    /// サンプルされた方向（ローカル座標系）。
    pub out_local: glam::Vec3,
    pub pdf: f32,
    /// 光源からの輝度蓄積（フォトン投棄）の対象になる方向かどうか。
    pub is_diffuse: bool,
}

fn cosine_hemisphere_sample(rng: &mut impl Rng) -> (glam::Vec3, f32) {
    let u: f32 = rng.random();
    let v: f32 = rng.random();
    let phi = 2.0 * std::f32::consts::PI * u;
    let t = v.sqrt();
    let r = (1.0 - t * t).max(0.0).sqrt();
    let out = glam::vec3(r * phi.cos(), r * phi.sin(), t);
    (out, t / std::f32::consts::PI)
}

/// マテリアルのバリアント。
#[derive(Debug, Clone)]
pub enum Material {
    Lambert {
        albedo: glam::Vec3,
        texture: Option<Texture>,
    },
    Phong {
        kd: glam::Vec3,
        ks: glam::Vec3,
        shininess: f32,
        texture: Option<Texture>,
    },
    Specular {
        tint: glam::Vec3,
        texture: Option<Texture>,
    },
    Transparent {
        tint: glam::Vec3,
        ior: f32,
        texture: Option<Texture>,
    },
    General {
        ka: glam::Vec3,
        kd: glam::Vec3,
        ks: glam::Vec3,
        ns: f32,
        ni: f32,
        d: f32,
        illum: i32,
        texture: Option<Texture>,
    },
}
impl Material {
    pub fn texture_color(&self, uv: glam::Vec2) -> Option<glam::Vec3> {
        let texture = match self {
            Material::Lambert { texture, .. }
            | Material::Phong { texture, .. }
            | Material::Specular { texture, .. }
            | Material::Transparent { texture, .. }
            | Material::General { texture, .. } => texture.as_ref(),
        }?;
        Some(texture.sample(uv))
    }

    /// BRDFを評価する。`from_light`は光側の積分かどうかを示す。
    pub fn bsdf(&self, in_local: glam::Vec3, out_local: glam::Vec3, _from_light: bool) -> glam::Vec3 {
        match self {
            Material::Lambert { albedo, .. } => lambert_bsdf(*albedo, in_local, out_local),
            Material::Phong {
                kd, ks, shininess, ..
            } => phong_bsdf(*kd, *ks, *shininess, in_local, out_local),
            Material::Specular { .. } | Material::Transparent { .. } => glam::Vec3::ZERO,
            Material::General {
                ka, kd, ks, ns, illum, ..
            } => match illum {
                2 => phong_bsdf(*kd + *ka, *ks, *ns, in_local, out_local),
                _ => lambert_bsdf(*kd + *ka, in_local, out_local),
            },
        }
    }

    /// 重点的サンプリングを行う。
    pub fn sample(
        &self,
        in_local: glam::Vec3,
        from_light: bool,
        rng: &mut impl Rng,
    ) -> MaterialSample {
        match self {
            Material::Lambert { albedo, .. } => lambert_sample(*albedo, rng),
            Material::Phong {
                kd, ks, shininess, ..
            } => phong_sample(*kd, *ks, *shininess, in_local, rng),
            Material::Specular { tint, .. } => specular_sample(*tint, in_local),
            Material::Transparent { tint, ior, .. } => {
                transparent_sample(*tint, *ior, in_local, from_light, rng)
            }
            Material::General {
                ka, kd, ks, ns, ni, illum, ..
            } => match illum {
                0 | 1 => lambert_sample(*kd + *ka, rng),
                2 => phong_sample(*kd + *ka, *ks, *ns, in_local, rng),
                5 => specular_sample(*ks, in_local),
                7 => transparent_sample(*ks, *ni, in_local, from_light, rng),
                _ => lambert_sample(*kd + *ka, rng),
            },
        }
    }
}

fn lambert_bsdf(albedo: glam::Vec3, in_local: glam::Vec3, out_local: glam::Vec3) -> glam::Vec3 {
    if in_local.z * out_local.z < 0.0 {
        glam::Vec3::ZERO
    } else {
        albedo / std::f32::consts::PI
    }
}

fn lambert_sample(albedo: glam::Vec3, rng: &mut impl Rng) -> MaterialSample {
    let (out_local, pdf) = cosine_hemisphere_sample(rng);
    MaterialSample {
        throughput: albedo / std::f32::consts::PI,
        out_local,
        pdf,
        is_diffuse: true,
    }
}

fn phong_bsdf(
    kd: glam::Vec3,
    ks: glam::Vec3,
    shininess: f32,
    in_local: glam::Vec3,
    out_local: glam::Vec3,
) -> glam::Vec3 {
    if in_local.z * out_local.z < 0.0 {
        return glam::Vec3::ZERO;
    }
    let reflect_in = math::reflect(in_local, glam::Vec3::Z);
    let cos_alpha = out_local.dot(reflect_in).max(0.0);
    let pi = std::f32::consts::PI;
    kd / pi + ks * cos_alpha.powf(shininess) * (2.0 + shininess) / (2.0 * pi)
}

fn phong_sample(
    kd: glam::Vec3,
    ks: glam::Vec3,
    shininess: f32,
    in_local: glam::Vec3,
    rng: &mut impl Rng,
) -> MaterialSample {
    let total = kd + ks;
    let p_r = total.max_element().min(1.0);
    let sum_total = total.x + total.y + total.z;
    let p_d = if sum_total > 0.0 {
        p_r * (kd.x + kd.y + kd.z) / sum_total
    } else {
        0.0
    };

    let u: f32 = rng.random();
    if u < p_d {
        let (out_local, t) = cosine_hemisphere_sample(rng);
        MaterialSample {
            throughput: kd / std::f32::consts::PI,
            out_local,
            pdf: p_r * t / std::f32::consts::PI,
            is_diffuse: true,
        }
    } else if u < p_r {
        let reflect_in = math::reflect(in_local, glam::Vec3::Z);
        let tangent = math::generate_vertical(reflect_in);
        let bitangent = reflect_in.cross(tangent);

        let phi_u: f32 = rng.random();
        let v: f32 = rng.random();
        let phi = 2.0 * std::f32::consts::PI * phi_u;
        let t = v.powf(1.0 / (1.0 + shininess));
        let r = (1.0 - t * t).max(0.0).sqrt();
        let local = glam::vec3(r * phi.cos(), r * phi.sin(), t);
        let out_local = math::local_to_world(tangent, bitangent, reflect_in, local);

        let pdf = p_r * (shininess + 2.0) * t.powf(shininess) / (2.0 * std::f32::consts::PI);
        let f = phong_bsdf(kd, ks, shininess, in_local, out_local) - kd / std::f32::consts::PI;
        MaterialSample {
            throughput: f,
            out_local,
            pdf,
            is_diffuse: true,
        }
    } else {
        MaterialSample {
            throughput: glam::Vec3::ZERO,
            out_local: glam::Vec3::ZERO,
            pdf: 1.0,
            is_diffuse: true,
        }
    }
}

fn specular_sample(tint: glam::Vec3, in_local: glam::Vec3) -> MaterialSample {
    let out_local = math::reflect(in_local, glam::Vec3::Z);
    MaterialSample {
        throughput: tint / (out_local.z.abs() + 1e-6),
        out_local,
        pdf: 1.0,
        is_diffuse: false,
    }
}

fn transparent_sample(
    tint: glam::Vec3,
    ior: f32,
    in_local: glam::Vec3,
    from_light: bool,
    rng: &mut impl Rng,
) -> MaterialSample {
    let entering = in_local.z >= 0.0;
    let (n_in, n_out) = if entering { (1.0, ior) } else { (ior, 1.0) };
    let n = if entering { glam::Vec3::Z } else { -glam::Vec3::Z };

    let reflect_out = math::reflect(in_local, glam::Vec3::Z);
    let refract_out = math::refract(in_local, n, n_in, n_out);

    let cos_i = in_local.z.abs();
    let cos_t = refract_out.z.abs();

    // Fresnelの反射率（s偏光・p偏光成分）。
    let (rs, rp) = if refract_out == glam::Vec3::ZERO {
        (1.0, 1.0)
    } else {
        let rs = ((n_in * cos_i - n_out * cos_t) / (n_in * cos_i + n_out * cos_t)).powi(2);
        let rp = ((n_in * cos_t - n_out * cos_i) / (n_in * cos_t + n_out * cos_i)).powi(2);
        (rs, rp)
    };

    let u: f32 = rng.random();
    if u < (rs + rp) / 2.0 {
        MaterialSample {
            throughput: tint / cos_i.max(1e-6),
            out_local: reflect_out,
            pdf: 1.0,
            is_diffuse: false,
        }
    } else {
        let scale = if entering { 1.0 / (ior * ior) } else { ior * ior };
        let throughput = if from_light {
            tint / cos_t.max(1e-6)
        } else {
            scale * tint / cos_t.max(1e-6)
        };
        MaterialSample {
            throughput,
            out_local: refract_out,
            pdf: 1.0,
            is_diffuse: false,
        }
    }
}

//! Stochastic Progressive Photon Mapping のレンダリングループ。

use std::cell::RefCell;
use std::path::Path;

use math::{Ray, Transform, Vector3, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use scene::Scene;

use crate::photon_map::{Photon, PhotonMap, merge_local_buffers, parallel_emit};

/// SPPMの挙動を決める設定値。`renderer/src/main.rs`のCLI引数から組み立てる。
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub photon_num: usize,
    pub iter: usize,
    pub depth: usize,
    pub ray_num: usize,
    pub radius: f32,
    pub alpha: f32,
    pub seed: u64,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            photon_num: 50_000,
            iter: 50,
            depth: 10,
            ray_num: 4,
            radius: 0.5,
            alpha: 0.75,
            seed: 0,
        }
    }
}

const RAY_EPSILON: f32 = 1e-4;

thread_local! {
    static WORKER_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// 各ワーカースレッドに1つずつ結びついたRNGを使ってfを実行する。
/// 初回呼び出し時、`seeds[thread_index % seeds.len()]`で遅延初期化する。
fn with_worker_rng<R>(seeds: &[u64], f: impl FnOnce(&mut StdRng) -> R) -> R {
    WORKER_RNG.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let idx = rayon::current_thread_index().unwrap_or(0) % seeds.len().max(1);
            *slot = Some(StdRng::seed_from_u64(seeds[idx]));
        }
        f(slot.as_mut().unwrap())
    })
}

/// `seed_i = rng_i.uniform_int(0, W-1) + i・W`のワーカーシード決定則。
fn compute_worker_seeds(base_seed: u64, num_workers: usize) -> Vec<u64> {
    (0..num_workers)
        .map(|i| {
            let mut rng_i = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let w = num_workers.max(1) as u64;
            let u = rng_i.random_range(0..w);
            u + i as u64 * w
        })
        .collect()
}

fn is_finite_nonneg(v: glam::Vec3) -> bool {
    v.is_finite() && v.x >= 0.0 && v.y >= 0.0 && v.z >= 0.0
}

/// フォトン1本をシーンへ放出し、拡散面で起きたデポジットを集めて返す。
fn emit_photon(scene: &Scene, depth: usize, rng: &mut StdRng) -> Vec<Photon> {
    let mut deposits = Vec::new();
    let light_count = scene.lights.len();
    if light_count == 0 {
        return deposits;
    }

    let light_id = rng.random_range(0..light_count);
    let sample = scene.lights[light_id].sample_ray(rng);
    if sample.pdf < 0.0 {
        return deposits;
    }

    let mut power = sample.power / sample.pdf.max(1e-6) * light_count as f32;
    let mut ray = sample.ray;

    for bounce in 0..depth {
        if !is_finite_nonneg(power) {
            break;
        }

        let hit = scene.intersect(&ray, RAY_EPSILON);
        let Some(material_index) = hit.material_index else {
            break;
        };
        let material = &scene.materials[material_index];

        let n_shade = hit.surface.shading_normal;
        let n_geom = hit.surface.geometric_normal.to_vec3();
        let world_to_local: Transform<World, math::Local> =
            Transform::from_shading_normal(&n_shade);
        let local_to_world = world_to_local.inverse();

        let in_world = ray.dir.to_vec3().normalize();
        let in_local = (&world_to_local * Vector3::from(-in_world)).to_vec3();

        let material_sample = material.sample(in_local, true, rng);

        if material_sample.is_diffuse {
            deposits.push(Photon {
                position: hit.surface.position,
                incoming_direction: in_world,
                power,
            });
        }

        let mut co = material_sample.throughput;
        if hit.surface.has_texture
            && let Some(tex_color) = material.texture_color(hit.surface.uv)
        {
            co *= tex_color;
        }

        let out_world = (&local_to_world * Vector3::from(material_sample.out_local)).to_vec3();
        let cos_out_geom = out_world.dot(n_geom).abs();
        let cos_in_shade = in_world.dot(n_shade.to_vec3()).abs();
        let cos_in_geom = in_world.dot(n_geom).abs().max(1e-6);

        power =
            power * co / material_sample.pdf.max(1e-6) * cos_out_geom * cos_in_shade / cos_in_geom;

        if bounce >= 1 {
            let p = power.max_element().clamp(0.0, 1.0);
            if rng.random::<f32>() >= p {
                break;
            }
            power /= p.max(1e-6);
        }

        ray = Ray::new(hit.surface.position, Vector3::from(out_world));
    }

    deposits
}

fn photon_pass(scene: &Scene, config: &RenderConfig, seeds: &[u64]) -> PhotonMap {
    let buffers = parallel_emit(config.photon_num, 100, |_| {
        with_worker_rng(seeds, |rng| emit_photon(scene, config.depth, rng))
    });

    let mut map = PhotonMap::new();
    merge_local_buffers(&mut map, buffers);
    map.build();
    map
}

/// 拡散面でのフォトン収集（ゲイン）。
fn gather(
    scene: &Scene,
    photon_map: &PhotonMap,
    position: glam::Vec3,
    world_to_local: &Transform<World, math::Local>,
    view_in_local: glam::Vec3,
    material: &scene::Material,
    radius_sq: f32,
    photon_num: usize,
) -> glam::Vec3 {
    let mut rho = glam::Vec3::ZERO;
    photon_map.query_in_range(position, radius_sq, &mut |photon| {
        let photon_in_local =
            (world_to_local * Vector3::from(-photon.incoming_direction)).to_vec3();
        rho += photon.power * material.bsdf(view_in_local, photon_in_local, false);
    });
    rho / (std::f32::consts::PI * radius_sq * photon_num as f32)
        + scene.ambient * material.bsdf(view_in_local, glam::Vec3::Z, false)
}

fn eye_ray_radiance(
    scene: &Scene,
    photon_map: &PhotonMap,
    mut ray: math::Ray<World>,
    config: &RenderConfig,
    radius: f32,
    rng: &mut impl Rng,
) -> glam::Vec3 {
    let mut throughput = glam::Vec3::ONE;

    for _ in 0..config.depth {
        let hit = scene.intersect(&ray, RAY_EPSILON);
        let Some(material_index) = hit.material_index else {
            return scene.background * throughput;
        };
        let material = &scene.materials[material_index];

        let n_shade = hit.surface.shading_normal;
        let world_to_local: Transform<World, math::Local> =
            Transform::from_shading_normal(&n_shade);
        let local_to_world = world_to_local.inverse();

        let in_world = ray.dir.to_vec3().normalize();
        let in_local = (&world_to_local * Vector3::from(-in_world)).to_vec3();

        let material_sample = material.sample(in_local, false, rng);

        if material_sample.is_diffuse {
            let mut rho = gather(
                scene,
                photon_map,
                hit.surface.position.to_vec3(),
                &world_to_local,
                in_local,
                material,
                radius * radius,
                config.photon_num,
            );
            if hit.surface.has_texture
                && let Some(tex_color) = material.texture_color(hit.surface.uv)
            {
                rho *= tex_color;
            }
            if let Some(emission) = hit.light_emission {
                let cos = in_world.dot(hit.surface.geometric_normal.to_vec3()).abs();
                rho += emission * cos;
            }
            return throughput * rho;
        }

        let mut co = material_sample.throughput;
        if hit.surface.has_texture
            && let Some(tex_color) = material.texture_color(hit.surface.uv)
        {
            co *= tex_color;
        }
        let out_world = (&local_to_world * Vector3::from(material_sample.out_local)).to_vec3();
        let cos_out = out_world.dot(n_shade.to_vec3()).abs();

        throughput = throughput * co * cos_out / material_sample.pdf.max(1e-6);
        if throughput.length() < 1e-5 {
            return glam::Vec3::ZERO;
        }

        ray = math::Ray::new(hit.surface.position, Vector3::from(out_world));
    }

    glam::Vec3::ZERO
}

fn eye_pass(
    scene: &Scene,
    photon_map: &PhotonMap,
    config: &RenderConfig,
    radius: f32,
    seeds: &[u64],
    img: &mut [glam::Vec3],
) {
    let width = scene.camera.width();
    img.par_iter_mut().enumerate().for_each(|(index, accum)| {
        let x = index as u32 % width;
        let y = index as u32 / width;
        with_worker_rng(seeds, |rng| {
            let mut sum = glam::Vec3::ZERO;
            for _ in 0..config.ray_num {
                let ray = scene.camera.sample_ray(x, y, rng);
                sum += eye_ray_radiance(scene, photon_map, ray, config, radius, rng);
            }
            *accum += sum / config.ray_num as f32;
        });
    });
}

fn tonemap(img: &[glam::Vec3], samples: f32, gamma: f32) -> Vec<glam::Vec3> {
    img.iter()
        .map(|&c| {
            let mean = c / samples;
            let gammaed = glam::vec3(
                mean.x.max(0.0).powf(1.0 / gamma),
                mean.y.max(0.0).powf(1.0 / gamma),
                mean.z.max(0.0).powf(1.0 / gamma),
            );
            let max_channel = gammaed.x.max(gammaed.y).max(gammaed.z).max(1.0);
            gammaed / max_channel
        })
        .collect()
}

/// シーンをSPPMでレンダリングし、最終イテレーションの画像を返す。
/// `preview_dir`を指定すると各イテレーション終了時に`<preview_dir>/<i>.bmp`を書き出す。
pub fn render(
    scene: &Scene,
    config: &RenderConfig,
    preview_dir: Option<&Path>,
) -> anyhow::Result<Vec<glam::Vec3>> {
    let width = scene.camera.width();
    let height = scene.camera.height();
    let gamma = scene.camera.gamma();
    let mut img = vec![glam::Vec3::ZERO; (width * height) as usize];
    let mut radius = config.radius;

    let num_workers = rayon::current_num_threads();
    let seeds = compute_worker_seeds(config.seed, num_workers);

    for i in 0..config.iter {
        let start = std::time::Instant::now();
        let photon_map = photon_pass(scene, config, &seeds);
        eye_pass(scene, &photon_map, config, radius, &seeds, &mut img);

        let preview = tonemap(&img, (i + 1) as f32, gamma);
        println!(
            "iteration {}/{}: radius = {radius:.4}, photons = {}, {:.2}s",
            i + 1,
            config.iter,
            photon_map.len(),
            start.elapsed().as_secs_f32()
        );
        if let Some(dir) = preview_dir {
            std::fs::create_dir_all(dir)?;
            crate::image_io::write_bmp(&dir.join(format!("{i}.bmp")), width, height, &preview)?;
        }

        radius *= ((i as f32 + config.alpha) / (i as f32 + 1.0)).sqrt();
    }

    Ok(tonemap(&img, config.iter as f32, gamma))
}

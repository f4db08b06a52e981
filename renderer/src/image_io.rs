//! 画像コーデック（PPM/TGA/BMP）。線形色を`floor(c*255)`で飽和丸めしてバイトへ変換する。

use std::path::Path;

use anyhow::Context;
use image::{ImageFormat, RgbImage};

fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).floor() as u8
}

fn to_rgb_image(width: u32, height: u32, pixels: &[glam::Vec3]) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let c = pixels[(y * width + x) as usize];
        image::Rgb([to_byte(c.x), to_byte(c.y), to_byte(c.z)])
    })
}

/// P6形式のPPMを直接バイト列として書き出す。原点は画像の左下。
pub fn write_ppm(
    path: &Path,
    width: u32,
    height: u32,
    pixels: &[glam::Vec3],
) -> anyhow::Result<()> {
    use std::io::Write;

    let mut out = Vec::with_capacity(32 + (width * height * 3) as usize);
    write!(out, "P6\n# generated\n{width} {height}\n255\n")?;
    for y in (0..height).rev() {
        for x in 0..width {
            let c = pixels[(y * width + x) as usize];
            out.push(to_byte(c.x));
            out.push(to_byte(c.y));
            out.push(to_byte(c.z));
        }
    }
    std::fs::write(path, out).with_context(|| format!("failed to write ppm {}", path.display()))
}

pub fn write_bmp(
    path: &Path,
    width: u32,
    height: u32,
    pixels: &[glam::Vec3],
) -> anyhow::Result<()> {
    to_rgb_image(width, height, pixels)
        .save_with_format(path, ImageFormat::Bmp)
        .with_context(|| format!("failed to write bmp {}", path.display()))
}

pub fn write_tga(
    path: &Path,
    width: u32,
    height: u32,
    pixels: &[glam::Vec3],
) -> anyhow::Result<()> {
    to_rgb_image(width, height, pixels)
        .save_with_format(path, ImageFormat::Tga)
        .with_context(|| format!("failed to write tga {}", path.display()))
}

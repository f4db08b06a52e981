use std::path::PathBuf;

use clap::Parser;

mod image_io;
mod photon_map;
mod sppm;

use sppm::RenderConfig;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// シーン記述ファイルのパス
    scene: PathBuf,
    /// 出力画像のパス（拡張子でフォーマットを決める: .bmp/.tga/.ppm）
    #[arg(short, long, default_value = "output.bmp")]
    output: PathBuf,
    /// 1イテレーションあたりに放出するフォトン数
    #[arg(long, default_value_t = 50_000)]
    photon_num: usize,
    /// SPPMイテレーション数
    #[arg(long, default_value_t = 50)]
    iter: usize,
    /// レイの最大バウンス数
    #[arg(long, default_value_t = 10)]
    depth: usize,
    /// ピクセルあたりのアイレイ本数
    #[arg(long, default_value_t = 4)]
    ray_num: usize,
    /// 初期収集半径
    #[arg(long, default_value_t = 0.5)]
    radius: f32,
    /// 半径収縮パラメータ（0,1）
    #[arg(long, default_value_t = 0.75)]
    alpha: f32,
    /// 乱数シード
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// 各イテレーションのプレビューを書き出すディレクトリ
    #[arg(long)]
    preview_dir: Option<PathBuf>,
}

fn run(args: Args) -> anyhow::Result<()> {
    println!("Start build scene...");
    let start = std::time::Instant::now();

    let scene = scene::parse_scene_file(&args.scene)?;

    let end = start.elapsed();
    println!("Finish build scene: {} seconds.", end.as_secs_f32());

    let config = RenderConfig {
        photon_num: args.photon_num,
        iter: args.iter,
        depth: args.depth,
        ray_num: args.ray_num,
        radius: args.radius,
        alpha: args.alpha,
        seed: args.seed,
    };

    println!("Start rendering...");
    let start = std::time::Instant::now();

    let image = sppm::render(&scene, &config, args.preview_dir.as_deref())?;

    let end = start.elapsed();
    println!("Finish rendering: {} seconds.", end.as_secs_f32());

    let width = scene.camera.width();
    let height = scene.camera.height();
    match args.output.extension().and_then(|e| e.to_str()) {
        Some("ppm") => image_io::write_ppm(&args.output, width, height, &image)?,
        Some("tga") => image_io::write_tga(&args.output, width, height, &image)?,
        _ => image_io::write_bmp(&args.output, width, height, &image)?,
    }
    println!("Wrote {}", args.output.display());

    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

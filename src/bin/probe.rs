// Diagnostics binary: probe local media and show what a job would do with it

use std::path::{Path, PathBuf};

use news_reel::{
    audio::AudioLoader,
    composition::{AlignmentPlan, FfmpegCommand},
    config::Config,
    ffmpeg,
    visual::{loader::prepare_still, VisualLoader, VisualSource},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(audio_path), Some(visual_path)) = (args.next(), args.next()) else {
        eprintln!("usage: probe <narration audio> <image or background video>");
        std::process::exit(2);
    };
    let config = Config::default();

    println!("🔎 News-Reel media probe");

    // Tooling
    println!("\n1. Checking tools...");
    for tool in ["ffmpeg", "ffprobe"] {
        let found = ffmpeg::check_available(tool);
        println!("   {} - {}", tool, if found { "✅ found" } else { "❌ missing" });
    }
    let encoder = &config.video.codec;
    println!(
        "   encoder {} - {}",
        encoder,
        if ffmpeg::has_encoder(encoder) { "✅ available" } else { "❌ unavailable" }
    );

    // Narration
    println!("\n2. Probing narration...");
    let audio = AudioLoader::probe(&audio_path)?;
    println!("   Duration: {:.3}s", audio.duration);
    println!("   Sample rate: {} Hz, channels: {}", audio.sample_rate, audio.channels);
    println!("   Format: {}", audio.format.extension);
    println!("   Frames at {} fps: {}", config.video.fps, audio.frames_at(config.video.fps));

    // Visual
    println!("\n3. Opening visual...");
    let scratch = tempfile::tempdir()?;
    let visual = open_visual(Path::new(&visual_path), scratch.path(), config.visual.target_height).await?;
    let (width, height) = visual.resolution();
    println!("   Kind: {}", visual.kind());
    println!("   Resolution: {}x{}", width, height);
    if let Some(duration) = visual.duration() {
        println!("   Duration: {:.3}s", duration);
    }

    // Alignment
    println!("\n4. Alignment plan...");
    let plan = AlignmentPlan::new(&visual, audio.duration)?;
    println!("   Output duration: {:.3}s", plan.output_duration);
    println!("   Extra visual passes: {}", plan.visual_loops);
    println!("   Visual material covered: {:.3}s", plan.covered_duration());

    let command = FfmpegCommand::new(
        &visual,
        &audio.file_path,
        Path::new("out.mp4"),
        &plan,
        &config.video,
        config.visual.target_height,
    );
    println!("\n5. Encoder command:");
    println!("   ffmpeg {}", command.args().join(" "));

    Ok(())
}

async fn open_visual(path: &Path, scratch: &Path, target_height: u32) -> news_reel::Result<VisualSource> {
    let is_image = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if is_image {
        let bytes = std::fs::read(path)?;
        let dest: PathBuf = scratch.join("still.png");
        prepare_still(&bytes, &path.display().to_string(), target_height, dest)
    } else {
        VisualLoader::open_background_video(path).await
    }
}

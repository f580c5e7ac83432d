mod cli;
mod ocr;
mod pipeline;
mod video;

use anyhow::Result;
use cli::Args;
use ocr::tesseract::TesseractRecognizer;
use pipeline::orchestrator::CaptionPipeline;
use video::ffmpeg_sampler::FfmpegSampler;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Logging goes to stderr; stdout carries only caption lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_args();
    let rect = args.rect()?;

    tracing::info!(
        "scanning {} region {} (diff threshold {})",
        args.video.display(),
        rect,
        args.diff_threshold
    );

    let mut sampler = FfmpegSampler::new(&args.video, args.start, args.end)?;
    let recognizer = TesseractRecognizer;

    let mut pipeline = CaptionPipeline::new(rect, args.diff_threshold);
    pipeline.run(&mut sampler, &recognizer, |caption| {
        println!("{} {}", caption.display_time, caption.text);
    })?;

    Ok(())
}

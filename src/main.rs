use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use weighlog::config::{SettingsOverrides, DEFAULT_SETTINGS_FILE};
use weighlog::export;
use weighlog::queue::{spawn_worker, JobEvent, VideoJob};
use weighlog::{process_video_file, CropRect, LogCrateSink, LogSink, Settings, VideoOptions};

#[derive(Parser)]
#[command(name = "weighlog")]
#[command(about = "Read a scale display from video and log stable weight measurements")]
struct Cli {
    /// Video files (or directories of frames) to process
    #[arg(value_name = "VIDEO", required = true)]
    videos: Vec<PathBuf>,

    /// Settings file (created with defaults if missing)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Detection model, overrides the settings file
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Display crop as X,Y,W,H; saved back to the settings file
    #[arg(long, value_name = "X,Y,W,H")]
    crop: Option<CropRect>,

    /// Detection confidence threshold
    #[arg(long)]
    conf: Option<f32>,

    /// NMS IoU threshold
    #[arg(long)]
    nms: Option<f32>,

    /// Frame rate for frame directories, or to override the container
    #[arg(long)]
    fps: Option<f64>,

    /// Directory for the result CSV files
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Also write the raw per-frame readings next to each result
    #[arg(long)]
    frames_csv: bool,

    /// Save per-step debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut settings = Settings::load(&args.config)?;
    if let Some(crop) = &args.crop {
        log::info!("Updating crop values to: {:?}", crop);
    }
    settings.apply_overrides(
        SettingsOverrides {
            crop: args.crop,
            model_path: args.model.clone(),
            confidence_threshold: args.conf,
            nms_threshold: args.nms,
        },
        &args.config,
    )?;

    std::fs::create_dir_all(&args.out_dir)?;

    let sink: Arc<dyn LogSink> = Arc::new(LogCrateSink);
    let jobs: Vec<VideoJob> = args.videos.iter().map(VideoJob::new).collect();
    let total = jobs.len();

    let worker_settings = settings.clone();
    let worker_sink = sink.clone();
    let fps = args.fps;
    let debug_root = args.debug_out.clone();
    let (worker, events) = spawn_worker(jobs, move |job: &VideoJob| {
        // One debug subdirectory per video
        let debug_dir = debug_root.as_ref().map(|root| {
            root.join(job.path.file_name().map(|n| n.to_os_string()).unwrap_or_default())
        });
        let options = VideoOptions { fps, debug_dir };
        process_video_file(&job.path, &worker_settings, &options, worker_sink.clone())
    });

    let mut failed = 0;
    for event in events {
        match event {
            JobEvent::Finished { index, progress_percent, path, outcome, .. } => match outcome {
                Ok(report) => {
                    log::info!("[{}/{}] {} finished ({}%)", index + 1, total, path.display(), progress_percent);
                    let csv_path = export::result_path(&args.out_dir, &path);
                    export::write_measurements(&csv_path, &report.measurements)?;
                    if args.frames_csv {
                        let frames_path = csv_path.with_extension("frames.csv");
                        export::write_frame_records(&frames_path, &report.records)?;
                    }

                    println!("\n=== [{}/{}] {} ({}%) ===", index + 1, total, path.display(), progress_percent);
                    if report.stopped_early {
                        println!("Stopped early after repeated read failures");
                    }
                    println!("Frames read: {}, samples: {}, read failures: {}, time: {:.1}s",
                        report.frames_read, report.records.len(), report.read_failures,
                        report.elapsed.as_secs_f64());

                    if report.measurements.is_empty() {
                        println!("No measurements found.");
                    } else {
                        println!("{:>4}  {:>8}  {}", "#", "value", "timestamp");
                        for m in &report.measurements {
                            println!("{:>4}  {:>8.1}  {}", m.sequence_index, m.value, m.timestamp);
                        }
                    }
                    println!("Saved {}", csv_path.display());
                }
                Err(e) => {
                    failed += 1;
                    log::error!("Failed to process {}: {:#}", path.display(), e);
                    println!("\n=== [{}/{}] {} FAILED: {:#} ===", index + 1, total, path.display(), e);
                }
            },
            JobEvent::AllDone { succeeded, failed: failed_count, cancelled } => {
                println!("\nDone: {} succeeded, {} failed, {} cancelled", succeeded, failed_count, cancelled);
            }
        }
    }

    worker.join().map_err(|_| anyhow::anyhow!("Worker thread panicked"))?;

    if failed == total {
        anyhow::bail!("No video could be processed");
    }
    Ok(())
}

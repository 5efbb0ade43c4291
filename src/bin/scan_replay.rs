use clap::Parser;
use qr_scan::source::synthetic::{SyntheticCamera, load_frame};
use qr_scan::{FacingMode, QrDecoder, ScanService, ScannerConfig, ScannerState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scan_replay",
    version,
    about = "Replay image files through the live scan loop"
)]
struct Cli {
    /// Frames to play, in order; the last one is held
    #[arg(required = true)]
    frames: Vec<PathBuf>,
    /// Ticks per second (defaults to QR_SCAN_FPS or 60)
    #[arg(long)]
    fps: Option<u32>,
    /// Polls reported as "not ready" before the first frame
    #[arg(long, default_value_t = 0)]
    warmup: usize,
    /// Simulated camera permission latency in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
    /// Downscale frames so neither side exceeds this (0 disables)
    #[arg(long, default_value_t = 1200)]
    max_dim: u32,
    /// Requested camera (environment or user)
    #[arg(long)]
    facing: Option<FacingMode>,
    /// Give up after this many seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qr_scan=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let max_dim = (cli.max_dim > 0).then_some(cli.max_dim);
    let mut frames = Vec::with_capacity(cli.frames.len());
    for path in &cli.frames {
        match load_frame(path, max_dim) {
            Ok(frame) => frames.push(frame),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let mut config = ScannerConfig::from_env();
    if let Some(fps) = cli.fps {
        config = config.with_ticks_per_second(fps);
    }
    if let Some(facing) = cli.facing {
        config = config.with_facing_mode(facing);
    }

    let camera = SyntheticCamera::with_frames(frames)
        .with_warmup(cli.warmup)
        .with_latency(Duration::from_millis(cli.latency_ms));
    let decoder = QrDecoder::from_config(&config);
    let (scanner, task) = ScanService::spawn(camera, decoder, &config);

    if let Err(err) = scanner.start() {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let mut states = scanner.subscribe();
    let outcome = match tokio::time::timeout(
        Duration::from_secs(cli.timeout_secs),
        states.wait_for(|s| matches!(s, ScannerState::Success(_) | ScannerState::Error(_))),
    )
    .await
    {
        Ok(Ok(state)) => state.clone(),
        Ok(Err(_)) => {
            eprintln!("scanner stopped unexpectedly");
            return ExitCode::FAILURE;
        }
        Err(_) => {
            eprintln!("no QR code found within {}s", cli.timeout_secs);
            ScannerState::Idle
        }
    };

    // Shutdown errors only mean the service already exited
    let _ = scanner.shutdown();
    let _ = task.await;

    match outcome {
        ScannerState::Success(payload) => {
            println!("{payload}");
            if payload.looks_like_url() {
                eprintln!("(link)");
            }
            ExitCode::SUCCESS
        }
        ScannerState::Error(err) => {
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
        _ => ExitCode::FAILURE,
    }
}

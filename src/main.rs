use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tessel::{Engine, EngineConfig, NullRenderer, RenderSink, load_config_from_path};
use tessel_proto::FrameReader;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Feed a capture of length-prefixed server frames through a headless engine
    Replay {
        capture: PathBuf,

        /// View radius used while replaying
        #[arg(long, default_value_t = 2)]
        radius: i32,

        /// Give up waiting on mesh workers after this many milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => EngineConfig::default(),
    };
    match cli.command {
        Cmd::Replay {
            capture,
            radius,
            timeout_ms,
        } => replay(config, &capture, radius, Duration::from_millis(timeout_ms)),
    }
}

fn replay(mut config: EngineConfig, capture: &Path, radius: i32, timeout: Duration) -> Result<(), Box<dyn Error>> {
    config.view_radius = radius.clamp(1, 24);
    let bytes = std::fs::read(capture).map_err(|e| format!("read error {}: {e}", capture.display()))?;
    let mut engine = Engine::new(config);
    let mut render = NullRenderer::new();
    render.resize_world(engine.radii().diameter());

    let mut reader = FrameReader::new();
    reader.push(&bytes);
    let mut frames = 0usize;
    loop {
        match reader.next_frame() {
            Ok(Some(frame)) => {
                engine.handle_message(&frame);
                frames += 1;
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("capture framing error after {frames} frames: {e}");
                break;
            }
        }
    }
    if reader.buffered() > 0 {
        log::warn!("{} trailing bytes ignored", reader.buffered());
    }

    let deadline = Instant::now() + timeout;
    loop {
        engine.ensure_chunks(&mut render);
        if engine.pool().busy_count() == 0 || Instant::now() >= deadline {
            break;
        }
        engine.wait_workers(Duration::from_millis(50), &mut render);
    }

    log::info!(
        "replayed {frames} frames: {} chunks, {} faces in {} buffers, {} players, {} chat lines, {} requests queued",
        engine.store().len(),
        render.live_faces(),
        render.live_buffers(),
        engine.players().len(),
        engine.chat().len(),
        engine.outbox().len()
    );
    for line in engine.chat().lines() {
        log::info!("chat: {line}");
    }
    Ok(())
}

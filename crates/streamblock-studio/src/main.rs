use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::RgbImage;

use streamblock_engine::config::EngineConfig;
use streamblock_engine::coords::{Rect, ScreenBounds};
use streamblock_engine::engine::{
    BlockId, ChannelSink, Coordinator, EngineEvent, Frame, Paint, SharedGeometry,
};
use streamblock_engine::layout::{load_layout, save_layout, BlockRecord, DEFAULT_LAYOUT_FILE};
use streamblock_engine::logging::{init_logging, LoggingConfig};
use streamblock_engine::sample::ImageScreen;

const SCREEN: ScreenBounds = ScreenBounds::new(1280, 720);
const RUN_TIME: Duration = Duration::from_secs(8);
const SCENE_PERIOD: Duration = Duration::from_millis(2500);

/// Desktop backgrounds the scene thread cycles through: (left, right) halves.
const SCENES: [([u8; 3], [u8; 3]); 4] = [
    ([24, 28, 36], [24, 28, 36]),
    ([230, 230, 225], [230, 230, 225]),
    ([20, 20, 20], [240, 240, 240]),
    ([40, 90, 200], [200, 60, 40]),
];

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ┌──────────────────────────────────────┐");
    println!("  │  STREAMBLOCK STUDIO  ·  headless run │");
    println!("  └──────────────────────────────────────┘");
    println!();

    let layout_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYOUT_FILE));

    let summary = run_session(&layout_path, EngineConfig::default(), RUN_TIME)?;
    println!();
    println!(
        "  {} adaptation(s), {} gradient frame(s) exported",
        summary.adaptations, summary.exported
    );
    Ok(())
}

/// What a session produced.
#[derive(Debug, Default)]
struct Summary {
    adaptations: usize,
    exported: usize,
}

/// Loads the layout, runs the engine against the simulated desktop for
/// `run_time`, then exports gradient frames and saves the layout back.
fn run_session(layout_path: &Path, config: EngineConfig, run_time: Duration) -> Result<Summary> {
    let records = match load_layout(layout_path) {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => default_blocks(),
        Err(err) => {
            log::warn!("{err:#}; using default blocks");
            default_blocks()
        }
    };

    let limits = config.limits;
    let screen = ImageScreen::new(paint_scene(SCENES[0]));
    let (sink, events) = ChannelSink::new();
    let coordinator = Coordinator::new(config, Arc::new(screen.clone()), Arc::new(sink));

    for (i, record) in records.iter().enumerate() {
        let id = BlockId(i as u64);
        let rect = record.rect(limits, SCREEN);
        if coordinator.enable_record(id, record, SharedGeometry::new(rect)) {
            log::info!("{id}: dynamic at {rect:?}");
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let scene = {
        let (screen, running) = (screen.clone(), running.clone());
        thread::Builder::new()
            .name("sb-scene".into())
            .spawn(move || run_scene(screen, running))
            .context("spawning scene thread")?
    };

    // This thread is the UI context: it alone consumes frames.
    let mut summary = Summary::default();
    let mut latest: HashMap<BlockId, Frame> = HashMap::new();
    let deadline = Instant::now() + run_time;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        match events.recv_timeout(left) {
            Ok(EngineEvent::FrameReady { id, frame }) => {
                log::trace!("{id}: frame {:?}", frame.mode);
                latest.insert(id, frame);
            }
            Ok(EngineEvent::Adapted { id, event }) => {
                summary.adaptations += 1;
                println!("  {id}  →  {}  ({})", event.dominant.to_hex(), event.mode.as_str());
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::Relaxed);
    let stopped = coordinator.disable_all();
    log::info!("stopped {stopped} dynamic block(s)");
    if scene.join().is_err() {
        log::warn!("scene thread panicked");
    }

    let out_dir = layout_path.parent().unwrap_or(Path::new("."));
    for (id, frame) in &latest {
        if let Paint::Gradient(img) = &frame.paint {
            let path = out_dir.join(format!("streamblock_block{}.png", id.0));
            img.save(&path).with_context(|| format!("writing {}", path.display()))?;
            log::info!("{id}: gradient written to {}", path.display());
            summary.exported += 1;
        }
    }

    // Dynamic blocks keep their configured fill as the solid fallback; the
    // adaptive color is never persisted.
    save_layout(layout_path, &records)?;

    Ok(summary)
}

fn default_blocks() -> Vec<BlockRecord> {
    let plain = BlockRecord::default_for(SCREEN, "#000000");
    let dynamic = BlockRecord::from_rect(Rect::new(560, 80, 200, 90), "#202020", true);
    vec![plain, dynamic]
}

/// Paints the simulated desktop: two halves plus a fixed taskbar strip.
fn paint_scene((left, right): ([u8; 3], [u8; 3])) -> RgbImage {
    let (w, h) = (SCREEN.width as u32, SCREEN.height as u32);
    RgbImage::from_fn(w, h, |x, y| {
        if y >= h - 40 {
            image::Rgb([32, 32, 40])
        } else if x < w / 2 {
            image::Rgb(left)
        } else {
            image::Rgb(right)
        }
    })
}

fn run_scene(screen: ImageScreen, running: Arc<AtomicBool>) {
    let mut index = 0;
    let mut next = Instant::now() + SCENE_PERIOD;
    while running.load(Ordering::Relaxed) {
        if Instant::now() < next {
            thread::sleep(Duration::from_millis(50));
            continue;
        }
        next += SCENE_PERIOD;
        index = (index + 1) % SCENES.len();
        log::debug!("scene {index}");
        screen.replace(paint_scene(SCENES[index]));
    }
}

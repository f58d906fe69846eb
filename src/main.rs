mod camera;
mod config;
mod debounce;
mod gesture;
mod landmark;
mod model_download;
mod sink;
mod tracker;
mod types;

use std::{
    io::BufRead,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use anyhow::Result;

use crate::{
    camera::CameraFrameSource,
    debounce::ActionDebouncer,
    gesture::GestureClassifier,
    landmark::{CameraLandmarkSource, OrtEngine},
    sink::HttpSink,
    tracker::GrabTracker,
};

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args().nth(1);
    let cfg = config::load(config_path.as_deref())?;

    match camera::available_cameras() {
        Ok(devices) => {
            for device in &devices {
                log::info!("found camera {:?}: {}", device.index, device.label);
            }
        }
        Err(err) => log::warn!("camera enumeration failed: {err:?}"),
    }

    model_download::ensure_handpose_model_ready(&cfg.detector.model_path)?;

    let frame_source = CameraFrameSource::open(&cfg.camera)?;
    let engine = OrtEngine::new(cfg.detector.clone())?;
    let mut source = CameraLandmarkSource::new(frame_source, engine);

    let mut tracker = GrabTracker::new(
        GestureClassifier::new(cfg.classifier.clone()),
        ActionDebouncer::new(&cfg.debounce),
        HttpSink::new(&cfg.sink),
    );

    let stop = Arc::new(AtomicBool::new(false));
    spawn_stdin_stop_watcher(stop.clone());

    log::info!("relaying grab gestures to {} (press Enter to quit)", cfg.sink.url);
    tracker::run_loop(&mut source, &mut tracker, &stop);

    Ok(())
}

/// Flip the stop flag on the next line from stdin. The capture loop checks
/// the flag between frames and winds down on its own; the camera is
/// released when the source drops.
fn spawn_stdin_stop_watcher(stop: Arc<AtomicBool>) {
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        stop.store(true, Ordering::SeqCst);
    });
}

mod common;
mod ort;

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

pub use self::ort::OrtEngine;
use crate::{
    camera::CameraFrameSource,
    types::{Frame, HandObservation, HandSkeleton},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    /// Confidence required to pick a hand up when none was tracked on the
    /// previous frame.
    pub min_detection_confidence: f32,
    /// Lower bar for keeping an already-tracked hand across frames.
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: crate::model_download::default_handpose_model_path(),
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

/// Black-box supplier of per-frame hand skeletons. The tracker only ever
/// sees this trait; the concrete source below pairs the camera with an ONNX
/// hand-pose model.
pub trait LandmarkSource {
    fn next_hands(&mut self) -> Result<HandObservation>;
}

/// Per-frame inference backend. May return zero or more skeletons; the ORT
/// backend yields at most one.
pub trait HandposeEngine {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<HandSkeleton>>;
}

pub struct CameraLandmarkSource<E: HandposeEngine> {
    camera: CameraFrameSource,
    engine: E,
}

impl<E: HandposeEngine> CameraLandmarkSource<E> {
    pub fn new(camera: CameraFrameSource, engine: E) -> Self {
        Self { camera, engine }
    }
}

impl<E: HandposeEngine> LandmarkSource for CameraLandmarkSource<E> {
    fn next_hands(&mut self) -> Result<HandObservation> {
        let frame = self.camera.capture()?;
        let hands = self.engine.infer(&frame)?;
        Ok(HandObservation {
            hands,
            captured_at: frame.timestamp,
        })
    }
}

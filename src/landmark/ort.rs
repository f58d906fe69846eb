use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{DetectorConfig, HandposeEngine, common};
use crate::types::{Frame, HandSkeleton};

pub struct OrtEngine {
    session: Session,
    cfg: DetectorConfig,
    hand_active: bool,
}

impl OrtEngine {
    pub fn new(cfg: DetectorConfig) -> Result<Self> {
        let session = build_session(&cfg.model_path)?;
        log::info!(
            "handpose ORT backend ready using {}",
            cfg.model_path.display()
        );

        Ok(Self {
            session,
            cfg,
            hand_active: false,
        })
    }
}

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(2)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}

impl HandposeEngine for OrtEngine {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<HandSkeleton>> {
        let (input, letterbox) = common::prepare_frame(frame)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run ORT session")?;

        if outputs.len() < 1 {
            return Err(anyhow!("model returned no outputs"));
        }

        let coords = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = coords.iter().copied().collect();
        let points = common::decode_landmarks(&flattened)?;

        let confidence = if outputs.len() > 1 {
            outputs[1]
                .try_extract_array::<f32>()
                .ok()
                .and_then(|arr| arr.iter().next().copied())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0)
        } else {
            0.0
        };

        // A tracked hand only needs to clear the (typically lower) tracking
        // bar; a fresh detection needs the full detection confidence.
        let threshold = if self.hand_active {
            self.cfg.min_tracking_confidence
        } else {
            self.cfg.min_detection_confidence
        };

        if confidence < threshold {
            self.hand_active = false;
            return Ok(Vec::new());
        }

        self.hand_active = true;
        let skeleton = common::to_skeleton(&points, &letterbox)?;
        Ok(vec![skeleton])
    }
}

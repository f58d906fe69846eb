use std::time::Instant;

use anyhow::{Result, anyhow};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraIndex, CameraInfo, FrameFormat, RequestedFormat, RequestedFormatType,
    },
};
use serde::Deserialize;

use crate::types::Frame;

// Prefer pixel formats that are widely supported; built-in cameras often
// reject YUYV even though Nokhwa reports it.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
    FrameFormat::GRAY,
    FrameFormat::YUYV,
    FrameFormat::NV12,
    FrameFormat::MJPEG,
];

fn requested_formats() -> [RequestedFormat<'static>; 4] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestResolution,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0 }
    }
}

#[derive(Clone, Debug)]
pub struct CameraDevice {
    pub index: CameraIndex,
    pub label: String,
}

pub fn available_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().clone(),
            label: format_camera_label(&info),
        })
        .collect())
}

fn format_camera_label(info: &CameraInfo) -> String {
    info.human_name()
}

fn build_camera(index: CameraIndex) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
}

/// Blocking frame source. The whole pipeline runs at this camera's natural
/// pace: `capture` blocks until the driver hands over the next frame, and
/// nothing upstream buffers on our side.
pub struct CameraFrameSource {
    camera: Camera,
}

impl CameraFrameSource {
    /// Opening the device is the one fatal setup step; a camera that cannot
    /// be opened ends the process rather than the frame.
    pub fn open(cfg: &CameraConfig) -> Result<Self> {
        let camera = build_camera(CameraIndex::Index(cfg.index))?;
        log::info!(
            "camera {} open at {}x{}",
            cfg.index,
            camera.resolution().width(),
            camera.resolution().height()
        );
        Ok(Self { camera })
    }

    pub fn capture(&mut self) -> Result<Frame> {
        let raw = self.camera.frame()?;
        let decoded = raw.decode_image::<RgbFormat>()?;

        let (width, height) = decoded.dimensions();
        let rgb = decoded.into_raw();
        if rgb.is_empty() {
            return Err(anyhow!("camera returned an empty frame"));
        }

        // Expand RGB to RGBA for the inference preprocessing.
        let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
        for chunk in rgb.chunks_exact(3) {
            rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
        }

        Ok(Frame {
            rgba,
            width,
            height,
            timestamp: Instant::now(),
        })
    }
}

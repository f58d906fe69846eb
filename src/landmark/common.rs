use anyhow::{Result, anyhow};
use image::{RgbaImage, imageops::FilterType};
use ndarray::Array4;

use crate::types::{Frame, HandSkeleton, Landmark, NUM_LANDMARKS};

pub const INPUT_SIZE: u32 = 224;

#[derive(Clone, Debug)]
pub struct LetterboxInfo {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
}

/// Letterbox the frame into the model's square input and scale pixels to
/// [0, 1], keeping the mapping needed to take landmarks back out.
pub fn prepare_frame(frame: &Frame) -> Result<(Array4<f32>, LetterboxInfo)> {
    let Some(img) = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()) else {
        return Err(anyhow!("failed to build RGBA image from frame"));
    };

    let scale = INPUT_SIZE as f32 / (frame.width.max(frame.height) as f32);
    let new_w = (frame.width as f32 * scale).round().max(1.0) as u32;
    let new_h = (frame.height as f32 * scale).round().max(1.0) as u32;
    let resized = image::imageops::resize(&img, new_w, new_h, FilterType::CatmullRom);

    let pad_x = ((INPUT_SIZE as i64 - new_w as i64) / 2).max(0) as f32;
    let pad_y = ((INPUT_SIZE as i64 - new_h as i64) / 2).max(0) as f32;
    let mut canvas =
        RgbaImage::from_pixel(INPUT_SIZE, INPUT_SIZE, image::Rgba([0u8, 0u8, 0u8, 255u8]));
    for y in 0..new_h {
        for x in 0..new_w {
            let px = *resized.get_pixel(x, y);
            let lx = (x as f32 + pad_x).round() as u32;
            let ly = (y as f32 + pad_y).round() as u32;
            if lx < canvas.width() && ly < canvas.height() {
                canvas.put_pixel(lx, ly, px);
            }
        }
    }

    let mut input = Array4::<f32>::zeros((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3));
    for y in 0..INPUT_SIZE {
        for x in 0..INPUT_SIZE {
            let pixel = canvas.get_pixel(x, y).0;
            input[[0, y as usize, x as usize, 0]] = pixel[0] as f32 / 255.0;
            input[[0, y as usize, x as usize, 1]] = pixel[1] as f32 / 255.0;
            input[[0, y as usize, x as usize, 2]] = pixel[2] as f32 / 255.0;
        }
    }

    let letterbox = LetterboxInfo {
        scale,
        pad_x,
        pad_y,
        orig_w: frame.width,
        orig_h: frame.height,
    };

    Ok((input, letterbox))
}

/// Split the model's flat output into 21 letterbox-space points.
pub fn decode_landmarks(flat: &[f32]) -> Result<Vec<[f32; 3]>> {
    if flat.len() < NUM_LANDMARKS * 3 {
        return Err(anyhow!(
            "unexpected landmarks length: got {}, need {}",
            flat.len(),
            NUM_LANDMARKS * 3
        ));
    }

    let mut points = Vec::with_capacity(NUM_LANDMARKS);
    for chunk in flat.chunks_exact(3).take(NUM_LANDMARKS) {
        points.push([chunk[0], chunk[1], chunk[2]]);
    }
    Ok(points)
}

/// Undo the letterbox and express every point in normalized [0, 1] frame
/// coordinates, y down. Depth keeps the same divisor as x so relative
/// proportions survive.
pub fn to_skeleton(points: &[[f32; 3]], letterbox: &LetterboxInfo) -> Result<HandSkeleton> {
    if points.len() < NUM_LANDMARKS {
        return Err(anyhow!(
            "skeleton needs {} points, got {}",
            NUM_LANDMARKS,
            points.len()
        ));
    }

    let norm_w = (letterbox.orig_w.max(1)) as f32;
    let norm_h = (letterbox.orig_h.max(1)) as f32;

    let mut landmarks = [Landmark::default(); NUM_LANDMARKS];
    for (slot, [x, y, z]) in landmarks.iter_mut().zip(points.iter().copied()) {
        let px = (x - letterbox.pad_x) / letterbox.scale;
        let py = (y - letterbox.pad_y) / letterbox.scale;
        *slot = Landmark {
            x: (px / norm_w).clamp(0.0, 1.0),
            y: (py / norm_h).clamp(0.0, 1.0),
            z: z / letterbox.scale / norm_w,
        };
    }

    Ok(HandSkeleton::new(landmarks))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::types::landmarks;

    #[test]
    fn decode_rejects_short_output() {
        assert!(decode_landmarks(&[0.0; 10]).is_err());
    }

    #[test]
    fn decode_takes_first_21_triples() {
        let flat: Vec<f32> = (0..NUM_LANDMARKS * 3).map(|i| i as f32).collect();
        let points = decode_landmarks(&flat).unwrap();
        assert_eq!(points.len(), NUM_LANDMARKS);
        assert_eq!(points[0], [0.0, 1.0, 2.0]);
        assert_eq!(points[20], [60.0, 61.0, 62.0]);
    }

    #[test]
    fn to_skeleton_maps_letterbox_center_to_frame_center() {
        // 640x480 frame: scale 0.35, 168px of content, 28px vertical pads.
        let letterbox = LetterboxInfo {
            scale: 0.35,
            pad_x: 0.0,
            pad_y: 28.0,
            orig_w: 640,
            orig_h: 480,
        };
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        points[landmarks::WRIST] = [112.0, 112.0, 0.0];

        let skeleton = to_skeleton(&points, &letterbox).unwrap();
        let wrist = skeleton.point(landmarks::WRIST);
        assert!((wrist.x - 0.5).abs() < 1e-4);
        assert!((wrist.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn to_skeleton_clamps_outside_points() {
        let letterbox = LetterboxInfo {
            scale: 0.35,
            pad_x: 0.0,
            pad_y: 28.0,
            orig_w: 640,
            orig_h: 480,
        };
        let mut points = [[112.0f32; 3]; NUM_LANDMARKS];
        // Inside the top letterbox pad, above the actual frame.
        points[landmarks::WRIST] = [112.0, 5.0, 0.0];

        let skeleton = to_skeleton(&points, &letterbox).unwrap();
        assert_eq!(skeleton.point(landmarks::WRIST).y, 0.0);
    }

    #[test]
    fn prepare_frame_letterboxes_landscape_input() {
        let frame = Frame {
            rgba: vec![255; (64 * 48 * 4) as usize],
            width: 64,
            height: 48,
            timestamp: Instant::now(),
        };
        let (input, letterbox) = prepare_frame(&frame).unwrap();
        assert_eq!(input.shape(), &[1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3]);
        assert_eq!(letterbox.orig_w, 64);
        assert_eq!(letterbox.orig_h, 48);
        assert_eq!(letterbox.pad_x, 0.0);
        assert!(letterbox.pad_y > 0.0);
        assert!((letterbox.scale - INPUT_SIZE as f32 / 64.0).abs() < 1e-6);
    }
}

use std::time::Instant;

use serde::{Deserialize, Serialize};

pub const NUM_LANDMARKS: usize = 21;

/// MediaPipe hand landmark indices.
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

/// One tracked point in normalized image coordinates, x and y in [0, 1]
/// with y increasing downward; z is relative depth from the wrist.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[allow(dead_code)]
    pub z: f32,
}

/// All 21 landmarks for one detected hand in one frame.
#[derive(Clone, Debug)]
pub struct HandSkeleton {
    points: [Landmark; NUM_LANDMARKS],
}

impl HandSkeleton {
    pub fn new(points: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    pub fn point(&self, idx: usize) -> Landmark {
        self.points[idx]
    }
}

/// Everything the landmark source produced for one captured frame.
#[derive(Clone, Debug)]
pub struct HandObservation {
    pub hands: Vec<HandSkeleton>,
    pub captured_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureLabel {
    Open,
    Closed,
    Ambiguous,
}

/// Outbound request to the transfer sink, serialized lowercase on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionEvent {
    Grab,
    /// Never sent by the tracker; the receiving side finalizes a transfer.
    #[allow(dead_code)]
    Release,
    /// Manual recovery escape hatch on the sink.
    #[allow(dead_code)]
    Reset,
}

/// Transfer status owned by the remote sink. Reported back in replies and
/// logged; never read into the local control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkState {
    Idle,
    Grabbed,
    Transferred,
}
